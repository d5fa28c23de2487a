//! # clusterscan-contracts
//!
//! Shared types, wire records, and error types for the clusterscan
//! publishing agent.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate, only data definitions, object key layout, and error types.

pub mod audit;
pub mod error;
pub mod layout;
pub mod metadata;
