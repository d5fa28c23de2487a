//! The date-range driver.
//!
//! Walks an inclusive range of calendar days in ascending order and, for
//! each day, obtains an audit and publishes it. A day that fails to publish
//! is recorded and the walk continues.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use tracing::{error, info};

use clusterscan_contracts::{
    error::{ScanError, ScanResult},
    metadata::PublishedAuditMetadata,
};

use crate::{publisher::Publisher, traits::AuditSource};

/// Accepted format for `from` / `to` configuration values.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// An inclusive range of scan days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> ScanResult<Self> {
        if end < start {
            return Err(ScanError::DateRange {
                reason: format!("end date {end} is before start date {start}"),
            });
        }
        Ok(Self { start, end })
    }

    /// A range covering only `day`.
    pub fn single(day: NaiveDate) -> Self {
        Self { start: day, end: day }
    }

    /// Resolve the range from optional configuration strings.
    ///
    /// Empty strings count as absent. With neither bound present the range is
    /// `today..=today`; with only one present the configuration is rejected.
    pub fn resolve(from: Option<&str>, to: Option<&str>, today: NaiveDate) -> ScanResult<Self> {
        let from = from.filter(|s| !s.is_empty());
        let to = to.filter(|s| !s.is_empty());

        match (from, to) {
            (None, None) => Ok(Self::single(today)),
            (Some(from), Some(to)) => Self::new(parse_date("from", from)?, parse_date("to", to)?),
            _ => Err(ScanError::DateRange {
                reason: "from and to dates should both have values, or both be empty".to_string(),
            }),
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Every day in the range, ascending.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        std::iter::successors(Some(self.start), |day| day.checked_add_days(Days::new(1)))
            .take_while(move |day| *day <= end)
    }
}

fn parse_date(field: &str, value: &str) -> ScanResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|e| ScanError::DateRange {
        reason: format!("{field} date '{value}' is not a valid YYYY-MM-DD date: {e}"),
    })
}

/// What happened to one scan day.
#[derive(Debug)]
pub struct DayOutcome {
    pub date: NaiveDate,
    pub published: ScanResult<PublishedAuditMetadata>,
}

/// The per-day results of a driver run, in processing order.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub days: Vec<DayOutcome>,
}

impl RunSummary {
    pub fn has_failures(&self) -> bool {
        self.days.iter().any(|d| d.published.is_err())
    }

    pub fn failed_days(&self) -> impl Iterator<Item = &DayOutcome> {
        self.days.iter().filter(|d| d.published.is_err())
    }
}

/// Runs audit + publish once per day of a range.
pub struct Driver {
    source: Box<dyn AuditSource>,
    publisher: Publisher,
}

impl Driver {
    pub fn new(source: Box<dyn AuditSource>, publisher: Publisher) -> Self {
        Self { source, publisher }
    }

    /// Process `range`, stamping each day with the current UTC time of day.
    pub fn run(&mut self, range: &DateRange) -> RunSummary {
        self.run_at(range, Utc::now().time())
    }

    /// Process `range`, stamping each day with `time_of_day`.
    pub fn run_at(&mut self, range: &DateRange, time_of_day: NaiveTime) -> RunSummary {
        info!(from = %range.start, to = %range.end, "starting scan range");

        let mut summary = RunSummary::default();
        for date in range.days() {
            let scan_date: DateTime<Utc> = date.and_time(time_of_day).and_utc();

            let run = self.source.produce_audit(scan_date);
            let published = self.publisher.publish(run, scan_date);

            if let Err(e) = &published {
                error!(date = %date, error = %e, "publishing scan day failed");
            }
            summary.days.push(DayOutcome { date, published });
        }

        info!(
            days = summary.days.len(),
            failed = summary.failed_days().count(),
            "scan range finished"
        );
        summary
    }
}

impl std::fmt::Debug for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Driver")
            .field("publisher", &self.publisher)
            .finish_non_exhaustive()
    }
}
