//! Statistics engine
//!
//! Accumulates per-hour counters for resolved queries and produces
//! aggregated snapshots at hourly or daily granularity.

mod data;
mod memory;

use serde::Serialize;
use std::time::Duration;

pub use data::{StatsData, TopEntry};
pub use memory::MemoryStats;

/// Bucket size of a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Hours,
    Days,
}

impl TimeUnit {
    /// Granularity used for a given retention interval.
    ///
    /// Anything longer than a week is reported per day.
    pub const fn for_interval(interval_days: u32) -> Self {
        if interval_days > 7 {
            Self::Days
        } else {
            Self::Hours
        }
    }
}

impl std::fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hours => write!(f, "hours"),
            Self::Days => write!(f, "days"),
        }
    }
}

/// Outcome of a single query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    NotFiltered,
    Filtered,
    SafeBrowsing,
    SafeSearch,
    Parental,
}

impl ResultKind {
    pub(crate) const COUNT: usize = 5;

    pub(crate) const fn index(self) -> usize {
        match self {
            Self::NotFiltered => 0,
            Self::Filtered => 1,
            Self::SafeBrowsing => 2,
            Self::SafeSearch => 3,
            Self::Parental => 4,
        }
    }

    pub const fn is_blocked(self) -> bool {
        !matches!(self, Self::NotFiltered)
    }
}

/// One observation fed to the engine
#[derive(Debug, Clone)]
pub struct Entry {
    pub domain: String,
    pub client: String,
    pub result: ResultKind,
    pub elapsed: Duration,
}

/// Contract between the control API and the statistics backend.
///
/// Implementations synchronize internally; every method takes `&self`.
pub trait StatsEngine: Send + Sync {
    /// Set the retention window in days.
    fn configure(&self, interval_days: u32);

    /// Produce an aggregated snapshot at the requested granularity.
    fn get_data(&self, unit: TimeUnit) -> StatsData;

    /// Drop every collected counter.
    fn clear(&self);

    /// Account one query.
    fn record(&self, entry: Entry);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_granularity_threshold() {
        assert_eq!(TimeUnit::for_interval(1), TimeUnit::Hours);
        assert_eq!(TimeUnit::for_interval(7), TimeUnit::Hours);
        assert_eq!(TimeUnit::for_interval(8), TimeUnit::Days);
        assert_eq!(TimeUnit::for_interval(30), TimeUnit::Days);
        assert_eq!(TimeUnit::for_interval(90), TimeUnit::Days);
    }

    #[test]
    fn test_time_unit_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&TimeUnit::Hours).unwrap(), r#""hours""#);
        assert_eq!(TimeUnit::Days.to_string(), "days");
    }
}
