//! Accounting policy inputs: daily work windows, the day-accounting mode and
//! the excluded-day predicate.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while building a [`WorkSchedule`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// A period does not open strictly before it closes.
    #[error("period {open}-{close} must open before it closes")]
    NotOrdered { open: NaiveTime, close: NaiveTime },

    /// Two periods overlap once sorted by opening time (1-based positions).
    #[error("period {first} overlaps period {second}")]
    Overlap { first: usize, second: usize },
}

/// A daily clock-time window during which elapsed time counts as work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct WorkPeriod {
    open: NaiveTime,
    close: NaiveTime,
}

impl WorkPeriod {
    /// Creates a period, rejecting empty or reversed windows.
    pub fn new(open: NaiveTime, close: NaiveTime) -> Result<Self, ScheduleError> {
        if open >= close {
            return Err(ScheduleError::NotOrdered { open, close });
        }
        Ok(Self { open, close })
    }

    pub const fn open(&self) -> NaiveTime {
        self.open
    }

    pub const fn close(&self) -> NaiveTime {
        self.close
    }
}

impl fmt::Display for WorkPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            self.open.format("%H:%M"),
            self.close.format("%H:%M")
        )
    }
}

/// Validated set of work periods, sorted by opening time and non-overlapping.
///
/// Periods that touch (one closes exactly when the next opens) are accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkSchedule {
    periods: Vec<WorkPeriod>,
}

impl WorkSchedule {
    /// Sorts the periods and rejects any overlap between neighbours.
    pub fn new(mut periods: Vec<WorkPeriod>) -> Result<Self, ScheduleError> {
        periods.sort_by_key(WorkPeriod::open);
        for (idx, pair) in periods.windows(2).enumerate() {
            if pair[1].open < pair[0].close {
                return Err(ScheduleError::Overlap {
                    first: idx + 1,
                    second: idx + 2,
                });
            }
        }
        Ok(Self { periods })
    }

    pub fn periods(&self) -> &[WorkPeriod] {
        &self.periods
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Opening time of the earliest period, or midnight when there is none.
    pub fn first_open(&self) -> NaiveTime {
        self.periods
            .first()
            .map_or(NaiveTime::MIN, WorkPeriod::open)
    }
}

impl fmt::Display for WorkSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.periods.is_empty() {
            return write!(f, "(no periods)");
        }
        for (idx, period) in self.periods.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{period}")?;
        }
        Ok(())
    }
}

/// How elapsed time is converted into counted time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AccountingMode {
    /// Only time inside the configured work periods counts.
    #[default]
    WindowBased,
    /// Every hour of every non-excluded day counts.
    FullDay,
}

impl AccountingMode {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::WindowBased => "window",
            Self::FullDay => "full-day",
        }
    }
}

impl fmt::Display for AccountingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AccountingMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "window" | "window-based" => Ok(Self::WindowBased),
            "full-day" | "24h" => Ok(Self::FullDay),
            _ => Err(UnknownMode(s.to_string())),
        }
    }
}

impl Serialize for AccountingMode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AccountingMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unknown accounting mode strings.
#[derive(Debug, Clone, Error)]
#[error("unknown accounting mode: {0} (expected `window` or `full-day`)")]
pub struct UnknownMode(String);

/// Decides which calendar dates contribute no counted time at all.
pub trait ExcludedDays {
    fn is_excluded(&self, date: NaiveDate) -> bool;
}

impl<F> ExcludedDays for F
where
    F: Fn(NaiveDate) -> bool,
{
    fn is_excluded(&self, date: NaiveDate) -> bool {
        self(date)
    }
}

/// Excludes every date falling on a single weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekdayExclusion {
    weekday: Option<Weekday>,
}

impl WeekdayExclusion {
    pub const fn new(weekday: Option<Weekday>) -> Self {
        Self { weekday }
    }

    /// Excludes nothing.
    pub const fn none() -> Self {
        Self { weekday: None }
    }
}

impl Default for WeekdayExclusion {
    fn default() -> Self {
        Self::new(Some(Weekday::Sun))
    }
}

impl ExcludedDays for WeekdayExclusion {
    fn is_excluded(&self, date: NaiveDate) -> bool {
        self.weekday == Some(date.weekday())
    }
}
