//! Row-by-row driver: normalize, aggregate, format, tally.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;

use crate::aggregate::{Aggregate, aggregate};
use crate::format::{CompoundUnits, DisplayStyle, FormattedValue, format};
use crate::normalize::{RowError, normalize};
use crate::schedule::{AccountingMode, ExcludedDays, WeekdayExclusion, WorkSchedule};

/// One input row as read from the source sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl RawRow {
    pub fn new(start: Option<impl Into<String>>, end: Option<impl Into<String>>) -> Self {
        Self {
            start: start.map(Into::into),
            end: end.map(Into::into),
        }
    }
}

/// Per-category row counts for one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ErrorStats {
    pub empty_input: usize,
    pub format_error: usize,
    pub inverted_order: usize,
    /// Valid rows whose counted time is zero. These still carry a value.
    pub zero_duration: usize,
}

impl ErrorStats {
    pub const fn record(&mut self, error: RowError) {
        match error {
            RowError::EmptyInput => self.empty_input += 1,
            RowError::FormatError => self.format_error += 1,
            RowError::InvertedOrder => self.inverted_order += 1,
        }
    }

    /// Rows that produced no value.
    pub const fn failed(&self) -> usize {
        self.empty_input + self.format_error + self.inverted_order
    }
}

/// Everything the driver needs besides the rows.
#[derive(Debug, Clone)]
pub struct BatchOptions<E = WeekdayExclusion> {
    pub schedule: WorkSchedule,
    pub mode: AccountingMode,
    pub style: DisplayStyle,
    pub units: CompoundUnits,
    pub excluded: E,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            schedule: WorkSchedule::default(),
            mode: AccountingMode::default(),
            style: DisplayStyle::default(),
            units: CompoundUnits::default(),
            excluded: WeekdayExclusion::default(),
        }
    }
}

/// Outcome of evaluating a single row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Counted {
        value: FormattedValue,
        zero: bool,
        touched_excluded: Vec<NaiveDate>,
    },
    Failed(RowError),
}

/// Results of a batch, aligned with the input rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    /// One entry per input row; `None` when the row was not computable.
    pub results: Vec<Option<FormattedValue>>,
    pub stats: ErrorStats,
    /// Row index to the excluded dates its span touches.
    pub excluded_touches: BTreeMap<usize, Vec<NaiveDate>>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Rows with a value, zero-valued rows included.
    pub fn valid(&self) -> usize {
        self.results.iter().filter(|r| r.is_some()).count()
    }

    pub const fn invalid(&self) -> usize {
        self.stats.failed()
    }
}

/// Evaluates one row. Never panics on malformed input.
pub fn evaluate_row<E>(row: &RawRow, options: &BatchOptions<E>) -> RowOutcome
where
    E: ExcludedDays,
{
    let (start, end) = match normalize(row.start.as_deref(), row.end.as_deref()) {
        Ok(pair) => pair,
        Err(error) => return RowOutcome::Failed(error),
    };

    let aggregate = match aggregate(start, end, &options.schedule, options.mode, &options.excluded) {
        Ok(aggregate) => aggregate,
        Err(e) => {
            tracing::warn!(%start, %end, error = %e, "row could not be aggregated");
            return RowOutcome::Failed(RowError::FormatError);
        }
    };

    counted_outcome(&aggregate, options)
}

fn counted_outcome<E>(aggregate: &Aggregate, options: &BatchOptions<E>) -> RowOutcome {
    // format only returns None for None input
    let value = format(Some(aggregate.hours()), options.style, &options.units)
        .unwrap_or(FormattedValue::Hours(0.0));
    RowOutcome::Counted {
        value,
        zero: aggregate.is_zero(),
        touched_excluded: aggregate.touched_excluded.clone(),
    }
}

/// Runs every row and collects values, tallies and annotations.
///
/// Rows are evaluated in parallel; the report keeps input order.
pub fn run_batch<E>(rows: &[RawRow], options: &BatchOptions<E>) -> BatchReport
where
    E: ExcludedDays + Sync,
{
    let outcomes: Vec<RowOutcome> = rows
        .par_iter()
        .map(|row| evaluate_row(row, options))
        .collect();

    let mut report = BatchReport {
        results: Vec::with_capacity(outcomes.len()),
        ..BatchReport::default()
    };

    for (idx, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            RowOutcome::Counted {
                value,
                zero,
                touched_excluded,
                ..
            } => {
                if zero {
                    report.stats.zero_duration += 1;
                }
                if !touched_excluded.is_empty() {
                    report.excluded_touches.insert(idx, touched_excluded);
                }
                report.results.push(Some(value));
            }
            RowOutcome::Failed(error) => {
                tracing::trace!(row = idx, %error, "row skipped");
                report.stats.record(error);
                report.results.push(None);
            }
        }
    }

    tracing::debug!(
        rows = report.total(),
        valid = report.valid(),
        stats = ?report.stats,
        "batch complete"
    );

    report
}
