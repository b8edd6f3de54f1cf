//! Core working-time logic.
//!
//! This crate converts clock-in/clock-out pairs into counted working time:
//! - Normalize: classify raw (start, end) pairs as usable or failed
//! - Aggregate: intersect a span with daily work windows, or count whole days,
//!   skipping an excluded weekday
//! - Format: render hours as a rounded number or as days/hours/minutes
//! - Batch: run the pipeline over many rows and tally failures

mod aggregate;
mod batch;
mod format;
mod normalize;
mod schedule;

pub use aggregate::{Aggregate, AggregateError, aggregate};
pub use batch::{
    BatchOptions, BatchReport, ErrorStats, RawRow, RowOutcome, evaluate_row, run_batch,
};
pub use format::{
    Breakdown, CompoundUnits, DisplayStyle, FormattedValue, UnknownStyle, format, round_hours,
};
pub use normalize::{RowError, normalize, parse_instant};
pub use schedule::{
    AccountingMode, ExcludedDays, ScheduleError, UnknownMode, WeekdayExclusion, WorkPeriod,
    WorkSchedule,
};
