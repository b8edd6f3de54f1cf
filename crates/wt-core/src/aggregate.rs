//! Counted-time aggregation over a multi-day span.
//!
//! # Algorithm Summary
//!
//! 1. Collect every excluded date touched by `[start, end]` (annotation only)
//! 2. Window-based: walk the span day by day, intersecting the cursor with each
//!    work period re-anchored on the current date. Excluded dates are skipped
//!    and the cursor resumes at the next day's first opening time.
//! 3. Full-day: elapsed time minus the overlap with every touched excluded date
//! 4. Negative totals are clamped to zero

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

use crate::schedule::{AccountingMode, ExcludedDays, WorkSchedule};

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Failures while walking the calendar.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AggregateError {
    /// The span runs past the last representable date.
    #[error("no calendar date after {0}")]
    DateOverflow(NaiveDate),
}

/// Counted time for one span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregate {
    /// Counted duration, never negative.
    pub counted: Duration,

    /// Excluded dates overlapping the span, ascending.
    pub touched_excluded: Vec<NaiveDate>,
}

impl Aggregate {
    /// Counted duration in fractional hours.
    #[allow(clippy::cast_precision_loss)]
    pub fn hours(&self) -> f64 {
        self.counted.num_milliseconds() as f64 / MILLIS_PER_HOUR
    }

    pub fn is_zero(&self) -> bool {
        self.counted == Duration::zero()
    }
}

/// Computes counted time between `start` and `end` under `mode`.
///
/// Callers are expected to pass `start < end` (see `normalize`);
/// any other span simply counts as zero.
pub fn aggregate<E>(
    start: NaiveDateTime,
    end: NaiveDateTime,
    schedule: &WorkSchedule,
    mode: AccountingMode,
    excluded: &E,
) -> Result<Aggregate, AggregateError>
where
    E: ExcludedDays + ?Sized,
{
    let touched_excluded = touched_excluded_dates(start, end, excluded);

    let counted = match mode {
        AccountingMode::WindowBased => window_based(start, end, schedule, excluded)?,
        AccountingMode::FullDay => full_day(start, end, &touched_excluded)?,
    };

    let counted = if counted < Duration::zero() {
        tracing::warn!(%start, %end, ?counted, "negative counted time clamped to zero");
        Duration::zero()
    } else {
        counted
    };

    Ok(Aggregate {
        counted,
        touched_excluded,
    })
}

/// Dates `d` whose day `[d 00:00, d+1 00:00)` meets `[start, end]` and are excluded.
fn touched_excluded_dates<E>(start: NaiveDateTime, end: NaiveDateTime, excluded: &E) -> Vec<NaiveDate>
where
    E: ExcludedDays + ?Sized,
{
    let last = end.date();
    start
        .date()
        .iter_days()
        .take_while(|day| *day <= last)
        .filter(|day| excluded.is_excluded(*day))
        .collect()
}

fn next_day(day: NaiveDate) -> Result<NaiveDate, AggregateError> {
    day.succ_opt().ok_or(AggregateError::DateOverflow(day))
}

fn overlap(
    start: NaiveDateTime,
    end: NaiveDateTime,
    window_start: NaiveDateTime,
    window_end: NaiveDateTime,
) -> Duration {
    let from = start.max(window_start);
    let to = end.min(window_end);
    if from < to { to - from } else { Duration::zero() }
}

fn window_based<E>(
    start: NaiveDateTime,
    end: NaiveDateTime,
    schedule: &WorkSchedule,
    excluded: &E,
) -> Result<Duration, AggregateError>
where
    E: ExcludedDays + ?Sized,
{
    let mut counted = Duration::zero();
    let mut cursor = start;

    while cursor < end {
        let day = cursor.date();
        let tomorrow = next_day(day)?;

        if excluded.is_excluded(day) {
            cursor = tomorrow.and_time(schedule.first_open());
            continue;
        }

        for period in schedule.periods() {
            counted += overlap(
                cursor,
                end,
                day.and_time(period.open()),
                day.and_time(period.close()),
            );
        }

        cursor = tomorrow.and_time(NaiveTime::MIN);
    }

    Ok(counted)
}

fn full_day(
    start: NaiveDateTime,
    end: NaiveDateTime,
    touched_excluded: &[NaiveDate],
) -> Result<Duration, AggregateError> {
    let mut counted = end - start;
    for day in touched_excluded {
        let day_start = day.and_time(NaiveTime::MIN);
        let day_end = next_day(*day)?.and_time(NaiveTime::MIN);
        counted -= overlap(start, end, day_start, day_end);
    }
    Ok(counted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{WeekdayExclusion, WorkPeriod};

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn t(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%H:%M").unwrap()
    }

    fn schedule(periods: &[(&str, &str)]) -> WorkSchedule {
        WorkSchedule::new(
            periods
                .iter()
                .map(|(open, close)| WorkPeriod::new(t(open), t(close)).unwrap())
                .collect(),
        )
        .unwrap()
    }

    fn office() -> WorkSchedule {
        schedule(&[("08:30", "12:00"), ("13:30", "18:00")])
    }

    fn window(start: &str, end: &str) -> Aggregate {
        aggregate(
            dt(start),
            dt(end),
            &office(),
            AccountingMode::WindowBased,
            &WeekdayExclusion::default(),
        )
        .unwrap()
    }

    fn full(start: &str, end: &str) -> Aggregate {
        aggregate(
            dt(start),
            dt(end),
            &office(),
            AccountingMode::FullDay,
            &WeekdayExclusion::default(),
        )
        .unwrap()
    }

    #[test]
    fn morning_and_afternoon_partial_windows() {
        // Monday 09:00-14:00: 3h in the morning window, 0.5h after lunch
        let result = window("2024-05-06 09:00", "2024-05-06 14:00");
        assert!((result.hours() - 3.5).abs() < f64::EPSILON);
        assert!(result.touched_excluded.is_empty());
    }

    #[test]
    fn span_inside_one_window_counts_fully() {
        let result = window("2024-05-07 09:15", "2024-05-07 11:45");
        assert_eq!(result.counted, Duration::minutes(150));
    }

    #[test]
    fn span_inside_lunch_gap_counts_nothing() {
        let result = window("2024-05-07 12:10", "2024-05-07 13:20");
        assert!(result.is_zero());
    }

    #[test]
    fn sunday_is_skipped_across_weekend() {
        // Saturday 10:00 to Monday 10:00: Sat 2h + 4.5h, Mon 1.5h
        let result = window("2024-05-11 10:00", "2024-05-13 10:00");
        assert_eq!(result.counted, Duration::hours(8));
        assert_eq!(result.touched_excluded, vec![date("2024-05-12")]);
    }

    #[test]
    fn full_day_subtracts_one_sunday() {
        let result = full("2024-05-11 00:00", "2024-05-13 00:00");
        assert_eq!(result.counted, Duration::hours(24));
        assert!((result.hours() - 24.0).abs() < f64::EPSILON);
        assert_eq!(result.touched_excluded, vec![date("2024-05-12")]);
    }

    #[test]
    fn full_day_without_sunday_is_elapsed_time() {
        let result = full("2024-05-06 07:45", "2024-05-08 19:10");
        assert_eq!(result.counted, dt("2024-05-08 19:10") - dt("2024-05-06 07:45"));
    }

    #[test]
    fn full_day_partial_sunday_overlap() {
        // Saturday 22:00 to Sunday 05:00: only the 2 Saturday hours count
        let result = full("2024-05-11 22:00", "2024-05-12 05:00");
        assert_eq!(result.counted, Duration::hours(2));
        assert_eq!(result.touched_excluded, vec![date("2024-05-12")]);
    }

    #[test]
    fn span_within_sunday_is_zero_in_both_modes() {
        assert!(window("2024-05-12 09:00", "2024-05-12 17:00").is_zero());
        assert!(full("2024-05-12 09:00", "2024-05-12 17:00").is_zero());
    }

    #[test]
    fn end_at_midnight_touches_that_date() {
        let result = full("2024-05-11 20:00", "2024-05-12 00:00");
        assert_eq!(result.counted, Duration::hours(4));
        assert_eq!(result.touched_excluded, vec![date("2024-05-12")]);
    }

    #[test]
    fn two_weeks_touch_two_sundays() {
        let result = full("2024-05-06 00:00", "2024-05-20 00:00");
        assert_eq!(result.counted, Duration::hours(14 * 24 - 2 * 24));
        assert_eq!(
            result.touched_excluded,
            vec![date("2024-05-12"), date("2024-05-19")]
        );
    }

    #[test]
    fn full_week_of_windows() {
        // Mon 00:00 to next Mon 00:00: six working days of 8h each
        let result = window("2024-05-06 00:00", "2024-05-13 00:00");
        assert_eq!(result.counted, Duration::hours(48));
    }

    #[test]
    fn resumes_at_first_configured_opening_after_sunday() {
        let early = schedule(&[("06:00", "07:00"), ("08:30", "12:00")]);
        let result = aggregate(
            dt("2024-05-12 10:00"),
            dt("2024-05-13 09:00"),
            &early,
            AccountingMode::WindowBased,
            &WeekdayExclusion::default(),
        )
        .unwrap();
        assert_eq!(result.counted, Duration::minutes(90));
    }

    #[test]
    fn no_exclusion_counts_sunday_windows() {
        let result = aggregate(
            dt("2024-05-12 09:00"),
            dt("2024-05-12 10:00"),
            &office(),
            AccountingMode::WindowBased,
            &WeekdayExclusion::none(),
        )
        .unwrap();
        assert_eq!(result.counted, Duration::hours(1));
        assert!(result.touched_excluded.is_empty());
    }

    #[test]
    fn empty_schedule_counts_nothing_in_window_mode() {
        let result = aggregate(
            dt("2024-05-06 09:00"),
            dt("2024-05-07 09:00"),
            &WorkSchedule::default(),
            AccountingMode::WindowBased,
            &WeekdayExclusion::default(),
        )
        .unwrap();
        assert!(result.is_zero());
    }

    #[test]
    fn custom_predicate_excludes_holiday() {
        let holiday = date("2024-05-01");
        let result = aggregate(
            dt("2024-04-30 09:00"),
            dt("2024-05-02 09:00"),
            &office(),
            AccountingMode::FullDay,
            &move |d: NaiveDate| d == holiday,
        )
        .unwrap();
        assert_eq!(result.counted, Duration::hours(24));
        assert_eq!(result.touched_excluded, vec![holiday]);
    }

    #[test]
    fn last_representable_date_overflows() {
        let err = aggregate(
            NaiveDate::MAX.and_time(t("09:00")),
            NaiveDate::MAX.and_time(t("10:00")),
            &office(),
            AccountingMode::WindowBased,
            &WeekdayExclusion::none(),
        )
        .unwrap_err();
        assert_eq!(err, AggregateError::DateOverflow(NaiveDate::MAX));
    }

    #[test]
    fn counted_time_is_never_negative() {
        let starts = ["2024-05-10 23:30", "2024-05-11 17:59", "2024-05-12 00:00"];
        let ends = ["2024-05-12 00:01", "2024-05-13 08:29", "2024-05-14 23:59"];
        for start in starts {
            for end in ends {
                for mode in [AccountingMode::WindowBased, AccountingMode::FullDay] {
                    let result = aggregate(
                        dt(start),
                        dt(end),
                        &office(),
                        mode,
                        &WeekdayExclusion::default(),
                    )
                    .unwrap();
                    assert!(result.hours() >= 0.0, "{start} -> {end} ({mode})");
                }
            }
        }
    }
}
