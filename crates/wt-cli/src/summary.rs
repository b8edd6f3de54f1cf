//! Run summary shown after a batch.
//!
//! Mirrors the counters the batch produces: totals, valid (zero included),
//! zero, invalid, and the breakdown of invalid rows by cause.

use std::fmt::Write;

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;

use wt_core::{BatchReport, DisplayStyle, ErrorStats};

/// Annotation attached to one output row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowNote {
    /// 1-based sheet row.
    pub row: usize,
    pub text: String,
}

/// Everything reported back to the user for one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub sheet: String,
    pub output: String,
    pub style: DisplayStyle,
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub stats: ErrorStats,
    pub notes: Vec<RowNote>,
}

impl RunSummary {
    /// Builds the summary; `first_row` is the 0-based sheet row of result 0.
    pub fn new(
        sheet: impl Into<String>,
        output: impl Into<String>,
        style: DisplayStyle,
        report: &BatchReport,
        first_row: usize,
    ) -> Self {
        let notes = report
            .excluded_touches
            .iter()
            .map(|(idx, dates)| RowNote {
                row: first_row + idx + 1,
                text: excluded_note(dates),
            })
            .collect();

        Self {
            sheet: sheet.into(),
            output: output.into(),
            style,
            total: report.total(),
            valid: report.valid(),
            invalid: report.invalid(),
            stats: report.stats,
            notes,
        }
    }
}

/// Annotation text for a row whose span touches excluded dates.
pub fn excluded_note(dates: &[NaiveDate]) -> String {
    let listed: Vec<String> = dates.iter().map(|d| d.format("%m-%d").to_string()).collect();
    format!(
        "contains {} excluded day(s): {}",
        dates.len(),
        listed.join(", ")
    )
}

/// Formats the human-readable summary.
pub fn format_summary(summary: &RunSummary) -> String {
    let mut output = String::new();

    writeln!(output, "RESULTS: {}", summary.sheet).unwrap();
    writeln!(output, "───────").unwrap();
    writeln!(output, "Total rows:     {}", summary.total).unwrap();
    writeln!(output, "Valid rows:     {} (zero included)", summary.valid).unwrap();
    writeln!(output, "Zero rows:      {}", summary.stats.zero_duration).unwrap();
    writeln!(output, "Invalid rows:   {}", summary.invalid).unwrap();

    writeln!(output).unwrap();
    writeln!(output, "INVALID BY CAUSE").unwrap();
    writeln!(output, "────────────────").unwrap();
    writeln!(output, "Empty input:    {}", summary.stats.empty_input).unwrap();
    writeln!(output, "Format error:   {}", summary.stats.format_error).unwrap();
    writeln!(output, "Inverted order: {}", summary.stats.inverted_order).unwrap();

    if !summary.notes.is_empty() {
        writeln!(output).unwrap();
        writeln!(output, "EXCLUDED DAYS").unwrap();
        writeln!(output, "─────────────").unwrap();
        for note in &summary.notes {
            writeln!(output, "Row {}: {}", note.row, note.text).unwrap();
        }
    }

    writeln!(output).unwrap();
    writeln!(output, "Saved {} ({})", summary.output, summary.style).unwrap();

    output
}

/// Formats the summary as JSON.
pub fn format_summary_json(summary: &RunSummary) -> Result<String> {
    Ok(serde_json::to_string_pretty(summary)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeMap;

    use insta::assert_snapshot;
    use wt_core::FormattedValue;

    fn sample_report() -> BatchReport {
        let mut excluded_touches = BTreeMap::new();
        excluded_touches.insert(
            2,
            vec![
                NaiveDate::from_ymd_opt(2024, 5, 12).unwrap(),
                NaiveDate::from_ymd_opt(2024, 5, 19).unwrap(),
            ],
        );
        BatchReport {
            results: vec![
                Some(FormattedValue::Hours(3.5)),
                None,
                Some(FormattedValue::Hours(40.0)),
                Some(FormattedValue::Hours(0.0)),
                None,
            ],
            stats: ErrorStats {
                empty_input: 1,
                format_error: 0,
                inverted_order: 1,
                zero_duration: 1,
            },
            excluded_touches,
        }
    }

    #[test]
    fn excluded_note_lists_month_day() {
        let dates = [NaiveDate::from_ymd_opt(2024, 5, 12).unwrap()];
        assert_eq!(excluded_note(&dates), "contains 1 excluded day(s): 05-12");
    }

    #[test]
    fn note_rows_are_one_based_sheet_rows() {
        let summary = RunSummary::new("hours.csv", "hours.csv", DisplayStyle::Hours, &sample_report(), 1);
        assert_eq!(summary.notes.len(), 1);
        assert_eq!(summary.notes[0].row, 4);
    }

    #[test]
    fn test_summary_with_notes() {
        let summary = RunSummary::new("hours.csv", "hours.csv", DisplayStyle::Hours, &sample_report(), 1);
        assert_snapshot!(format_summary(&summary), @r"
        RESULTS: hours.csv
        ───────
        Total rows:     5
        Valid rows:     3 (zero included)
        Zero rows:      1
        Invalid rows:   2

        INVALID BY CAUSE
        ────────────────
        Empty input:    1
        Format error:   0
        Inverted order: 1

        EXCLUDED DAYS
        ─────────────
        Row 4: contains 2 excluded day(s): 05-12, 05-19

        Saved hours.csv (hours)
        ");
    }

    #[test]
    fn test_summary_json_shape() {
        let summary = RunSummary::new("in.csv", "out.csv", DisplayStyle::Compound, &sample_report(), 1);
        let json: serde_json::Value =
            serde_json::from_str(&format_summary_json(&summary).unwrap()).unwrap();
        assert_eq!(json["style"], "compound");
        assert_eq!(json["total"], 5);
        assert_eq!(json["stats"]["inverted_order"], 1);
        assert_eq!(json["notes"][0]["row"], 4);
    }
}
