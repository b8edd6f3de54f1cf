//! Compute command: runs the batch over a CSV sheet and writes results back.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use clap::Args;

use wt_core::{AccountingMode, BatchOptions, DisplayStyle, RawRow, run_batch};

use crate::column::{ColumnPlan, column_letters};
use crate::summary::{RunSummary, excluded_note, format_summary, format_summary_json};
use crate::{Config, Sheet, UnitsPreset};

/// How many conflicting cells to name when the destination is not empty.
const CONFLICT_EXAMPLES: usize = 3;

#[derive(Debug, Args)]
pub struct ComputeArgs {
    /// CSV sheet holding start/end timestamps (no header handling; see --start-row).
    pub input: PathBuf,

    /// Where to write the updated sheet. Defaults to rewriting INPUT.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Column letters of start timestamps.
    #[arg(long)]
    pub start_col: Option<String>,

    /// Column letters of end timestamps.
    #[arg(long)]
    pub end_col: Option<String>,

    /// Destination column. Defaults to the column right of the end column.
    #[arg(long)]
    pub write_col: Option<String>,

    /// Column receiving excluded-day annotations.
    #[arg(long)]
    pub notes_col: Option<String>,

    /// First data row (1-based).
    #[arg(long)]
    pub start_row: Option<usize>,

    /// Accounting mode: `window` or `full-day`.
    #[arg(long)]
    pub mode: Option<AccountingMode>,

    /// Display style: `hours` or `compound`.
    #[arg(long)]
    pub style: Option<DisplayStyle>,

    /// Unit labels for the compound style.
    #[arg(long, value_enum)]
    pub units: Option<UnitsPreset>,

    /// Print the summary as JSON.
    #[arg(long)]
    pub json: bool,
}

impl ComputeArgs {
    /// Applies command-line overrides on top of the loaded config.
    pub fn apply(&self, config: &Config) -> Config {
        let mut config = config.clone();
        if let Some(col) = &self.start_col {
            config.start_col.clone_from(col);
        }
        if let Some(col) = &self.end_col {
            config.end_col.clone_from(col);
        }
        if self.write_col.is_some() {
            config.write_col.clone_from(&self.write_col);
        }
        if self.notes_col.is_some() {
            config.notes_col.clone_from(&self.notes_col);
        }
        if let Some(row) = self.start_row {
            config.start_row = row;
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(style) = self.style {
            config.style = style;
        }
        if let Some(units) = self.units {
            config.units = units;
        }
        config
    }
}

/// Runs the compute command.
pub fn run<W: Write>(writer: &mut W, args: &ComputeArgs, config: &Config) -> Result<RunSummary> {
    let config = args.apply(config);
    if config.start_row == 0 {
        bail!("start row is 1-based and must be at least 1");
    }
    let first_row = config.start_row - 1;

    let plan = ColumnPlan::resolve(
        &config.start_col,
        &config.end_col,
        config.write_col.as_deref(),
        config.notes_col.as_deref(),
    )?;
    let schedule = config.schedule()?;

    let mut sheet = Sheet::read(&args.input)?;
    ensure_column_free(&sheet, plan.write, first_row, "destination")?;
    if let Some(notes) = plan.notes {
        ensure_column_free(&sheet, notes, first_row, "notes")?;
    }

    let rows: Vec<RawRow> = (first_row..sheet.row_count())
        .map(|row| RawRow {
            start: sheet.cell(row, plan.start).map(str::to_string),
            end: sheet.cell(row, plan.end).map(str::to_string),
        })
        .collect();

    tracing::debug!(
        input = %args.input.display(),
        rows = rows.len(),
        mode = %config.mode,
        schedule = %schedule,
        "computing sheet"
    );

    let options = BatchOptions {
        schedule,
        mode: config.mode,
        style: config.style,
        units: config.units.units(),
        excluded: config.exclusion(),
    };
    let report = run_batch(&rows, &options);

    for (idx, (row, result)) in rows.iter().zip(&report.results).enumerate() {
        let sheet_row = first_row + idx;
        match result {
            Some(value) => sheet.set(sheet_row, plan.write, value.to_string()),
            None if !sheet.is_empty_row(sheet_row)
                && (is_blank(row.start.as_deref()) || is_blank(row.end.as_deref())) =>
            {
                sheet.set(sheet_row, plan.write, "");
            }
            None => {}
        }
    }

    if let Some(notes) = plan.notes {
        for (idx, dates) in &report.excluded_touches {
            sheet.set(first_row + idx, notes, excluded_note(dates));
        }
    }

    let output = args.output.as_ref().unwrap_or(&args.input);
    sheet.write(output)?;
    tracing::debug!(output = %output.display(), "sheet written");

    let summary = RunSummary::new(
        display_name(&args.input),
        output.display().to_string(),
        config.style,
        &report,
        first_row,
    );

    if args.json {
        writeln!(writer, "{}", format_summary_json(&summary)?)?;
    } else {
        write!(writer, "{}", format_summary(&summary))?;
    }

    Ok(summary)
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

/// Fails when `col` already holds data at or below `from_row`.
fn ensure_column_free(sheet: &Sheet, col: usize, from_row: usize, role: &str) -> Result<()> {
    let occupied = sheet.occupied_rows(col, from_row);
    if occupied.is_empty() {
        return Ok(());
    }

    let letters = column_letters(col);
    let examples: Vec<String> = occupied
        .iter()
        .take(CONFLICT_EXAMPLES)
        .map(|row| format!("{letters}{}", row + 1))
        .collect();

    bail!(
        "{role} column {letters} is not empty: {} non-empty cell(s), e.g. {}. Clear the column or choose another one",
        occupied.len(),
        examples.join(", ")
    )
}
