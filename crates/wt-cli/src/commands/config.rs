//! Config command for showing the effective settings.

use std::io::Write;

use anyhow::Result;

use crate::column::{column_index, column_letters};
use crate::Config;

pub fn run<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    let schedule = config.schedule()?;

    let write_col = match &config.write_col {
        Some(col) => col.to_uppercase(),
        None => format!("{} (right of end)", column_letters(column_index(&config.end_col)? + 1)),
    };

    writeln!(writer, "Working-time configuration")?;
    writeln!(writer, "Mode:             {}", config.mode)?;
    writeln!(writer, "Style:            {}", config.style)?;
    writeln!(writer, "Units:            {}", config.units.as_str())?;
    writeln!(writer, "Excluded weekday: {}", config.excluded_weekday)?;
    writeln!(writer, "Start column:     {}", config.start_col.to_uppercase())?;
    writeln!(writer, "End column:       {}", config.end_col.to_uppercase())?;
    writeln!(writer, "Write column:     {write_col}")?;
    writeln!(
        writer,
        "Notes column:     {}",
        config.notes_col.as_deref().map_or_else(|| "-".to_string(), str::to_uppercase)
    )?;
    writeln!(writer, "Start row:        {}", config.start_row)?;
    writeln!(writer, "Work periods:     {schedule}")?;

    Ok(())
}
