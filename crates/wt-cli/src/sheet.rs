//! Header-less CSV grid read and written back in place.

use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};

/// A rectangular-ish grid of text cells. Rows may differ in length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sheet {
    rows: Vec<Vec<String>>,
}

impl Sheet {
    pub fn read(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        Self::from_reader(file).with_context(|| format!("failed to read {}", path.display()))
    }

    /// Parses a sheet, keeping blank lines as empty rows so row numbers match
    /// the file.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(data.as_slice());

        let mut rows = Vec::new();
        let mut record = StringRecord::new();
        let mut consumed: usize = 0;
        while reader
            .read_record(&mut record)
            .with_context(|| format!("invalid CSV on line {}", reader.position().line()))?
        {
            let end = usize::try_from(reader.position().byte())?;
            let after_cr = consumed
                .checked_sub(1)
                .and_then(|idx| data.get(idx))
                .is_some_and(|b| *b == b'\r');
            let chunk = data.get(consumed..end).unwrap_or_default();
            rows.resize_with(rows.len() + leading_blank_lines(chunk, after_cr), Vec::new);
            rows.push(record.iter().map(str::to_string).collect());
            consumed = end;
        }
        Ok(Self { rows })
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        self.to_writer(file)
            .with_context(|| format!("failed to write {}", path.display()))
    }

    /// Writes every row; empty rows come out as bare blank lines.
    pub fn to_writer<W: Write>(&self, mut writer: W) -> Result<()> {
        for row in &self.rows {
            if row.is_empty() {
                // the csv writer renders an empty record as `""`
                writer.write_all(b"\n")?;
                continue;
            }
            let mut csv = WriterBuilder::new().flexible(true).from_writer(&mut writer);
            csv.write_record(row)?;
            csv.flush()?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Cell text, `None` when the row or column does not exist.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }

    /// Sets a cell, padding the row with empty cells as needed.
    pub fn set(&mut self, row: usize, col: usize, value: impl Into<String>) {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.rows[row];
        if cells.len() <= col {
            cells.resize_with(col + 1, String::new);
        }
        cells[col] = value.into();
    }

    /// True when the row has no cells at all (a blank line in the file).
    pub fn is_empty_row(&self, row: usize) -> bool {
        self.rows.get(row).is_none_or(Vec::is_empty)
    }

    /// Rows at or after `from_row` whose cell in `col` holds non-blank text.
    pub fn occupied_rows(&self, col: usize, from_row: usize) -> Vec<usize> {
        (from_row..self.rows.len())
            .filter(|&row| self.cell(row, col).is_some_and(|v| !v.trim().is_empty()))
            .collect()
    }
}

/// Counts the blank lines at the head of the bytes consumed for one record.
///
/// `after_cr` is set when the previous record ended on `\r`, whose `\n` the
/// parser only swallows while reading the next record.
fn leading_blank_lines(chunk: &[u8], after_cr: bool) -> usize {
    let bytes = match chunk.strip_prefix(b"\n") {
        Some(rest) if after_cr => rest,
        _ => chunk,
    };

    let mut count = 0;
    let mut iter = bytes.iter().peekable();
    while let Some(byte) = iter.next() {
        match byte {
            b'\n' => count += 1,
            b'\r' => {
                count += 1;
                iter.next_if_eq(&&b'\n');
            }
            _ => break,
        }
    }
    count
}
