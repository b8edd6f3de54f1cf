//! Spreadsheet column letters (`A`, `Z`, `AA`, ...).

use anyhow::{Result, bail};

/// Converts column letters to a 0-based index. Case-insensitive.
pub fn column_index(letters: &str) -> Result<usize> {
    let letters = letters.trim();
    if letters.is_empty() {
        bail!("column letters cannot be empty");
    }

    let mut index: usize = 0;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            bail!("invalid column: {letters}");
        }
        let digit = (ch.to_ascii_uppercase() as usize) - ('A' as usize) + 1;
        index = index
            .checked_mul(26)
            .and_then(|i| i.checked_add(digit))
            .ok_or_else(|| anyhow::anyhow!("column out of range: {letters}"))?;
    }
    Ok(index - 1)
}

/// Converts a 0-based index back to column letters.
pub fn column_letters(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        // rem < 26, so the cast cannot truncate
        #[allow(clippy::cast_possible_truncation)]
        letters.push(char::from(b'A' + rem as u8));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Resolved column positions for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnPlan {
    pub start: usize,
    pub end: usize,
    pub write: usize,
    pub notes: Option<usize>,
}

impl ColumnPlan {
    /// Resolves letters, defaulting the destination to the column right of `end`.
    pub fn resolve(
        start: &str,
        end: &str,
        write: Option<&str>,
        notes: Option<&str>,
    ) -> Result<Self> {
        let start = column_index(start)?;
        let end = column_index(end)?;
        let write = write.map_or(Ok(end + 1), column_index)?;
        let notes = notes.map(column_index).transpose()?;

        if write == start || write == end {
            bail!(
                "destination column {} must differ from the start and end columns",
                column_letters(write)
            );
        }
        if let Some(notes) = notes {
            if notes == start || notes == end || notes == write {
                bail!(
                    "notes column {} must differ from the start, end and destination columns",
                    column_letters(notes)
                );
            }
        }

        Ok(Self {
            start,
            end,
            write,
            notes,
        })
    }
}
