//! Configuration loading and management.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use chrono::{NaiveTime, Weekday};
use clap::ValueEnum;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use wt_core::{
    AccountingMode, CompoundUnits, DisplayStyle, WeekdayExclusion, WorkPeriod, WorkSchedule,
};

/// Label set used by the compound display style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum UnitsPreset {
    /// `1d 2h 30m`
    #[default]
    En,
    /// `1天 2小时 30分钟`
    Zh,
}

impl UnitsPreset {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Zh => "zh",
        }
    }

    pub const fn units(self) -> CompoundUnits {
        match self {
            Self::En => CompoundUnits::ENGLISH,
            Self::Zh => CompoundUnits::CHINESE,
        }
    }
}

/// A work period as written in the config file (`HH:MM`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodConfig {
    pub start: String,
    pub end: String,
}

impl PeriodConfig {
    fn new(start: &str, end: &str) -> Self {
        Self {
            start: start.to_string(),
            end: end.to_string(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Daily windows counted in window mode.
    pub work_periods: Vec<PeriodConfig>,

    pub mode: AccountingMode,

    pub style: DisplayStyle,

    pub units: UnitsPreset,

    /// Weekday that never counts.
    pub excluded_weekday: Weekday,

    /// Column letters holding start timestamps.
    pub start_col: String,

    /// Column letters holding end timestamps.
    pub end_col: String,

    /// Destination column. Defaults to the column right of `end_col`.
    pub write_col: Option<String>,

    /// Column receiving excluded-day annotations, if any.
    pub notes_col: Option<String>,

    /// First data row (1-based).
    pub start_row: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            work_periods: vec![
                PeriodConfig::new("08:30", "12:00"),
                PeriodConfig::new("13:30", "18:00"),
            ],
            mode: AccountingMode::WindowBased,
            style: DisplayStyle::Hours,
            units: UnitsPreset::En,
            excluded_weekday: Weekday::Sun,
            start_col: "A".to_string(),
            end_col: "B".to_string(),
            write_col: None,
            notes_col: None,
            start_row: 2,
        }
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (WT_*)
        figment = figment.merge(Env::prefixed("WT_"));

        figment.extract()
    }

    /// Parses and validates `work_periods`, reporting every problem found.
    pub fn schedule(&self) -> Result<WorkSchedule> {
        let mut periods = Vec::with_capacity(self.work_periods.len());
        let mut problems = Vec::new();

        for (idx, period) in self.work_periods.iter().enumerate() {
            match parse_period(period) {
                Ok(parsed) => periods.push(parsed),
                Err(errors) => problems.extend(
                    errors
                        .into_iter()
                        .map(|e| format!("period {}: {e}", idx + 1)),
                ),
            }
        }

        if problems.is_empty() {
            match WorkSchedule::new(periods) {
                Ok(schedule) => return Ok(schedule),
                Err(e) => problems.push(e.to_string()),
            }
        }

        let mut message = String::from("invalid work periods:");
        for problem in &problems {
            write!(message, "\n  - {problem}")?;
        }
        bail!(message)
    }

    pub const fn exclusion(&self) -> WeekdayExclusion {
        WeekdayExclusion::new(Some(self.excluded_weekday))
    }
}

fn parse_period(period: &PeriodConfig) -> Result<WorkPeriod, Vec<&'static str>> {
    let start = period.start.trim();
    let end = period.end.trim();

    let mut errors = Vec::new();
    if start.is_empty() {
        errors.push("start time cannot be empty");
    }
    if end.is_empty() {
        errors.push("end time cannot be empty");
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    let (Ok(open), Ok(close)) = (
        NaiveTime::parse_from_str(start, "%H:%M"),
        NaiveTime::parse_from_str(end, "%H:%M"),
    ) else {
        return Err(vec!["times must be HH:MM"]);
    };

    WorkPeriod::new(open, close).map_err(|_| vec!["start must be before end"])
}

/// Returns the platform-specific config directory for wt.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("wt"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    use tempfile::NamedTempFile;

    fn with_periods(periods: &[(&str, &str)]) -> Config {
        Config {
            work_periods: periods
                .iter()
                .map(|(start, end)| PeriodConfig::new(start, end))
                .collect(),
            ..Config::default()
        }
    }

    #[test]
    fn test_dirs_config_path_ends_with_wt() {
        let path = dirs_config_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "wt");
    }

    #[test]
    fn test_default_schedule_is_office_hours() {
        let schedule = Config::default().schedule().unwrap();
        assert_eq!(schedule.to_string(), "08:30-12:00, 13:30-18:00");
    }

    #[test]
    fn test_schedule_reports_every_problem() {
        let config = with_periods(&[("", "12:00"), ("9am", "10:00"), ("14:00", "13:00")]);
        let err = config.schedule().unwrap_err().to_string();
        assert_eq!(
            err,
            "invalid work periods:\n  - period 1: start time cannot be empty\n  - period 2: times must be HH:MM\n  - period 3: start must be before end"
        );
    }

    #[test]
    fn test_schedule_reports_overlap() {
        let config = with_periods(&[("13:00", "17:00"), ("08:00", "13:30")]);
        let err = config.schedule().unwrap_err().to_string();
        assert_eq!(err, "invalid work periods:\n  - period 1 overlaps period 2");
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
mode = "full-day"
style = "compound"
units = "zh"
excluded_weekday = "Sat"
write_col = "D"
start_row = 3

[[work_periods]]
start = "09:00"
end = "17:00"
"#
        )
        .unwrap();
        file.flush().unwrap();

        let config = Config::load_from(Some(file.path())).unwrap();
        assert_eq!(config.mode, AccountingMode::FullDay);
        assert_eq!(config.style, DisplayStyle::Compound);
        assert_eq!(config.units, UnitsPreset::Zh);
        assert_eq!(config.excluded_weekday, Weekday::Sat);
        assert_eq!(config.write_col.as_deref(), Some("D"));
        assert_eq!(config.start_row, 3);
        assert_eq!(config.start_col, "A");
        assert_eq!(config.work_periods, vec![PeriodConfig::new("09:00", "17:00")]);
    }

    #[test]
    fn test_bad_mode_in_file_fails_to_load() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"mode = "weekly""#).unwrap();
        file.flush().unwrap();

        assert!(Config::load_from(Some(file.path())).is_err());
    }
}
