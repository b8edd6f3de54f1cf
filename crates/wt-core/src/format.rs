//! Rendering counted hours for display.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const MINUTES_PER_DAY: i64 = 1440;

/// Well under one millisecond expressed in minutes (~1.7e-5).
const MINUTE_EPSILON: f64 = 1e-9;

/// How a counted value is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DisplayStyle {
    /// Hours as a number rounded to two decimals.
    #[default]
    Hours,
    /// Days, hours and minutes as text.
    Compound,
}

impl DisplayStyle {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Hours => "hours",
            Self::Compound => "compound",
        }
    }
}

impl fmt::Display for DisplayStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DisplayStyle {
    type Err = UnknownStyle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hours" => Ok(Self::Hours),
            "compound" => Ok(Self::Compound),
            _ => Err(UnknownStyle(s.to_string())),
        }
    }
}

impl Serialize for DisplayStyle {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DisplayStyle {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unknown display style strings.
#[derive(Debug, Clone, Error)]
#[error("unknown display style: {0} (expected `hours` or `compound`)")]
pub struct UnknownStyle(String);

/// Unit labels for the compound style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompoundUnits {
    pub day: &'static str,
    pub hour: &'static str,
    pub minute: &'static str,
}

impl CompoundUnits {
    pub const ENGLISH: Self = Self {
        day: "d",
        hour: "h",
        minute: "m",
    };

    pub const CHINESE: Self = Self {
        day: "天",
        hour: "小时",
        minute: "分钟",
    };
}

impl Default for CompoundUnits {
    fn default() -> Self {
        Self::ENGLISH
    }
}

/// A rendered result cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FormattedValue {
    Hours(f64),
    Text(String),
}

impl fmt::Display for FormattedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hours(hours) => write!(f, "{hours:.2}"),
            Self::Text(text) => write!(f, "{text}"),
        }
    }
}

/// Days, hours and minutes of a truncated minute count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Breakdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
}

impl Breakdown {
    /// Splits `floor(hours * 60)` minutes into days, hours and minutes.
    ///
    /// Hours built from whole minutes may sit a few ULPs below the exact
    /// value; those still floor to that minute.
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_hours(hours: f64) -> Self {
        let total = (hours * 60.0 + MINUTE_EPSILON).floor() as i64;
        Self {
            days: total / MINUTES_PER_DAY,
            hours: total % MINUTES_PER_DAY / 60,
            minutes: total % 60,
        }
    }

    pub const fn total_minutes(&self) -> i64 {
        self.days * MINUTES_PER_DAY + self.hours * 60 + self.minutes
    }

    /// Renders from the largest non-zero unit down to minutes.
    pub fn render(&self, units: &CompoundUnits) -> String {
        let Self {
            days,
            hours,
            minutes,
        } = *self;
        if days > 0 {
            format!(
                "{days}{} {hours}{} {minutes}{}",
                units.day, units.hour, units.minute
            )
        } else if hours > 0 {
            format!("{hours}{} {minutes}{}", units.hour, units.minute)
        } else if minutes > 0 {
            format!("{minutes}{}", units.minute)
        } else {
            "0".to_string()
        }
    }
}

/// Rounds to two decimal places.
pub fn round_hours(hours: f64) -> f64 {
    (hours * 100.0).round() / 100.0
}

/// Renders counted hours; `None` (not computable) stays `None`.
pub fn format(hours: Option<f64>, style: DisplayStyle, units: &CompoundUnits) -> Option<FormattedValue> {
    let hours = hours?;
    Some(match style {
        DisplayStyle::Hours => FormattedValue::Hours(round_hours(hours)),
        DisplayStyle::Compound => FormattedValue::Text(Breakdown::from_hours(hours).render(units)),
    })
}
