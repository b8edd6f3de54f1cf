//! Working-time calculator CLI library.
//!
//! This crate provides the CSV sheet collaborator around `wt-core`.

mod cli;
mod column;
pub mod commands;
mod config;
mod sheet;
pub mod summary;

pub use cli::{Cli, Commands};
pub use column::{ColumnPlan, column_index, column_letters};
pub use config::{Config, PeriodConfig, UnitsPreset};
pub use sheet::Sheet;
