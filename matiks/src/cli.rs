//! Argument handling shared by the binaries.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use matiks_core::ingest::parse_timestamp;
use matiks_core::Config;

/// Reference time for inactivity: `--now` when given, otherwise local wall-clock time.
pub fn resolve_now(raw: Option<&str>) -> Result<Option<NaiveDateTime>> {
    raw.map(|value| {
        parse_timestamp(value)
            .with_context(|| format!("invalid --now value: {value} (use YYYY-MM-DD [HH:MM:SS])"))
    })
    .transpose()
}

/// Current local time as a naive timestamp.
pub fn wall_clock() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Dataset location: `--data` when given, otherwise `dataset.path` from config.
pub fn dataset_path(arg: Option<PathBuf>, config: &Config) -> PathBuf {
    arg.unwrap_or_else(|| config.dataset.path.clone())
}
