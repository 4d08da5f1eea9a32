//! Dataset loading
//!
//! Turns a CSV export of user activity into a [`Dataset`]:
//!
//! 1. Columns are matched by header name; extra columns are ignored.
//! 2. `Signup_Date` and `Last_Login` are parsed permissively; failures become
//!    missing values instead of errors.
//! 3. Rows without a parseable `Last_Login` are dropped for good.
//! 4. Week and month buckets are derived from `Last_Login`.
//!
//! [`load`] goes through the process-wide [`DatasetCache`], so repeated
//! calls for an unchanged file do not re-read it.
//!
//! The only fatal conditions are a missing or unreadable source and a header
//! without one of the [`REQUIRED_COLUMNS`].

pub mod cache;
pub mod timestamp;

pub use cache::{DatasetCache, SourceStamp};
pub use timestamp::parse_timestamp;

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::types::{Dataset, UserActivityRecord};

/// Columns every dataset header must contain.
pub const REQUIRED_COLUMNS: [&str; 11] = [
    "User_ID",
    "Country",
    "Game_Title",
    "Subscription_Tier",
    "Signup_Date",
    "Last_Login",
    "Total_Revenue_USD",
    "Avg_Session_Duration_Min",
    "Total_Play_Sessions",
    "Device_Type",
    "Preferred_Game_Mode",
];

/// Bookkeeping from a single load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Data rows seen after the header
    pub rows_read: usize,
    /// Rows that became records
    pub rows_kept: usize,
    /// Rows dropped because `Last_Login` was blank or unparseable
    pub dropped_missing_last_login: usize,
    /// Kept rows whose `Signup_Date` could not be parsed
    pub invalid_signup_dates: usize,
    /// Numeric cells that were present but not a valid number
    pub invalid_numeric_cells: usize,
    /// Rows the CSV reader could not decode at all
    pub malformed_rows: usize,
    /// SHA-256 of the source bytes, hex encoded
    pub source_digest: String,
}

/// A loaded dataset together with its load report.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDataset {
    pub dataset: Dataset,
    pub report: LoadReport,
}

/// Load a dataset through the process-wide cache.
pub fn load(path: &Path) -> Result<Arc<LoadedDataset>> {
    DatasetCache::global().get_or_load(path)
}

/// Load a dataset from disk, bypassing the cache.
pub fn load_uncached(path: &Path) -> Result<LoadedDataset> {
    if !path.exists() {
        return Err(Error::SourceNotFound(path.to_path_buf()));
    }
    let bytes = std::fs::read(path)?;
    let loaded = parse_bytes(&bytes)?;

    tracing::info!(
        path = %path.display(),
        rows_read = loaded.report.rows_read,
        rows_kept = loaded.report.rows_kept,
        dropped = loaded.report.dropped_missing_last_login,
        "Dataset loaded"
    );

    Ok(loaded)
}

/// Load a dataset from any reader, bypassing the cache.
pub fn load_reader<R: Read>(mut reader: R) -> Result<LoadedDataset> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    parse_bytes(&bytes)
}

/// One CSV row as text, before any cleaning.
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "User_ID", default)]
    user_id: String,
    #[serde(rename = "Country", default)]
    country: String,
    #[serde(rename = "Game_Title", default)]
    game_title: String,
    #[serde(rename = "Subscription_Tier", default)]
    subscription_tier: String,
    #[serde(rename = "Signup_Date", default)]
    signup_date: String,
    #[serde(rename = "Last_Login", default)]
    last_login: String,
    #[serde(rename = "Total_Revenue_USD", default)]
    total_revenue_usd: String,
    #[serde(rename = "Avg_Session_Duration_Min", default)]
    avg_session_duration_min: String,
    #[serde(rename = "Total_Play_Sessions", default)]
    total_play_sessions: String,
    #[serde(rename = "Device_Type", default)]
    device_type: String,
    #[serde(rename = "Preferred_Game_Mode", default)]
    preferred_game_mode: String,
}

fn parse_bytes(bytes: &[u8]) -> Result<LoadedDataset> {
    let mut report = LoadReport {
        source_digest: hex::encode(Sha256::digest(bytes)),
        ..Default::default()
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(Error::MissingColumn(column));
        }
    }

    let width = headers.len();
    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        report.rows_read += 1;
        // header is line 1, so data row N sits on line N + 2
        let line = index + 2;
        let mut row = match row {
            Ok(row) => row,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                tracing::warn!(line, error = %e, "Skipping malformed row");
                report.malformed_rows += 1;
                continue;
            }
        };

        // short rows read as blanks in their missing trailing columns
        row.truncate(width);
        while row.len() < width {
            row.push_field("");
        }
        let row: RawRow = match row.deserialize(Some(&headers)) {
            Ok(row) => row,
            Err(e) => {
                tracing::warn!(line, error = %e, "Skipping malformed row");
                report.malformed_rows += 1;
                continue;
            }
        };

        match clean_row(row, &mut report) {
            Some(record) => records.push(record),
            None => report.dropped_missing_last_login += 1,
        }
    }

    report.rows_kept = records.len();
    if report.dropped_missing_last_login > 0 {
        tracing::debug!(
            dropped = report.dropped_missing_last_login,
            "Dropped rows without a parseable Last_Login"
        );
    }

    Ok(LoadedDataset {
        dataset: Dataset::new(records),
        report,
    })
}

/// Convert a raw row into a record, or `None` if it has no usable login.
fn clean_row(row: RawRow, report: &mut LoadReport) -> Option<UserActivityRecord> {
    let last_login = parse_timestamp(&row.last_login)?;

    let signup_date = parse_timestamp(&row.signup_date);
    if signup_date.is_none() && !row.signup_date.trim().is_empty() {
        report.invalid_signup_dates += 1;
    }

    let mut record = UserActivityRecord::new(row.user_id.trim(), last_login)
        .with_country(row.country)
        .with_game_title(row.game_title)
        .with_subscription_tier(row.subscription_tier)
        .with_device_type(row.device_type)
        .with_preferred_game_mode(row.preferred_game_mode)
        .with_signup_date(signup_date);

    record.total_revenue_usd = numeric_cell(&row.total_revenue_usd, parse_decimal, report);
    record.avg_session_duration_min =
        numeric_cell(&row.avg_session_duration_min, parse_decimal, report);
    record.total_play_sessions = numeric_cell(&row.total_play_sessions, parse_count, report);

    Some(record)
}

/// Parse a numeric cell; blanks are missing, garbage is missing and counted.
fn numeric_cell<T>(
    raw: &str,
    parse: fn(&str) -> Option<T>,
    report: &mut LoadReport,
) -> Option<T> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    let parsed = parse(value);
    if parsed.is_none() {
        report.invalid_numeric_cells += 1;
    }
    parsed
}

fn parse_decimal(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Session counts may arrive as "12" or, from float-typed exports, "12.0".
fn parse_count(value: &str) -> Option<u32> {
    if let Ok(count) = value.parse::<u32>() {
        return Some(count);
    }
    let float = parse_decimal(value)?;
    if float >= 0.0 && float.fract() == 0.0 && float <= u32::MAX as f64 {
        Some(float as u32)
    } else {
        None
    }
}
