//! Core domain types for matiks
//!
//! These types represent one row of user activity and the in-memory dataset
//! built from them. Calendar buckets are derived once, when a record is
//! constructed, and never change afterwards.

use std::fmt;
use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};

/// Category used when a categorical cell is empty.
///
/// Missing values form their own group instead of being dropped.
pub const MISSING_CATEGORY: &str = "(missing)";

// ============================================
// Calendar buckets
// ============================================

/// ISO week (Monday through Sunday) containing a timestamp.
///
/// Ordering follows the Monday that starts the week, so sorting is
/// chronological even across year boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WeekBucket {
    start: NaiveDate,
}

impl WeekBucket {
    /// Bucket for the week containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        let offset = date.weekday().num_days_from_monday() as i64;
        Self {
            start: date - Duration::days(offset),
        }
    }

    /// Monday that opens the week.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Sunday that closes the week.
    pub fn end(&self) -> NaiveDate {
        self.start + Duration::days(6)
    }

    /// ISO 8601 week label (e.g., "2024-W01").
    pub fn iso_label(&self) -> String {
        let week = self.start.iso_week();
        format!("{}-W{:02}", week.year(), week.week())
    }
}

impl fmt::Display for WeekBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}",
            self.start.format("%Y-%m-%d"),
            self.end().format("%Y-%m-%d")
        )
    }
}

impl Serialize for WeekBucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Gregorian calendar month containing a timestamp.
///
/// Field order makes the derived ordering chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthBucket {
    year: i32,
    month: u32,
}

impl MonthBucket {
    /// Bucket for the month containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Month number, 1-12.
    pub fn month(&self) -> u32 {
        self.month
    }
}

impl fmt::Display for MonthBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for MonthBucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ============================================
// Records
// ============================================

/// One row of the activity dataset.
///
/// `last_login` is always present: rows without a parseable login never
/// become records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserActivityRecord {
    pub user_id: String,
    pub country: String,
    pub game_title: String,
    pub subscription_tier: String,
    pub signup_date: Option<NaiveDateTime>,
    last_login: NaiveDateTime,
    pub total_revenue_usd: Option<f64>,
    pub avg_session_duration_min: Option<f64>,
    pub total_play_sessions: Option<u32>,
    pub device_type: String,
    pub preferred_game_mode: String,
    week_bucket: WeekBucket,
    month_bucket: MonthBucket,
}

impl UserActivityRecord {
    /// Create a record with derived buckets and every other field missing.
    pub fn new(user_id: impl Into<String>, last_login: NaiveDateTime) -> Self {
        let date = last_login.date();
        Self {
            user_id: user_id.into(),
            country: MISSING_CATEGORY.to_string(),
            game_title: MISSING_CATEGORY.to_string(),
            subscription_tier: MISSING_CATEGORY.to_string(),
            signup_date: None,
            last_login,
            total_revenue_usd: None,
            avg_session_duration_min: None,
            total_play_sessions: None,
            device_type: MISSING_CATEGORY.to_string(),
            preferred_game_mode: MISSING_CATEGORY.to_string(),
            week_bucket: WeekBucket::containing(date),
            month_bucket: MonthBucket::containing(date),
        }
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = category(country.into());
        self
    }

    pub fn with_game_title(mut self, game_title: impl Into<String>) -> Self {
        self.game_title = category(game_title.into());
        self
    }

    pub fn with_subscription_tier(mut self, tier: impl Into<String>) -> Self {
        self.subscription_tier = category(tier.into());
        self
    }

    pub fn with_device_type(mut self, device_type: impl Into<String>) -> Self {
        self.device_type = category(device_type.into());
        self
    }

    pub fn with_preferred_game_mode(mut self, mode: impl Into<String>) -> Self {
        self.preferred_game_mode = category(mode.into());
        self
    }

    pub fn with_signup_date(mut self, signup_date: Option<NaiveDateTime>) -> Self {
        self.signup_date = signup_date;
        self
    }

    pub fn with_revenue(mut self, revenue_usd: f64) -> Self {
        self.total_revenue_usd = Some(revenue_usd);
        self
    }

    pub fn with_session_duration(mut self, minutes: f64) -> Self {
        self.avg_session_duration_min = Some(minutes);
        self
    }

    pub fn with_play_sessions(mut self, sessions: u32) -> Self {
        self.total_play_sessions = Some(sessions);
        self
    }

    /// Timestamp of the user's most recent login.
    pub fn last_login(&self) -> NaiveDateTime {
        self.last_login
    }

    /// Calendar date of the most recent login.
    pub fn last_login_date(&self) -> NaiveDate {
        self.last_login.date()
    }

    pub fn week_bucket(&self) -> WeekBucket {
        self.week_bucket
    }

    pub fn month_bucket(&self) -> MonthBucket {
        self.month_bucket
    }
}

/// Normalize a categorical cell, mapping blanks to [`MISSING_CATEGORY`].
pub(crate) fn category(value: String) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        MISSING_CATEGORY.to_string()
    } else {
        trimmed.to_string()
    }
}

// ============================================
// Dataset
// ============================================

/// An immutable collection of activity records.
///
/// Records are shared behind `Arc`, so filtered views are cheap to build and
/// never copy or mutate the rows of the dataset they came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<Arc<UserActivityRecord>>,
}

impl Dataset {
    pub fn new(records: Vec<UserActivityRecord>) -> Self {
        records.into_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UserActivityRecord> + '_ {
        self.records.iter().map(|r| r.as_ref())
    }

    /// Records matching `predicate`, sharing storage with `self`.
    pub fn subset<P>(&self, predicate: P) -> Dataset
    where
        P: Fn(&UserActivityRecord) -> bool,
    {
        Self {
            records: self
                .records
                .iter()
                .filter(|record| predicate(record))
                .map(Arc::clone)
                .collect(),
        }
    }
}

impl FromIterator<UserActivityRecord> for Dataset {
    fn from_iter<I: IntoIterator<Item = UserActivityRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().map(Arc::new).collect(),
        }
    }
}
