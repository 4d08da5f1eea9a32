//! KPI scalars and grouped aggregates over a dataset.
//!
//! Every function here is total: an empty dataset yields zero or an empty
//! series. Grouped results are ordered by key, which is chronological for
//! dates and calendar buckets and alphabetical for categories. Missing
//! numeric values are skipped, matching how the sums and means are shown.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;

use super::distribution::{sorted_values, FiveNumberSummary};
use crate::types::{Dataset, MonthBucket, UserActivityRecord, WeekBucket};

/// One point of a grouped aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint<K, V> {
    pub key: K,
    pub value: V,
}

/// Headline scalars.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Kpis {
    pub total_users: usize,
    pub total_revenue: f64,
    pub avg_session_duration: f64,
}

/// Compute all three KPIs.
pub fn kpis(ds: &Dataset) -> Kpis {
    Kpis {
        total_users: total_users(ds),
        total_revenue: total_revenue(ds),
        avg_session_duration: avg_session_duration(ds),
    }
}

/// Number of distinct users.
pub fn total_users(ds: &Dataset) -> usize {
    ds.iter()
        .map(|r| r.user_id.as_str())
        .collect::<HashSet<_>>()
        .len()
}

/// Sum of revenue across records.
pub fn total_revenue(ds: &Dataset) -> f64 {
    ds.iter().filter_map(|r| r.total_revenue_usd).sum()
}

/// Mean session duration in minutes, or 0.0 when no record has one.
pub fn avg_session_duration(ds: &Dataset) -> f64 {
    let (sum, count) = ds
        .iter()
        .filter_map(|r| r.avg_session_duration_min)
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Distinct users per calendar date of last login.
pub fn daily_active_users(ds: &Dataset) -> Vec<SeriesPoint<NaiveDate, usize>> {
    distinct_users_by(ds, UserActivityRecord::last_login_date)
}

/// Distinct users per ISO week of last login.
pub fn weekly_active_users(ds: &Dataset) -> Vec<SeriesPoint<WeekBucket, usize>> {
    distinct_users_by(ds, UserActivityRecord::week_bucket)
}

/// Distinct users per calendar month of last login.
pub fn monthly_active_users(ds: &Dataset) -> Vec<SeriesPoint<MonthBucket, usize>> {
    distinct_users_by(ds, UserActivityRecord::month_bucket)
}

/// Revenue per calendar month of last login.
pub fn monthly_revenue(ds: &Dataset) -> Vec<SeriesPoint<MonthBucket, f64>> {
    revenue_by(ds, UserActivityRecord::month_bucket)
}

/// Record count per device type.
pub fn device_distribution(ds: &Dataset) -> Vec<SeriesPoint<String, usize>> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in ds.iter() {
        *counts.entry(record.device_type.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(key, value)| SeriesPoint {
            key: key.to_string(),
            value,
        })
        .collect()
}

/// Revenue per subscription tier.
pub fn revenue_by_tier(ds: &Dataset) -> Vec<SeriesPoint<String, f64>> {
    revenue_by(ds, |r| r.subscription_tier.clone())
}

/// Session-duration distribution for one game mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModeDistribution {
    pub mode: String,
    /// Present durations, sorted ascending
    pub durations: Vec<f64>,
    /// `None` when no record in the group has a duration
    pub summary: Option<FiveNumberSummary>,
}

/// Full distribution of session duration per preferred game mode.
pub fn session_duration_by_mode(ds: &Dataset) -> Vec<ModeDistribution> {
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for record in ds.iter() {
        let values = groups
            .entry(record.preferred_game_mode.as_str())
            .or_default();
        if let Some(duration) = record.avg_session_duration_min {
            values.push(duration);
        }
    }
    groups
        .into_iter()
        .map(|(mode, values)| {
            let durations = sorted_values(values);
            ModeDistribution {
                mode: mode.to_string(),
                summary: FiveNumberSummary::from_sorted(&durations),
                durations,
            }
        })
        .collect()
}

fn distinct_users_by<K, F>(ds: &Dataset, key: F) -> Vec<SeriesPoint<K, usize>>
where
    K: Ord,
    F: Fn(&UserActivityRecord) -> K,
{
    let mut groups: BTreeMap<K, HashSet<&str>> = BTreeMap::new();
    for record in ds.iter() {
        groups
            .entry(key(record))
            .or_default()
            .insert(record.user_id.as_str());
    }
    groups
        .into_iter()
        .map(|(key, users)| SeriesPoint {
            key,
            value: users.len(),
        })
        .collect()
}

fn revenue_by<K, F>(ds: &Dataset, key: F) -> Vec<SeriesPoint<K, f64>>
where
    K: Ord,
    F: Fn(&UserActivityRecord) -> K,
{
    let mut groups: BTreeMap<K, f64> = BTreeMap::new();
    for record in ds.iter() {
        *groups.entry(key(record)).or_default() += record.total_revenue_usd.unwrap_or(0.0);
    }
    groups
        .into_iter()
        .map(|(key, value)| SeriesPoint { key, value })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MISSING_CATEGORY;
    use chrono::NaiveDateTime;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn sample() -> Dataset {
        Dataset::new(vec![
            UserActivityRecord::new("U1", at(2023, 12, 31))
                .with_subscription_tier("Mid")
                .with_device_type("Mobile")
                .with_preferred_game_mode("Solo")
                .with_revenue(10.0)
                .with_session_duration(20.0),
            UserActivityRecord::new("U2", at(2024, 1, 1))
                .with_subscription_tier("High")
                .with_device_type("PC")
                .with_preferred_game_mode("Ranked")
                .with_revenue(30.0)
                .with_session_duration(40.0),
            // same user logged in again the same day
            UserActivityRecord::new("U2", at(2024, 1, 1))
                .with_subscription_tier("High")
                .with_device_type("PC")
                .with_preferred_game_mode("Ranked")
                .with_revenue(5.0),
            UserActivityRecord::new("U3", at(2024, 2, 14))
                .with_subscription_tier("Mid")
                .with_preferred_game_mode("Solo")
                .with_session_duration(60.0),
        ])
    }

    #[test]
    fn test_kpis() {
        let kpis = kpis(&sample());
        assert_eq!(kpis.total_users, 3);
        assert_eq!(kpis.total_revenue, 45.0);
        assert_eq!(kpis.avg_session_duration, 40.0);
    }

    #[test]
    fn test_empty_dataset_is_safe() {
        let ds = Dataset::default();
        assert_eq!(total_users(&ds), 0);
        assert_eq!(total_revenue(&ds), 0.0);
        assert_eq!(avg_session_duration(&ds), 0.0);
        assert!(daily_active_users(&ds).is_empty());
        assert!(weekly_active_users(&ds).is_empty());
        assert!(monthly_active_users(&ds).is_empty());
        assert!(monthly_revenue(&ds).is_empty());
        assert!(device_distribution(&ds).is_empty());
        assert!(revenue_by_tier(&ds).is_empty());
        assert!(session_duration_by_mode(&ds).is_empty());
    }

    #[test]
    fn test_daily_active_users_counts_distinct_users() {
        let dau = daily_active_users(&sample());
        let values: Vec<(String, usize)> = dau
            .iter()
            .map(|p| (p.key.to_string(), p.value))
            .collect();
        assert_eq!(
            values,
            vec![
                ("2023-12-31".to_string(), 1),
                ("2024-01-01".to_string(), 1),
                ("2024-02-14".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_weekly_buckets_span_year_boundary() {
        // 2023-12-31 is a Sunday, 2024-01-01 a Monday: different ISO weeks
        let wau = weekly_active_users(&sample());
        let labels: Vec<String> = wau.iter().map(|p| p.key.to_string()).collect();
        assert_eq!(
            labels,
            vec![
                "2023-12-25/2023-12-31",
                "2024-01-01/2024-01-07",
                "2024-02-12/2024-02-18",
            ]
        );
    }

    #[test]
    fn test_monthly_series_are_chronological() {
        let ds = sample();
        let mau: Vec<(String, usize)> = monthly_active_users(&ds)
            .into_iter()
            .map(|p| (p.key.to_string(), p.value))
            .collect();
        assert_eq!(
            mau,
            vec![
                ("2023-12".to_string(), 1),
                ("2024-01".to_string(), 1),
                ("2024-02".to_string(), 1),
            ]
        );

        let revenue: Vec<f64> = monthly_revenue(&ds).into_iter().map(|p| p.value).collect();
        assert_eq!(revenue, vec![10.0, 35.0, 0.0]);
    }

    #[test]
    fn test_monthly_revenue_conserves_total() {
        let ds = sample();
        let grouped: f64 = monthly_revenue(&ds).iter().map(|p| p.value).sum();
        assert_eq!(grouped, total_revenue(&ds));
    }

    #[test]
    fn test_missing_category_is_its_own_group() {
        let devices = device_distribution(&sample());
        let pairs: Vec<(&str, usize)> = devices.iter().map(|p| (p.key.as_str(), p.value)).collect();
        assert_eq!(pairs, vec![(MISSING_CATEGORY, 1), ("Mobile", 1), ("PC", 2)]);
    }

    #[test]
    fn test_revenue_by_tier() {
        let tiers = revenue_by_tier(&sample());
        let pairs: Vec<(&str, f64)> = tiers.iter().map(|p| (p.key.as_str(), p.value)).collect();
        assert_eq!(pairs, vec![("High", 35.0), ("Mid", 10.0)]);
    }

    #[test]
    fn test_session_duration_by_mode() {
        let modes = session_duration_by_mode(&sample());
        assert_eq!(modes.len(), 2);

        let ranked = &modes[0];
        assert_eq!(ranked.mode, "Ranked");
        assert_eq!(ranked.durations, vec![40.0]);

        let solo = &modes[1];
        assert_eq!(solo.mode, "Solo");
        assert_eq!(solo.durations, vec![20.0, 60.0]);
        let summary = solo.summary.unwrap();
        assert_eq!(summary.min, 20.0);
        assert_eq!(summary.median, 40.0);
        assert_eq!(summary.max, 60.0);
    }

    #[test]
    fn test_mode_without_durations_keeps_group() {
        let ds = Dataset::new(vec![
            UserActivityRecord::new("U1", at(2024, 1, 1)).with_preferred_game_mode("Co-op"),
        ]);
        let modes = session_duration_by_mode(&ds);
        assert_eq!(modes.len(), 1);
        assert!(modes[0].durations.is_empty());
        assert!(modes[0].summary.is_none());
    }
}
