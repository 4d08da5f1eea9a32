//! Rule-based insight heuristics.
//!
//! Cohorts are defined relative to the working subset: percentile thresholds
//! are recomputed for every selection, and inactivity is measured against an
//! injected `now` so results are reproducible.
//!
//! Cohort sizes in [`InsightBundle`] count distinct users.

use chrono::NaiveDateTime;
use serde::Serialize;

use super::distribution::quantile;
use super::metrics::{total_revenue, total_users};
use crate::config::InsightConfig;
use crate::format::{format_count, format_percent, format_percentile};
use crate::types::{Dataset, UserActivityRecord};

/// General suggestions shown after the data-driven ones.
pub const GENERAL_SUGGESTIONS: [&str; 4] = [
    "Offer targeted incentives or rewards for users nearing churn.",
    "Promote popular game modes among low-retention users.",
    "Encourage social features or competition to increase engagement.",
    "Consider tailored pricing or trial extensions for mid-tier subscribers.",
];

/// Whole days from the record's last login to `now`, rounded down.
pub fn days_since_last_login(record: &UserActivityRecord, now: NaiveDateTime) -> i64 {
    (now - record.last_login())
        .num_milliseconds()
        .div_euclid(86_400_000)
}

/// Records whose revenue is strictly above the `percentile` quantile.
pub fn high_value_cohort(ds: &Dataset, percentile: f64) -> (Option<f64>, Dataset) {
    above_quantile(ds, percentile, |r| r.total_revenue_usd)
}

/// Records whose play-session count is strictly above the `percentile` quantile.
pub fn high_retention_cohort(ds: &Dataset, percentile: f64) -> (Option<f64>, Dataset) {
    above_quantile(ds, percentile, |r| r.total_play_sessions.map(f64::from))
}

/// Whether a record meets either churn signal.
pub fn is_churn_risk(
    record: &UserActivityRecord,
    now: NaiveDateTime,
    config: &InsightConfig,
) -> bool {
    days_since_last_login(record, now) > config.churn_inactive_days
        || is_low_session(record, config)
}

/// Records inactive for too long or with too few sessions.
pub fn churn_risk_cohort(ds: &Dataset, now: NaiveDateTime, config: &InsightConfig) -> Dataset {
    ds.subset(|r| is_churn_risk(r, now, config))
}

fn is_low_session(record: &UserActivityRecord, config: &InsightConfig) -> bool {
    record
        .total_play_sessions
        .is_some_and(|sessions| sessions <= config.low_session_threshold)
}

fn above_quantile<F>(ds: &Dataset, percentile: f64, value: F) -> (Option<f64>, Dataset)
where
    F: Fn(&UserActivityRecord) -> Option<f64>,
{
    let threshold = quantile(ds.iter().filter_map(&value), percentile);
    let cohort = match threshold {
        Some(t) => ds.subset(|r| value(r).is_some_and(|v| v > t)),
        None => Dataset::default(),
    };
    (threshold, cohort)
}

/// Share of `part` in `whole` as a percentage; 0.0 when `whole` is zero.
pub fn percentage(part: f64, whole: f64) -> f64 {
    if whole == 0.0 || !whole.is_finite() {
        0.0
    } else {
        part / whole * 100.0
    }
}

/// Named counts and percentages behind the insight text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightBundle {
    /// Distinct users in the working subset
    pub total_users: usize,

    /// Revenue threshold for the high-value cohort (`None` without revenue data)
    pub high_value_threshold: Option<f64>,
    pub high_value_users: usize,
    /// Share of total revenue held by the high-value cohort
    pub high_value_revenue_pct: f64,

    /// Play-session threshold for the high-retention cohort
    pub high_retention_threshold: Option<f64>,
    pub high_retention_users: usize,

    pub churn_risk_users: usize,
    pub churn_pct: f64,
    /// Users past the inactivity limit, regardless of session count
    pub inactive_users: usize,
    pub low_session_users: usize,
    pub mid_tier_users: usize,

    /// Thresholds the counts were computed with
    pub config: InsightSettings,
}

/// The subset of [`InsightConfig`] echoed in every bundle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightSettings {
    pub high_value_percentile: f64,
    pub high_retention_percentile: f64,
    pub churn_inactive_days: i64,
    pub low_session_threshold: u32,
    pub mid_tier_label: String,
}

impl From<&InsightConfig> for InsightSettings {
    fn from(config: &InsightConfig) -> Self {
        Self {
            high_value_percentile: config.high_value_percentile,
            high_retention_percentile: config.high_retention_percentile,
            churn_inactive_days: config.churn_inactive_days,
            low_session_threshold: config.low_session_threshold,
            mid_tier_label: config.mid_tier_label.clone(),
        }
    }
}

/// Derive every insight for the working subset.
pub fn compute_insights(ds: &Dataset, now: NaiveDateTime, config: &InsightConfig) -> InsightBundle {
    let total = total_users(ds);

    let (high_value_threshold, high_value) = high_value_cohort(ds, config.high_value_percentile);
    let (high_retention_threshold, high_retention) =
        high_retention_cohort(ds, config.high_retention_percentile);
    let churn_risk = churn_risk_cohort(ds, now, config);

    let inactive = ds.subset(|r| days_since_last_login(r, now) > config.churn_inactive_days);
    let low_session = ds.subset(|r| is_low_session(r, config));
    let mid_tier = ds.subset(|r| r.subscription_tier == config.mid_tier_label);

    let churn_risk_users = total_users(&churn_risk);

    InsightBundle {
        total_users: total,
        high_value_threshold,
        high_value_users: total_users(&high_value),
        high_value_revenue_pct: percentage(total_revenue(&high_value), total_revenue(ds)),
        high_retention_threshold,
        high_retention_users: total_users(&high_retention),
        churn_risk_users,
        churn_pct: percentage(churn_risk_users as f64, total as f64),
        inactive_users: total_users(&inactive),
        low_session_users: total_users(&low_session),
        mid_tier_users: total_users(&mid_tier),
        config: InsightSettings::from(config),
    }
}

impl InsightBundle {
    /// Data-driven recommendations followed by the general suggestions.
    pub fn recommendations(&self) -> Vec<String> {
        let settings = &self.config;
        let mut lines = vec![
            format!(
                "{} of users ({} out of {}) show clear churn signals: {} or fewer sessions, or more than {} days inactive. Send them reactivation offers or flag them for downgrade prevention.",
                format_percent(self.churn_pct),
                format_count(self.churn_risk_users),
                format_count(self.total_users),
                settings.low_session_threshold,
                settings.churn_inactive_days,
            ),
            format!(
                "{} users played {} or fewer sessions. A/B test onboarding tweaks or drop-off intercepts in the first sessions instead of spreading engagement budget.",
                format_count(self.low_session_users),
                settings.low_session_threshold,
            ),
            format!(
                "{} users sit above the {} revenue percentile and bring in {} of revenue. Profile their game modes and session lengths to build lookalike audiences.",
                format_count(self.high_value_users),
                format_percentile(settings.high_value_percentile),
                format_percent(self.high_value_revenue_pct),
            ),
            format!(
                "{} users are on the '{}' subscription tier. Bundle high-usage game modes to move them up a tier, or offer a pause option instead of letting them drop out.",
                format_count(self.mid_tier_users),
                settings.mid_tier_label,
            ),
        ];
        lines.extend(GENERAL_SUGGESTIONS.iter().map(|s| s.to_string()));
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 30)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn record_days_ago(id: &str, days: i64, sessions: u32) -> UserActivityRecord {
        UserActivityRecord::new(id, now() - Duration::days(days)).with_play_sessions(sessions)
    }

    #[test]
    fn test_days_since_last_login_rounds_down() {
        let record = UserActivityRecord::new("U1", now() - Duration::hours(47));
        assert_eq!(days_since_last_login(&record, now()), 1);

        let future = UserActivityRecord::new("U2", now() + Duration::hours(1));
        assert_eq!(days_since_last_login(&future, now()), -1);
    }

    #[test]
    fn test_churn_risk_uses_either_signal() {
        let ds = Dataset::new(vec![
            record_days_ago("A", 40, 10),
            record_days_ago("B", 5, 1),
            record_days_ago("C", 5, 5),
        ]);
        let cohort = churn_risk_cohort(&ds, now(), &InsightConfig::default());
        let ids: Vec<&str> = cohort.iter().map(|r| r.user_id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B"]);
    }

    #[test]
    fn test_churn_boundaries_are_strict_and_inclusive() {
        let ds = Dataset::new(vec![
            // exactly 30 days is not inactive enough
            record_days_ago("A", 30, 10),
            // exactly 2 sessions counts as low
            record_days_ago("B", 1, 2),
            // missing session count never qualifies as low
            UserActivityRecord::new("C", now()),
        ]);
        let cohort = churn_risk_cohort(&ds, now(), &InsightConfig::default());
        let ids: Vec<&str> = cohort.iter().map(|r| r.user_id.as_str()).collect();
        assert_eq!(ids, vec!["B"]);
    }

    #[test]
    fn test_high_value_cohort_uses_linear_percentile() {
        let ds: Dataset = (1..=10)
            .map(|i| {
                UserActivityRecord::new(format!("U{}", i), now()).with_revenue(i as f64 * 10.0)
            })
            .collect();
        let (threshold, cohort) = high_value_cohort(&ds, 0.9);

        assert!((threshold.unwrap() - 91.0).abs() < 1e-9);
        let ids: Vec<&str> = cohort.iter().map(|r| r.user_id.as_str()).collect();
        assert_eq!(ids, vec!["U10"]);
    }

    #[test]
    fn test_single_record_forms_no_cohort() {
        let ds = Dataset::new(vec![record_days_ago("A", 1, 50).with_revenue(100.0)]);
        let (threshold, cohort) = high_value_cohort(&ds, 0.9);
        assert_eq!(threshold, Some(100.0));
        assert!(cohort.is_empty());

        let (_, cohort) = high_retention_cohort(&ds, 0.9);
        assert!(cohort.is_empty());
    }

    #[test]
    fn test_empty_dataset_bundle() {
        let bundle = compute_insights(&Dataset::default(), now(), &InsightConfig::default());
        assert_eq!(bundle.total_users, 0);
        assert_eq!(bundle.churn_risk_users, 0);
        assert_eq!(bundle.churn_pct, 0.0);
        assert_eq!(bundle.high_value_revenue_pct, 0.0);
        assert_eq!(bundle.high_value_threshold, None);
        assert!(bundle.recommendations()[0].starts_with("0.0% of users (0 out of 0)"));
    }

    #[test]
    fn test_bundle_counts_distinct_users() {
        let ds = Dataset::new(vec![
            record_days_ago("A", 40, 1).with_subscription_tier("Mid"),
            record_days_ago("A", 45, 1).with_subscription_tier("Mid"),
            record_days_ago("B", 2, 20).with_subscription_tier("High"),
            record_days_ago("C", 3, 8).with_subscription_tier("Mid"),
        ]);
        let bundle = compute_insights(&ds, now(), &InsightConfig::default());

        assert_eq!(bundle.total_users, 3);
        assert_eq!(bundle.churn_risk_users, 1);
        assert_eq!(bundle.inactive_users, 1);
        assert_eq!(bundle.low_session_users, 1);
        assert_eq!(bundle.mid_tier_users, 2);
        assert!((bundle.churn_pct - 100.0 / 3.0).abs() < 1e-9);
        // sessions 1,1,20,8 -> p90 = 8 + 0.7 * 12 = 16.4
        assert_eq!(bundle.high_retention_users, 1);
    }

    #[test]
    fn test_high_value_revenue_share() {
        let ds = Dataset::new(vec![
            record_days_ago("A", 1, 5).with_revenue(10.0),
            record_days_ago("B", 1, 5).with_revenue(10.0),
            record_days_ago("C", 1, 5).with_revenue(80.0),
        ]);
        let bundle = compute_insights(&ds, now(), &InsightConfig::default());
        assert_eq!(bundle.high_value_users, 1);
        assert!((bundle.high_value_revenue_pct - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_recommendations_include_general_suggestions() {
        let bundle = compute_insights(&Dataset::default(), now(), &InsightConfig::default());
        let lines = bundle.recommendations();
        assert_eq!(lines.len(), 4 + GENERAL_SUGGESTIONS.len());
        assert!(lines[2].contains("90th revenue percentile"));
        assert!(lines[3].contains("'Mid' subscription tier"));
        assert_eq!(lines.last().unwrap(), GENERAL_SUGGESTIONS.last().unwrap());
    }

    #[test]
    fn test_percentage_guards_zero() {
        assert_eq!(percentage(5.0, 0.0), 0.0);
        assert_eq!(percentage(1.0, 4.0), 25.0);
    }
}
