//! The dashboard view model.
//!
//! [`render`] is the single recomputation entry point: given the loaded
//! dataset, the current filter selection and a reference time, it produces
//! every number a front end draws. It holds no state, so front ends simply
//! call it again on each interaction.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use super::insights::{compute_insights, percentage, InsightBundle};
use super::metrics::{
    daily_active_users, device_distribution, kpis, monthly_active_users, monthly_revenue,
    revenue_by_tier, session_duration_by_mode, weekly_active_users, Kpis, ModeDistribution,
    SeriesPoint,
};
use crate::config::InsightConfig;
use crate::filter::{filter, FilterSelection};
use crate::types::{Dataset, MonthBucket, WeekBucket};

/// Everything the presentation layer needs for one render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    /// Reference time used for inactivity calculations
    pub now: NaiveDateTime,
    /// Selection the view was computed for
    pub selection: FilterSelection,
    /// Records in the working subset
    pub record_count: usize,
    pub kpis: Kpis,
    pub daily_active_users: Vec<SeriesPoint<NaiveDate, usize>>,
    pub weekly_active_users: Vec<SeriesPoint<WeekBucket, usize>>,
    pub monthly_active_users: Vec<SeriesPoint<MonthBucket, usize>>,
    pub monthly_revenue: Vec<SeriesPoint<MonthBucket, f64>>,
    pub device_distribution: Vec<SeriesPoint<String, usize>>,
    pub revenue_by_tier: Vec<SeriesPoint<String, f64>>,
    pub session_duration_by_mode: Vec<ModeDistribution>,
    pub insights: InsightBundle,
    pub recommendations: Vec<String>,
}

/// Filter `dataset` by `selection` and compute the full view.
pub fn render(
    dataset: &Dataset,
    selection: &FilterSelection,
    now: NaiveDateTime,
    config: &InsightConfig,
) -> DashboardView {
    let working = filter(dataset, selection);
    let insights = compute_insights(&working, now, config);
    let recommendations = insights.recommendations();

    tracing::debug!(
        records = working.len(),
        filtered = !selection.is_empty(),
        "Dashboard recomputed"
    );

    DashboardView {
        now,
        selection: selection.clone(),
        record_count: working.len(),
        kpis: kpis(&working),
        daily_active_users: daily_active_users(&working),
        weekly_active_users: weekly_active_users(&working),
        monthly_active_users: monthly_active_users(&working),
        monthly_revenue: monthly_revenue(&working),
        device_distribution: device_distribution(&working),
        revenue_by_tier: revenue_by_tier(&working),
        session_duration_by_mode: session_duration_by_mode(&working),
        insights,
        recommendations,
    }
}

impl DashboardView {
    /// True when the selection matched no records.
    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }

    /// Device counts as percentages of all records, for pie-style display.
    pub fn device_shares(&self) -> Vec<(String, f64)> {
        self.device_distribution
            .iter()
            .map(|p| {
                (
                    p.key.clone(),
                    percentage(p.value as f64, self.record_count as f64),
                )
            })
            .collect()
    }

    /// Pretty-printed JSON of the whole view.
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Dimension;
    use crate::types::UserActivityRecord;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn sample() -> Dataset {
        let login = |d: u32| {
            NaiveDate::from_ymd_opt(2024, 2, d)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap()
        };
        Dataset::new(vec![
            UserActivityRecord::new("U1", login(1))
                .with_country("India")
                .with_device_type("Mobile")
                .with_revenue(20.0)
                .with_play_sessions(1),
            UserActivityRecord::new("U2", login(20))
                .with_country("Brazil")
                .with_device_type("PC")
                .with_revenue(60.0)
                .with_play_sessions(12),
            UserActivityRecord::new("U3", login(25))
                .with_country("India")
                .with_device_type("PC")
                .with_revenue(20.0)
                .with_play_sessions(30),
        ])
    }

    #[test]
    fn test_render_unfiltered() {
        let view = render(&sample(), &FilterSelection::new(), now(), &InsightConfig::default());

        assert_eq!(view.record_count, 3);
        assert_eq!(view.kpis.total_users, 3);
        assert_eq!(view.kpis.total_revenue, 100.0);
        assert_eq!(view.monthly_revenue.len(), 1);
        assert_eq!(view.insights.churn_risk_users, 1);
        assert_eq!(view.recommendations.len(), 8);

        let shares = view.device_shares();
        assert_eq!(shares[0].0, "Mobile");
        assert!((shares[1].1 - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_render_filtered() {
        let selection = FilterSelection::new().with(Dimension::Country, ["India"]);
        let view = render(&sample(), &selection, now(), &InsightConfig::default());

        assert_eq!(view.record_count, 2);
        assert_eq!(view.kpis.total_revenue, 40.0);
        assert_eq!(view.selection, selection);
    }

    #[test]
    fn test_render_empty_selection_result() {
        let selection = FilterSelection::new().with(Dimension::Country, ["Atlantis"]);
        let view = render(&sample(), &selection, now(), &InsightConfig::default());

        assert!(view.is_empty());
        assert_eq!(view.kpis.avg_session_duration, 0.0);
        assert!(view.daily_active_users.is_empty());
        assert!(view.device_shares().is_empty());
        assert_eq!(view.insights.churn_pct, 0.0);
    }

    #[test]
    fn test_json_export_uses_bucket_labels() {
        let view = render(&sample(), &FilterSelection::new(), now(), &InsightConfig::default());
        let json: serde_json::Value = serde_json::from_str(&view.to_json().unwrap()).unwrap();

        assert_eq!(json["kpis"]["total_users"], 3);
        assert_eq!(json["monthly_revenue"][0]["key"], "2024-02");
        assert_eq!(json["daily_active_users"][0]["key"], "2024-02-01");
        assert_eq!(json["weekly_active_users"][0]["key"], "2024-01-29/2024-02-04");
    }
}
