//! Analytics over user activity
//!
//! Provides:
//! - KPI scalars and grouped time/category aggregates
//! - Quantiles and five-number summaries
//! - Rule-based cohort insights and recommendation text
//! - The dashboard view model that front ends render
//!
//! All computations are pure functions of a [`Dataset`](crate::types::Dataset)
//! and, for inactivity, an injected reference time.

pub mod dashboard;
pub mod distribution;
pub mod insights;
pub mod metrics;

pub use dashboard::{render, DashboardView};
pub use distribution::{quantile, FiveNumberSummary};
pub use insights::{compute_insights, InsightBundle, InsightSettings, GENERAL_SUGGESTIONS};
pub use metrics::{kpis, Kpis, ModeDistribution, SeriesPoint};
