//! # matiks-core
//!
//! Core library for matiks - a user activity and revenue dashboard.
//!
//! This library provides:
//! - Domain types for activity records and datasets
//! - CSV ingestion with a process-wide, staleness-aware cache
//! - Categorical filters
//! - KPI, time-series and distribution analytics
//! - Cohort insights and recommendations
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Data flow
//!
//! - **Source:** a CSV export on disk (never modified)
//! - **Dataset:** cleaned, typed records held in memory and shared
//! - **View:** everything derived from a filtered subset, recomputed per interaction
//!
//! ## Example
//!
//! ```rust,no_run
//! use matiks_core::{ingest, render, Config, FilterSelection};
//!
//! let config = Config::load().expect("failed to load config");
//! let loaded = ingest::load(&config.dataset.path).expect("failed to load dataset");
//!
//! let now = chrono::Local::now().naive_local();
//! let view = render(&loaded.dataset, &FilterSelection::new(), now, &config.insights);
//! println!("{} users", view.kpis.total_users);
//! ```

// Re-export commonly used items at the crate root
pub use analytics::{render, DashboardView};
pub use config::Config;
pub use error::{Error, Result};
pub use filter::{filter, filter_options, Dimension, FilterOptions, FilterSelection};
pub use ingest::{load, DatasetCache, LoadReport, LoadedDataset};
pub use types::*;

// Public modules
pub mod analytics;
pub mod config;
pub mod error;
pub mod filter;
pub mod format;
pub mod ingest;
pub mod logging;
pub mod types;
