//! matiks-report - one-shot activity and revenue summary
//!
//! Prints the dashboard numbers for a filter selection to the terminal, or
//! exports them as Markdown or JSON.

mod cli;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use matiks_core::analytics::DashboardView;
use matiks_core::format::{
    format_count, format_currency, format_minutes, format_percent, format_percentile,
};
use matiks_core::{ingest, render, Config, Dimension, FilterSelection, LoadReport};

#[derive(Parser, Debug)]
#[command(name = "matiks-report")]
#[command(about = "Summarize user activity, revenue and churn signals")]
#[command(version)]
struct Args {
    /// Dataset CSV (default: dataset.path from config)
    #[arg(long)]
    data: Option<PathBuf>,

    /// Only include users from this country (repeatable)
    #[arg(long = "country")]
    countries: Vec<String>,

    /// Only include users of this game title (repeatable)
    #[arg(long = "game")]
    games: Vec<String>,

    /// Only include users on this subscription tier (repeatable)
    #[arg(long = "tier")]
    tiers: Vec<String>,

    /// Reference time for inactivity (default: now)
    #[arg(long)]
    now: Option<String>,

    /// Export format (md = markdown, json = JSON)
    #[arg(long)]
    export: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load().context("failed to load configuration")?;
    let _log_guard = matiks_core::logging::init(&config.logging).ok();

    let path = cli::dataset_path(args.data.clone(), &config);
    let now = cli::resolve_now(args.now.as_deref())?.unwrap_or_else(cli::wall_clock);

    let loaded = ingest::load(&path)
        .with_context(|| format!("failed to load dataset from {}", path.display()))?;

    let selection = FilterSelection::new()
        .with(Dimension::Country, args.countries)
        .with(Dimension::GameTitle, args.games)
        .with(Dimension::SubscriptionTier, args.tiers);

    let view = render(&loaded.dataset, &selection, now, &config.insights);

    match args.export.as_deref() {
        Some("json") => print_json(&path, &loaded.report, &view)?,
        Some("md") => print_markdown(&path, &view),
        Some(other) => anyhow::bail!("Unknown export format: {}. Use 'md' or 'json'", other),
        None => print_terminal(&path, &loaded.report, &view),
    }

    Ok(())
}

/// One line describing the active filters.
fn describe_selection(selection: &FilterSelection) -> String {
    if selection.is_empty() {
        return "all users".to_string();
    }
    Dimension::ALL
        .iter()
        .filter(|d| !selection.values(**d).is_empty())
        .map(|d| {
            let values: Vec<&str> = selection.values(*d).iter().map(String::as_str).collect();
            format!("{}: {}", d.label(), values.join(", "))
        })
        .collect::<Vec<_>>()
        .join("; ")
}

fn print_terminal(path: &Path, report: &LoadReport, view: &DashboardView) {
    let title = "MATIKS ACTIVITY REPORT";

    // Header
    println!();
    println!("╭{}╮", "─".repeat(60));
    println!("│{:^60}│", title);
    println!("╰{}╯", "─".repeat(60));
    println!();
    println!("   Source:   {}", path.display());
    println!(
        "   Rows:     {} read, {} kept, {} dropped without a last login",
        format_count(report.rows_read),
        format_count(report.rows_kept),
        format_count(report.dropped_missing_last_login)
    );
    println!("   Filter:   {}", describe_selection(&view.selection));
    println!("   As of:    {}", view.now.format("%Y-%m-%d %H:%M"));
    println!();

    if view.is_empty() {
        println!("  No users match this selection.");
        println!();
        return;
    }

    // Headline numbers
    println!("SUMMARY");
    println!(
        "   Users: {:<14} Revenue: {:<16} Avg session: {}",
        format_count(view.kpis.total_users),
        format_currency(view.kpis.total_revenue),
        format_minutes(view.kpis.avg_session_duration)
    );
    println!();

    println!("MONTHLY");
    println!("   {:<10} {:>10} {:>16}", "Month", "Active", "Revenue");
    for (active, revenue) in view
        .monthly_active_users
        .iter()
        .zip(view.monthly_revenue.iter())
    {
        println!(
            "   {:<10} {:>10} {:>16}",
            active.key.to_string(),
            format_count(active.value),
            format_currency(revenue.value)
        );
    }
    println!();

    if let Some(peak) = view.weekly_active_users.iter().max_by_key(|p| p.value) {
        println!(
            "   Busiest week: {} ({}) with {} active users",
            peak.key.iso_label(),
            peak.key,
            format_count(peak.value)
        );
        println!();
    }

    println!("DEVICES");
    for (device, share) in view.device_shares() {
        println!("   {:<16} {:>7}", device, format_percent(share));
    }
    println!();

    println!("REVENUE BY TIER");
    for point in &view.revenue_by_tier {
        println!("   {:<16} {:>16}", point.key, format_currency(point.value));
    }
    println!();

    println!("SESSION DURATION BY MODE");
    for mode in &view.session_duration_by_mode {
        match &mode.summary {
            Some(s) => println!(
                "   {:<16} median {:<12} IQR {:.2}-{:.2}  range {:.2}-{:.2}",
                mode.mode,
                format_minutes(s.median),
                s.q1,
                s.q3,
                s.min,
                s.max
            ),
            None => println!("   {:<16} no durations recorded", mode.mode),
        }
    }
    println!();

    let insights = &view.insights;
    println!("INSIGHTS");
    println!(
        "   High value:     {} users above the {} revenue percentile",
        format_count(insights.high_value_users),
        format_percentile(insights.config.high_value_percentile)
    );
    println!(
        "   High retention: {} users above the {} session percentile",
        format_count(insights.high_retention_users),
        format_percentile(insights.config.high_retention_percentile)
    );
    println!(
        "   Churn risk:     {} users ({})",
        format_count(insights.churn_risk_users),
        format_percent(insights.churn_pct)
    );
    println!();

    println!("RECOMMENDATIONS");
    for (i, line) in view.recommendations.iter().enumerate() {
        println!("   {}. {}", i + 1, line);
    }
    println!();
}

fn print_markdown(path: &Path, view: &DashboardView) {
    println!("# Matiks Activity Report");
    println!();
    println!("- **Source:** `{}`", path.display());
    println!("- **Filter:** {}", describe_selection(&view.selection));
    println!("- **As of:** {}", view.now.format("%Y-%m-%d %H:%M"));
    println!();

    println!("## Summary");
    println!();
    println!("| Metric | Value |");
    println!("|--------|-------|");
    println!("| Users | {} |", format_count(view.kpis.total_users));
    println!("| Revenue | {} |", format_currency(view.kpis.total_revenue));
    println!(
        "| Avg session | {} |",
        format_minutes(view.kpis.avg_session_duration)
    );
    println!();

    if !view.monthly_revenue.is_empty() {
        println!("## Monthly");
        println!();
        println!("| Month | Active users | Revenue |");
        println!("|-------|--------------|---------|");
        for (active, revenue) in view
            .monthly_active_users
            .iter()
            .zip(view.monthly_revenue.iter())
        {
            println!(
                "| {} | {} | {} |",
                active.key,
                format_count(active.value),
                format_currency(revenue.value)
            );
        }
        println!();
    }

    if !view.revenue_by_tier.is_empty() {
        println!("## Revenue by Tier");
        println!();
        println!("| Tier | Revenue |");
        println!("|------|---------|");
        for point in &view.revenue_by_tier {
            println!("| {} | {} |", point.key, format_currency(point.value));
        }
        println!();
    }

    println!("## Insights");
    println!();
    let insights = &view.insights;
    println!(
        "- **Churn risk:** {} users ({})",
        format_count(insights.churn_risk_users),
        format_percent(insights.churn_pct)
    );
    println!(
        "- **High value:** {} users ({} of revenue)",
        format_count(insights.high_value_users),
        format_percent(insights.high_value_revenue_pct)
    );
    println!(
        "- **High retention:** {} users",
        format_count(insights.high_retention_users)
    );
    println!();

    println!("## Recommendations");
    println!();
    for line in &view.recommendations {
        println!("- {}", line);
    }
    println!();

    println!("---");
    println!("*Generated by matiks-report*");
}

fn print_json(path: &Path, report: &LoadReport, view: &DashboardView) -> Result<()> {
    let json = serde_json::json!({
        "source": path.display().to_string(),
        "load": report,
        "dashboard": view,
    });

    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
