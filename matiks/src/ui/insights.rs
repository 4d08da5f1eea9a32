use super::*;

pub(super) fn render_insights(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Length(8), // Cohort counts
        Constraint::Min(4),    // Recommendations
    ])
    .split(area);

    render_cohorts(frame, app, chunks[0]);
    render_recommendations(frame, app, chunks[1]);
}

fn render_cohorts(frame: &mut Frame, app: &App, area: Rect) {
    let insights = &app.view.insights;
    let settings = &insights.config;
    let label = |text: &'static str| Span::styled(text, Style::default().fg(LABEL_COLOR));
    let threshold = |t: Option<f64>| t.map_or_else(|| "-".to_string(), |t| format!("{:.2}", t));

    let lines = vec![
        Line::from(vec![
            label("Churn risk:      "),
            Span::styled(
                format!(
                    "{} users ({})",
                    format_count(insights.churn_risk_users),
                    format_percent(insights.churn_pct)
                ),
                Style::default().fg(RISK_COLOR).bold(),
            ),
        ]),
        Line::from(vec![
            label("  inactive:      "),
            Span::raw(format!(
                "{} users > {} days since last login",
                format_count(insights.inactive_users),
                settings.churn_inactive_days
            )),
        ]),
        Line::from(vec![
            label("  low sessions:  "),
            Span::raw(format!(
                "{} users with <= {} sessions",
                format_count(insights.low_session_users),
                settings.low_session_threshold
            )),
        ]),
        Line::from(vec![
            label("High value:      "),
            Span::styled(
                format!(
                    "{} users above {} ({} of revenue)",
                    format_count(insights.high_value_users),
                    insights
                        .high_value_threshold
                        .map_or_else(|| "-".to_string(), format_currency),
                    format_percent(insights.high_value_revenue_pct)
                ),
                Style::default().fg(REVENUE_COLOR),
            ),
        ]),
        Line::from(vec![
            label("High retention:  "),
            Span::styled(
                format!(
                    "{} users above {} sessions",
                    format_count(insights.high_retention_users),
                    threshold(insights.high_retention_threshold)
                ),
                Style::default().fg(USERS_COLOR),
            ),
        ]),
        Line::from(vec![
            label("Mid tier:        "),
            Span::raw(format!(
                "{} users on '{}'",
                format_count(insights.mid_tier_users),
                settings.mid_tier_label
            )),
        ]),
    ];

    frame.render_widget(Paragraph::new(lines).block(panel("Cohorts")), area);
}

fn render_recommendations(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = Vec::new();
    for (i, text) in app.view.recommendations.iter().enumerate() {
        lines.push(Line::from(vec![
            Span::styled(format!("{}. ", i + 1), Style::default().fg(ACCENT).bold()),
            Span::raw(text.as_str()),
        ]));
        lines.push(Line::from(""));
    }

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .scroll((app.scroll_offset, 0))
        .block(panel("Recommendations (d/u to scroll)"));
    frame.render_widget(paragraph, area);
}
