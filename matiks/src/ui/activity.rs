use super::*;

/// Active-user trends: daily and weekly sparklines, monthly table.
pub(super) fn render_activity(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Length(5), // Daily
        Constraint::Length(5), // Weekly
        Constraint::Min(4),    // Monthly table
    ])
    .split(area);

    let view = &app.view;

    let daily: Vec<u64> = view
        .daily_active_users
        .iter()
        .map(|p| p.value as u64)
        .collect();
    let daily_title = match (view.daily_active_users.first(), view.daily_active_users.last()) {
        (Some(first), Some(last)) => format!("Daily Active Users  {} .. {}", first.key, last.key),
        _ => "Daily Active Users".to_string(),
    };
    render_sparkline(frame, &daily_title, &daily, chunks[0]);

    let weekly: Vec<u64> = view
        .weekly_active_users
        .iter()
        .map(|p| p.value as u64)
        .collect();
    let weekly_title = match view.weekly_active_users.iter().max_by_key(|p| p.value) {
        Some(peak) => format!(
            "Weekly Active Users  peak {} ({})",
            peak.key.iso_label(),
            format_count(peak.value)
        ),
        None => "Weekly Active Users".to_string(),
    };
    render_sparkline(frame, &weekly_title, &weekly, chunks[1]);

    render_monthly_table(frame, app, chunks[2]);
}

fn render_sparkline(frame: &mut Frame, title: &str, data: &[u64], area: Rect) {
    let sparkline = Sparkline::default()
        .block(panel(title))
        .data(data)
        .style(Style::default().fg(USERS_COLOR))
        .bar_set(symbols::bar::NINE_LEVELS);
    frame.render_widget(sparkline, area);
}

fn render_monthly_table(frame: &mut Frame, app: &App, area: Rect) {
    let view = &app.view;
    let max = view
        .monthly_active_users
        .iter()
        .map(|p| p.value)
        .max()
        .unwrap_or(0) as f64;
    let bar_width = area.width.saturating_sub(28) as usize;

    let header = Row::new(
        ["Month", "Active", ""]
            .into_iter()
            .map(|h| Cell::from(h).style(Style::default().fg(Color::Yellow).bold())),
    );

    let rows = view.monthly_active_users.iter().map(|p| {
        Row::new([
            Cell::from(p.key.to_string()),
            Cell::from(format_count(p.value)),
            Cell::from(bar(p.value as f64, max, bar_width)).style(Style::default().fg(USERS_COLOR)),
        ])
    });

    let widths = [
        Constraint::Length(9),
        Constraint::Length(9),
        Constraint::Fill(1),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(panel("Monthly Active Users"));
    frame.render_widget(table, area);
}
