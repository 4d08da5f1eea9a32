use super::*;

/// Revenue over time and by subscription tier.
pub(super) fn render_revenue(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Percentage(55), // Monthly revenue
        Constraint::Percentage(45), // By tier
    ])
    .split(area);

    let view = &app.view;
    render_revenue_rows(
        frame,
        "Monthly Revenue",
        view.monthly_revenue
            .iter()
            .map(|p| (p.key.to_string(), p.value))
            .collect(),
        view.kpis.total_revenue,
        chunks[0],
    );
    render_revenue_rows(
        frame,
        "Revenue by Subscription Tier",
        view.revenue_by_tier
            .iter()
            .map(|p| (p.key.clone(), p.value))
            .collect(),
        view.kpis.total_revenue,
        chunks[1],
    );
}

fn render_revenue_rows(
    frame: &mut Frame,
    title: &str,
    rows: Vec<(String, f64)>,
    total: f64,
    area: Rect,
) {
    let max = rows.iter().map(|(_, v)| *v).fold(0.0, f64::max);
    let bar_width = area.width.saturating_sub(44) as usize;

    let header = Row::new(
        ["", "Revenue", "Share", ""]
            .into_iter()
            .map(|h| Cell::from(h).style(Style::default().fg(Color::Yellow).bold())),
    );

    let table_rows = rows.iter().map(|(label, value)| {
        let share = matiks_core::analytics::insights::percentage(*value, total);
        Row::new([
            Cell::from(label.as_str()),
            Cell::from(format_currency(*value)).style(Style::default().fg(REVENUE_COLOR)),
            Cell::from(format_percent(share)).style(Style::default().fg(DIM)),
            Cell::from(bar(*value, max, bar_width)).style(Style::default().fg(REVENUE_COLOR)),
        ])
    });

    let widths = [
        Constraint::Length(14),
        Constraint::Length(16),
        Constraint::Length(8),
        Constraint::Fill(1),
    ];

    let table = Table::new(table_rows, widths)
        .header(header)
        .block(panel(title));
    frame.render_widget(table, area);
}
