use super::*;

/// Device mix and session-duration distribution per game mode.
pub(super) fn render_breakdowns(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Length(app.view.device_distribution.len() as u16 + 3), // Devices
        Constraint::Min(5),                                                // Modes
    ])
    .split(area);

    render_devices(frame, app, chunks[0]);
    render_modes(frame, app, chunks[1]);
}

fn render_devices(frame: &mut Frame, app: &App, area: Rect) {
    let shares = app.view.device_shares();
    let bar_width = area.width.saturating_sub(36) as usize;

    let header = Row::new(
        ["Device", "Records", "Share", ""]
            .into_iter()
            .map(|h| Cell::from(h).style(Style::default().fg(Color::Yellow).bold())),
    );

    let rows = app
        .view
        .device_distribution
        .iter()
        .zip(shares.iter())
        .map(|(point, (_, share))| {
            Row::new([
                Cell::from(point.key.as_str()),
                Cell::from(format_count(point.value)),
                Cell::from(format_percent(*share)),
                Cell::from(bar(*share, 100.0, bar_width)).style(Style::default().fg(ACCENT)),
            ])
        });

    let widths = [
        Constraint::Length(14),
        Constraint::Length(8),
        Constraint::Length(8),
        Constraint::Fill(1),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(panel("Device Type"));
    frame.render_widget(table, area);
}

fn render_modes(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new(
        ["Game Mode", "n", "Min", "Q1", "Median", "Q3", "Max"]
            .into_iter()
            .map(|h| Cell::from(h).style(Style::default().fg(Color::Yellow).bold())),
    );

    let rows = app.view.session_duration_by_mode.iter().map(|mode| {
        let n = Cell::from(format_count(mode.durations.len()));
        match &mode.summary {
            Some(s) => Row::new([
                Cell::from(mode.mode.as_str()),
                n,
                Cell::from(format!("{:.1}", s.min)),
                Cell::from(format!("{:.1}", s.q1)),
                Cell::from(format!("{:.1}", s.median))
                    .style(Style::default().fg(SESSION_COLOR).bold()),
                Cell::from(format!("{:.1}", s.q3)),
                Cell::from(format!("{:.1}", s.max)),
            ]),
            None => Row::new([
                Cell::from(mode.mode.as_str()),
                n,
                Cell::from("-").style(Style::default().fg(DIM)),
                Cell::from("-").style(Style::default().fg(DIM)),
                Cell::from("-").style(Style::default().fg(DIM)),
                Cell::from("-").style(Style::default().fg(DIM)),
                Cell::from("-").style(Style::default().fg(DIM)),
            ]),
        }
    });

    let widths = [
        Constraint::Fill(1),
        Constraint::Length(6),
        Constraint::Length(8),
        Constraint::Length(8),
        Constraint::Length(8),
        Constraint::Length(8),
        Constraint::Length(8),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(panel("Session Duration by Game Mode (minutes)"));
    frame.render_widget(table, area);
}
