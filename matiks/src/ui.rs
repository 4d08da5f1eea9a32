//! UI rendering for the TUI.

mod activity;
mod breakdowns;
mod insights;
mod revenue;

use matiks_core::format::{format_count, format_currency, format_minutes, format_percent};
use matiks_core::Dimension;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Sparkline, Table, Wrap},
    Frame,
};

use crate::app::{App, ContentTab};

// ========== Dashboard Colors ==========

/// Accent for headings and the active tab
const ACCENT: Color = Color::Rgb(0, 200, 200);
/// Revenue figures and bars
const REVENUE_COLOR: Color = Color::Rgb(50, 205, 50);
/// Active-user figures and sparklines
const USERS_COLOR: Color = Color::Rgb(0, 180, 255);
/// Session-duration figures
const SESSION_COLOR: Color = Color::Rgb(255, 180, 100);
/// Churn and risk highlights
const RISK_COLOR: Color = Color::Rgb(255, 127, 80);
/// Label color for metric names
const LABEL_COLOR: Color = Color::Rgb(100, 180, 180);
/// Border color for the filter sidebar
const BORDER_FILTERS: Color = Color::Rgb(180, 100, 180);
/// Border color for content panels
const BORDER_CONTENT: Color = Color::Rgb(80, 160, 80);
/// Dim gray for secondary text
const DIM: Color = Color::Rgb(128, 128, 128);

/// Render the application UI.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Layout: tab header, KPI cards, body, footer
    let chunks = Layout::vertical([
        Constraint::Length(2), // Tab header
        Constraint::Length(4), // KPI cards
        Constraint::Min(8),    // Sidebar + content
        Constraint::Length(1), // Footer
    ])
    .split(area);

    render_tab_header(frame, app.tab, chunks[0]);
    render_kpis(frame, app, chunks[1]);

    let body = Layout::horizontal([
        Constraint::Length(30), // Filters
        Constraint::Min(20),    // Content
    ])
    .split(chunks[2]);

    render_filters(frame, app, body[0]);

    if app.view.is_empty() {
        render_empty(frame, body[1]);
    } else {
        match app.tab {
            ContentTab::Activity => activity::render_activity(frame, app, body[1]),
            ContentTab::Revenue => revenue::render_revenue(frame, app, body[1]),
            ContentTab::Breakdowns => breakdowns::render_breakdowns(frame, app, body[1]),
            ContentTab::Insights => insights::render_insights(frame, app, body[1]),
        }
    }

    render_footer(frame, app, chunks[3]);
}

/// Render the tab bar header.
fn render_tab_header(frame: &mut Frame, active: ContentTab, area: Rect) {
    // Layout: app name on left, tabs to the right
    let chunks = Layout::horizontal([
        Constraint::Length(10), // App name
        Constraint::Min(1),     // Tabs
    ])
    .split(area);

    let app_name = Paragraph::new(" matiks").style(Style::default().fg(ACCENT).bold());
    frame.render_widget(app_name, chunks[0]);

    let active_style = Style::default()
        .fg(ACCENT)
        .bold()
        .add_modifier(Modifier::UNDERLINED);
    let inactive_style = Style::default().fg(Color::DarkGray);

    let mut spans = Vec::new();
    for (i, tab) in ContentTab::ALL.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        let style = if *tab == active {
            active_style
        } else {
            inactive_style
        };
        spans.push(Span::styled(format!(" {} {} ", i + 1, tab.title()), style));
    }

    let tabs = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(tabs, chunks[1]);
}

/// Render the three headline KPI cards.
fn render_kpis(frame: &mut Frame, app: &App, area: Rect) {
    let cards = Layout::horizontal([
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
    ])
    .split(area);

    let kpis = &app.view.kpis;
    render_card(
        frame,
        "Total Users",
        format_count(kpis.total_users),
        USERS_COLOR,
        cards[0],
    );
    render_card(
        frame,
        "Total Revenue",
        format_currency(kpis.total_revenue),
        REVENUE_COLOR,
        cards[1],
    );
    render_card(
        frame,
        "Avg Session Duration",
        format_minutes(kpis.avg_session_duration),
        SESSION_COLOR,
        cards[2],
    );
}

fn render_card(frame: &mut Frame, title: &str, value: String, color: Color, area: Rect) {
    let card = Paragraph::new(Line::from(Span::styled(
        value,
        Style::default().fg(color).bold(),
    )))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(color))
            .title(Span::styled(
                format!(" {} ", title),
                Style::default().fg(LABEL_COLOR),
            )),
    );
    frame.render_widget(card, area);
}

/// Render the filter sidebar: one checkbox list per dimension.
fn render_filters(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_FILTERS))
        .title(" Filters ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let sections = Layout::vertical([
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
    ])
    .split(inner);

    for (dimension, section) in Dimension::ALL.iter().zip(sections.iter()) {
        render_filter_list(frame, app, *dimension, *section);
    }
}

fn render_filter_list(frame: &mut Frame, app: &App, dimension: Dimension, area: Rect) {
    let focused = app.focus == dimension;
    let values = app.options.values(dimension);
    let selected = app.selection.values(dimension).len();

    let heading_style = if focused {
        Style::default().fg(ACCENT).bold()
    } else {
        Style::default().fg(LABEL_COLOR)
    };
    let summary = if selected == 0 {
        "all".to_string()
    } else {
        format!("{} selected", selected)
    };

    let mut lines = vec![Line::from(vec![
        Span::styled(dimension.label(), heading_style),
        Span::styled(format!(" ({})", summary), Style::default().fg(DIM)),
    ])];

    // keep the cursor row visible below the heading
    let rows = area.height.saturating_sub(1) as usize;
    let cursor = app.cursor(dimension);
    let offset = if rows == 0 {
        0
    } else {
        cursor.saturating_sub(rows - 1)
    };

    for (i, value) in values.iter().enumerate().skip(offset).take(rows) {
        let checked = app.selection.is_selected(dimension, value);
        let marker = if checked { "[x] " } else { "[ ] " };
        let mut style = if checked {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::Gray)
        };
        if focused && i == cursor {
            style = style.bg(Color::Rgb(40, 40, 60)).add_modifier(Modifier::BOLD);
        }
        lines.push(Line::from(Span::styled(format!("{}{}", marker, value), style)));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

/// Content-panel block with the shared border style.
fn panel(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_CONTENT))
        .title(format!(" {} ", title))
}

/// Horizontal bar scaled against `max`, `width` cells wide at most.
fn bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || !value.is_finite() || value <= 0.0 {
        return String::new();
    }
    let cells = ((value / max) * width as f64).round().max(1.0) as usize;
    "█".repeat(cells.min(width))
}

fn render_empty(frame: &mut Frame, area: Rect) {
    let placeholder = Paragraph::new("No users match the current filters. Press C to clear them.")
        .style(Style::default().fg(Color::DarkGray))
        .wrap(Wrap { trim: true })
        .block(panel("No data"));
    frame.render_widget(placeholder, area);
}

/// Render the footer with key hints.
fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let key_style = Style::default().fg(Color::Yellow);

    let mut spans = vec![
        Span::styled(" Tab", key_style),
        Span::raw(" filter  "),
        Span::styled("j/k", key_style),
        Span::raw(" move  "),
        Span::styled("Space", key_style),
        Span::raw(" toggle  "),
        Span::styled("c/C", key_style),
        Span::raw(" clear  "),
        Span::styled("h/l", key_style),
        Span::raw(" tab  "),
        Span::styled("r", key_style),
        Span::raw(" reload  "),
        Span::styled("q", key_style),
        Span::raw(" quit  "),
        Span::raw("│ "),
        Span::styled(
            format!(
                "{}/{} records",
                format_count(app.view.record_count),
                format_count(app.loaded.dataset.len())
            ),
            Style::default().fg(Color::DarkGray),
        ),
    ];

    if let Some(status) = &app.status {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled(status.clone(), Style::default().fg(Color::DarkGray)));
    }

    if app.should_show_reload_indicator() {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled(
            "● RELOADED",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
