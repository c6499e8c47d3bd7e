//! Dashboard view: Live cohort overview.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use crate::application::CohortStats;
use crate::domain::RiskLevel;
use crate::tui::styles::{MedicalTheme, LOGO_SMALL};

/// Dashboard state for rendering.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub stats: CohortStats,
    pub risk_distribution: [(RiskLevel, usize); 3],
    /// Whether the background mutation worker is running.
    pub live: bool,
    /// Ticks observed since startup.
    pub tick_count: u64,
    /// How many patients the last tick touched.
    pub last_mutated: usize,
}

impl DashboardState {
    fn default_distribution() -> [(RiskLevel, usize); 3] {
        [
            (RiskLevel::Low, 0),
            (RiskLevel::Medium, 0),
            (RiskLevel::High, 0),
        ]
    }
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            stats: CohortStats::default(),
            risk_distribution: Self::default_distribution(),
            live: false,
            tick_count: 0,
            last_mutated: 0,
        }
    }
}

/// Render the main dashboard view.
pub fn render_dashboard(f: &mut Frame, area: Rect, state: &DashboardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(5), // Stat cards
            Constraint::Min(0),    // Distribution + actions
        ])
        .split(area);

    render_header(f, chunks[0], state);
    render_stat_cards(f, chunks[1], state);
    render_lower_panels(f, chunks[2], state);
}

fn render_header(f: &mut Frame, area: Rect, state: &DashboardState) {
    let live_span = if state.live {
        Span::styled("LIVE", MedicalTheme::success())
    } else {
        Span::styled("PAUSED", MedicalTheme::text_muted())
    };

    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled(LOGO_SMALL, MedicalTheme::title()),
        Span::styled(" │ ", MedicalTheme::text_muted()),
        Span::styled(
            "Cardiovascular Cohort Monitoring",
            MedicalTheme::text_secondary(),
        ),
        Span::styled(" │ ", MedicalTheme::text_muted()),
        live_span,
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_stat_cards(f: &mut Frame, area: Rect, state: &DashboardState) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(area);

    render_card(
        f,
        cards[0],
        "Total Patients",
        state.stats.total_patients.to_string(),
        MedicalTheme::info(),
    );
    render_card(
        f,
        cards[1],
        "High Risk",
        state.stats.high_risk_patients.to_string(),
        MedicalTheme::danger(),
    );
    render_card(
        f,
        cards[2],
        "High Risk %",
        format!("{:.1}%", state.stats.high_risk_percentage),
        MedicalTheme::warning(),
    );
}

fn render_card(f: &mut Frame, area: Rect, title: &str, value: String, style: ratatui::style::Style) {
    let block = Block::default()
        .title(Span::styled(format!(" {title} "), MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(value, style.patch(MedicalTheme::title()))),
    ])
    .alignment(ratatui::layout::Alignment::Center)
    .block(block);

    f.render_widget(content, area);
}

fn render_lower_panels(f: &mut Frame, area: Rect, state: &DashboardState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    render_distribution(f, chunks[0], state);
    render_actions(f, chunks[1], state);
}

fn render_distribution(f: &mut Frame, area: Rect, state: &DashboardState) {
    let block = Block::default()
        .title(Span::styled(" Risk Distribution ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    let inner = block.inner(area);
    f.render_widget(block, area);

    let total = state.stats.total_patients.max(1);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .margin(1)
        .split(inner);

    for (i, (level, count)) in state.risk_distribution.iter().enumerate() {
        let ratio = *count as f64 / total as f64;
        let gauge = Gauge::default()
            .block(
                Block::default()
                    .title(Span::styled(
                        format!(" {level} ({count}) "),
                        MedicalTheme::risk_level(*level),
                    ))
                    .borders(Borders::ALL)
                    .border_style(MedicalTheme::border()),
            )
            .gauge_style(MedicalTheme::risk_level(*level))
            .percent((ratio * 100.0).clamp(0.0, 100.0) as u16)
            .label(format!("{:.1}%", ratio * 100.0));
        f.render_widget(gauge, rows[i]);
    }
}

fn render_actions(f: &mut Frame, area: Rect, state: &DashboardState) {
    let mut lines = vec![
        Line::from(vec![
            Span::styled("[P] ", MedicalTheme::key_hint()),
            Span::styled("Patients", MedicalTheme::key_desc()),
        ]),
        Line::from(vec![
            Span::styled("[V] ", MedicalTheme::key_hint()),
            Span::styled("Vitals Monitor", MedicalTheme::key_desc()),
        ]),
        Line::from(vec![
            Span::styled("[A] ", MedicalTheme::key_hint()),
            Span::styled("Analytics", MedicalTheme::key_desc()),
        ]),
        Line::from(vec![
            Span::styled("[M] ", MedicalTheme::key_hint()),
            Span::styled("Manual Tick", MedicalTheme::key_desc()),
        ]),
        Line::from(vec![
            Span::styled("[W] ", MedicalTheme::key_hint()),
            Span::styled("Toggle Live Updates", MedicalTheme::key_desc()),
        ]),
        Line::from(vec![
            Span::styled("[Q] ", MedicalTheme::key_hint()),
            Span::styled("Quit", MedicalTheme::key_desc()),
        ]),
        Line::from(""),
    ];

    lines.push(Line::from(vec![
        Span::styled("Ticks: ", MedicalTheme::text_secondary()),
        Span::styled(state.tick_count.to_string(), MedicalTheme::text()),
        Span::styled("  Last updated: ", MedicalTheme::text_secondary()),
        Span::styled(
            format!("{} patients", state.last_mutated),
            MedicalTheme::text(),
        ),
    ]));

    let block = Block::default()
        .title(Span::styled(" Actions ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    f.render_widget(Paragraph::new(lines).block(block), area);
}
