//! Analytics view: treatment outcomes cross-tab and cluster profiles.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::application::{ClusterProfile, TreatmentAnalysis};
use crate::tui::styles::MedicalTheme;

/// Analytics screen state.
#[derive(Debug, Default)]
pub struct AnalyticsState {
    pub treatment_analysis: Option<TreatmentAnalysis>,
    pub clusters: Option<Vec<ClusterProfile>>,
    pub error: Option<String>,
}

/// Render the analytics screen.
pub fn render_analytics(f: &mut Frame, area: Rect, state: &AnalyticsState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),      // Header
            Constraint::Percentage(45), // Treatment cross-tab
            Constraint::Min(0),         // Cluster profiles
            Constraint::Length(3),      // Footer
        ])
        .split(area);

    render_header(f, chunks[0], state);
    render_treatments(f, chunks[1], state);
    render_clusters(f, chunks[2], state);
    render_footer(f, chunks[3]);
}

fn render_header(f: &mut Frame, area: Rect, state: &AnalyticsState) {
    let mut spans = vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Analytics", MedicalTheme::title()),
        Span::styled(" │ ", MedicalTheme::text_muted()),
        Span::styled("Treatment Outcomes & Segmentation", MedicalTheme::text_secondary()),
    ];
    if let Some(err) = &state.error {
        spans.push(Span::styled(" │ ", MedicalTheme::text_muted()));
        spans.push(Span::styled(err.as_str(), MedicalTheme::danger()));
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_treatments(f: &mut Frame, area: Rect, state: &AnalyticsState) {
    let block = Block::default()
        .title(Span::styled(" Treatment Outcomes ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    let Some(analysis) = &state.treatment_analysis else {
        let empty = Paragraph::new(Line::from(Span::styled(
            "Press [R] to compute",
            MedicalTheme::text_muted(),
        )))
        .block(block);
        f.render_widget(empty, area);
        return;
    };

    let response_labels: Vec<String> = analysis
        .treatments
        .first()
        .map(|t| t.responses.iter().map(|r| r.response.to_string()).collect())
        .unwrap_or_default();

    let mut header_cells = vec![Cell::from(Span::styled("Treatment", MedicalTheme::subtitle()))];
    for label in response_labels {
        header_cells.push(Cell::from(Span::styled(label, MedicalTheme::subtitle())));
    }
    header_cells.push(Cell::from(Span::styled("Total", MedicalTheme::subtitle())));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = analysis
        .treatments
        .iter()
        .map(|outcomes| {
            let mut cells = vec![Cell::from(Span::styled(
                outcomes.treatment.to_string(),
                MedicalTheme::text(),
            ))];
            for response in &outcomes.responses {
                cells.push(Cell::from(Span::styled(
                    response.count.to_string(),
                    MedicalTheme::text_secondary(),
                )));
            }
            cells.push(Cell::from(Span::styled(
                outcomes.total().to_string(),
                MedicalTheme::info(),
            )));
            Row::new(cells).height(1)
        })
        .collect();

    let widths = [
        Constraint::Percentage(36),
        Constraint::Percentage(17),
        Constraint::Percentage(17),
        Constraint::Percentage(17),
        Constraint::Percentage(13),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .column_spacing(1);

    f.render_widget(table, area);
}

fn render_clusters(f: &mut Frame, area: Rect, state: &AnalyticsState) {
    let block = Block::default()
        .title(Span::styled(" Patient Segments ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    let Some(profiles) = &state.clusters else {
        let empty = Paragraph::new(Line::from(Span::styled(
            "Press [S] to segment the cohort",
            MedicalTheme::text_muted(),
        )))
        .block(block);
        f.render_widget(empty, area);
        return;
    };

    let mut lines = Vec::new();
    for profile in profiles {
        let means = ClusterProfile::feature_names()
            .iter()
            .zip(&profile.feature_means)
            .map(|(name, mean)| format!("{name} {mean:.1}"))
            .collect::<Vec<_>>()
            .join("  ");

        lines.push(Line::from(vec![
            Span::styled(
                format!("Cluster {}  ", profile.cluster),
                MedicalTheme::subtitle(),
            ),
            Span::styled(
                format!("{} patients ({:.1}%)  ", profile.size, profile.share * 100.0),
                MedicalTheme::text(),
            ),
            Span::styled(
                format!("high risk {:.1}%", profile.high_risk_share * 100.0),
                MedicalTheme::gauge(1.0 - profile.high_risk_share),
            ),
        ]));
        lines.push(Line::from(Span::styled(
            format!("  {means}"),
            MedicalTheme::text_muted(),
        )));
        lines.push(Line::from(""));
    }

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_footer(f: &mut Frame, area: Rect) {
    let footer = Paragraph::new(Line::from(vec![
        Span::styled("[R] ", MedicalTheme::key_hint()),
        Span::styled("Refresh ", MedicalTheme::key_desc()),
        Span::styled("[S] ", MedicalTheme::key_hint()),
        Span::styled("Segment ", MedicalTheme::key_desc()),
        Span::styled("[Esc] ", MedicalTheme::key_hint()),
        Span::styled("Back", MedicalTheme::key_desc()),
    ]))
    .block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(footer, area);
}
