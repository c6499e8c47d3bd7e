//! Vitals view: short synthetic monitoring window for one patient.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Sparkline},
    Frame,
};

use crate::application::VitalsTrace;
use crate::tui::styles::MedicalTheme;

/// Vitals screen state.
#[derive(Debug, Default)]
pub struct VitalsState {
    pub patient_id: Option<String>,
    pub trace: Option<VitalsTrace>,
    pub error: Option<String>,
}

/// Render the vitals monitor.
pub fn render_vitals(f: &mut Frame, area: Rect, state: &VitalsState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Traces
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_header(f, chunks[0], state);
    render_traces(f, chunks[1], state);
    render_footer(f, chunks[2]);
}

fn render_header(f: &mut Frame, area: Rect, state: &VitalsState) {
    let patient = state.patient_id.as_deref().unwrap_or("<none>");
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Vitals Monitor", MedicalTheme::title()),
        Span::styled(" │ Patient ", MedicalTheme::text_secondary()),
        Span::styled(patient, MedicalTheme::subtitle()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_traces(f: &mut Frame, area: Rect, state: &VitalsState) {
    if let Some(err) = &state.error {
        let content = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("! Cannot load vitals", MedicalTheme::danger())),
            Line::from(""),
            Line::from(Span::styled(err.as_str(), MedicalTheme::text())),
        ])
        .alignment(ratatui::layout::Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(MedicalTheme::danger()),
        );
        f.render_widget(content, area);
        return;
    }

    let Some(trace) = &state.trace else {
        let content = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "Select a patient from the Patients screen first.",
                MedicalTheme::text_muted(),
            )),
        ])
        .alignment(ratatui::layout::Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border()),
        );
        f.render_widget(content, area);
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Percentage(45),
            Constraint::Length(2),
        ])
        .split(area);

    let sbp: Vec<u64> = trace.systolic_bp.iter().map(|&v| v.max(0) as u64).collect();
    let sbp_label = format!(
        " Systolic BP (mmHg)  last: {} ",
        trace.systolic_bp.last().copied().unwrap_or(0)
    );
    let sbp_chart = Sparkline::default()
        .block(
            Block::default()
                .title(Span::styled(sbp_label, MedicalTheme::danger()))
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border()),
        )
        .style(MedicalTheme::danger())
        .data(&sbp);
    f.render_widget(sbp_chart, rows[0]);

    let hr: Vec<u64> = trace.heart_rate.iter().map(|&v| v.max(0) as u64).collect();
    let hr_label = format!(
        " Heart Rate (bpm)  last: {} ",
        trace.heart_rate.last().copied().unwrap_or(0)
    );
    let hr_chart = Sparkline::default()
        .block(
            Block::default()
                .title(Span::styled(hr_label, MedicalTheme::info()))
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border()),
        )
        .style(MedicalTheme::info())
        .data(&hr);
    f.render_widget(hr_chart, rows[1]);

    let times = Line::from(vec![
        Span::styled("  ", MedicalTheme::text()),
        Span::styled(trace.times.join("   "), MedicalTheme::text_muted()),
    ]);
    f.render_widget(Paragraph::new(times), rows[2]);
}

fn render_footer(f: &mut Frame, area: Rect) {
    let footer = Paragraph::new(Line::from(vec![
        Span::styled("[R] ", MedicalTheme::key_hint()),
        Span::styled("Refresh ", MedicalTheme::key_desc()),
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
