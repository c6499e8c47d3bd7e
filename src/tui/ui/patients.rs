//! Patients view: scrollable cohort list with a record detail pane.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::domain::{Cohort, PatientRecord};
use crate::tui::styles::MedicalTheme;

/// Patients screen state.
#[derive(Debug, Default)]
pub struct PatientListState {
    pub cohort: Cohort,
    pub list: ListState,
}

impl PatientListState {
    /// Replace the snapshot, keeping the selection in range.
    pub fn set_cohort(&mut self, cohort: Cohort) {
        self.cohort = cohort;
        let selected = self.list.selected().unwrap_or(0);
        if self.cohort.is_empty() {
            self.list.select(None);
        } else {
            self.list.select(Some(selected.min(self.cohort.len() - 1)));
        }
    }

    pub fn select_next(&mut self) {
        if self.cohort.is_empty() {
            return;
        }
        let next = self
            .list
            .selected()
            .map_or(0, |i| (i + 1).min(self.cohort.len() - 1));
        self.list.select(Some(next));
    }

    pub fn select_prev(&mut self) {
        if self.cohort.is_empty() {
            return;
        }
        let prev = self.list.selected().map_or(0, |i| i.saturating_sub(1));
        self.list.select(Some(prev));
    }

    /// The currently selected record, if any.
    #[must_use]
    pub fn selected_patient(&self) -> Option<&PatientRecord> {
        self.list
            .selected()
            .and_then(|i| self.cohort.iter().nth(i))
    }
}

/// Render the patients screen.
pub fn render_patients(f: &mut Frame, area: Rect, state: &mut PatientListState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    render_list(f, chunks[0], state);
    render_detail(f, chunks[1], state.selected_patient());
}

fn render_list(f: &mut Frame, area: Rect, state: &mut PatientListState) {
    let items: Vec<ListItem> = state
        .cohort
        .iter()
        .map(|p| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<7}", p.patient_id), MedicalTheme::text()),
                Span::styled(
                    format!("{:>3}y {:<7}", p.attributes.age, p.attributes.gender.to_string()),
                    MedicalTheme::text_secondary(),
                ),
                Span::styled(
                    format!("{:>6}", p.risk_level.to_string()),
                    MedicalTheme::risk_level(p.risk_level),
                ),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(Span::styled(
                    format!(" Patients ({}) ", state.cohort.len()),
                    MedicalTheme::subtitle(),
                ))
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border()),
        )
        .highlight_style(MedicalTheme::selected());

    f.render_stateful_widget(list, area, &mut state.list);
}

fn render_detail(f: &mut Frame, area: Rect, patient: Option<&PatientRecord>) {
    let block = Block::default()
        .title(Span::styled(" Record ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    let Some(p) = patient else {
        let empty = Paragraph::new(Line::from(Span::styled(
            "No patient selected",
            MedicalTheme::text_muted(),
        )))
        .block(block);
        f.render_widget(empty, area);
        return;
    };

    let a = &p.attributes;
    let field = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{label:<18}"), MedicalTheme::text_secondary()),
            Span::styled(value, MedicalTheme::text()),
        ])
    };

    let symptoms = a
        .symptoms
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    let medications = a
        .medications
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");

    let mut lines = vec![
        field("Patient", p.patient_id.clone()),
        Line::from(vec![
            Span::styled(format!("{:<18}", "Risk level"), MedicalTheme::text_secondary()),
            Span::styled(p.risk_level.to_string(), MedicalTheme::risk_level(p.risk_level)),
            Span::styled(
                format!("  ({})", p.risk_level.description()),
                MedicalTheme::text_muted(),
            ),
        ]),
        Line::from(""),
        field("Age / Gender", format!("{} / {}", a.age, a.gender)),
        field(
            "Blood pressure",
            format!("{}/{} mmHg", a.systolic_bp, a.diastolic_bp),
        ),
        field("Heart rate", format!("{} bpm", a.heart_rate)),
        field("Cholesterol", format!("{} mg/dL", a.cholesterol)),
        field("BMI", format!("{:.1}", a.bmi)),
        field("Exercise", format!("{} h/week", a.exercise_hours)),
        field("Smoking", yes_no(a.smoking)),
        field("Diabetes", yes_no(a.diabetes)),
        Line::from(""),
        field("Visit date", a.visit_date.to_string()),
        field("Symptoms", symptoms),
        field("Treatment", a.treatment.to_string()),
        field("Medications", medications),
        field("Response", a.treatment_response.to_string()),
        field("Follow-ups", a.follow_up_visits.to_string()),
    ];

    if let Some(cluster) = p.cluster {
        lines.push(field("Cluster", cluster.to_string()));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("[Enter] ", MedicalTheme::key_hint()),
        Span::styled("Vitals ", MedicalTheme::key_desc()),
        Span::styled("[Esc] ", MedicalTheme::key_hint()),
        Span::styled("Back", MedicalTheme::key_desc()),
    ]));

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn yes_no(value: bool) -> String {
    if value { "yes" } else { "no" }.to_string()
}
