//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - Live update worker lifecycle
//! - Monitor service integration

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use crate::application::{MonitorEvent, MonitorHandle, MonitorService, MonitorWorker};

use super::ui::{
    analytics::{render_analytics, AnalyticsState},
    dashboard::{render_dashboard, DashboardState},
    patients::{render_patients, PatientListState},
    render_disclaimer,
    vitals::{render_vitals, VitalsState},
};

/// Number of segments the analytics screen asks for.
const SEGMENT_COUNT: usize = 3;

/// Current screen/view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    Patients,
    Vitals,
    Analytics,
}

/// Main application state
pub struct App {
    /// Current screen
    screen: Screen,

    /// Whether the app should quit
    should_quit: bool,

    /// Shared cohort monitor
    service: MonitorService,

    /// Interval between background ticks
    tick_interval: Duration,

    /// Seed handed to segmentation runs
    seed: u64,

    /// Dashboard state
    dashboard_state: DashboardState,

    /// Patients state
    patient_list_state: PatientListState,

    /// Vitals state
    vitals_state: VitalsState,

    /// Analytics state
    analytics_state: AnalyticsState,

    /// Running live-update worker (if toggled on)
    worker: Option<MonitorHandle>,
}

impl App {
    /// Create an application around a pre-built monitor service
    /// (Composition Root pattern: `main.rs` constructs all adapters).
    #[must_use]
    pub fn new(service: MonitorService, tick_interval: Duration, seed: u64) -> Self {
        Self {
            screen: Screen::Dashboard,
            should_quit: false,
            service,
            tick_interval,
            seed,
            dashboard_state: DashboardState::default(),
            patient_list_state: PatientListState::default(),
            vitals_state: VitalsState::default(),
            analytics_state: AnalyticsState::default(),
            worker: None,
        }
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Initial state update
        self.refresh_dashboard();
        self.patient_list_state.set_cohort(self.service.snapshot());

        // Main loop
        let result = self.main_loop(&mut terminal);

        // Restore terminal
        if let Some(worker) = self.worker.take() {
            worker.stop();
        }
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            // Drain worker tick events
            self.poll_worker();

            // Draw current screen
            terminal.draw(|f| {
                let area = f.area();
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(3)])
                    .split(area);

                let content_area = chunks[0];
                let disclaimer_area = chunks[1];

                match self.screen {
                    Screen::Dashboard => render_dashboard(f, content_area, &self.dashboard_state),
                    Screen::Patients => {
                        render_patients(f, content_area, &mut self.patient_list_state);
                    }
                    Screen::Vitals => render_vitals(f, content_area, &self.vitals_state),
                    Screen::Analytics => render_analytics(f, content_area, &self.analytics_state),
                }

                render_disclaimer(f, disclaimer_area);
            })?;

            // Handle input (short poll to stay responsive)
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key.code, key.modifiers);
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Drain tick events from the background worker into the screen states.
    fn poll_worker(&mut self) {
        let Some(worker) = &self.worker else {
            return;
        };

        let mut ticked = false;
        while let Some(MonitorEvent::Tick { mutated, stats }) = worker.try_recv() {
            self.dashboard_state.stats = stats;
            self.dashboard_state.tick_count += 1;
            self.dashboard_state.last_mutated = mutated.len();
            ticked = true;
        }

        if ticked {
            self.dashboard_state.risk_distribution = self.service.risk_distribution();
            if self.screen == Screen::Patients {
                self.patient_list_state.set_cohort(self.service.snapshot());
            }
        }
    }

    fn refresh_dashboard(&mut self) {
        self.dashboard_state.stats = self.service.stats();
        self.dashboard_state.risk_distribution = self.service.risk_distribution();
        self.dashboard_state.live = self.worker.is_some();
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        // Global quit handling
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Dashboard => self.handle_dashboard_key(key),
            Screen::Patients => self.handle_patients_key(key),
            Screen::Vitals => self.handle_vitals_key(key),
            Screen::Analytics => self.handle_analytics_key(key),
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('p') | KeyCode::Char('P') => {
                self.patient_list_state.set_cohort(self.service.snapshot());
                self.screen = Screen::Patients;
            }
            KeyCode::Char('v') | KeyCode::Char('V') => {
                self.load_vitals();
                self.screen = Screen::Vitals;
            }
            KeyCode::Char('a') | KeyCode::Char('A') => {
                self.load_analytics();
                self.screen = Screen::Analytics;
            }
            KeyCode::Char('m') | KeyCode::Char('M') => {
                let mutated = self.service.tick();
                self.dashboard_state.tick_count += 1;
                self.dashboard_state.last_mutated = mutated.len();
                self.refresh_dashboard();
            }
            KeyCode::Char('w') | KeyCode::Char('W') => {
                self.toggle_worker();
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            _ => {}
        }
    }

    fn handle_patients_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Down | KeyCode::Char('j') => self.patient_list_state.select_next(),
            KeyCode::Up | KeyCode::Char('k') => self.patient_list_state.select_prev(),
            KeyCode::Enter => {
                self.load_vitals();
                self.screen = Screen::Vitals;
            }
            KeyCode::Esc => {
                self.refresh_dashboard();
                self.screen = Screen::Dashboard;
            }
            _ => {}
        }
    }

    fn handle_vitals_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('r') | KeyCode::Char('R') => self.load_vitals(),
            KeyCode::Esc => {
                self.refresh_dashboard();
                self.screen = Screen::Dashboard;
            }
            _ => {}
        }
    }

    fn handle_analytics_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('r') | KeyCode::Char('R') => self.load_analytics(),
            KeyCode::Char('s') | KeyCode::Char('S') => self.run_segmentation(),
            KeyCode::Esc => {
                self.refresh_dashboard();
                self.screen = Screen::Dashboard;
            }
            _ => {}
        }
    }

    /// Start or stop the background mutation worker.
    fn toggle_worker(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.stop();
            tracing::info!("live updates stopped");
        } else {
            self.worker = Some(MonitorWorker::spawn(
                self.service.clone(),
                self.tick_interval,
            ));
            tracing::info!("live updates started");
        }
        self.dashboard_state.live = self.worker.is_some();
    }

    /// Load the vitals trace for the currently selected patient.
    fn load_vitals(&mut self) {
        let patient_id = self
            .patient_list_state
            .selected_patient()
            .map(|p| p.patient_id.clone());

        let Some(patient_id) = patient_id else {
            self.vitals_state = VitalsState::default();
            return;
        };

        match self.service.vitals(&patient_id) {
            Ok(trace) => {
                self.vitals_state = VitalsState {
                    patient_id: Some(patient_id),
                    trace: Some(trace),
                    error: None,
                };
            }
            Err(e) => {
                tracing::error!(patient_id = %patient_id, error = %e, "failed to load vitals");
                self.vitals_state = VitalsState {
                    patient_id: Some(patient_id),
                    trace: None,
                    error: Some(e.to_string()),
                };
            }
        }
    }

    fn load_analytics(&mut self) {
        self.analytics_state.treatment_analysis = Some(self.service.treatment_analysis());
        self.analytics_state.error = None;
    }

    fn run_segmentation(&mut self) {
        match self.service.apply_segmentation(SEGMENT_COUNT, self.seed) {
            Ok(profiles) => {
                self.analytics_state.clusters = Some(profiles);
                self.analytics_state.error = None;
            }
            Err(e) => {
                tracing::error!(error = %e, "segmentation failed");
                self.analytics_state.error = Some(e.to_string());
            }
        }
    }
}
