//! TUI module: Terminal User Interface using Ratatui.
//!
//! Provides a medical-themed interface for:
//! - Dashboard with live cohort statistics
//! - Patient browsing with per-record detail
//! - Real-time vitals monitoring for a selected patient
//! - Treatment and segmentation analytics

mod app;
mod styles;
mod ui;

pub use app::App;
pub use styles::MedicalTheme;
