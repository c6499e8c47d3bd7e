//! # CardioViz
//!
//! Synthetic cardiovascular cohort simulation and risk classification.
//!
//! This crate provides:
//! - A seedable generator for internally-consistent synthetic patient records
//! - Rule-based multi-factor risk scoring (two named policies)
//! - A live mutation loop that perturbs vitals and keeps risk labels consistent
//! - Feature-standardized k-means segmentation of the cohort
//! - Aggregate analytics consumed by the terminal dashboard
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core types and pure rules (patient records, scoring, sampling)
//! - `application`: Use cases orchestrating the domain (generation, mutation,
//!   segmentation, analytics, live monitoring)
//! - `ports`: Trait definitions for external operations
//! - `adapters`: Concrete implementations (JSON snapshot storage)
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;
pub mod tui;

pub use domain::{Cohort, PatientRecord, RiskLevel, ScoringPolicy};

/// Result type for CardioViz operations
pub type Result<T> = std::result::Result<T, CardiovizError>;

/// Main error type for CardioViz
#[derive(Debug, thiserror::Error)]
pub enum CardiovizError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Patient not found: {0}")]
    NotFound(String),

    #[error("Operation requires a non-empty cohort")]
    EmptyCohort,

    #[error("Storage operation failed: {0}")]
    Storage(#[from] adapters::StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
