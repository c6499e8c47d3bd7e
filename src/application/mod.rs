//! Application layer: Use cases and services.
//!
//! This module orchestrates the domain types into the core operations:
//! cohort generation, live mutation ticks, segmentation, aggregate
//! analytics, and the background monitoring worker.

mod analytics;
mod generator;
mod monitor;
mod mutation;
mod segmentation;

pub use analytics::{
    cohort_stats, high_risk_ratio, risk_distribution, treatment_analysis, vitals_trace,
    CohortStats, ResponseCount, TreatmentAnalysis, TreatmentOutcomes, VitalsTrace,
};
pub use generator::CohortGenerator;
pub use monitor::{MonitorEvent, MonitorHandle, MonitorService, MonitorWorker, ReadMode};
pub use mutation::{MutationEngine, MutationMode};
pub use segmentation::{ClusterProfile, SegmentationEngine};
