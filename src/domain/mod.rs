//! Domain layer: Core business types and logic.
//!
//! This module contains pure types with no IO: the patient record shape,
//! the attribute sampler, the scoring policies, and the cohort collection.

mod cohort;
mod patient;
mod risk;
mod sampler;

#[cfg(test)]
pub(crate) mod testutil;

pub use cohort::Cohort;
pub use patient::{
    Gender, Medication, PatientAttributes, PatientRecord, Symptom, Treatment, TreatmentResponse,
    MEDICATIONS, SYMPTOMS, TREATMENTS, TREATMENT_RESPONSES, VITALS_HISTORY_LEN,
};
pub use risk::{RiskLevel, ScoringPolicy};
pub use sampler::AttributeSampler;
