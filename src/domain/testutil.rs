//! Shared fixtures for unit tests across the domain and application layers.

use chrono::NaiveDate;

use super::patient::{
    Gender, Medication, PatientAttributes, Symptom, Treatment, TreatmentResponse,
};

/// A mid-risk female patient with unremarkable vitals.
pub(crate) fn sample_attributes() -> PatientAttributes {
    PatientAttributes {
        age: 55,
        gender: Gender::Female,
        systolic_bp: 128,
        diastolic_bp: 82,
        heart_rate: 74,
        cholesterol: 195,
        bmi: 24.3,
        exercise_hours: 4,
        smoking: false,
        diabetes: false,
        visit_date: NaiveDate::from_ymd_opt(2025, 3, 14).expect("valid date"),
        symptoms: vec![Symptom::Dizziness, Symptom::Fatigue],
        treatment: Treatment::StandardMedication,
        medications: vec![Medication::Aspirin, Medication::Statin],
        treatment_response: TreatmentResponse::PartialImprovement,
        follow_up_visits: 2,
        bp_history: vec![120, 131, 126, 129, 133, 128],
        hr_history: vec![70, 76, 73, 72, 78, 74],
    }
}

/// The worst-case scenario patient: every scoring bucket maxed out.
pub(crate) fn high_risk_attributes() -> PatientAttributes {
    PatientAttributes {
        age: 70,
        gender: Gender::Male,
        systolic_bp: 185,
        diastolic_bp: 112,
        heart_rate: 45,
        cholesterol: 290,
        bmi: 32.0,
        exercise_hours: 1,
        smoking: true,
        diabetes: true,
        visit_date: NaiveDate::from_ymd_opt(2025, 1, 2).expect("valid date"),
        symptoms: vec![Symptom::ChestPain, Symptom::Dizziness, Symptom::Fatigue],
        treatment: Treatment::InterventionalSurgery,
        medications: vec![Medication::Statin, Medication::BetaBlocker],
        treatment_response: TreatmentResponse::NoImprovement,
        follow_up_visits: 5,
        bp_history: vec![180, 178, 182, 185, 181, 185],
        hr_history: vec![48, 50, 46, 44, 47, 45],
    }
}
