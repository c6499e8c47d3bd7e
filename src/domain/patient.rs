//! Patient record types for the simulated cardiovascular cohort.
//!
//! Every record is a fixed-shape struct: all fields are always present and
//! typed, unlike the loosely keyed maps a dashboard payload would carry.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::risk::RiskLevel;

/// Number of historical measurements kept per vital sign.
pub const VITALS_HISTORY_LEN: usize = 6;

/// Patient gender (as recorded at intake).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Male => write!(f, "male"),
            Self::Female => write!(f, "female"),
        }
    }
}

/// Symptom labels the sampler draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symptom {
    #[serde(rename = "chest pain")]
    ChestPain,
    #[serde(rename = "shortness of breath")]
    ShortnessOfBreath,
    #[serde(rename = "palpitations")]
    Palpitations,
    #[serde(rename = "dizziness")]
    Dizziness,
    #[serde(rename = "fatigue")]
    Fatigue,
}

/// The full symptom label set (5 entries).
pub const SYMPTOMS: [Symptom; 5] = [
    Symptom::ChestPain,
    Symptom::ShortnessOfBreath,
    Symptom::Palpitations,
    Symptom::Dizziness,
    Symptom::Fatigue,
];

impl std::fmt::Display for Symptom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::ChestPain => "chest pain",
            Self::ShortnessOfBreath => "shortness of breath",
            Self::Palpitations => "palpitations",
            Self::Dizziness => "dizziness",
            Self::Fatigue => "fatigue",
        };
        write!(f, "{label}")
    }
}

/// Treatment plan categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Treatment {
    #[serde(rename = "standard medication")]
    StandardMedication,
    #[serde(rename = "interventional surgery")]
    InterventionalSurgery,
    #[serde(rename = "lifestyle intervention")]
    LifestyleIntervention,
}

/// The full treatment category set (3 entries).
pub const TREATMENTS: [Treatment; 3] = [
    Treatment::StandardMedication,
    Treatment::InterventionalSurgery,
    Treatment::LifestyleIntervention,
];

impl std::fmt::Display for Treatment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::StandardMedication => "standard medication",
            Self::InterventionalSurgery => "interventional surgery",
            Self::LifestyleIntervention => "lifestyle intervention",
        };
        write!(f, "{label}")
    }
}

/// Medication labels the sampler draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Medication {
    #[serde(rename = "aspirin")]
    Aspirin,
    #[serde(rename = "statin")]
    Statin,
    #[serde(rename = "beta blocker")]
    BetaBlocker,
    #[serde(rename = "ACE inhibitor")]
    AceInhibitor,
}

/// The full medication label set (4 entries).
pub const MEDICATIONS: [Medication; 4] = [
    Medication::Aspirin,
    Medication::Statin,
    Medication::BetaBlocker,
    Medication::AceInhibitor,
];

impl std::fmt::Display for Medication {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Aspirin => "aspirin",
            Self::Statin => "statin",
            Self::BetaBlocker => "beta blocker",
            Self::AceInhibitor => "ACE inhibitor",
        };
        write!(f, "{label}")
    }
}

/// Recorded response to the assigned treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TreatmentResponse {
    #[serde(rename = "significant improvement")]
    SignificantImprovement,
    #[serde(rename = "partial improvement")]
    PartialImprovement,
    #[serde(rename = "no improvement")]
    NoImprovement,
}

/// The full response outcome set (3 entries).
pub const TREATMENT_RESPONSES: [TreatmentResponse; 3] = [
    TreatmentResponse::SignificantImprovement,
    TreatmentResponse::PartialImprovement,
    TreatmentResponse::NoImprovement,
];

impl std::fmt::Display for TreatmentResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::SignificantImprovement => "significant improvement",
            Self::PartialImprovement => "partial improvement",
            Self::NoImprovement => "no improvement",
        };
        write!(f, "{label}")
    }
}

/// Everything the Risk Scorer reads: demographics, vitals, flags, and the
/// clinical narrative. `risk_level` deliberately lives outside this struct so
/// it can only be derived from it, never sampled or edited on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientAttributes {
    pub age: u32,
    pub gender: Gender,

    // Volatile vitals, overwritten by the mutation engine.
    pub systolic_bp: i32,
    pub diastolic_bp: i32,
    pub heart_rate: i32,
    pub cholesterol: i32,
    pub bmi: f64,
    pub exercise_hours: i32,

    // Risk-factor flags.
    pub smoking: bool,
    pub diabetes: bool,

    // Clinical narrative, immutable after creation.
    pub visit_date: NaiveDate,
    pub symptoms: Vec<Symptom>,
    pub treatment: Treatment,
    pub medications: Vec<Medication>,
    pub treatment_response: TreatmentResponse,
    pub follow_up_visits: u32,

    // Six months of simulated monitoring history.
    pub bp_history: Vec<i32>,
    pub hr_history: Vec<i32>,
}

impl PatientAttributes {
    /// Validate that all fields are within the documented plausible ranges.
    ///
    /// # Errors
    /// Returns validation errors as a vector of strings.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if !(18..=90).contains(&self.age) {
            errors.push(format!("Age {} out of range [18, 90]", self.age));
        }
        if !(90..=180).contains(&self.systolic_bp) {
            errors.push(format!(
                "Systolic BP {} out of range [90, 180]",
                self.systolic_bp
            ));
        }
        if !(60..=110).contains(&self.diastolic_bp) {
            errors.push(format!(
                "Diastolic BP {} out of range [60, 110]",
                self.diastolic_bp
            ));
        }
        if !(60..=100).contains(&self.heart_rate) {
            errors.push(format!(
                "Heart rate {} out of range [60, 100]",
                self.heart_rate
            ));
        }
        if !(150..=300).contains(&self.cholesterol) {
            errors.push(format!(
                "Cholesterol {} out of range [150, 300]",
                self.cholesterol
            ));
        }
        if !(18.5..=35.0).contains(&self.bmi) {
            errors.push(format!("BMI {} out of range [18.5, 35.0]", self.bmi));
        }
        if !(0..=14).contains(&self.exercise_hours) {
            errors.push(format!(
                "Exercise hours {} out of range [0, 14]",
                self.exercise_hours
            ));
        }
        if !(1..=3).contains(&self.symptoms.len()) {
            errors.push(format!("Symptom count {} out of [1, 3]", self.symptoms.len()));
        }
        if !(1..=3).contains(&self.medications.len()) {
            errors.push(format!(
                "Medication count {} out of [1, 3]",
                self.medications.len()
            ));
        }
        if has_duplicates(&self.symptoms) {
            errors.push("Duplicate symptom labels".to_string());
        }
        if has_duplicates(&self.medications) {
            errors.push("Duplicate medication labels".to_string());
        }
        if !(1..=5).contains(&self.follow_up_visits) {
            errors.push(format!(
                "Follow-up visits {} out of range [1, 5]",
                self.follow_up_visits
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Whether the patient reports the given symptom.
    #[must_use]
    pub fn has_symptom(&self, symptom: Symptom) -> bool {
        self.symptoms.contains(&symptom)
    }
}

fn has_duplicates<T: PartialEq>(items: &[T]) -> bool {
    items
        .iter()
        .enumerate()
        .any(|(i, a)| items[i + 1..].contains(a))
}

/// One simulated patient.
///
/// `risk_level` is always derived from `attributes` via a scoring policy and
/// is rewritten together with any vitals change; it is never set directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub patient_id: String,

    #[serde(flatten)]
    pub attributes: PatientAttributes,

    pub risk_level: RiskLevel,

    /// Cluster id assigned by the segmentation engine; absent until it runs.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub cluster: Option<usize>,
}

impl PatientRecord {
    /// Assemble a record, deriving the risk label from the attributes.
    #[must_use]
    pub fn new(
        patient_id: impl Into<String>,
        attributes: PatientAttributes,
        policy: super::ScoringPolicy,
    ) -> Self {
        let (_, risk_level) = policy.classify(&attributes);
        Self {
            patient_id: patient_id.into(),
            attributes,
            risk_level,
            cluster: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::testutil::sample_attributes;
    use crate::domain::ScoringPolicy;

    #[test]
    fn test_valid_attributes_pass_validation() {
        assert!(sample_attributes().validate().is_ok());
    }

    #[test]
    fn test_out_of_range_attributes_are_reported() {
        let mut attrs = sample_attributes();
        attrs.age = 10;
        attrs.systolic_bp = 250;
        attrs.symptoms = vec![
            Symptom::ChestPain,
            Symptom::ChestPain,
            Symptom::Fatigue,
            Symptom::Dizziness,
        ];

        let errors = attrs.validate().expect_err("should fail validation");
        assert!(errors.iter().any(|e| e.contains("Age")));
        assert!(errors.iter().any(|e| e.contains("Systolic")));
        assert!(errors.iter().any(|e| e.contains("Symptom count")));
        assert!(errors.iter().any(|e| e.contains("Duplicate symptom")));
    }

    #[test]
    fn test_record_derives_risk_from_attributes() {
        let record = PatientRecord::new("P0001", sample_attributes(), ScoringPolicy::Full);
        let (_, expected) = ScoringPolicy::Full.classify(&record.attributes);
        assert_eq!(record.risk_level, expected);
        assert!(record.cluster.is_none());
    }

    #[test]
    fn test_serde_uses_flat_field_names() {
        let record = PatientRecord::new("P0001", sample_attributes(), ScoringPolicy::Full);
        let json = serde_json::to_value(&record).expect("serialize");

        assert_eq!(json["patient_id"], "P0001");
        assert_eq!(json["age"], 55);
        assert_eq!(json["gender"], "female");
        assert_eq!(json["visit_date"], "2025-03-14");
        assert_eq!(json["symptoms"][0], "dizziness");
        assert_eq!(json["treatment"], "standard medication");
        assert!(json.get("cluster").is_none());

        let back: PatientRecord = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, record);
    }
}
