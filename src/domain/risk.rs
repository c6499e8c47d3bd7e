//! Rule-based cardiovascular risk scoring.
//!
//! Two scoring policies exist side by side, mirroring the two rule sets the
//! system runs in production: the fine-grained `Full` policy applied once at
//! cohort generation, and the coarser `Light` policy applied on every live
//! mutation recompute. They are not expected to agree on every patient; the
//! divergence is preserved on purpose rather than merged into one table.
//!
//! Both policies are pure functions of [`PatientAttributes`]: no IO, no
//! randomness, no shared state. The weight tables are compile-time constants.

use serde::{Deserialize, Serialize};

use super::patient::{PatientAttributes, Symptom};

/// Risk level classification for the cohort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Low risk, routine follow-up
    Low,
    /// Medium risk, monitoring recommended
    Medium,
    /// High risk, intervention recommended
    High,
}

impl RiskLevel {
    /// Get a human-readable description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Low => "Low risk - No significant indicators",
            Self::Medium => "Medium risk - Follow-up recommended",
            Self::High => "High risk - Immediate consultation advised",
        }
    }

    /// Get the associated color for TUI display (RGB).
    #[must_use]
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            Self::Low => (16, 185, 129),    // Emerald (#10B981)
            Self::Medium => (251, 191, 36), // Amber (#FBBF24)
            Self::High => (244, 63, 94),    // Rose (#F43F5E)
        }
    }

    /// All levels, in ascending severity order.
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Score-to-level cut points: scores at or below `low` map to Low, at or
/// below `medium` to Medium, anything above to High.
#[derive(Debug, Clone, Copy)]
struct CutPoints {
    low: u32,
    medium: u32,
}

const FULL_CUT_POINTS: CutPoints = CutPoints { low: 5, medium: 12 };
const LIGHT_CUT_POINTS: CutPoints = CutPoints { low: 4, medium: 8 };

/// A named, versioned set of threshold-based point contributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringPolicy {
    /// Fine-grained buckets, used at cohort-generation time.
    Full,
    /// Coarse buckets, used on every mutation recompute.
    Light,
}

impl ScoringPolicy {
    /// Compute the additive risk score for a patient.
    #[must_use]
    pub fn score(&self, p: &PatientAttributes) -> u32 {
        match self {
            Self::Full => full_score(p),
            Self::Light => light_score(p),
        }
    }

    /// Compute the score and map it to a discrete risk level.
    #[must_use]
    pub fn classify(&self, p: &PatientAttributes) -> (u32, RiskLevel) {
        let score = self.score(p);
        let cuts = match self {
            Self::Full => FULL_CUT_POINTS,
            Self::Light => LIGHT_CUT_POINTS,
        };

        let level = if score <= cuts.low {
            RiskLevel::Low
        } else if score <= cuts.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        };

        (score, level)
    }
}

impl std::fmt::Display for ScoringPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::Light => write!(f, "light"),
        }
    }
}

fn full_score(p: &PatientAttributes) -> u32 {
    let mut score = 0;

    // Age buckets
    if p.age > 75 {
        score += 4;
    } else if p.age > 65 {
        score += 3;
    } else if p.age > 55 {
        score += 2;
    } else if p.age > 45 {
        score += 1;
    }

    // Blood pressure
    if p.systolic_bp >= 180 {
        score += 4;
    } else if p.systolic_bp >= 160 {
        score += 3;
    } else if p.systolic_bp >= 140 {
        score += 2;
    }
    if p.diastolic_bp >= 110 {
        score += 3;
    } else if p.diastolic_bp >= 90 {
        score += 2;
    }

    // Heart rate, both tails
    if p.heart_rate > 100 || p.heart_rate < 50 {
        score += 2;
    } else if p.heart_rate > 90 || p.heart_rate < 60 {
        score += 1;
    }

    // Cholesterol
    if p.cholesterol >= 280 {
        score += 3;
    } else if p.cholesterol >= 240 {
        score += 2;
    } else if p.cholesterol >= 200 {
        score += 1;
    }

    // Lifestyle and comorbidity flags
    if p.smoking {
        score += 3;
    }
    if p.diabetes {
        score += 3;
    }
    if p.bmi >= 30.0 {
        score += 2;
    } else if p.bmi >= 25.0 {
        score += 1;
    }
    if p.exercise_hours < 2 {
        score += 2;
    } else if p.exercise_hours < 5 {
        score += 1;
    }

    // Symptoms
    if p.has_symptom(Symptom::ChestPain) {
        score += 3;
    }
    if p.symptoms.len() >= 3 {
        score += 2;
    } else if p.symptoms.len() >= 2 {
        score += 1;
    }

    score
}

fn light_score(p: &PatientAttributes) -> u32 {
    let mut score = 0;

    if p.age > 60 {
        score += 2;
    }
    if p.systolic_bp > 140 {
        score += 2;
    }
    if p.diastolic_bp > 90 {
        score += 1;
    }
    if p.heart_rate > 90 {
        score += 1;
    }
    if p.cholesterol > 200 {
        score += 2;
    }
    if p.smoking {
        score += 2;
    }
    if p.diabetes {
        score += 2;
    }
    if p.bmi > 30.0 {
        score += 1;
    }
    if p.exercise_hours < 3 {
        score += 1;
    }
    if p.symptoms.len() > 2 {
        score += 2;
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::testutil::{high_risk_attributes, sample_attributes};

    #[test]
    fn test_scoring_is_deterministic() {
        let attrs = sample_attributes();
        for policy in [ScoringPolicy::Full, ScoringPolicy::Light] {
            assert_eq!(policy.classify(&attrs), policy.classify(&attrs));
        }
    }

    #[test]
    fn test_full_policy_worst_case_scenario() {
        // age 70 (+3), systolic 185 (+4), diastolic 112 (+3), heart rate 45 (+2),
        // cholesterol 290 (+3), smoking (+3), diabetes (+3), bmi 32 (+2),
        // exercise 1h (+2), chest pain (+3), three symptoms (+2) = 30
        let attrs = high_risk_attributes();
        let (score, level) = ScoringPolicy::Full.classify(&attrs);
        assert!(score >= 20, "expected score >= 20, got {score}");
        assert_eq!(level, RiskLevel::High);
    }

    #[test]
    fn test_full_policy_cut_points() {
        let mut attrs = sample_attributes();
        attrs.age = 30;
        attrs.systolic_bp = 110;
        attrs.diastolic_bp = 70;
        attrs.heart_rate = 72;
        attrs.cholesterol = 180;
        attrs.bmi = 22.0;
        attrs.exercise_hours = 6;
        attrs.symptoms = vec![Symptom::Fatigue];

        let (score, level) = ScoringPolicy::Full.classify(&attrs);
        assert_eq!(score, 0);
        assert_eq!(level, RiskLevel::Low);
    }

    #[test]
    fn test_light_policy_boundaries() {
        let mut attrs = sample_attributes();
        attrs.age = 61; // +2
        attrs.systolic_bp = 141; // +2
        attrs.exercise_hours = 5;
        attrs.cholesterol = 195;

        let (score, level) = ScoringPolicy::Light.classify(&attrs);
        assert_eq!(score, 4);
        assert_eq!(level, RiskLevel::Low);

        attrs.diastolic_bp = 91; // +1 pushes over the low cut
        let (score, level) = ScoringPolicy::Light.classify(&attrs);
        assert_eq!(score, 5);
        assert_eq!(level, RiskLevel::Medium);
    }

    #[test]
    fn test_policies_may_disagree() {
        // A patient right around the thresholds where the two rule sets
        // diverge; the labels need not match and that is by contract.
        let mut attrs = sample_attributes();
        attrs.age = 67;
        attrs.cholesterol = 245;
        attrs.symptoms = vec![Symptom::ChestPain, Symptom::Fatigue];

        let (_, full) = ScoringPolicy::Full.classify(&attrs);
        let (_, light) = ScoringPolicy::Light.classify(&attrs);
        // Full: +3 age, +2 chol, +1 exercise(4h), +3 chest pain, +1 two symptoms = 10 -> Medium
        // Light: +2 age, +2 chol = 4 -> Low
        assert_eq!(full, RiskLevel::Medium);
        assert_eq!(light, RiskLevel::Low);
    }
}
