//! Cohort-level aggregation: counts, percentages, cross-tabulations, and
//! short synthetic vitals traces for the dashboard.
//!
//! Every function here is a pure read over the current cohort snapshot and
//! tolerates an empty cohort with a defined zeroed result; only explicit
//! ratio requests signal `EmptyCohort` instead of fabricating a denominator.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::domain::{
    Cohort, RiskLevel, Treatment, TreatmentResponse, TREATMENTS, TREATMENT_RESPONSES,
};
use crate::{CardiovizError, Result};

/// Headline statistics for the dashboard stat cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CohortStats {
    pub total_patients: usize,
    pub high_risk_patients: usize,
    /// Percentage rounded to one decimal; 0.0 for an empty cohort.
    pub high_risk_percentage: f64,
}

/// Counts, percentage, and a defined zero result for an empty cohort.
#[must_use]
pub fn cohort_stats(cohort: &Cohort) -> CohortStats {
    let total_patients = cohort.len();
    let high_risk_patients = cohort
        .iter()
        .filter(|p| p.risk_level == RiskLevel::High)
        .count();

    let high_risk_percentage = if total_patients == 0 {
        0.0
    } else {
        round1(100.0 * high_risk_patients as f64 / total_patients as f64)
    };

    CohortStats {
        total_patients,
        high_risk_patients,
        high_risk_percentage,
    }
}

/// High-risk fraction in [0, 1].
///
/// # Errors
/// `EmptyCohort` when there is no valid denominator.
pub fn high_risk_ratio(cohort: &Cohort) -> Result<f64> {
    if cohort.is_empty() {
        return Err(CardiovizError::EmptyCohort);
    }
    let stats = cohort_stats(cohort);
    Ok(stats.high_risk_patients as f64 / stats.total_patients as f64)
}

/// Patient count per risk level, in ascending severity order.
#[must_use]
pub fn risk_distribution(cohort: &Cohort) -> [(RiskLevel, usize); 3] {
    let mut counts = [0usize; 3];
    for patient in cohort {
        let idx = RiskLevel::ALL
            .iter()
            .position(|l| *l == patient.risk_level)
            .expect("level is one of ALL");
        counts[idx] += 1;
    }

    [
        (RiskLevel::Low, counts[0]),
        (RiskLevel::Medium, counts[1]),
        (RiskLevel::High, counts[2]),
    ]
}

/// One response outcome tally inside a treatment group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseCount {
    pub response: TreatmentResponse,
    pub count: usize,
}

/// Response tallies for a single treatment category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreatmentOutcomes {
    pub treatment: Treatment,
    pub responses: Vec<ResponseCount>,
}

impl TreatmentOutcomes {
    /// Total patients under this treatment.
    #[must_use]
    pub fn total(&self) -> usize {
        self.responses.iter().map(|r| r.count).sum()
    }
}

/// The full 3x3 treatment-by-response cross-tabulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreatmentAnalysis {
    pub treatments: Vec<TreatmentOutcomes>,
}

/// Tally the three response outcomes for each of the three treatment
/// categories. Categories with no patients tally to zero.
#[must_use]
pub fn treatment_analysis(cohort: &Cohort) -> TreatmentAnalysis {
    let treatments = TREATMENTS
        .iter()
        .map(|&treatment| {
            let responses = TREATMENT_RESPONSES
                .iter()
                .map(|&response| ResponseCount {
                    response,
                    count: cohort
                        .iter()
                        .filter(|p| {
                            p.attributes.treatment == treatment
                                && p.attributes.treatment_response == response
                        })
                        .count(),
                })
                .collect();
            TreatmentOutcomes {
                treatment,
                responses,
            }
        })
        .collect();

    TreatmentAnalysis { treatments }
}

/// A short synthetic vitals window for one patient's monitoring view.
/// Generated on demand by bounded jitter around the current vitals; never
/// persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalsTrace {
    /// `HH:MM` labels, oldest first, spaced 10 minutes apart.
    pub times: Vec<String>,
    pub systolic_bp: Vec<i32>,
    pub heart_rate: Vec<i32>,
}

/// Number of points in a vitals trace.
pub const VITALS_TRACE_LEN: usize = 6;

/// Generate a trace for the named patient.
///
/// The patient's vitals must sit inside the global ranges; generation,
/// mutation, and snapshot load all enforce this.
///
/// # Errors
/// `NotFound` for an unknown patient id.
pub fn vitals_trace(cohort: &Cohort, patient_id: &str, rng: &mut ChaCha8Rng) -> Result<VitalsTrace> {
    let patient = cohort
        .get(patient_id)
        .ok_or_else(|| CardiovizError::NotFound(patient_id.to_string()))?;

    let now = chrono::Local::now();
    let times = (0..VITALS_TRACE_LEN)
        .rev()
        .map(|i| (now - chrono::Duration::minutes(i as i64 * 10)).format("%H:%M").to_string())
        .collect();

    let sbp = patient.attributes.systolic_bp;
    let hr = patient.attributes.heart_rate;
    let systolic_bp = (0..VITALS_TRACE_LEN)
        .map(|_| rng.gen_range((sbp - 20).max(90)..=(sbp + 20).min(180)))
        .collect();
    let heart_rate = (0..VITALS_TRACE_LEN)
        .map(|_| rng.gen_range((hr - 10).max(60)..=(hr + 10).min(100)))
        .collect();

    Ok(VitalsTrace {
        times,
        systolic_bp,
        heart_rate,
    })
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::testutil::{high_risk_attributes, sample_attributes};
    use crate::domain::{PatientRecord, ScoringPolicy};

    fn mixed_cohort() -> Cohort {
        let mut patients = Vec::new();
        for i in 1..=6 {
            patients.push(PatientRecord::new(
                format!("P{i:04}"),
                sample_attributes(),
                ScoringPolicy::Full,
            ));
        }
        for i in 7..=8 {
            patients.push(PatientRecord::new(
                format!("P{i:04}"),
                high_risk_attributes(),
                ScoringPolicy::Full,
            ));
        }
        Cohort::new(patients)
    }

    #[test]
    fn test_stats_percentage_is_rounded_to_one_decimal() {
        let cohort = mixed_cohort();
        let stats = cohort_stats(&cohort);

        assert_eq!(stats.total_patients, 8);
        assert_eq!(stats.high_risk_patients, 2);
        // 2 / 8 = 25.0 exactly
        assert!((stats.high_risk_percentage - 25.0).abs() < f64::EPSILON);

        // A non-terminating fraction rounds, not truncates: 2/3 -> 66.7
        let small = Cohort::new(
            (1..=3)
                .map(|i| {
                    let attrs = if i < 3 {
                        high_risk_attributes()
                    } else {
                        sample_attributes()
                    };
                    PatientRecord::new(format!("P{i:04}"), attrs, ScoringPolicy::Full)
                })
                .collect(),
        );
        assert!((cohort_stats(&small).high_risk_percentage - 66.7).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_cohort_yields_zeroed_stats() {
        let stats = cohort_stats(&Cohort::default());
        assert_eq!(stats.total_patients, 0);
        assert_eq!(stats.high_risk_patients, 0);
        assert!((stats.high_risk_percentage - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ratio_signals_empty_cohort() {
        let err = high_risk_ratio(&Cohort::default()).expect_err("no denominator");
        assert!(matches!(err, CardiovizError::EmptyCohort));

        let ratio = high_risk_ratio(&mixed_cohort()).expect("ratio");
        assert!((ratio - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_risk_distribution_counts_every_patient() {
        let cohort = mixed_cohort();
        let dist = risk_distribution(&cohort);
        let total: usize = dist.iter().map(|(_, c)| c).sum();
        assert_eq!(total, cohort.len());
        assert_eq!(dist[2].1, 2);
    }

    #[test]
    fn test_treatment_analysis_is_a_full_cross_tab() {
        let cohort = mixed_cohort();
        let analysis = treatment_analysis(&cohort);

        assert_eq!(analysis.treatments.len(), 3);
        for outcomes in &analysis.treatments {
            assert_eq!(outcomes.responses.len(), 3);
        }

        let grand_total: usize = analysis.treatments.iter().map(TreatmentOutcomes::total).sum();
        assert_eq!(grand_total, cohort.len());
    }

    #[test]
    fn test_treatment_analysis_tolerates_empty_cohort() {
        let analysis = treatment_analysis(&Cohort::default());
        assert_eq!(analysis.treatments.len(), 3);
        assert!(analysis.treatments.iter().all(|t| t.total() == 0));
    }

    #[test]
    fn test_vitals_trace_stays_near_current_vitals() {
        let cohort = mixed_cohort();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let trace = vitals_trace(&cohort, "P0001", &mut rng).expect("trace");

        assert_eq!(trace.times.len(), VITALS_TRACE_LEN);
        let sbp = cohort.get("P0001").expect("exists").attributes.systolic_bp;
        for &value in &trace.systolic_bp {
            assert!((sbp - 20..=sbp + 20).contains(&value));
            assert!((90..=180).contains(&value));
        }
        for &value in &trace.heart_rate {
            assert!((60..=100).contains(&value));
        }
    }

    #[test]
    fn test_vitals_trace_unknown_patient() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let err = vitals_trace(&mixed_cohort(), "P9999", &mut rng).expect_err("unknown");
        assert!(matches!(err, CardiovizError::NotFound(_)));
    }
}
