//! The live mutation loop: perturb a random subset of vitals each tick and
//! keep risk labels consistent with the new values.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::domain::{Cohort, ScoringPolicy};

/// Global bounds for mutated vitals.
const SYSTOLIC_RANGE: (i32, i32) = (90, 180);
const HEART_RATE_RANGE: (i32, i32) = (60, 100);

/// How a tick rewrites the selected patients' vitals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationMode {
    /// Redraw from the global ranges, the request-triggered API behavior.
    Resample,
    /// Bounded jitter around the previous value (±20 mmHg, ±10 bpm), the
    /// streaming-monitor behavior. Clamped to the global ranges.
    Jitter,
}

/// Mutates a uniformly random subset of 5–10 patients per tick, overwriting
/// only `systolic_bp` and `heart_rate`, then reclassifying with the light
/// policy. The vitals and the risk label of a selected patient are written
/// under the same mutable borrow, so a reader holding the cohort lock never
/// observes one without the other.
pub struct MutationEngine {
    rng: ChaCha8Rng,
    mode: MutationMode,
}

impl MutationEngine {
    /// Create an engine with a fixed seed.
    #[must_use]
    pub fn new(seed: u64, mode: MutationMode) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            mode,
        }
    }

    /// Run one mutation tick. Returns the ids of the mutated patients.
    ///
    /// A tick on an empty cohort is a no-op.
    pub fn tick(&mut self, cohort: &mut Cohort) -> Vec<String> {
        if cohort.is_empty() {
            return Vec::new();
        }

        let subset_size = self.rng.gen_range(5..=10).min(cohort.len());
        let indices = rand::seq::index::sample(&mut self.rng, cohort.len(), subset_size);

        let mut mutated = Vec::with_capacity(subset_size);
        for idx in indices {
            let Some(patient) = cohort.get_mut_by_index(idx) else {
                continue;
            };

            let (systolic_bp, heart_rate) = match self.mode {
                MutationMode::Resample => (
                    self.rng.gen_range(SYSTOLIC_RANGE.0..=SYSTOLIC_RANGE.1),
                    self.rng.gen_range(HEART_RATE_RANGE.0..=HEART_RATE_RANGE.1),
                ),
                MutationMode::Jitter => (
                    self.rng
                        .gen_range(patient.attributes.systolic_bp - 20
                            ..=patient.attributes.systolic_bp + 20)
                        .clamp(SYSTOLIC_RANGE.0, SYSTOLIC_RANGE.1),
                    self.rng
                        .gen_range(patient.attributes.heart_rate - 10
                            ..=patient.attributes.heart_rate + 10)
                        .clamp(HEART_RATE_RANGE.0, HEART_RATE_RANGE.1),
                ),
            };

            // Vitals and risk label update as one unit per patient.
            patient.attributes.systolic_bp = systolic_bp;
            patient.attributes.heart_rate = heart_rate;
            let (_, level) = ScoringPolicy::Light.classify(&patient.attributes);
            patient.risk_level = level;

            mutated.push(patient.patient_id.clone());
        }

        tracing::debug!(count = mutated.len(), "mutation tick applied");
        mutated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::CohortGenerator;
    use crate::domain::AttributeSampler;
    use chrono::NaiveDate;

    fn test_cohort(n: usize) -> Cohort {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date");
        CohortGenerator::with_sampler(AttributeSampler::with_today(42, today))
            .generate(n)
            .expect("generate")
    }

    #[test]
    fn test_mutated_patients_get_light_policy_labels() {
        let mut cohort = test_cohort(100);
        let mut engine = MutationEngine::new(1, MutationMode::Resample);

        for _ in 0..20 {
            let mutated = engine.tick(&mut cohort);
            assert!(!mutated.is_empty());
            for id in &mutated {
                let patient = cohort.get(id).expect("mutated patient exists");
                let (_, expected) = ScoringPolicy::Light.classify(&patient.attributes);
                assert_eq!(patient.risk_level, expected);
            }
        }
    }

    #[test]
    fn test_subset_size_is_bounded() {
        let mut cohort = test_cohort(100);
        let mut engine = MutationEngine::new(2, MutationMode::Resample);
        for _ in 0..50 {
            let mutated = engine.tick(&mut cohort);
            assert!((5..=10).contains(&mutated.len()));
        }
    }

    #[test]
    fn test_identity_set_is_invariant_under_ticks() {
        let mut cohort = test_cohort(50);
        let ids_before = cohort.patient_ids();

        let mut engine = MutationEngine::new(3, MutationMode::Jitter);
        for _ in 0..25 {
            engine.tick(&mut cohort);
        }

        assert_eq!(cohort.patient_ids(), ids_before);
    }

    #[test]
    fn test_only_volatile_vitals_change() {
        let mut cohort = test_cohort(30);
        let before = cohort.clone();

        let mut engine = MutationEngine::new(4, MutationMode::Resample);
        engine.tick(&mut cohort);

        for (old, new) in before.iter().zip(cohort.iter()) {
            assert_eq!(old.patient_id, new.patient_id);
            assert_eq!(old.attributes.age, new.attributes.age);
            assert_eq!(old.attributes.diastolic_bp, new.attributes.diastolic_bp);
            assert_eq!(old.attributes.cholesterol, new.attributes.cholesterol);
            assert_eq!(old.attributes.symptoms, new.attributes.symptoms);
            assert_eq!(old.attributes.visit_date, new.attributes.visit_date);
        }
    }

    #[test]
    fn test_jitter_stays_within_global_bounds() {
        let mut cohort = test_cohort(40);
        let mut engine = MutationEngine::new(5, MutationMode::Jitter);

        for _ in 0..50 {
            for id in engine.tick(&mut cohort) {
                let p = cohort.get(&id).expect("exists");
                assert!((90..=180).contains(&p.attributes.systolic_bp));
                assert!((60..=100).contains(&p.attributes.heart_rate));
            }
        }
    }

    #[test]
    fn test_empty_cohort_tick_is_noop() {
        let mut cohort = Cohort::default();
        let mut engine = MutationEngine::new(6, MutationMode::Resample);
        assert!(engine.tick(&mut cohort).is_empty());
    }

    #[test]
    fn test_small_cohort_caps_subset() {
        let mut cohort = test_cohort(3);
        let mut engine = MutationEngine::new(7, MutationMode::Resample);
        let mutated = engine.tick(&mut cohort);
        assert_eq!(mutated.len(), 3);
    }
}
