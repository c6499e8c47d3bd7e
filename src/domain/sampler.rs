//! Weighted attribute sampling for synthetic patients.
//!
//! Draws are conditioned so elevated values cluster with age and comorbidity
//! rather than being independent: elderly or comorbid patients fall into
//! wider, higher vitals ranges. The correlations are loose heuristics for a
//! plausible-looking cohort, not a physiological model.

use chrono::{Duration, NaiveDate};
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use super::patient::{
    Gender, PatientAttributes, VITALS_HISTORY_LEN, MEDICATIONS, SYMPTOMS, TREATMENTS,
    TREATMENT_RESPONSES,
};

/// Age brackets with their categorical weights, skewed toward the
/// middle-aged and elderly.
const AGE_BRACKETS: [(u32, u32); 5] = [(18, 30), (31, 45), (46, 60), (61, 75), (76, 90)];
const AGE_WEIGHTS: [f64; 5] = [0.10, 0.15, 0.25, 0.30, 0.20];

/// Draws one internally-consistent attribute tuple per call.
///
/// All randomness flows through a single seedable ChaCha stream, so a fixed
/// seed reproduces the same cohort. Each patient's draws are independent of
/// other patients' outcomes.
pub struct AttributeSampler {
    rng: ChaCha8Rng,
    age_bracket_dist: WeightedIndex<f64>,
    /// Visit dates are drawn uniformly from the 365 days before this date.
    today: NaiveDate,
}

impl AttributeSampler {
    /// Create a sampler seeded for reproducible cohorts.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::with_today(seed, chrono::Local::now().date_naive())
    }

    /// Create a sampler with an explicit "today" for the visit-date window.
    #[must_use]
    pub fn with_today(seed: u64, today: NaiveDate) -> Self {
        let age_bracket_dist =
            WeightedIndex::new(AGE_WEIGHTS).expect("age bracket weights are valid");
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            age_bracket_dist,
            today,
        }
    }

    /// Draw one patient's attributes.
    #[must_use]
    pub fn sample(&mut self) -> PatientAttributes {
        let rng = &mut self.rng;

        let (age_min, age_max) = AGE_BRACKETS[self.age_bracket_dist.sample(rng)];
        let age = rng.gen_range(age_min..=age_max);

        let is_elderly = age > 60;
        let comorbidity_p = if is_elderly { 0.30 } else { 0.15 };
        let has_comorbidity = rng.gen_bool(comorbidity_p);
        let elevated = is_elderly || has_comorbidity;

        let (systolic_bp, diastolic_bp) = if elevated {
            (rng.gen_range(130..=180), rng.gen_range(80..=110))
        } else {
            (rng.gen_range(90..=140), rng.gen_range(60..=90))
        };

        let heart_rate = if is_elderly {
            rng.gen_range(60..=90)
        } else {
            rng.gen_range(60..=100)
        };

        let cholesterol = if elevated {
            rng.gen_range(180..=300)
        } else {
            rng.gen_range(150..=240)
        };

        // Diabetes is gated: only a fraction of patients get a coin flip at
        // all, everyone else defaults to no.
        let diabetes_gate = if is_elderly { 0.25 } else { 0.10 };
        let diabetes = rng.gen_bool(diabetes_gate) && rng.gen_bool(0.5);

        let bmi = (rng.gen_range(18.5_f64..=35.0) * 10.0).round() / 10.0;

        let symptom_count = rng.gen_range(1..=3);
        let symptoms = SYMPTOMS
            .choose_multiple(rng, symptom_count)
            .copied()
            .collect();

        let medication_count = rng.gen_range(1..=3);
        let medications = MEDICATIONS
            .choose_multiple(rng, medication_count)
            .copied()
            .collect();

        let visit_date = self.today - Duration::days(rng.gen_range(1..=365));

        let bp_history = (0..VITALS_HISTORY_LEN)
            .map(|_| rng.gen_range(systolic_bp - 20..=systolic_bp + 20))
            .collect();
        let hr_history = (0..VITALS_HISTORY_LEN)
            .map(|_| rng.gen_range(heart_rate - 10..=heart_rate + 10))
            .collect();

        PatientAttributes {
            age,
            gender: if rng.gen_bool(0.5) {
                Gender::Male
            } else {
                Gender::Female
            },
            systolic_bp,
            diastolic_bp,
            heart_rate,
            cholesterol,
            bmi,
            exercise_hours: rng.gen_range(0..=14),
            smoking: rng.gen_bool(0.5),
            diabetes,
            visit_date,
            symptoms,
            treatment: *TREATMENTS.choose(rng).expect("non-empty treatment set"),
            medications,
            treatment_response: *TREATMENT_RESPONSES
                .choose(rng)
                .expect("non-empty response set"),
            follow_up_visits: rng.gen_range(1..=5),
            bp_history,
            hr_history,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sampled_attributes_respect_documented_ranges() {
        let mut sampler = AttributeSampler::new(7);
        for _ in 0..500 {
            let attrs = sampler.sample();
            let is_elderly = attrs.age > 60;

            assert!((18..=90).contains(&attrs.age));
            assert!((90..=180).contains(&attrs.systolic_bp));
            assert!((60..=110).contains(&attrs.diastolic_bp));
            if is_elderly {
                assert!((60..=90).contains(&attrs.heart_rate));
            } else {
                assert!((60..=100).contains(&attrs.heart_rate));
            }
            assert!((150..=300).contains(&attrs.cholesterol));
            assert!((18.5..=35.0).contains(&attrs.bmi));
            assert!((0..=14).contains(&attrs.exercise_hours));
            assert!((1..=5).contains(&attrs.follow_up_visits));
            assert_eq!(attrs.bp_history.len(), VITALS_HISTORY_LEN);
            assert_eq!(attrs.hr_history.len(), VITALS_HISTORY_LEN);
        }
    }

    #[test]
    fn test_bmi_is_rounded_to_one_decimal() {
        let mut sampler = AttributeSampler::new(19);
        for _ in 0..200 {
            let scaled = sampler.sample().bmi * 10.0;
            assert!((scaled - scaled.round()).abs() < 1e-9);
        }
    }

    #[test]
    fn test_symptom_and_medication_sets_are_distinct() {
        let mut sampler = AttributeSampler::new(11);
        for _ in 0..500 {
            let attrs = sampler.sample();

            assert!((1..=3).contains(&attrs.symptoms.len()));
            assert!((1..=3).contains(&attrs.medications.len()));

            let mut symptoms = attrs.symptoms.clone();
            symptoms.sort_by_key(|s| s.to_string());
            symptoms.dedup();
            assert_eq!(symptoms.len(), attrs.symptoms.len());

            let mut meds = attrs.medications.clone();
            meds.sort_by_key(|m| m.to_string());
            meds.dedup();
            assert_eq!(meds.len(), attrs.medications.len());
        }
    }

    #[test]
    fn test_non_elderly_without_comorbidity_get_normal_bp() {
        let mut sampler = AttributeSampler::new(3);
        // Conditional ranges overlap, so check the implied invariant instead:
        // a systolic above 140 is only possible in the elevated branch.
        for _ in 0..500 {
            let attrs = sampler.sample();
            if attrs.systolic_bp > 140 || attrs.diastolic_bp > 90 {
                assert!(attrs.systolic_bp >= 130);
                assert!(attrs.diastolic_bp >= 80);
            }
        }
    }

    #[test]
    fn test_fixed_seed_reproduces_draws() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date");
        let mut a = AttributeSampler::with_today(42, today);
        let mut b = AttributeSampler::with_today(42, today);
        for _ in 0..50 {
            assert_eq!(a.sample(), b.sample());
        }
    }
}
