//! Cohort segmentation: standardized features partitioned by k-means.
//!
//! Cluster ids are only stable within one run. Any semantic naming (for
//! example "low-risk stable") has to come from inspecting the per-cluster
//! feature means afterwards, never from the id order.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::domain::{Cohort, RiskLevel};
use crate::{CardiovizError, Result};

const MAX_ITERATIONS: usize = 100;

/// Names of the base feature columns, in extraction order.
const FEATURE_NAMES: [&str; 7] = [
    "age",
    "systolic_bp",
    "diastolic_bp",
    "heart_rate",
    "cholesterol",
    "bmi",
    "exercise_hours",
];

/// Partitions the cohort into `k` clusters with Lloyd's iterative relocation
/// over z-score standardized features, restarted `restarts` times and keeping
/// the assignment with the lowest inertia. Deterministic under the seed.
///
/// Works entirely on a read copy of the feature vectors: a failed run never
/// touches the cohort.
pub struct SegmentationEngine {
    k: usize,
    restarts: usize,
    include_risk_flags: bool,
    seed: u64,
}

impl SegmentationEngine {
    /// Create an engine with the sklearn-like defaults (10 restarts).
    #[must_use]
    pub fn new(k: usize, seed: u64) -> Self {
        Self {
            k,
            restarts: 10,
            include_risk_flags: false,
            seed,
        }
    }

    /// Also feed smoking/diabetes as binary features (the extended variant).
    #[must_use]
    pub fn with_risk_flags(mut self) -> Self {
        self.include_risk_flags = true;
        self
    }

    /// Override the number of random restarts.
    #[must_use]
    pub fn with_restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts.max(1);
        self
    }

    /// Assign one cluster id per patient, in cohort order.
    ///
    /// # Errors
    /// `EmptyCohort` on an empty cohort; `InvalidArgument` when `k` is zero
    /// or not smaller than the cohort size.
    pub fn run(&self, cohort: &Cohort) -> Result<Vec<usize>> {
        if cohort.is_empty() {
            return Err(CardiovizError::EmptyCohort);
        }
        if self.k == 0 || self.k >= cohort.len() {
            return Err(CardiovizError::InvalidArgument(format!(
                "cluster count {} must be in [1, {})",
                self.k,
                cohort.len()
            )));
        }

        let data = standardize(self.feature_matrix(cohort));
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        let mut best: Option<(f64, Vec<usize>)> = None;
        for _ in 0..self.restarts {
            let (inertia, labels) = lloyd(&data, self.k, &mut rng);
            if best.as_ref().map_or(true, |(best_inertia, _)| inertia < *best_inertia) {
                best = Some((inertia, labels));
            }
        }

        let (inertia, labels) = best.expect("at least one restart ran");
        tracing::info!(k = self.k, inertia, "segmentation complete");
        Ok(labels)
    }

    fn feature_matrix(&self, cohort: &Cohort) -> Vec<Vec<f64>> {
        cohort
            .iter()
            .map(|p| {
                let a = &p.attributes;
                let mut row = vec![
                    f64::from(a.age),
                    f64::from(a.systolic_bp),
                    f64::from(a.diastolic_bp),
                    f64::from(a.heart_rate),
                    f64::from(a.cholesterol),
                    a.bmi,
                    f64::from(a.exercise_hours),
                ];
                if self.include_risk_flags {
                    row.push(f64::from(u8::from(a.smoking)));
                    row.push(f64::from(u8::from(a.diabetes)));
                }
                row
            })
            .collect()
    }
}

/// Z-score each column to zero mean and unit variance. Zero-variance columns
/// are left at zero so they stop influencing distances.
fn standardize(mut data: Vec<Vec<f64>>) -> Vec<Vec<f64>> {
    let n = data.len();
    if n == 0 {
        return data;
    }
    let dims = data[0].len();

    for col in 0..dims {
        let mean = data.iter().map(|row| row[col]).sum::<f64>() / n as f64;
        let variance = data
            .iter()
            .map(|row| (row[col] - mean).powi(2))
            .sum::<f64>()
            / n as f64;
        let std = variance.sqrt();

        for row in &mut data {
            row[col] = if std > f64::EPSILON {
                (row[col] - mean) / std
            } else {
                0.0
            };
        }
    }

    data
}

/// One Lloyd's run from a random initialization. Returns (inertia, labels).
fn lloyd(data: &[Vec<f64>], k: usize, rng: &mut ChaCha8Rng) -> (f64, Vec<usize>) {
    let dims = data[0].len();

    let mut centroids: Vec<Vec<f64>> = rand::seq::index::sample(rng, data.len(), k)
        .iter()
        .map(|i| data[i].clone())
        .collect();
    let mut labels = vec![0usize; data.len()];

    for _ in 0..MAX_ITERATIONS {
        // Assignment step.
        let mut changed = false;
        for (i, point) in data.iter().enumerate() {
            let nearest = nearest_centroid(point, &centroids);
            if labels[i] != nearest {
                labels[i] = nearest;
                changed = true;
            }
        }

        // Update step.
        let mut sums = vec![vec![0.0; dims]; k];
        let mut counts = vec![0usize; k];
        for (point, &label) in data.iter().zip(&labels) {
            counts[label] += 1;
            for (acc, value) in sums[label].iter_mut().zip(point) {
                *acc += value;
            }
        }
        for (cluster, centroid) in centroids.iter_mut().enumerate() {
            if counts[cluster] == 0 {
                // Re-seed an emptied cluster from a random point.
                *centroid = data[rng.gen_range(0..data.len())].clone();
                continue;
            }
            for (c, s) in centroid.iter_mut().zip(&sums[cluster]) {
                *c = s / counts[cluster] as f64;
            }
        }

        if !changed {
            break;
        }
    }

    let inertia = data
        .iter()
        .zip(&labels)
        .map(|(point, &label)| squared_distance(point, &centroids[label]))
        .sum();

    (inertia, labels)
}

fn nearest_centroid(point: &[f64], centroids: &[Vec<f64>]) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, centroid) in centroids.iter().enumerate() {
        let dist = squared_distance(point, centroid);
        if dist < best_dist {
            best_dist = dist;
            best = i;
        }
    }
    best
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

/// Per-cluster summary used to name segments after the fact.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterProfile {
    pub cluster: usize,
    pub size: usize,
    /// Share of the cohort in this cluster, in [0, 1].
    pub share: f64,
    /// Mean of each base feature column, ordered as [`feature_names`] returns.
    pub feature_means: Vec<f64>,
    /// Share of this cluster currently labeled high risk.
    pub high_risk_share: f64,
}

impl ClusterProfile {
    /// Names matching `feature_means` order.
    #[must_use]
    pub fn feature_names() -> &'static [&'static str] {
        &FEATURE_NAMES
    }

    /// Compute profiles for a labeled cohort. `labels` must be cohort-ordered
    /// output of [`SegmentationEngine::run`].
    #[must_use]
    pub fn from_labels(cohort: &Cohort, labels: &[usize], k: usize) -> Vec<Self> {
        let mut profiles: Vec<Self> = (0..k)
            .map(|cluster| Self {
                cluster,
                size: 0,
                share: 0.0,
                feature_means: vec![0.0; FEATURE_NAMES.len()],
                high_risk_share: 0.0,
            })
            .collect();

        for (patient, &label) in cohort.iter().zip(labels) {
            let profile = &mut profiles[label];
            let a = &patient.attributes;
            profile.size += 1;
            for (acc, value) in profile.feature_means.iter_mut().zip([
                f64::from(a.age),
                f64::from(a.systolic_bp),
                f64::from(a.diastolic_bp),
                f64::from(a.heart_rate),
                f64::from(a.cholesterol),
                a.bmi,
                f64::from(a.exercise_hours),
            ]) {
                *acc += value;
            }
            if patient.risk_level == RiskLevel::High {
                profile.high_risk_share += 1.0;
            }
        }

        let total = cohort.len() as f64;
        for profile in &mut profiles {
            if profile.size > 0 {
                let size = profile.size as f64;
                for mean in &mut profile.feature_means {
                    *mean /= size;
                }
                profile.high_risk_share /= size;
            }
            profile.share = profile.size as f64 / total;
        }

        profiles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::testutil::sample_attributes;
    use crate::domain::{PatientRecord, ScoringPolicy};

    /// Build a cohort from three well-separated synthetic subgroups and
    /// return it with the true group label per patient.
    fn separated_cohort(seed: u64) -> (Cohort, Vec<usize>) {
        // (age, systolic, diastolic, heart rate, cholesterol, bmi, exercise)
        let group_centers = [
            (45, 118, 75, 70, 170, 23.0, 8),
            (60, 135, 85, 78, 210, 27.0, 4),
            (72, 150, 95, 85, 250, 30.0, 1),
        ];
        let sizes = [42, 35, 23];

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut patients = Vec::new();
        let mut truth = Vec::new();

        for (group, (&size, center)) in sizes.iter().zip(group_centers).enumerate() {
            let (age, sbp, dbp, hr, chol, bmi, exercise) = center;
            for _ in 0..size {
                let mut attrs = sample_attributes();
                attrs.age = (age + rng.gen_range(-3..=3)) as u32;
                attrs.systolic_bp = sbp + rng.gen_range(-4..=4);
                attrs.diastolic_bp = dbp + rng.gen_range(-3..=3);
                attrs.heart_rate = hr + rng.gen_range(-3..=3);
                attrs.cholesterol = chol + rng.gen_range(-8..=8);
                attrs.bmi = bmi + rng.gen_range(-1.0..=1.0);
                attrs.exercise_hours = exercise + rng.gen_range(0..=1);

                let id = format!("P{:04}", patients.len() + 1);
                patients.push(PatientRecord::new(id, attrs, ScoringPolicy::Full));
                truth.push(group);
            }
        }

        (Cohort::new(patients), truth)
    }

    /// Majority-relabel agreement between predicted clusters and true groups.
    fn agreement(labels: &[usize], truth: &[usize], k: usize) -> f64 {
        let mut majority = vec![0usize; k];
        for cluster in 0..k {
            let mut counts = vec![0usize; k];
            for (&label, &t) in labels.iter().zip(truth) {
                if label == cluster {
                    counts[t] += 1;
                }
            }
            majority[cluster] = counts
                .iter()
                .enumerate()
                .max_by_key(|(_, &c)| c)
                .map(|(g, _)| g)
                .unwrap_or(0);
        }

        let matches = labels
            .iter()
            .zip(truth)
            .filter(|(&label, &t)| majority[label] == t)
            .count();
        matches as f64 / truth.len() as f64
    }

    #[test]
    fn test_recovers_separated_subgroups() {
        let (cohort, truth) = separated_cohort(42);
        let labels = SegmentationEngine::new(3, 42).run(&cohort).expect("run");

        assert_eq!(labels.len(), cohort.len());
        let score = agreement(&labels, &truth, 3);
        assert!(score >= 0.9, "agreement {score} below 0.9");
    }

    #[test]
    fn test_deterministic_under_fixed_seed() {
        let (cohort, _) = separated_cohort(7);
        let engine = SegmentationEngine::new(3, 99);
        assert_eq!(engine.run(&cohort).expect("run"), engine.run(&cohort).expect("run"));
    }

    #[test]
    fn test_invalid_k_is_rejected() {
        let (cohort, _) = separated_cohort(1);

        let err = SegmentationEngine::new(0, 1).run(&cohort).expect_err("k=0");
        assert!(matches!(err, CardiovizError::InvalidArgument(_)));

        // k must be strictly smaller than the cohort size.
        let err = SegmentationEngine::new(cohort.len(), 1)
            .run(&cohort)
            .expect_err("k == cohort size");
        assert!(matches!(err, CardiovizError::InvalidArgument(_)));

        let err = SegmentationEngine::new(cohort.len() + 1, 1)
            .run(&cohort)
            .expect_err("k too large");
        assert!(matches!(err, CardiovizError::InvalidArgument(_)));
    }

    #[test]
    fn test_empty_cohort_is_rejected() {
        let err = SegmentationEngine::new(3, 1)
            .run(&Cohort::default())
            .expect_err("empty");
        assert!(matches!(err, CardiovizError::EmptyCohort));
    }

    #[test]
    fn test_profiles_reflect_cluster_means() {
        let (cohort, _) = separated_cohort(13);
        let labels = SegmentationEngine::new(3, 13).run(&cohort).expect("run");
        let profiles = ClusterProfile::from_labels(&cohort, &labels, 3);

        assert_eq!(profiles.len(), 3);
        let total: usize = profiles.iter().map(|p| p.size).sum();
        assert_eq!(total, cohort.len());

        // The oldest-mean cluster should also carry the highest cholesterol
        // mean, since the synthetic groups co-vary.
        let oldest = profiles
            .iter()
            .max_by(|a, b| a.feature_means[0].total_cmp(&b.feature_means[0]))
            .expect("non-empty");
        let fattest = profiles
            .iter()
            .max_by(|a, b| a.feature_means[4].total_cmp(&b.feature_means[4]))
            .expect("non-empty");
        assert_eq!(oldest.cluster, fattest.cluster);
    }
}
