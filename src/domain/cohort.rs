//! The in-memory cohort: an insertion-ordered collection of patient records.

use serde::{Deserialize, Serialize};

use super::patient::PatientRecord;

/// Insertion-ordered collection of [`PatientRecord`], unique by `patient_id`.
///
/// Created once by the cohort generator and then only mutated in place: the
/// mutation engine rewrites vitals and risk labels, but nothing inserts or
/// deletes records afterwards. Serializes as a plain JSON array of patients.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cohort {
    patients: Vec<PatientRecord>,
}

impl Cohort {
    /// Build a cohort from generated records.
    #[must_use]
    pub fn new(patients: Vec<PatientRecord>) -> Self {
        Self { patients }
    }

    /// Number of patients.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patients.len()
    }

    /// Whether the cohort holds no patients.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }

    /// Look up a patient by id. Linear scan; the cohort is small.
    #[must_use]
    pub fn get(&self, patient_id: &str) -> Option<&PatientRecord> {
        self.patients.iter().find(|p| p.patient_id == patient_id)
    }

    /// Iterate over the records in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, PatientRecord> {
        self.patients.iter()
    }

    /// Iterate mutably, for in-place vitals updates.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, PatientRecord> {
        self.patients.iter_mut()
    }

    /// Mutable access by position, for subset mutation ticks.
    #[must_use]
    pub fn get_mut_by_index(&mut self, index: usize) -> Option<&mut PatientRecord> {
        self.patients.get_mut(index)
    }

    /// The ids of all patients, in insertion order.
    #[must_use]
    pub fn patient_ids(&self) -> Vec<String> {
        self.patients.iter().map(|p| p.patient_id.clone()).collect()
    }
}

impl<'a> IntoIterator for &'a Cohort {
    type Item = &'a PatientRecord;
    type IntoIter = std::slice::Iter<'a, PatientRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.patients.iter()
    }
}
