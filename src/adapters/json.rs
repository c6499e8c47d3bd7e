//! JSON snapshot adapter: Implementation of `SnapshotStore`.
//!
//! The cohort is persisted as one pretty-printed JSON array of patient
//! objects, with field names exactly as they appear on the wire. Writes go
//! through a temporary file and an atomic rename so a crash mid-write never
//! leaves a truncated snapshot behind.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::Cohort;
use crate::ports::SnapshotStore;

/// Error type for snapshot storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No snapshot at {}", .0.display())]
    NoSnapshot(PathBuf),

    #[error("Invalid record {patient_id}: {reasons}")]
    InvalidRecord { patient_id: String, reasons: String },
}

/// JSON document storage for cohort snapshots.
pub struct JsonSnapshotStore {
    path: PathBuf,
}

impl JsonSnapshotStore {
    /// Create a store backed by the given document path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The document path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for JsonSnapshotStore {
    type Error = StorageError;

    fn save_cohort(&self, cohort: &Cohort) -> Result<(), Self::Error> {
        let json = serde_json::to_vec_pretty(cohort)?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;

        tracing::info!(path = %self.path.display(), patients = cohort.len(), "snapshot saved");
        Ok(())
    }

    fn load_cohort(&self) -> Result<Cohort, Self::Error> {
        if !self.path.exists() {
            return Err(StorageError::NoSnapshot(self.path.clone()));
        }
        let bytes = fs::read(&self.path)?;
        let cohort: Cohort = serde_json::from_slice(&bytes)?;

        // Downstream consumers rely on vitals staying inside the documented
        // ranges; an edited snapshot must not smuggle values past them.
        for patient in &cohort {
            if let Err(errors) = patient.attributes.validate() {
                return Err(StorageError::InvalidRecord {
                    patient_id: patient.patient_id.clone(),
                    reasons: errors.join("; "),
                });
            }
        }

        Ok(cohort)
    }

    fn has_snapshot(&self) -> Result<bool, Self::Error> {
        Ok(self.path.exists())
    }

    fn delete_snapshot(&self) -> Result<(), Self::Error> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}
