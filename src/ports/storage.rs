//! Storage port: Trait for cohort snapshot persistence.
//!
//! This trait abstracts the snapshot backend (a JSON document on disk) from
//! the application logic.

use crate::domain::Cohort;

/// Trait for persisting and restoring cohort snapshots.
///
/// Round-tripping a cohort through a store must reproduce an equivalent
/// cohort: same ids, same field values, same risk levels. Random seeds are
/// not part of a snapshot; a restored cohort continues drifting from fresh
/// randomness.
pub trait SnapshotStore: Send + Sync {
    /// Error type for storage operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Persist the cohort, replacing any previous snapshot.
    ///
    /// # Errors
    /// Returns error if the storage operation fails.
    fn save_cohort(&self, cohort: &Cohort) -> Result<(), Self::Error>;

    /// Load the persisted cohort.
    ///
    /// # Errors
    /// Returns error if no snapshot exists, the document is malformed, or a
    /// record carries out-of-range attributes.
    fn load_cohort(&self) -> Result<Cohort, Self::Error>;

    /// Whether a snapshot exists.
    ///
    /// # Errors
    /// Returns error if the storage operation fails.
    fn has_snapshot(&self) -> Result<bool, Self::Error>;

    /// Remove the persisted snapshot, if any.
    ///
    /// # Errors
    /// Returns error if the storage operation fails.
    fn delete_snapshot(&self) -> Result<(), Self::Error>;
}
