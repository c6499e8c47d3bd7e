//! Adapters layer: Concrete implementations of ports.
//!
//! - `json`: plain JSON document persistence for cohort snapshots

pub mod json;

pub use json::{JsonSnapshotStore, StorageError};
