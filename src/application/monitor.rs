//! Live cohort monitoring: the owned cohort store and the periodic
//! background worker that drives mutation ticks.
//!
//! The cohort is the single piece of shared mutable state in the process.
//! `MonitorService` owns it behind one mutex, so ticks are serialized and a
//! reader sees either the pre- or post-tick cohort, never a half-mutated
//! patient: each patient's vitals and risk label are written under the same
//! lock hold.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::domain::{Cohort, PatientRecord};
use crate::ports::SnapshotStore;
use crate::{CardiovizError, Result};

use super::analytics::{
    self, CohortStats, TreatmentAnalysis, VitalsTrace,
};
use super::mutation::MutationEngine;
use super::segmentation::{ClusterProfile, SegmentationEngine};

/// How a bulk read treats the cohort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// Serve the current snapshot untouched.
    Static,
    /// Run one mutation tick first, then serve the snapshot. This mirrors the
    /// API variant where reads deliberately trigger simulated drift.
    Drift,
}

struct MonitorInner {
    cohort: Cohort,
    engine: MutationEngine,
}

/// The explicit owned store for the live cohort.
///
/// Replaces ambient module-level state with an injectable handle; clones
/// share the same cohort. All operations take the single lock, so ticks
/// never overlap and reads are consistent.
#[derive(Clone)]
pub struct MonitorService {
    inner: Arc<Mutex<MonitorInner>>,
    trace_rng: Arc<Mutex<ChaCha8Rng>>,
}

impl MonitorService {
    /// Wrap an initial cohort and its mutation engine.
    #[must_use]
    pub fn new(cohort: Cohort, engine: MutationEngine, seed: u64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MonitorInner { cohort, engine })),
            trace_rng: Arc::new(Mutex::new(ChaCha8Rng::seed_from_u64(seed))),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MonitorInner> {
        // A panic can only happen between patient updates, never inside one,
        // so the cohort is still consistent and the lock is safe to reclaim.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A consistent snapshot of one patient.
    ///
    /// # Errors
    /// `NotFound` for an unknown id.
    pub fn patient(&self, patient_id: &str) -> Result<PatientRecord> {
        self.lock()
            .cohort
            .get(patient_id)
            .cloned()
            .ok_or_else(|| CardiovizError::NotFound(patient_id.to_string()))
    }

    /// The entire current cohort. `ReadMode::Drift` runs one mutation tick
    /// before snapshotting.
    #[must_use]
    pub fn bulk_read(&self, mode: ReadMode) -> Cohort {
        let mut inner = self.lock();
        if mode == ReadMode::Drift {
            let MonitorInner { cohort, engine } = &mut *inner;
            engine.tick(cohort);
        }
        inner.cohort.clone()
    }

    /// Run one mutation tick. Returns the mutated patient ids.
    pub fn tick(&self) -> Vec<String> {
        let mut inner = self.lock();
        let MonitorInner { cohort, engine } = &mut *inner;
        engine.tick(cohort)
    }

    /// Headline statistics over the current snapshot.
    #[must_use]
    pub fn stats(&self) -> CohortStats {
        analytics::cohort_stats(&self.lock().cohort)
    }

    /// Patient count per risk level.
    #[must_use]
    pub fn risk_distribution(&self) -> [(crate::domain::RiskLevel, usize); 3] {
        analytics::risk_distribution(&self.lock().cohort)
    }

    /// The treatment-by-response cross-tabulation.
    #[must_use]
    pub fn treatment_analysis(&self) -> TreatmentAnalysis {
        analytics::treatment_analysis(&self.lock().cohort)
    }

    /// A synthetic short vitals window for one patient.
    ///
    /// # Errors
    /// `NotFound` for an unknown id.
    pub fn vitals(&self, patient_id: &str) -> Result<VitalsTrace> {
        let inner = self.lock();
        let mut rng = self
            .trace_rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        analytics::vitals_trace(&inner.cohort, patient_id, &mut rng)
    }

    /// Segment the cohort into `k` clusters and write the cluster ids back
    /// onto the records. The cohort is untouched if segmentation fails.
    ///
    /// # Errors
    /// Propagates `InvalidArgument`/`EmptyCohort` from the engine.
    pub fn apply_segmentation(&self, k: usize, seed: u64) -> Result<Vec<ClusterProfile>> {
        let mut inner = self.lock();
        let labels = SegmentationEngine::new(k, seed).run(&inner.cohort)?;

        for (patient, &label) in inner.cohort.iter_mut().zip(&labels) {
            patient.cluster = Some(label);
        }
        Ok(ClusterProfile::from_labels(&inner.cohort, &labels, k))
    }

    /// Clone of the whole cohort.
    #[must_use]
    pub fn snapshot(&self) -> Cohort {
        self.lock().cohort.clone()
    }

    /// Persist the current snapshot.
    ///
    /// # Errors
    /// Propagates storage failures.
    pub fn save_to<S>(&self, store: &S) -> Result<()>
    where
        S: SnapshotStore,
        S::Error: Into<crate::adapters::StorageError>,
    {
        let snapshot = self.snapshot();
        store
            .save_cohort(&snapshot)
            .map_err(|e| CardiovizError::Storage(e.into()))
    }

    /// Replace the live cohort with a persisted snapshot.
    ///
    /// # Errors
    /// Propagates storage failures.
    pub fn load_from<S>(&self, store: &S) -> Result<()>
    where
        S: SnapshotStore,
        S::Error: Into<crate::adapters::StorageError>,
    {
        let cohort = store
            .load_cohort()
            .map_err(|e| CardiovizError::Storage(e.into()))?;
        self.lock().cohort = cohort;
        Ok(())
    }
}

/// Events published by the background worker.
#[derive(Debug, Clone)]
pub enum MonitorEvent {
    /// One tick completed: which patients changed and the fresh stats.
    Tick {
        mutated: Vec<String>,
        stats: CohortStats,
    },
}

/// Handle to a running monitor worker.
pub struct MonitorHandle {
    events_rx: Receiver<MonitorEvent>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl MonitorHandle {
    /// Try to receive the next event (non-blocking).
    #[must_use]
    pub fn try_recv(&self) -> Option<MonitorEvent> {
        self.events_rx.try_recv().ok()
    }

    /// Request a graceful stop and wait for the worker to finish its current
    /// tick. No in-flight tick is interrupted.
    pub fn stop(mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Periodic mutation worker: one serialized tick per interval, stoppable
/// between ticks.
pub struct MonitorWorker;

impl MonitorWorker {
    /// Spawn the background loop.
    ///
    /// Returns a handle to receive tick events and stop the loop.
    #[must_use]
    pub fn spawn(service: MonitorService, interval: Duration) -> MonitorHandle {
        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = stop.clone();

        let handle = thread::spawn(move || {
            Self::run_loop(&service, interval, &stop_flag, &tx);
        });

        MonitorHandle {
            events_rx: rx,
            stop,
            handle: Some(handle),
        }
    }

    fn run_loop(
        service: &MonitorService,
        interval: Duration,
        stop: &AtomicBool,
        tx: &Sender<MonitorEvent>,
    ) {
        tracing::info!(interval_ms = interval.as_millis() as u64, "monitor worker started");

        while !stop.load(Ordering::Relaxed) {
            let mutated = service.tick();
            let stats = service.stats();

            if tx
                .send(MonitorEvent::Tick { mutated, stats })
                .is_err()
            {
                // Consumer went away; nothing left to feed.
                break;
            }

            // Sleep in short slices so a stop request is honored promptly,
            // but always between ticks, never inside one.
            let mut remaining = interval;
            while !remaining.is_zero() && !stop.load(Ordering::Relaxed) {
                let slice = remaining.min(Duration::from_millis(50));
                thread::sleep(slice);
                remaining = remaining.saturating_sub(slice);
            }
        }

        tracing::info!("monitor worker stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{CohortGenerator, MutationMode};
    use crate::domain::AttributeSampler;
    use chrono::NaiveDate;

    fn test_service(n: usize) -> MonitorService {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date");
        let cohort = CohortGenerator::with_sampler(AttributeSampler::with_today(42, today))
            .generate(n)
            .expect("generate");
        MonitorService::new(cohort, MutationEngine::new(1, MutationMode::Resample), 9)
    }

    #[test]
    fn test_patient_lookup() {
        let service = test_service(20);
        assert_eq!(service.patient("P0007").expect("found").patient_id, "P0007");
        assert!(matches!(
            service.patient("P0099"),
            Err(CardiovizError::NotFound(_))
        ));
    }

    #[test]
    fn test_static_read_does_not_drift() {
        let service = test_service(30);
        let a = service.bulk_read(ReadMode::Static);
        let b = service.bulk_read(ReadMode::Static);
        assert_eq!(a, b);
    }

    #[test]
    fn test_drift_read_mutates_between_calls() {
        let service = test_service(30);
        let before = service.snapshot();
        let after = service.bulk_read(ReadMode::Drift);

        assert_eq!(before.patient_ids(), after.patient_ids());
        assert_ne!(before, after);
    }

    #[test]
    fn test_segmentation_failure_leaves_cohort_untouched() {
        let service = test_service(10);
        let before = service.snapshot();

        let err = service.apply_segmentation(0, 1).expect_err("bad k");
        assert!(matches!(err, CardiovizError::InvalidArgument(_)));
        assert_eq!(service.snapshot(), before);
    }

    #[test]
    fn test_segmentation_labels_every_patient() {
        let service = test_service(40);
        let profiles = service.apply_segmentation(3, 42).expect("segment");

        assert_eq!(profiles.len(), 3);
        let snapshot = service.snapshot();
        assert!(snapshot.iter().all(|p| matches!(p.cluster, Some(c) if c < 3)));
    }

    #[test]
    fn test_worker_ticks_and_stops_gracefully() {
        let service = test_service(25);
        let ids_before = service.snapshot().patient_ids();

        let handle = MonitorWorker::spawn(service.clone(), Duration::from_millis(10));

        // Wait for at least one tick event.
        let mut got_tick = false;
        for _ in 0..100 {
            if let Some(MonitorEvent::Tick { mutated, stats }) = handle.try_recv() {
                assert!(!mutated.is_empty());
                assert_eq!(stats.total_patients, 25);
                got_tick = true;
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }
        assert!(got_tick, "worker never delivered a tick");

        handle.stop();
        assert_eq!(service.snapshot().patient_ids(), ids_before);
    }
}
