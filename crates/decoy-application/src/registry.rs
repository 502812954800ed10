//! Tracker registry.
//!
//! Owns every live `SessionTracker`. The map is guarded by a registry-level
//! `RwLock`; each tracker has its own `Mutex`, so work on different sessions
//! never contends beyond the brief map lookup.

use chrono::{DateTime, Utc};
use decoy_core::{
    Clock, EngineConfig, Report, SessionTracker, ThresholdSampler, TrackerSnapshot,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

/// A tracker behind its per-session lock.
pub type SharedTracker = Arc<Mutex<SessionTracker>>;

pub struct TrackerRegistry {
    trackers: RwLock<HashMap<String, SharedTracker>>,
    sampler: ThresholdSampler,
    history_capacity: usize,
    retention_window: Duration,
    clock: Arc<dyn Clock>,
}

impl TrackerRegistry {
    pub fn new(config: &EngineConfig, sampler: ThresholdSampler, clock: Arc<dyn Clock>) -> Self {
        Self {
            trackers: RwLock::new(HashMap::new()),
            sampler,
            history_capacity: config.history_capacity,
            retention_window: config.retention_window(),
            clock,
        }
    }

    /// Returns the tracker for `id`, creating it on first reference.
    ///
    /// Creation happens under the write lock, so concurrent first messages
    /// for the same id share one tracker.
    pub async fn get_or_create(&self, id: &str) -> SharedTracker {
        if let Some(tracker) = self.trackers.read().await.get(id) {
            return Arc::clone(tracker);
        }

        let mut trackers = self.trackers.write().await;
        let tracker = trackers.entry(id.to_string()).or_insert_with(|| {
            let threshold = self.sampler.sample();
            tracing::info!(
                "[TrackerRegistry] Created tracker {} (completeness threshold {})",
                id,
                threshold
            );
            Arc::new(Mutex::new(SessionTracker::new(
                id,
                threshold,
                self.history_capacity,
                self.clock.now(),
            )))
        });
        Arc::clone(tracker)
    }

    pub async fn get(&self, id: &str) -> Option<SharedTracker> {
        self.trackers.read().await.get(id).cloned()
    }

    /// Removes a tracker regardless of status. Returns whether it existed.
    pub async fn remove(&self, id: &str) -> bool {
        let removed = self.trackers.write().await.remove(id).is_some();
        if removed {
            tracing::debug!("[TrackerRegistry] Removed tracker {}", id);
        }
        removed
    }

    pub async fn snapshot(&self, id: &str) -> Option<TrackerSnapshot> {
        let tracker = self.get(id).await?;
        let guard = tracker.lock().await;
        Some(guard.snapshot())
    }

    /// State of every active tracker.
    pub async fn list_active(&self) -> Vec<TrackerSnapshot> {
        let mut active = Vec::new();
        for tracker in self.all().await {
            let guard = tracker.lock().await;
            if !guard.is_completed() {
                active.push(guard.snapshot());
            }
        }
        active
    }

    /// Final reports of every completed tracker still retained.
    pub async fn list_completed(&self) -> Vec<Arc<Report>> {
        let mut reports = Vec::new();
        for tracker in self.all().await {
            if let Some(report) = tracker.lock().await.final_report() {
                reports.push(report);
            }
        }
        reports
    }

    /// Drops completed trackers that started before the retention window.
    ///
    /// Candidates are collected from a snapshot of the map, then removed
    /// under the write lock only if the entry is still the same tracker.
    pub async fn sweep(&self) -> usize {
        let cutoff = self.cutoff(self.clock.now());
        let entries: Vec<(String, SharedTracker)> = self
            .trackers
            .read()
            .await
            .iter()
            .map(|(id, tracker)| (id.clone(), Arc::clone(tracker)))
            .collect();

        let mut expired = Vec::new();
        for (id, tracker) in entries {
            let is_expired = {
                let guard = tracker.lock().await;
                guard.is_completed() && cutoff.is_some_and(|cutoff| guard.started_at() < cutoff)
            };
            if is_expired {
                expired.push((id, tracker));
            }
        }

        if expired.is_empty() {
            tracing::debug!("[TrackerRegistry] Sweep found nothing to remove");
            return 0;
        }

        let mut trackers = self.trackers.write().await;
        let mut removed = 0;
        for (id, tracker) in expired {
            let same = trackers
                .get(&id)
                .is_some_and(|current| Arc::ptr_eq(current, &tracker));
            if same {
                trackers.remove(&id);
                removed += 1;
            }
        }
        tracing::info!(
            "[TrackerRegistry] Sweep removed {} completed tracker(s), {} remaining",
            removed,
            trackers.len()
        );
        removed
    }

    pub async fn len(&self) -> usize {
        self.trackers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.trackers.read().await.is_empty()
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    async fn all(&self) -> Vec<SharedTracker> {
        self.trackers.read().await.values().cloned().collect()
    }

    fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let window = chrono::Duration::from_std(self.retention_window).ok()?;
        now.checked_sub_signed(window)
    }
}
