//! Periodic registry sweep.

use crate::registry::TrackerRegistry;
use decoy_core::{DecoyError, EngineConfig, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;

/// Handle to the background sweep task.
///
/// The task runs until [`SweepScheduler::shutdown`] is called or the handle's
/// token is cancelled. Dropping the handle does not stop the task.
#[derive(Debug)]
pub struct SweepScheduler {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Spawns a task that sweeps `registry` every `every`, first after one full
/// interval. A zero period is rejected.
pub fn start_sweep_scheduler(
    registry: Arc<TrackerRegistry>,
    every: Duration,
) -> Result<SweepScheduler> {
    if every.is_zero() {
        return Err(DecoyError::config("sweep interval must be positive"));
    }
    let token = CancellationToken::new();
    let task_token = token.clone();

    let handle = tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + every, every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tracing::info!(target: "sweep", "Scheduler started ({:?} interval)", every);

        loop {
            tokio::select! {
                _ = task_token.cancelled() => break,
                _ = ticker.tick() => {
                    let removed = registry.sweep().await;
                    tracing::debug!(target: "sweep", "Tick - removed {} tracker(s)", removed);
                }
            }
        }

        tracing::info!(target: "sweep", "Scheduler stopped");
    });

    Ok(SweepScheduler { token, handle })
}

impl SweepScheduler {
    /// Starts the sweep at the configured `sweep_interval_secs`.
    pub fn from_config(registry: Arc<TrackerRegistry>, config: &EngineConfig) -> Result<Self> {
        start_sweep_scheduler(registry, config.sweep_interval())
    }

    /// Stops the task and waits for it to finish.
    pub async fn shutdown(self) {
        self.token.cancel();
        if let Err(e) = self.handle.await {
            tracing::error!(target: "sweep", "Sweep task ended abnormally: {}", e);
        }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Token that stops the scheduler when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use decoy_core::{Clock, ManualClock, TerminationReason, ThresholdSampler};

    #[tokio::test(start_paused = true)]
    async fn test_scheduler_sweeps_and_shuts_down() {
        let clock = Arc::new(ManualClock::default());
        let registry = Arc::new(TrackerRegistry::new(
            &EngineConfig::default(),
            ThresholdSampler::seeded(75, 0, 3),
            clock.clone(),
        ));
        registry
            .get_or_create("done")
            .await
            .lock()
            .await
            .complete(TerminationReason::ExtractionComplete, clock.now());
        registry.get_or_create("live").await;
        clock.advance(Duration::from_secs(2 * 3600));

        let scheduler = start_sweep_scheduler(Arc::clone(&registry), Duration::from_secs(60)).unwrap();
        assert!(scheduler.is_running());
        assert_eq!(registry.len().await, 2);

        for _ in 0..10 {
            tokio::time::sleep(Duration::from_secs(61)).await;
            if registry.len().await == 1 {
                break;
            }
        }
        assert_eq!(registry.len().await, 1);
        assert!(registry.get("live").await.is_some());

        scheduler.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_external_cancellation_stops_task() {
        let registry = Arc::new(TrackerRegistry::new(
            &EngineConfig::default(),
            ThresholdSampler::seeded(75, 0, 3),
            Arc::new(ManualClock::default()),
        ));
        let scheduler = start_sweep_scheduler(registry, Duration::from_secs(60)).unwrap();
        scheduler.cancellation_token().cancel();
        for _ in 0..10 {
            if !scheduler.is_running() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(!scheduler.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_is_rejected() {
        let registry = Arc::new(TrackerRegistry::new(
            &EngineConfig::default(),
            ThresholdSampler::seeded(75, 0, 3),
            Arc::new(ManualClock::default()),
        ));
        let err = start_sweep_scheduler(Arc::clone(&registry), Duration::ZERO).unwrap_err();
        assert!(err.is_config());
    }

    #[tokio::test(start_paused = true)]
    async fn test_from_config_uses_sweep_interval() {
        let clock = Arc::new(ManualClock::default());
        let mut config = EngineConfig::default();
        config.sweep_interval_secs = 120;
        let registry = Arc::new(TrackerRegistry::new(
            &config,
            ThresholdSampler::seeded(75, 0, 3),
            clock.clone(),
        ));
        registry
            .get_or_create("done")
            .await
            .lock()
            .await
            .complete(TerminationReason::ManualTermination, clock.now());
        clock.advance(Duration::from_secs(2 * 3600));

        let scheduler = SweepScheduler::from_config(Arc::clone(&registry), &config).unwrap();
        tokio::time::sleep(Duration::from_secs(100)).await;
        assert_eq!(registry.len().await, 1);
        for _ in 0..10 {
            tokio::time::sleep(Duration::from_secs(10)).await;
            if registry.is_empty().await {
                break;
            }
        }
        assert!(registry.is_empty().await);
        scheduler.shutdown().await;
    }
}
