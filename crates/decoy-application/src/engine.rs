//! Conversation engine.
//!
//! Routes each inbound message through its session tracker and the
//! termination policy, consulting the advisory service when the policy
//! allows it.

use crate::registry::{SharedTracker, TrackerRegistry};
use decoy_core::{
    AdvisoryRequest, AdvisoryService, CallbackPayload, Clock, DecoyError, EngineConfig,
    HistoryEntry, PatternExtractor, Progress, Report, Result, Sender, SessionTracker,
    StructuredAnalysis, TerminationPolicy, TerminationReason,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::MutexGuard;

/// Result of processing one message.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum ProcessOutcome {
    /// The session stays open.
    Continue { progress: Progress },
    /// The session is completed; repeated calls return the same report.
    #[serde(rename_all = "camelCase")]
    Terminated {
        reason: TerminationReason,
        description: String,
        report: Arc<Report>,
    },
}

impl ProcessOutcome {
    fn terminated(report: Arc<Report>) -> Self {
        Self::Terminated {
            reason: report.termination_reason,
            description: report.termination_description.clone(),
            report,
        }
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self, Self::Terminated { .. })
    }

    pub fn report(&self) -> Option<&Arc<Report>> {
        match self {
            Self::Terminated { report, .. } => Some(report),
            Self::Continue { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<TerminationReason> {
        self.report().map(|r| r.termination_reason)
    }
}

pub struct ConversationEngine {
    registry: Arc<TrackerRegistry>,
    policy: TerminationPolicy,
    extractor: PatternExtractor,
    advisory: Option<Arc<dyn AdvisoryService>>,
    advisory_timeout: Duration,
    frustration_step: u8,
    clock: Arc<dyn Clock>,
}

impl ConversationEngine {
    /// Creates an engine without an advisory service; only hard limits and
    /// the fallback rule decide termination.
    pub fn new(config: &EngineConfig, registry: Arc<TrackerRegistry>) -> Self {
        let clock = Arc::clone(registry.clock());
        Self {
            registry,
            policy: TerminationPolicy::from_config(config),
            extractor: PatternExtractor::new(),
            advisory: None,
            advisory_timeout: config.advisory.timeout(),
            frustration_step: config.frustration_step,
            clock,
        }
    }

    pub fn with_advisory(mut self, advisory: Arc<dyn AdvisoryService>) -> Self {
        self.advisory = Some(advisory);
        self
    }

    pub fn registry(&self) -> &Arc<TrackerRegistry> {
        &self.registry
    }

    /// Processes one message for `session_id`.
    ///
    /// `history` overrides the tracker's own recent history as advisory
    /// context. Messages for a completed session leave it untouched and
    /// return the cached report.
    pub async fn process_message(
        &self,
        session_id: &str,
        sender: Sender,
        text: &str,
        analysis: Option<&StructuredAnalysis>,
        history: Option<&[HistoryEntry]>,
    ) -> ProcessOutcome {
        let tracker = self.registry.get_or_create(session_id).await;
        let mut guard = tracker.lock().await;
        if let Some(report) = guard.final_report() {
            tracing::debug!("[Engine] {} already completed, returning cached report", session_id);
            return ProcessOutcome::terminated(report);
        }

        let mut now = self.clock.now();
        if sender == Sender::Agent {
            guard.record_agent_message(text, now);
            return ProcessOutcome::Continue {
                progress: guard.progress(now),
            };
        }

        let local = self.extractor.extract(text);
        let Some(previous_activity) =
            guard.record_counterparty_message(text, &local, analysis, self.frustration_step, now)
        else {
            return ProcessOutcome::terminated(guard.complete(TerminationReason::Unknown, now));
        };

        if let Some(reason) = self.policy.check_hard_limits(&guard, previous_activity, now) {
            return Self::finish(&mut guard, reason, now);
        }

        if let Some(request) = self.advisory_request(&guard, history, now) {
            let observed_count = guard.message_count();
            drop(guard);
            let decision = self.consult(&request).await;

            guard = tracker.lock().await;
            if let Some(report) = guard.final_report() {
                tracing::info!(
                    "[Engine] {} completed while the advisory call was in flight",
                    session_id
                );
                return ProcessOutcome::terminated(report);
            }
            now = self.clock.now();
            if guard.message_count() != observed_count {
                tracing::debug!(
                    "[Engine] {} advanced during the advisory call, discarding its verdict",
                    session_id
                );
            } else if let Some(reason) = decision {
                return Self::finish(&mut guard, reason, now);
            }
        }

        if let Some(reason) = self.policy.fallback(&guard) {
            return Self::finish(&mut guard, reason, now);
        }

        ProcessOutcome::Continue {
            progress: guard.progress(now),
        }
    }

    /// Ends a session on request.
    ///
    /// Defaults to `ManualTermination`. An already completed session keeps
    /// its original report.
    pub async fn terminate_session(
        &self,
        session_id: &str,
        reason: Option<TerminationReason>,
    ) -> Result<Arc<Report>> {
        let tracker = self.tracker(session_id).await?;
        let mut guard = tracker.lock().await;
        let reason = reason.unwrap_or(TerminationReason::ManualTermination);
        Ok(guard.complete(reason, self.clock.now()))
    }

    /// Builds the outbound payload for a session in its current state.
    pub async fn callback_payload(&self, session_id: &str) -> Result<CallbackPayload> {
        let tracker = self.tracker(session_id).await?;
        let guard = tracker.lock().await;
        Ok(CallbackPayload::from_tracker(&guard))
    }

    async fn tracker(&self, session_id: &str) -> Result<SharedTracker> {
        self.registry
            .get(session_id)
            .await
            .ok_or_else(|| DecoyError::not_found("Session", session_id))
    }

    fn advisory_request(
        &self,
        tracker: &SessionTracker,
        history: Option<&[HistoryEntry]>,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Option<AdvisoryRequest> {
        self.advisory.as_ref()?;
        let history_len = history.map_or_else(|| tracker.history_len(), <[HistoryEntry]>::len);
        self.policy
            .should_consult_advisory(tracker, history_len)
            .then(|| self.policy.advisory_request(tracker, history, now))
    }

    /// Asks the advisory service, turning every failure into "no decision".
    async fn consult(&self, request: &AdvisoryRequest) -> Option<TerminationReason> {
        let advisory = self.advisory.as_ref()?;
        match tokio::time::timeout(self.advisory_timeout, advisory.recommend(request)).await {
            Ok(Ok(response)) => {
                let decision = self.policy.interpret_advisory(&response);
                tracing::debug!(
                    "[Engine] {} advisory '{}' verdict {:?} (confidence {:.2}) -> {:?}",
                    request.session_id,
                    advisory.name(),
                    response.reason,
                    response.confidence,
                    decision
                );
                decision
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    "[Engine] {} advisory '{}' failed, using fallback: {}",
                    request.session_id,
                    advisory.name(),
                    e
                );
                None
            }
            Err(_) => {
                tracing::warn!(
                    "[Engine] {} advisory '{}' timed out after {:?}, using fallback",
                    request.session_id,
                    advisory.name(),
                    self.advisory_timeout
                );
                None
            }
        }
    }

    fn finish(
        guard: &mut MutexGuard<'_, SessionTracker>,
        reason: TerminationReason,
        now: chrono::DateTime<chrono::Utc>,
    ) -> ProcessOutcome {
        ProcessOutcome::terminated(guard.complete(reason, now))
    }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
