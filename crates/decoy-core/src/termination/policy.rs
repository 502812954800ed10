//! Termination rules.
//!
//! The policy is evaluated once per counterparty message, first match wins:
//! hard limits, then the advisory recommendation, then the fallback rule.
//! The advisory call itself lives in the application layer; this module
//! only decides when to ask and how to read the answer.

use super::advisory::{AdvisoryRequest, AdvisoryResponse, AdvisoryStats, AdvisoryVerdict};
use super::reason::TerminationReason;
use crate::clock::elapsed;
use crate::config::{AdvisoryConfig, EngineConfig};
use crate::tracker::model::duration_ms;
use crate::tracker::{HistoryEntry, SessionTracker};
use chrono::{DateTime, Utc};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct TerminationPolicy {
    max_messages: u32,
    min_messages_for_extraction: u32,
    max_duration: Duration,
    inactivity_timeout: Duration,
    frustration_threshold: u8,
    advisory: AdvisoryConfig,
}

impl TerminationPolicy {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            max_messages: config.max_messages,
            min_messages_for_extraction: config.min_messages_for_extraction,
            max_duration: config.max_duration(),
            inactivity_timeout: config.inactivity_timeout(),
            frustration_threshold: config.frustration_threshold,
            advisory: config.advisory.clone(),
        }
    }

    /// Checks message count, duration and inactivity, in that order.
    ///
    /// `previous_activity` is the last activity before the message being
    /// evaluated; the tracker has already recorded the message itself.
    pub fn check_hard_limits(
        &self,
        tracker: &SessionTracker,
        previous_activity: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Option<TerminationReason> {
        if tracker.message_count() >= self.max_messages {
            return Some(TerminationReason::MaxMessagesReached);
        }
        if tracker.duration(now) >= self.max_duration {
            return Some(TerminationReason::MaxDurationReached);
        }
        if elapsed(previous_activity, now) >= self.inactivity_timeout {
            return Some(TerminationReason::InactivityTimeout);
        }
        None
    }

    /// Whether the advisory service should be consulted for this message.
    pub fn should_consult_advisory(&self, tracker: &SessionTracker, history_len: usize) -> bool {
        self.advisory.enabled
            && tracker.message_count() >= self.advisory.min_messages
            && history_len >= self.advisory.min_history
    }

    /// Maps an advisory recommendation to a termination decision.
    ///
    /// Only a confident, positive recommendation with a mappable category
    /// ends the session; everything else is "no decision".
    pub fn interpret_advisory(&self, response: &AdvisoryResponse) -> Option<TerminationReason> {
        if !response.should_terminate || response.confidence < self.advisory.min_confidence {
            return None;
        }
        match response.reason {
            AdvisoryVerdict::Success | AdvisoryVerdict::Complete => {
                Some(TerminationReason::ExtractionComplete)
            }
            AdvisoryVerdict::Suspicious => Some(TerminationReason::ScammerSuspicious),
            AdvisoryVerdict::Frustration => Some(TerminationReason::ScammerFrustrated),
            AdvisoryVerdict::Continue => None,
        }
    }

    /// Deterministic rule used when the advisory gives no decision.
    pub fn fallback(&self, tracker: &SessionTracker) -> Option<TerminationReason> {
        if tracker.message_count() >= self.min_messages_for_extraction
            && tracker.completeness_score() >= tracker.completeness_threshold()
        {
            return Some(TerminationReason::ExtractionComplete);
        }
        if tracker.frustration_level() >= self.frustration_threshold {
            return Some(TerminationReason::ScammerFrustrated);
        }
        None
    }

    /// Builds the advisory request for a tracker.
    ///
    /// `history` is the caller-supplied conversation when present; it is cut
    /// down to the configured window, as is the tracker's own history.
    pub fn advisory_request(
        &self,
        tracker: &SessionTracker,
        history: Option<&[HistoryEntry]>,
        now: DateTime<Utc>,
    ) -> AdvisoryRequest {
        let window = self.advisory.history_window;
        let recent_history = match history {
            Some(entries) => {
                let skip = entries.len().saturating_sub(window);
                entries[skip..].to_vec()
            }
            None => tracker.recent_history(window),
        };
        AdvisoryRequest {
            session_id: tracker.id().to_string(),
            recent_history,
            extracted_data_snapshot: tracker.extracted_data().clone(),
            stats: AdvisoryStats {
                message_count: tracker.message_count(),
                duration_ms: duration_ms(tracker.duration(now)),
                completeness_score: tracker.completeness_score(),
                frustration_level: tracker.frustration_level(),
            },
        }
    }

    pub fn advisory_config(&self) -> &AdvisoryConfig {
        &self.advisory
    }
}

#[cfg(test)]
#[path = "policy_test.rs"]
mod tests;
