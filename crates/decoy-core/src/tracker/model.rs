//! Per-session tracker state.

use super::frustration::next_frustration_level;
use super::message::{HistoryEntry, Sender};
use super::scoring::completeness_score;
use crate::clock::elapsed;
use crate::intel::{ExtractedData, ExtractionCandidates, StructuredAnalysis};
use crate::report::Report;
use crate::termination::TerminationReason;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use strum::{AsRefStr, Display};

/// Lifecycle status of a tracker. `Completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TrackerStatus {
    Active,
    Completed,
}

/// Lightweight progress figures returned while a session continues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub session_id: String,
    pub message_count: u32,
    pub completeness_score: u8,
    pub frustration_level: u8,
    pub elapsed_ms: u64,
}

/// Read-only copy of a tracker's state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerSnapshot {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    pub message_count: u32,
    pub agent_message_count: u32,
    pub completeness_score: u8,
    pub completeness_threshold: u8,
    pub frustration_level: u8,
    pub status: TrackerStatus,
    pub termination_reason: Option<TerminationReason>,
    pub scam_detected: bool,
    pub extracted_data: ExtractedData,
}

/// Accumulating state of one conversation.
///
/// Mutated only through `record_*` and `complete`. Once completed, every
/// mutator is a no-op and the cached report is the single source of truth.
#[derive(Debug, Clone)]
pub struct SessionTracker {
    id: String,
    started_at: DateTime<Utc>,
    last_activity_at: DateTime<Utc>,
    message_count: u32,
    agent_message_count: u32,
    extracted_data: ExtractedData,
    completeness_score: u8,
    completeness_threshold: u8,
    frustration_level: u8,
    status: TrackerStatus,
    termination_reason: Option<TerminationReason>,
    scam_detected: bool,
    history: VecDeque<HistoryEntry>,
    history_capacity: usize,
    final_report: Option<Arc<Report>>,
}

impl SessionTracker {
    pub fn new(
        id: impl Into<String>,
        completeness_threshold: u8,
        history_capacity: usize,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            started_at: now,
            last_activity_at: now,
            message_count: 0,
            agent_message_count: 0,
            extracted_data: ExtractedData::new(),
            completeness_score: 0,
            completeness_threshold,
            frustration_level: 0,
            status: TrackerStatus::Active,
            termination_reason: None,
            scam_detected: false,
            history: VecDeque::with_capacity(history_capacity.min(64)),
            history_capacity,
            final_report: None,
        }
    }

    /// Records a counterparty message.
    ///
    /// Local candidates are merged before the external analysis, so the
    /// analyzer can correct a locally guessed impersonated entity. Returns
    /// the activity time preceding this message, or `None` if the session
    /// is already completed.
    pub fn record_counterparty_message(
        &mut self,
        text: &str,
        local: &ExtractionCandidates,
        analysis: Option<&StructuredAnalysis>,
        frustration_step: u8,
        now: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        if self.is_completed() {
            return None;
        }
        let previous = self.touch(Sender::Counterparty, text, now);
        self.message_count += 1;

        let mut added = self.extracted_data.merge(local);
        if let Some(analysis) = analysis {
            added += self.extracted_data.merge(&analysis.to_candidates());
            self.scam_detected |= analysis.indicates_scam();
        }
        self.scam_detected |= !self.extracted_data.scam_type.is_empty();
        self.completeness_score = completeness_score(&self.extracted_data);
        self.frustration_level =
            next_frustration_level(self.frustration_level, text, frustration_step);

        tracing::debug!(
            "[SessionTracker] {} message #{}: +{} values, score={}, frustration={}",
            self.id,
            self.message_count,
            added,
            self.completeness_score,
            self.frustration_level
        );
        Some(previous)
    }

    /// Records one of our own replies. Returns `None` if completed.
    pub fn record_agent_message(&mut self, text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if self.is_completed() {
            return None;
        }
        let previous = self.touch(Sender::Agent, text, now);
        self.agent_message_count += 1;
        Some(previous)
    }

    fn touch(&mut self, sender: Sender, text: &str, now: DateTime<Utc>) -> DateTime<Utc> {
        // Clock skew must not move activity backwards.
        let now = now.max(self.last_activity_at);
        let previous = std::mem::replace(&mut self.last_activity_at, now);
        if self.history_capacity > 0 {
            if self.history.len() == self.history_capacity {
                self.history.pop_front();
            }
            self.history.push_back(HistoryEntry::new(sender, text, now));
        }
        previous
    }

    /// Transitions to `Completed` and returns the final report.
    ///
    /// Calling this on a completed tracker returns the existing report and
    /// ignores `reason`.
    pub fn complete(&mut self, reason: TerminationReason, now: DateTime<Utc>) -> Arc<Report> {
        if let Some(report) = &self.final_report {
            return Arc::clone(report);
        }
        self.status = TrackerStatus::Completed;
        self.termination_reason = Some(reason);
        let report = Arc::new(Report::generate(self, now));
        self.final_report = Some(Arc::clone(&report));
        tracing::info!(
            "[SessionTracker] {} completed: {} (severity {}, score {})",
            self.id,
            reason,
            report.severity,
            self.completeness_score
        );
        report
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn last_activity_at(&self) -> DateTime<Utc> {
        self.last_activity_at
    }

    pub fn message_count(&self) -> u32 {
        self.message_count
    }

    pub fn agent_message_count(&self) -> u32 {
        self.agent_message_count
    }

    pub fn extracted_data(&self) -> &ExtractedData {
        &self.extracted_data
    }

    pub fn completeness_score(&self) -> u8 {
        self.completeness_score
    }

    pub fn completeness_threshold(&self) -> u8 {
        self.completeness_threshold
    }

    pub fn frustration_level(&self) -> u8 {
        self.frustration_level
    }

    pub fn status(&self) -> TrackerStatus {
        self.status
    }

    pub fn is_completed(&self) -> bool {
        self.status == TrackerStatus::Completed
    }

    pub fn termination_reason(&self) -> Option<TerminationReason> {
        self.termination_reason
    }

    pub fn scam_detected(&self) -> bool {
        self.scam_detected
    }

    pub fn final_report(&self) -> Option<Arc<Report>> {
        self.final_report.clone()
    }

    /// Wall-clock time since the session started.
    pub fn duration(&self, now: DateTime<Utc>) -> std::time::Duration {
        elapsed(self.started_at, now)
    }

    /// The last `n` history entries, oldest first.
    pub fn recent_history(&self, n: usize) -> Vec<HistoryEntry> {
        let skip = self.history.len().saturating_sub(n);
        self.history.iter().skip(skip).cloned().collect()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn progress(&self, now: DateTime<Utc>) -> Progress {
        Progress {
            session_id: self.id.clone(),
            message_count: self.message_count,
            completeness_score: self.completeness_score,
            frustration_level: self.frustration_level,
            elapsed_ms: duration_ms(self.duration(now)),
        }
    }

    pub fn snapshot(&self) -> TrackerSnapshot {
        TrackerSnapshot {
            id: self.id.clone(),
            started_at: self.started_at,
            last_activity_at: self.last_activity_at,
            message_count: self.message_count,
            agent_message_count: self.agent_message_count,
            completeness_score: self.completeness_score,
            completeness_threshold: self.completeness_threshold,
            frustration_level: self.frustration_level,
            status: self.status,
            termination_reason: self.termination_reason,
            scam_detected: self.scam_detected,
            extracted_data: self.extracted_data.clone(),
        }
    }
}

pub(crate) fn duration_ms(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
#[path = "model_test.rs"]
mod tests;
