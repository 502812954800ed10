//! Final report synthesis.

use crate::intel::ExtractedData;
use crate::intel::lexicon::HIGH_SEVERITY_SCAM_TYPES;
use crate::termination::TerminationReason;
use crate::tracker::SessionTracker;
use crate::tracker::model::duration_ms;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};
use uuid::Uuid;

/// Threat classification of a completed session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, AsRefStr,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Classifies captured intelligence.
    ///
    /// A high-severity scam type with a captured link is `Critical`, without
    /// one `High`. Any other scam type is `Medium`; no scam type is `Low`.
    pub fn classify(data: &ExtractedData) -> Self {
        let high_severity = data
            .scam_type
            .iter()
            .any(|t| HIGH_SEVERITY_SCAM_TYPES.contains(&t.as_str()));
        match (high_severity, data.links.is_empty()) {
            (true, false) => Self::Critical,
            (true, true) => Self::High,
            _ if !data.scam_type.is_empty() => Self::Medium,
            _ => Self::Low,
        }
    }
}

/// Conversation figures at termination time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub message_count: u32,
    pub agent_message_count: u32,
    pub duration_ms: u64,
    pub completeness_score: u8,
    pub completeness_threshold: u8,
    pub frustration_level: u8,
    pub scam_detected: bool,
}

/// Terminal artifact of a completed session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub report_id: Uuid,
    pub session_id: String,
    pub termination_reason: TerminationReason,
    pub termination_description: String,
    pub severity: Severity,
    pub summary: ReportSummary,
    pub extracted_data: ExtractedData,
    pub recommendations: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl Report {
    /// Builds the report from a tracker's current state.
    pub(crate) fn generate(tracker: &SessionTracker, now: DateTime<Utc>) -> Self {
        let reason = tracker
            .termination_reason()
            .unwrap_or(TerminationReason::Unknown);
        let data = tracker.extracted_data().clone();
        Self {
            report_id: Uuid::new_v4(),
            session_id: tracker.id().to_string(),
            termination_reason: reason,
            termination_description: reason.description().to_string(),
            severity: Severity::classify(&data),
            summary: ReportSummary {
                message_count: tracker.message_count(),
                agent_message_count: tracker.agent_message_count(),
                duration_ms: duration_ms(tracker.duration(now)),
                completeness_score: tracker.completeness_score(),
                completeness_threshold: tracker.completeness_threshold(),
                frustration_level: tracker.frustration_level(),
                scam_detected: tracker.scam_detected(),
            },
            recommendations: recommendations(&data),
            extracted_data: data,
            generated_at: now,
        }
    }
}

/// Recommended follow-up actions, one per non-empty category.
pub fn recommendations(data: &ExtractedData) -> Vec<String> {
    let mut actions = Vec::new();
    if !data.links.is_empty() {
        actions.push(format!(
            "Report {} captured domain(s) to registrars and browser blocklists",
            data.links.len()
        ));
    }
    if !data.phone_numbers.is_empty() {
        actions.push(format!(
            "Report {} phone number(s) to the fraud reporting hotline",
            data.phone_numbers.len()
        ));
    }
    if !data.bank_accounts.is_empty() {
        actions.push("Flag captured bank accounts with the issuing banks".to_string());
    }
    if !data.payment_handles.is_empty() {
        actions.push("Report payment handles to their payment providers".to_string());
    }
    if !data.emails.is_empty() {
        actions.push("Forward email addresses to the mail providers' abuse desks".to_string());
    }
    if let Some(entity) = &data.impersonated_entity {
        actions.push(format!("Notify {entity} that it is being impersonated"));
    }
    if !data.requested_data.is_empty() {
        let requested: Vec<&str> = data.requested_data.iter().map(String::as_str).collect();
        actions.push(format!(
            "Warn users never to share: {}",
            requested.join(", ")
        ));
    }
    if actions.is_empty() {
        actions.push("Archive the transcript for manual review".to_string());
    }
    actions
}
