//! Outbound result payload for an external sink.
//!
//! Transport is out of scope; this module only shapes the JSON.

use crate::report::Report;
use crate::tracker::{SessionTracker, TrackerStatus};
use serde::{Deserialize, Serialize};

/// Identifiers a downstream system can act on directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedIntelligence {
    pub bank_accounts: Vec<String>,
    pub payment_handles: Vec<String>,
    pub phishing_links: Vec<String>,
    pub phone_numbers: Vec<String>,
    pub emails: Vec<String>,
    pub suspicious_keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackPayload {
    pub session_id: String,
    pub scam_detected: bool,
    /// Messages from both sides.
    pub total_messages_exchanged: u32,
    pub extracted_intelligence: ExtractedIntelligence,
    pub agent_notes: String,
    pub status: TrackerStatus,
    pub termination_reason: Option<String>,
    pub final_report: Option<Report>,
}

impl CallbackPayload {
    pub fn from_tracker(tracker: &SessionTracker) -> Self {
        let data = tracker.extracted_data();
        let to_vec = |set: &std::collections::BTreeSet<String>| set.iter().cloned().collect();
        Self {
            session_id: tracker.id().to_string(),
            scam_detected: tracker.scam_detected(),
            total_messages_exchanged: tracker.message_count() + tracker.agent_message_count(),
            extracted_intelligence: ExtractedIntelligence {
                bank_accounts: to_vec(&data.bank_accounts),
                payment_handles: to_vec(&data.payment_handles),
                phishing_links: to_vec(&data.links),
                phone_numbers: to_vec(&data.phone_numbers),
                emails: to_vec(&data.emails),
                suspicious_keywords: to_vec(&data.suspicious_keywords),
            },
            agent_notes: agent_notes(tracker),
            status: tracker.status(),
            termination_reason: tracker.termination_reason().map(|r| r.code().to_string()),
            final_report: tracker.final_report().map(|r| (*r).clone()),
        }
    }
}

/// One-paragraph operator summary of what the session revealed.
fn agent_notes(tracker: &SessionTracker) -> String {
    let data = tracker.extracted_data();
    let mut notes = Vec::new();

    if !data.scam_type.is_empty() {
        notes.push(format!("Scam type: {}.", join(&data.scam_type)));
    }
    if !data.psychological_techniques.is_empty() {
        notes.push(format!("Tactics: {}.", join(&data.psychological_techniques)));
    }
    if let Some(entity) = &data.impersonated_entity {
        notes.push(format!("Impersonated {entity}."));
    }
    if !data.requested_data.is_empty() {
        notes.push(format!("Requested: {}.", join(&data.requested_data)));
    }

    let channels = [
        (data.links.len(), "link"),
        (data.phone_numbers.len(), "phone number"),
        (data.emails.len(), "email"),
        (data.bank_accounts.len(), "bank account"),
        (data.payment_handles.len(), "payment handle"),
    ];
    let captured: Vec<String> = channels
        .iter()
        .filter(|(count, _)| *count > 0)
        .map(|(count, label)| format!("{count} {label}{}", if *count == 1 { "" } else { "s" }))
        .collect();
    if !captured.is_empty() {
        notes.push(format!("Captured {}.", captured.join(", ")));
    }

    match tracker.termination_reason() {
        Some(reason) => notes.push(format!("{}.", reason.description())),
        None => notes.push("Engagement ongoing.".to_string()),
    }

    if notes.len() == 1 && !tracker.scam_detected() {
        notes.insert(0, "No scam indicators observed.".to_string());
    }
    notes.join(" ")
}

fn join(values: &std::collections::BTreeSet<String>) -> String {
    values.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}
