//! Prompt rendering for LLM-backed advisory agents.

use decoy_core::tracker::Sender;
use decoy_core::AdvisoryRequest;
use std::fmt::Write;

/// System prompt sent with every advisory request.
pub const ADVISORY_SYSTEM_PROMPT: &str = "\
You review an ongoing conversation between a scam-baiting agent and a suspected scammer. \
Decide whether the agent should end the engagement now.

Recommend ending when:
- SUCCESS / COMPLETE: enough actionable intelligence (payment details, links, phone numbers, \
the scammer's method) has been collected.
- SUSPICIOUS: the scammer suspects they are talking to a bot or an investigator.
- FRUSTRATION: the scammer is losing patience and is about to leave.
Otherwise answer CONTINUE.

Respond with a single JSON object and nothing else:
{\"shouldTerminate\": bool, \"reason\": \"CONTINUE|SUCCESS|SUSPICIOUS|FRUSTRATION|COMPLETE\", \
\"confidence\": number between 0 and 1, \"reasoning\": string, \"riskLevel\": \"LOW|MEDIUM|HIGH\"}";

/// Renders the user turn describing the session state.
pub fn render_advisory_prompt(request: &AdvisoryRequest) -> String {
    let stats = &request.stats;
    let mut out = String::new();
    let _ = writeln!(out, "Session: {}", request.session_id);
    let _ = writeln!(
        out,
        "Stats: {} scammer messages, {}s elapsed, completeness {}/100, frustration {}/100",
        stats.message_count,
        stats.duration_ms / 1000,
        stats.completeness_score,
        stats.frustration_level
    );

    let data = &request.extracted_data_snapshot;
    let _ = writeln!(out, "\nCollected intelligence:");
    let sections = [
        ("Scam types", &data.scam_type),
        ("Requested data", &data.requested_data),
        ("Attack methods", &data.attack_method),
        ("Techniques", &data.psychological_techniques),
        ("Links", &data.links),
        ("Phone numbers", &data.phone_numbers),
        ("Emails", &data.emails),
        ("Bank accounts", &data.bank_accounts),
        ("Payment handles", &data.payment_handles),
    ];
    for (label, values) in sections {
        if !values.is_empty() {
            let joined: Vec<&str> = values.iter().map(String::as_str).collect();
            let _ = writeln!(out, "- {label}: {}", joined.join(", "));
        }
    }
    if let Some(entity) = &data.impersonated_entity {
        let _ = writeln!(out, "- Impersonating: {entity}");
    }
    if data.is_empty() {
        let _ = writeln!(out, "- (nothing yet)");
    }

    let _ = writeln!(out, "\nRecent conversation:");
    for entry in &request.recent_history {
        let speaker = match entry.sender {
            Sender::Counterparty => "SCAMMER",
            Sender::Agent => "AGENT",
        };
        let _ = writeln!(out, "{speaker}: {}", entry.text);
    }
    out
}
