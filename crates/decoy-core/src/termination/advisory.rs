//! Advisory decision service contract.
//!
//! The advisory service is an external collaborator that reviews a session
//! and recommends whether to keep engaging. It is untrusted and unreliable:
//! responses are parsed leniently and every failure means "no decision".

use crate::error::{DecoyError, Result};
use crate::intel::ExtractedData;
use crate::tracker::HistoryEntry;
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Session statistics sent alongside the history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisoryStats {
    pub message_count: u32,
    pub duration_ms: u64,
    pub completeness_score: u8,
    pub frustration_level: u8,
}

/// Request payload for the advisory service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisoryRequest {
    pub session_id: String,
    pub recent_history: Vec<HistoryEntry>,
    pub extracted_data_snapshot: ExtractedData,
    pub stats: AdvisoryStats,
}

/// Recommendation category returned by the advisory service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdvisoryVerdict {
    #[default]
    Continue,
    Success,
    Suspicious,
    Frustration,
    Complete,
}

impl AdvisoryVerdict {
    fn from_loose(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "SUCCESS" => Self::Success,
            "SUSPICIOUS" => Self::Suspicious,
            "FRUSTRATION" | "FRUSTRATED" => Self::Frustration,
            "COMPLETE" | "COMPLETED" => Self::Complete,
            _ => Self::Continue,
        }
    }
}

/// Response from the advisory service. Missing fields default to a
/// non-terminating, zero-confidence recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct AdvisoryResponse {
    #[serde(deserialize_with = "loose_bool")]
    pub should_terminate: bool,
    #[serde(deserialize_with = "loose_verdict")]
    pub reason: AdvisoryVerdict,
    /// Normalized to [0, 1]; values above 1 are read as percentages.
    #[serde(deserialize_with = "loose_confidence")]
    pub confidence: f64,
    #[serde(deserialize_with = "loose_text")]
    pub reasoning: String,
    #[serde(deserialize_with = "loose_optional_text")]
    pub risk_level: Option<String>,
}

impl AdvisoryResponse {
    /// A plain "keep going" recommendation.
    pub fn continue_engagement() -> Self {
        Self::default()
    }

    /// Parses a response body that should contain a JSON object.
    ///
    /// Tolerates surrounding prose and markdown code fences, which language
    /// models routinely add. Fails only when no JSON object can be found.
    pub fn parse_lenient(text: &str) -> Result<Self> {
        let start = text.find('{');
        let end = text.rfind('}');
        let body = match (start, end) {
            (Some(start), Some(end)) if start < end => &text[start..=end],
            _ => {
                return Err(DecoyError::advisory(format!(
                    "response contains no JSON object: {}",
                    truncate(text, 120)
                )));
            }
        };
        let value: Value = serde_json::from_str(body)
            .map_err(|e| DecoyError::advisory(format!("malformed advisory JSON: {e}")))?;
        if !value.is_object() {
            return Err(DecoyError::advisory("advisory response is not an object"));
        }
        serde_json::from_value(value)
            .map_err(|e| DecoyError::advisory(format!("unexpected advisory shape: {e}")))
    }
}

/// An external service that recommends whether a session should end.
#[async_trait]
pub trait AdvisoryService: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Requests a recommendation. Implementations should not retry
    /// internally; the engine applies its own timeout.
    async fn recommend(&self, request: &AdvisoryRequest) -> Result<AdvisoryResponse>;
}

/// Advisory stand-in used when no service is configured.
pub struct NoOpAdvisoryService;

#[async_trait]
impl AdvisoryService for NoOpAdvisoryService {
    fn name(&self) -> &str {
        "noop"
    }

    async fn recommend(&self, _request: &AdvisoryRequest) -> Result<AdvisoryResponse> {
        Ok(AdvisoryResponse::continue_engagement())
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

fn loose_bool<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<bool, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::Bool(b)) => b,
        Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    })
}

fn loose_verdict<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<AdvisoryVerdict, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::String(s)) => AdvisoryVerdict::from_loose(&s),
        _ => AdvisoryVerdict::Continue,
    })
}

fn loose_confidence<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<f64, D::Error> {
    let raw = match Option::<Value>::deserialize(d)? {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().trim_end_matches('%').parse().unwrap_or(0.0),
        _ => 0.0,
    };
    let scaled = if raw > 1.0 { raw / 100.0 } else { raw };
    Ok(if scaled.is_finite() { scaled.clamp(0.0, 1.0) } else { 0.0 })
}

fn loose_text<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    Ok(loose_optional_text(d)?.unwrap_or_default())
}

fn loose_optional_text<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Null) | None => None,
        Some(other) => Some(other.to_string()),
    })
}
