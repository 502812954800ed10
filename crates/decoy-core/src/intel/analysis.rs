//! Structured analysis supplied by an upstream classifier.
//!
//! The payload is untrusted: any field may be missing, `null`, a bare
//! string where a list is expected, or a list containing non-strings.
//! Deserialization never fails on shape; only non-JSON text does, and
//! [`StructuredAnalysis::from_json_str`] swallows that too.

use super::model::{ExtractionCandidates, IntelSource};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Top-level analysis object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StructuredAnalysis {
    #[serde(deserialize_with = "lenient_list")]
    pub scam_types: Vec<String>,
    #[serde(deserialize_with = "lenient_bool")]
    pub is_scam: bool,
    #[serde(deserialize_with = "lenient_list")]
    pub psychological_techniques: Vec<String>,
    #[serde(deserialize_with = "lenient_extraction")]
    pub extraction: AnalysisExtraction,
}

/// Entity extraction block of the analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisExtraction {
    #[serde(deserialize_with = "lenient_list")]
    pub links: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub phone_numbers: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub emails: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub bank_accounts: Vec<String>,
    #[serde(alias = "upiIds", deserialize_with = "lenient_list")]
    pub payment_handles: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub suspicious_keywords: Vec<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub impersonated_entity: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub requested_data: Vec<String>,
    /// A single label or a list; folded into the session's scam types.
    #[serde(deserialize_with = "lenient_list")]
    pub scam_type: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub attack_method: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub key_phrases: Vec<String>,
}

impl StructuredAnalysis {
    /// Parses analysis JSON, degrading to an empty analysis on any error.
    pub fn from_json_str(text: &str) -> Self {
        match serde_json::from_str(text) {
            Ok(analysis) => analysis,
            Err(e) => {
                tracing::warn!("[StructuredAnalysis] Ignoring malformed analysis: {}", e);
                Self::default()
            }
        }
    }

    /// Converts an arbitrary JSON value, degrading to empty on mismatch.
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_else(|e| {
            tracing::warn!("[StructuredAnalysis] Ignoring malformed analysis: {}", e);
            Self::default()
        })
    }

    /// Whether the analyzer flagged the message as a scam.
    pub fn indicates_scam(&self) -> bool {
        self.is_scam || !self.scam_types.is_empty() || !self.extraction.scam_type.is_empty()
    }

    /// Flattens the analysis into candidates for the merger.
    pub fn to_candidates(&self) -> ExtractionCandidates {
        let extraction = &self.extraction;
        let mut candidates = ExtractionCandidates::empty(IntelSource::External);
        candidates.scam_type = self
            .scam_types
            .iter()
            .chain(extraction.scam_type.iter())
            .cloned()
            .collect();
        candidates.psychological_techniques = self.psychological_techniques.clone();
        candidates.requested_data = extraction.requested_data.clone();
        candidates.attack_method = extraction.attack_method.clone();
        candidates.phone_numbers = extraction.phone_numbers.clone();
        candidates.emails = extraction.emails.clone();
        candidates.links = extraction.links.clone();
        candidates.bank_accounts = extraction.bank_accounts.clone();
        candidates.payment_handles = extraction.payment_handles.clone();
        candidates.suspicious_keywords = extraction.suspicious_keywords.clone();
        candidates.key_phrases = extraction.key_phrases.clone();
        candidates.impersonated_entity = extraction.impersonated_entity.clone();
        candidates
    }
}

fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items.into_iter().filter_map(scalar_to_string).collect(),
        Some(other) => scalar_to_string(other).into_iter().collect(),
        None => Vec::new(),
    })
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(scalar_to_string))
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => b,
        Some(Value::String(s)) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "yes"),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        _ => false,
    })
}

fn lenient_extraction<'de, D>(deserializer: D) -> Result<AnalysisExtraction, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(value @ Value::Object(_)) => serde_json::from_value(value).unwrap_or_default(),
        _ => AnalysisExtraction::default(),
    })
}

fn scalar_to_string(value: Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_payload() {
        let analysis = StructuredAnalysis::from_value(json!({
            "scamTypes": ["FINANCIAL_FRAUD"],
            "isScam": true,
            "psychologicalTechniques": ["URGENCY", "FEAR"],
            "extraction": {
                "links": ["http://sbi-kyc.top"],
                "phoneNumbers": ["+91 98765 43210"],
                "upiIds": ["fraud@ybl"],
                "impersonatedEntity": "SBI",
                "requestedData": ["OTP"],
                "scamType": "KYC_FRAUD"
            }
        }));
        assert!(analysis.is_scam);
        assert_eq!(analysis.extraction.payment_handles, vec!["fraud@ybl"]);

        let candidates = analysis.to_candidates();
        assert_eq!(candidates.source, IntelSource::External);
        assert_eq!(candidates.scam_type, vec!["FINANCIAL_FRAUD", "KYC_FRAUD"]);
        assert_eq!(candidates.impersonated_entity.as_deref(), Some("SBI"));
    }

    #[test]
    fn test_missing_and_null_fields_are_empty() {
        let analysis = StructuredAnalysis::from_value(json!({
            "scamTypes": null,
            "extraction": { "links": null, "emails": "solo@example.com", "bankAccounts": [123456789012u64, null, ""] }
        }));
        assert!(analysis.scam_types.is_empty());
        assert!(!analysis.is_scam);
        assert!(analysis.extraction.links.is_empty());
        assert_eq!(analysis.extraction.emails, vec!["solo@example.com"]);
        assert_eq!(analysis.extraction.bank_accounts, vec!["123456789012"]);
    }

    #[test]
    fn test_extraction_of_wrong_shape_is_ignored() {
        let analysis = StructuredAnalysis::from_value(json!({
            "isScam": "yes",
            "extraction": "not an object"
        }));
        assert!(analysis.is_scam);
        assert_eq!(analysis.extraction, AnalysisExtraction::default());
    }

    #[test]
    fn test_non_json_degrades_to_default() {
        assert_eq!(
            StructuredAnalysis::from_json_str("<html>502</html>"),
            StructuredAnalysis::default()
        );
        assert_eq!(StructuredAnalysis::from_value(json!([1, 2])), StructuredAnalysis::default());
    }

    #[test]
    fn test_indicates_scam() {
        assert!(!StructuredAnalysis::default().indicates_scam());
        let analysis = StructuredAnalysis {
            scam_types: vec!["LOTTERY_SCAM".to_string()],
            ..Default::default()
        };
        assert!(analysis.indicates_scam());
    }
}
