//! Intelligence data model.
//!
//! `ExtractedData` is the cumulative, set-valued record kept per session.
//! `ExtractionCandidates` is a single batch of values proposed for merging,
//! produced either by the local pattern extractor or by an external analyzer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Where a batch of candidate values came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntelSource {
    /// Local regex and keyword matching.
    Local,
    /// Upstream structured analysis (classifier or language model).
    External,
}

/// Cumulative intelligence captured for one session.
///
/// Every collection is a set: values are unique within a category and
/// categories only ever grow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedData {
    pub scam_type: BTreeSet<String>,
    pub requested_data: BTreeSet<String>,
    pub attack_method: BTreeSet<String>,
    pub psychological_techniques: BTreeSet<String>,
    pub phone_numbers: BTreeSet<String>,
    pub emails: BTreeSet<String>,
    pub links: BTreeSet<String>,
    pub bank_accounts: BTreeSet<String>,
    pub payment_handles: BTreeSet<String>,
    pub suspicious_keywords: BTreeSet<String>,
    pub key_phrases: BTreeSet<String>,
    pub impersonated_entity: Option<String>,
    /// Provenance of `impersonated_entity`, used to let an external
    /// analyzer correct a local guess.
    #[serde(skip)]
    pub(crate) impersonation_source: Option<IntelSource>,
}

impl ExtractedData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when nothing has been captured yet.
    pub fn is_empty(&self) -> bool {
        self.scam_type.is_empty()
            && self.requested_data.is_empty()
            && self.attack_method.is_empty()
            && self.psychological_techniques.is_empty()
            && self.phone_numbers.is_empty()
            && self.emails.is_empty()
            && self.links.is_empty()
            && self.bank_accounts.is_empty()
            && self.payment_handles.is_empty()
            && self.suspicious_keywords.is_empty()
            && self.key_phrases.is_empty()
            && self.impersonated_entity.is_none()
    }

    /// Source of the current impersonated-entity value, if any.
    pub fn impersonation_source(&self) -> Option<IntelSource> {
        self.impersonation_source
    }
}

/// A batch of candidate values awaiting merge into `ExtractedData`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionCandidates {
    pub source: IntelSource,
    pub scam_type: Vec<String>,
    pub requested_data: Vec<String>,
    pub attack_method: Vec<String>,
    pub psychological_techniques: Vec<String>,
    pub phone_numbers: Vec<String>,
    pub emails: Vec<String>,
    pub links: Vec<String>,
    pub bank_accounts: Vec<String>,
    pub payment_handles: Vec<String>,
    pub suspicious_keywords: Vec<String>,
    pub key_phrases: Vec<String>,
    pub impersonated_entity: Option<String>,
}

impl ExtractionCandidates {
    pub fn empty(source: IntelSource) -> Self {
        Self {
            source,
            scam_type: Vec::new(),
            requested_data: Vec::new(),
            attack_method: Vec::new(),
            psychological_techniques: Vec::new(),
            phone_numbers: Vec::new(),
            emails: Vec::new(),
            links: Vec::new(),
            bank_accounts: Vec::new(),
            payment_handles: Vec::new(),
            suspicious_keywords: Vec::new(),
            key_phrases: Vec::new(),
            impersonated_entity: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.scam_type.is_empty()
            && self.requested_data.is_empty()
            && self.attack_method.is_empty()
            && self.psychological_techniques.is_empty()
            && self.phone_numbers.is_empty()
            && self.emails.is_empty()
            && self.links.is_empty()
            && self.bank_accounts.is_empty()
            && self.payment_handles.is_empty()
            && self.suspicious_keywords.is_empty()
            && self.key_phrases.is_empty()
            && self.impersonated_entity.is_none()
    }
}
