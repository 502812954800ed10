//! Extraction merging.
//!
//! Folds candidate batches into a session's `ExtractedData` with set-union
//! semantics. Values are normalized first so that trivially different
//! spellings of the same identifier collapse into one entry.

use super::extractor::collapse_whitespace;
use super::model::{ExtractedData, ExtractionCandidates, IntelSource};
use std::collections::BTreeSet;

impl ExtractedData {
    /// Merges a candidate batch and returns how many new values were added.
    ///
    /// Merging the same batch twice is a no-op the second time.
    pub fn merge(&mut self, candidates: &ExtractionCandidates) -> usize {
        let mut added = 0;
        added += union(&mut self.scam_type, &candidates.scam_type, normalize_label);
        added += union(&mut self.requested_data, &candidates.requested_data, normalize_label);
        added += union(&mut self.attack_method, &candidates.attack_method, normalize_label);
        added += union(
            &mut self.psychological_techniques,
            &candidates.psychological_techniques,
            normalize_label,
        );
        added += union(&mut self.phone_numbers, &candidates.phone_numbers, normalize_phone);
        added += union(&mut self.emails, &candidates.emails, normalize_lower);
        added += union(&mut self.links, &candidates.links, normalize_link);
        added += union(&mut self.bank_accounts, &candidates.bank_accounts, normalize_account);
        added += union(&mut self.payment_handles, &candidates.payment_handles, normalize_lower);
        added += union(
            &mut self.suspicious_keywords,
            &candidates.suspicious_keywords,
            normalize_phrase,
        );
        added += union(&mut self.key_phrases, &candidates.key_phrases, normalize_phrase);

        if let Some(entity) = candidates.impersonated_entity.as_deref().and_then(normalize_entity) {
            if self.accept_entity(&entity, candidates.source) {
                self.impersonated_entity = Some(entity);
                self.impersonation_source = Some(candidates.source);
                added += 1;
            }
        }

        added
    }

    /// Decides whether a newly detected entity replaces the current one.
    ///
    /// An empty slot always accepts. An external analyzer may correct a
    /// value that came from local matching; otherwise the first value sticks.
    fn accept_entity(&self, entity: &str, source: IntelSource) -> bool {
        match (&self.impersonated_entity, self.impersonation_source) {
            (None, _) => true,
            (Some(current), _) if current.eq_ignore_ascii_case(entity) => false,
            (Some(_), Some(IntelSource::Local)) => source == IntelSource::External,
            (Some(_), _) => false,
        }
    }
}

fn union(
    target: &mut BTreeSet<String>,
    values: &[String],
    normalize: fn(&str) -> Option<String>,
) -> usize {
    values
        .iter()
        .filter_map(|value| normalize(value))
        .filter(|value| target.insert(value.clone()))
        .count()
}

/// `"psychological pressure"` → `"PSYCHOLOGICAL_PRESSURE"`.
pub fn normalize_label(raw: &str) -> Option<String> {
    let mut label = String::with_capacity(raw.len());
    for c in raw.trim().chars() {
        if c.is_alphanumeric() {
            label.extend(c.to_uppercase());
        } else if !label.ends_with('_') {
            label.push('_');
        }
    }
    let label = label.trim_matches('_');
    (!label.is_empty()).then(|| label.to_string())
}

fn normalize_phone(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
    if digits.len() < 7 {
        return None;
    }
    Some(if trimmed.starts_with('+') {
        format!("+{digits}")
    } else {
        digits
    })
}

fn normalize_account(raw: &str) -> Option<String> {
    let account: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .flat_map(char::to_uppercase)
        .collect();
    (!account.is_empty()).then_some(account)
}

fn normalize_lower(raw: &str) -> Option<String> {
    let value = raw.trim().to_lowercase();
    (!value.is_empty()).then_some(value)
}

fn normalize_link(raw: &str) -> Option<String> {
    let link = raw
        .trim()
        .trim_start_matches(['(', '<', '[', '"', '\''])
        .trim_end_matches(['.', ',', ';', ':', '!', '?', ')', '>', ']', '"', '\'']);
    (!link.is_empty()).then(|| link.to_string())
}

fn normalize_phrase(raw: &str) -> Option<String> {
    let phrase = collapse_whitespace(&raw.to_lowercase());
    (!phrase.is_empty()).then_some(phrase)
}

fn normalize_entity(raw: &str) -> Option<String> {
    let entity = collapse_whitespace(raw);
    (!entity.is_empty()).then_some(entity)
}
