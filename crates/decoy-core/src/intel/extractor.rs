//! Local pattern extraction.
//!
//! A pure function from message text to candidate intelligence. Structured
//! identifiers are pulled out in a fixed order (emails, payment handles,
//! links, phone numbers, bank/card numbers) and each match is blanked out of
//! the working text before the next pass, so a value is only ever claimed by
//! one category. Keyword classification runs last, on the blanked text.

use super::lexicon::{
    self, Rule, ATTACK_METHOD_RULES, IMPERSONATED_ENTITIES, KEY_PHRASES, PSYCHOLOGICAL_RULES,
    REQUESTED_DATA_RULES, SCAM_TYPE_RULES, SUSPICIOUS_KEYWORDS,
};
use super::model::{ExtractionCandidates, IntelSource};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::ops::Range;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b[a-z0-9._%+-]+@[a-z0-9-]+(?:\.[a-z0-9-]+)*\.[a-z]{2,}\b")
        .expect("email pattern is valid")
});

static PAYMENT_HANDLE_RE: Lazy<Regex> = Lazy::new(|| {
    let providers = lexicon::PAYMENT_PROVIDERS.join("|");
    Regex::new(&format!(r"(?i)\b[a-z0-9._-]{{2,}}@(?:{providers})\b"))
        .expect("payment handle pattern is valid")
});

static SCHEMED_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bhttps?://[^\s<>"']+"#).expect("url pattern is valid")
});

static WWW_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bwww\.[^\s<>"']+"#).expect("www pattern is valid")
});

static BARE_DOMAIN_RE: Lazy<Regex> = Lazy::new(|| {
    let tlds = lexicon::LINK_TLDS.join("|");
    Regex::new(&format!(
        r#"(?i)\b(?:[a-z0-9](?:[a-z0-9-]{{0,61}}[a-z0-9])?\.)+(?:{tlds})\b(?:/[^\s<>"']*)?"#
    ))
    .expect("domain pattern is valid")
});

static PHONE_INTL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\+[0-9]{1,3}(?:[\s-]?[0-9]){8,12}\b")
        .expect("international phone pattern is valid")
});

static PHONE_LOCAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:[0-9]{10}|[0-9]{3}[\s-][0-9]{3}[\s-][0-9]{4}|[0-9]{5}[\s-][0-9]{5})\b")
        .expect("local phone pattern is valid")
});

/// Contiguous 9-18 digit runs, or card-style groups of four.
static ACCOUNT_NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:[0-9]{9,18}|[0-9]{4}(?:[ -][0-9]{4}){2,3})\b")
        .expect("account number pattern is valid")
});

static SCAM_TYPE_MATCHERS: Lazy<Vec<(&'static str, Regex)>> =
    Lazy::new(|| compile_rules(SCAM_TYPE_RULES));
static PSYCHOLOGICAL_MATCHERS: Lazy<Vec<(&'static str, Regex)>> =
    Lazy::new(|| compile_rules(PSYCHOLOGICAL_RULES));
static REQUESTED_DATA_MATCHERS: Lazy<Vec<(&'static str, Regex)>> =
    Lazy::new(|| compile_rules(REQUESTED_DATA_RULES));
static ATTACK_METHOD_MATCHERS: Lazy<Vec<(&'static str, Regex)>> =
    Lazy::new(|| compile_rules(ATTACK_METHOD_RULES));
static ENTITY_MATCHERS: Lazy<Vec<(&'static str, Regex)>> =
    Lazy::new(|| compile_rules(IMPERSONATED_ENTITIES));
static KEYWORD_MATCHERS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    SUSPICIOUS_KEYWORDS
        .iter()
        .map(|keyword| (*keyword, term_regex(&[keyword])))
        .collect()
});

/// Builds one case-insensitive matcher per rule. Terms are delimited by
/// non-alphanumeric characters rather than `\b`, since some terms end in
/// punctuation.
fn compile_rules(rules: &[Rule]) -> Vec<(&'static str, Regex)> {
    rules
        .iter()
        .map(|(label, terms)| (*label, term_regex(terms)))
        .collect()
}

fn term_regex(terms: &[&str]) -> Regex {
    let alternation = terms
        .iter()
        .map(|term| regex::escape(term))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)(?:^|[^a-z0-9])(?:{alternation})(?:$|[^a-z0-9])"))
        .expect("lexicon terms are escaped")
}

/// Stateless extractor over the built-in pattern tables.
#[derive(Debug, Default, Clone, Copy)]
pub struct PatternExtractor;

impl PatternExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extracts candidate intelligence from a single message.
    ///
    /// Identical input always produces identical output.
    pub fn extract(&self, text: &str) -> ExtractionCandidates {
        let mut candidates = ExtractionCandidates::empty(IntelSource::Local);
        let mut working = text.to_string();

        // Emails first; a handle like `name@sbi` is a prefix of `name@sbi.co.in`.
        for range in find_all(&EMAIL_RE, &working) {
            candidates.emails.push(working[range.clone()].to_string());
            blank(&mut working, range);
        }

        for range in find_all(&PAYMENT_HANDLE_RE, &working) {
            if continues_as_domain(&working, range.end) {
                continue;
            }
            candidates.payment_handles.push(working[range.clone()].to_string());
            blank(&mut working, range);
        }

        for pattern in [&*SCHEMED_URL_RE, &*WWW_URL_RE, &*BARE_DOMAIN_RE] {
            for range in find_all(pattern, &working) {
                let link = trim_link(&working[range.clone()]);
                if !link.is_empty() {
                    candidates.links.push(link.to_string());
                }
                blank(&mut working, range);
            }
        }

        // Phone numbers claim their digit runs before account-number matching.
        let mut phone_digits: HashSet<String> = HashSet::new();
        for pattern in [&*PHONE_INTL_RE, &*PHONE_LOCAL_RE] {
            for range in find_all(pattern, &working) {
                let raw = &working[range.clone()];
                let digits = digits_of(raw);
                if !(10..=15).contains(&digits.len()) {
                    continue;
                }
                let normalized = if raw.starts_with('+') {
                    format!("+{digits}")
                } else {
                    digits.clone()
                };
                candidates.phone_numbers.push(normalized);
                phone_digits.insert(digits);
                blank(&mut working, range);
            }
        }

        for range in find_all(&ACCOUNT_NUMBER_RE, &working) {
            let digits = digits_of(&working[range.clone()]);
            if digits.is_empty() || phone_digits.contains(&digits) {
                continue;
            }
            candidates.bank_accounts.push(digits);
            blank(&mut working, range);
        }

        classify(&working, &mut candidates);
        candidates
    }
}

fn classify(text: &str, candidates: &mut ExtractionCandidates) {
    candidates.scam_type = matching_labels(&SCAM_TYPE_MATCHERS, text);
    candidates.psychological_techniques = matching_labels(&PSYCHOLOGICAL_MATCHERS, text);
    candidates.requested_data = matching_labels(&REQUESTED_DATA_MATCHERS, text);
    candidates.suspicious_keywords = matching_labels(&KEYWORD_MATCHERS, text);

    let mut methods = matching_labels(&ATTACK_METHOD_MATCHERS, text);
    let mut imply = |label: &str, present: bool| {
        if present && !methods.iter().any(|m| m == label) {
            methods.push(label.to_string());
        }
    };
    imply("PHISHING_LINK", !candidates.links.is_empty());
    imply("CALL_REQUEST", !candidates.phone_numbers.is_empty());
    imply(
        "PAYMENT_REQUEST",
        !candidates.payment_handles.is_empty() || !candidates.bank_accounts.is_empty(),
    );
    candidates.attack_method = methods;

    candidates.impersonated_entity = ENTITY_MATCHERS
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(name, _)| name.to_string());

    let lowered = collapse_whitespace(&text.to_lowercase());
    candidates.key_phrases = KEY_PHRASES
        .iter()
        .filter(|phrase| lowered.contains(*phrase))
        .map(|phrase| phrase.to_string())
        .collect();
}

fn matching_labels(matchers: &[(&'static str, Regex)], text: &str) -> Vec<String> {
    matchers
        .iter()
        .filter(|(_, re)| re.is_match(text))
        .map(|(label, _)| label.to_string())
        .collect()
}

fn find_all(pattern: &Regex, text: &str) -> Vec<Range<usize>> {
    pattern.find_iter(text).map(|m| m.range()).collect()
}

/// Overwrites a matched span with spaces of equal byte length.
fn blank(text: &mut String, range: Range<usize>) {
    let filler = " ".repeat(range.len());
    text.replace_range(range, &filler);
}

/// True when a `user@provider` match is followed by `.tld`, i.e. it is
/// really the start of an email address.
fn continues_as_domain(text: &str, end: usize) -> bool {
    let mut rest = text[end..].chars();
    matches!(
        (rest.next(), rest.next()),
        (Some('.'), Some(c)) if c.is_ascii_alphanumeric()
    )
}

fn trim_link(raw: &str) -> &str {
    raw.trim_end_matches(['.', ',', ';', ':', '!', '?', ')', ']', '}', '\'', '"'])
}

fn digits_of(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> ExtractionCandidates {
        PatternExtractor::new().extract(text)
    }

    #[test]
    fn test_otp_urgency_message() {
        let c = extract("Send your OTP code now, urgent!");
        assert!(c.scam_type.contains(&"OTP_THEFT".to_string()));
        assert!(c.psychological_techniques.contains(&"URGENCY".to_string()));
        assert!(c.requested_data.contains(&"OTP".to_string()));
        assert!(c.attack_method.contains(&"CREDENTIAL_REQUEST".to_string()));
        assert!(c.links.is_empty());
        assert_eq!(c.source, IntelSource::Local);
    }

    #[test]
    fn test_links_of_all_shapes() {
        let c = extract(
            "Visit https://secure-sbi.example.com/login, or www.kyc-update.in or refund-claim.xyz/form now.",
        );
        assert!(c.links.contains(&"https://secure-sbi.example.com/login".to_string()));
        assert!(c.links.contains(&"www.kyc-update.in".to_string()));
        assert!(c.links.contains(&"refund-claim.xyz/form".to_string()));
        assert_eq!(c.links.len(), 3);
        assert!(c.attack_method.contains(&"PHISHING_LINK".to_string()));
    }

    #[test]
    fn test_unknown_tld_is_not_a_link() {
        let c = extract("the file is named report.final and config.toml");
        assert!(c.links.is_empty());
    }

    #[test]
    fn test_email_and_payment_handle_are_distinct() {
        let c = extract("Pay to refund.desk@ybl or mail support@sbi.co.in");
        assert_eq!(c.payment_handles, vec!["refund.desk@ybl".to_string()]);
        assert_eq!(c.emails, vec!["support@sbi.co.in".to_string()]);
        // The email domain must not resurface as a bare link.
        assert!(c.links.is_empty());
        assert!(c.attack_method.contains(&"PAYMENT_REQUEST".to_string()));
    }

    #[test]
    fn test_phone_formats() {
        let c = extract("Call +91 98765 43210 or 9123456780 or 555-123-4567");
        assert!(c.phone_numbers.contains(&"+919876543210".to_string()));
        assert!(c.phone_numbers.contains(&"9123456780".to_string()));
        assert!(c.phone_numbers.contains(&"5551234567".to_string()));
        assert!(c.bank_accounts.is_empty());
        assert!(c.attack_method.contains(&"CALL_REQUEST".to_string()));
    }

    #[test]
    fn test_card_number_is_bank_account() {
        let c = extract("Card 4111 1111 1111 1111 has been blocked");
        assert_eq!(c.bank_accounts, vec!["4111111111111111".to_string()]);
        assert!(c.phone_numbers.is_empty());
    }

    #[test]
    fn test_phone_takes_precedence_over_account() {
        let c = extract("My number is 9876543210, account 9876543210 also works");
        assert_eq!(c.phone_numbers.len(), 2);
        assert!(c.bank_accounts.is_empty());
    }

    #[test]
    fn test_account_number_alongside_phone() {
        let c = extract("Transfer to account 123456789012 and call 9876543210");
        assert_eq!(c.bank_accounts, vec!["123456789012".to_string()]);
        assert_eq!(c.phone_numbers, vec!["9876543210".to_string()]);
        assert!(c.scam_type.contains(&"FINANCIAL_FRAUD".to_string()));
    }

    #[test]
    fn test_separated_amounts_are_not_an_account() {
        let c = extract("Prices went 500 200 100 and then 1000 last week");
        assert!(c.bank_accounts.is_empty());
        assert!(!c.attack_method.contains(&"PAYMENT_REQUEST".to_string()));

        let grouped = extract("Account 1234-5678-9012 is frozen");
        assert_eq!(grouped.bank_accounts, vec!["123456789012".to_string()]);
    }

    #[test]
    fn test_non_ascii_digits_are_ignored() {
        // Devanagari digits.
        let c = extract("call \u{96f}\u{96e}\u{96d}\u{96c}\u{96b}\u{96a}\u{969}\u{968}\u{967}\u{966} now");
        assert!(c.phone_numbers.is_empty());
        assert!(c.bank_accounts.is_empty());
        assert!(!c.attack_method.contains(&"PAYMENT_REQUEST".to_string()));
    }

    #[test]
    fn test_account_sharing_phone_suffix_is_kept() {
        let c = extract("Call 9876543210, account 00009876543210 is ready");
        assert_eq!(c.phone_numbers, vec!["9876543210".to_string()]);
        assert_eq!(c.bank_accounts, vec!["00009876543210".to_string()]);
    }

    #[test]
    fn test_impersonated_entity_and_key_phrase() {
        let c = extract("This is SBI head office. Your  account will be blocked today.");
        assert_eq!(c.impersonated_entity.as_deref(), Some("SBI"));
        assert!(c.key_phrases.contains(&"account will be blocked".to_string()));
        assert!(c.psychological_techniques.contains(&"FEAR".to_string()));
    }

    #[test]
    fn test_handle_provider_does_not_imply_entity() {
        let c = extract("send to winner123@paytm");
        assert_eq!(c.payment_handles.len(), 1);
        assert!(c.impersonated_entity.is_none());
    }

    #[test]
    fn test_word_boundaries() {
        // "pin" inside "spinning" and "now" inside "know" must not match.
        let c = extract("I know the spinning wheel");
        assert!(c.requested_data.is_empty());
        assert!(c.psychological_techniques.is_empty());
    }

    #[test]
    fn test_benign_text_is_empty() {
        assert!(extract("Hi, how was your weekend?").is_empty());
        assert!(extract("").is_empty());
    }

    #[test]
    fn test_extraction_is_pure() {
        let text = "URGENT: pay 499 processing fee to claim@okaxis, visit bit.ly/x1";
        assert_eq!(extract(text), extract(text));
    }
}
