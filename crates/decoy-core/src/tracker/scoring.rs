//! Completeness scoring.
//!
//! Required categories carry 80 points, bonus categories 20. A category
//! scores its full weight when it holds at least one value.

use crate::intel::ExtractedData;

pub const WEIGHT_SCAM_TYPE: u32 = 25;
pub const WEIGHT_REQUESTED_DATA: u32 = 20;
pub const WEIGHT_ATTACK_METHOD: u32 = 20;
pub const WEIGHT_PSYCHOLOGICAL_TECHNIQUES: u32 = 15;
pub const WEIGHT_IMPERSONATED_ENTITY: u32 = 5;
pub const WEIGHT_PHONE_NUMBERS: u32 = 5;
pub const WEIGHT_EMAILS: u32 = 5;
pub const WEIGHT_LINKS: u32 = 5;

const TOTAL_WEIGHT: u32 = WEIGHT_SCAM_TYPE
    + WEIGHT_REQUESTED_DATA
    + WEIGHT_ATTACK_METHOD
    + WEIGHT_PSYCHOLOGICAL_TECHNIQUES
    + WEIGHT_IMPERSONATED_ENTITY
    + WEIGHT_PHONE_NUMBERS
    + WEIGHT_EMAILS
    + WEIGHT_LINKS;

/// Computes the 0–100 completeness score from scratch.
pub fn completeness_score(data: &ExtractedData) -> u8 {
    let categories = [
        (!data.scam_type.is_empty(), WEIGHT_SCAM_TYPE),
        (!data.requested_data.is_empty(), WEIGHT_REQUESTED_DATA),
        (!data.attack_method.is_empty(), WEIGHT_ATTACK_METHOD),
        (
            !data.psychological_techniques.is_empty(),
            WEIGHT_PSYCHOLOGICAL_TECHNIQUES,
        ),
        (data.impersonated_entity.is_some(), WEIGHT_IMPERSONATED_ENTITY),
        (!data.phone_numbers.is_empty(), WEIGHT_PHONE_NUMBERS),
        (!data.emails.is_empty(), WEIGHT_EMAILS),
        (!data.links.is_empty(), WEIGHT_LINKS),
    ];
    let earned: u32 = categories
        .iter()
        .filter(|(present, _)| *present)
        .map(|(_, weight)| weight)
        .sum();
    // Rounded percentage of the total weight.
    ((earned * 100 + TOTAL_WEIGHT / 2) / TOTAL_WEIGHT) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with(mut f: impl FnMut(&mut ExtractedData)) -> ExtractedData {
        let mut data = ExtractedData::new();
        f(&mut data);
        data
    }

    #[test]
    fn test_weights_sum_to_hundred() {
        assert_eq!(TOTAL_WEIGHT, 100);
    }

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(completeness_score(&ExtractedData::new()), 0);
    }

    #[test]
    fn test_required_categories_only() {
        let data = with(|d| {
            d.scam_type.insert("OTP_THEFT".into());
            d.requested_data.insert("OTP".into());
            d.attack_method.insert("CREDENTIAL_REQUEST".into());
            d.psychological_techniques.insert("URGENCY".into());
        });
        assert_eq!(completeness_score(&data), 80);
    }

    #[test]
    fn test_no_partial_credit_for_extra_values() {
        let one = with(|d| {
            d.links.insert("a.xyz".into());
        });
        let many = with(|d| {
            d.links.insert("a.xyz".into());
            d.links.insert("b.xyz".into());
            d.links.insert("c.xyz".into());
        });
        assert_eq!(completeness_score(&one), 5);
        assert_eq!(completeness_score(&many), 5);
    }

    #[test]
    fn test_full_score() {
        let data = with(|d| {
            d.scam_type.insert("FINANCIAL_FRAUD".into());
            d.requested_data.insert("OTP".into());
            d.attack_method.insert("PHISHING_LINK".into());
            d.psychological_techniques.insert("FEAR".into());
            d.impersonated_entity = Some("SBI".into());
            d.phone_numbers.insert("9876543210".into());
            d.emails.insert("x@y.com".into());
            d.links.insert("y.com".into());
        });
        assert_eq!(completeness_score(&data), 100);
    }

    #[test]
    fn test_untracked_categories_do_not_score() {
        let data = with(|d| {
            d.bank_accounts.insert("123456789012".into());
            d.payment_handles.insert("a@ybl".into());
            d.suspicious_keywords.insert("otp".into());
        });
        assert_eq!(completeness_score(&data), 0);
    }
}
