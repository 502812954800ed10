use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Author of a conversation message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Sender {
    /// The adversarial party being engaged.
    #[serde(alias = "scammer")]
    #[strum(to_string = "counterparty", serialize = "scammer")]
    Counterparty,
    /// Our side of the conversation.
    #[serde(alias = "user", alias = "honeypot")]
    #[strum(to_string = "agent", serialize = "user", serialize = "honeypot")]
    Agent,
}

/// A single entry of a tracker's recent history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(sender: Sender, text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            sender,
            text: text.into(),
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sender_aliases() {
        assert_eq!("scammer".parse::<Sender>().unwrap(), Sender::Counterparty);
        assert_eq!("User".parse::<Sender>().unwrap(), Sender::Agent);
        let parsed: Sender = serde_json::from_str("\"honeypot\"").unwrap();
        assert_eq!(parsed, Sender::Agent);
        assert_eq!(serde_json::to_string(&Sender::Counterparty).unwrap(), "\"counterparty\"");
        assert!("bystander".parse::<Sender>().is_err());
    }
}
