//! Termination reasons.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Why a session was completed.
///
/// Codes are SCREAMING_SNAKE_CASE on the wire. Any code outside the known
/// set deserializes (and parses) to `Unknown`, which still has a
/// human-readable description.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TerminationReason {
    MaxMessagesReached,
    MaxDurationReached,
    InactivityTimeout,
    ExtractionComplete,
    ScammerSuspicious,
    ScammerFrustrated,
    ManualTermination,
    #[serde(other)]
    Unknown,
}

impl TerminationReason {
    /// Parses a reason code, mapping anything unrecognized to `Unknown`.
    pub fn from_code(code: &str) -> Self {
        code.trim()
            .to_ascii_uppercase()
            .parse()
            .unwrap_or(Self::Unknown)
    }

    /// Stable wire code, e.g. `MAX_MESSAGES_REACHED`.
    pub fn code(&self) -> &str {
        self.as_ref()
    }

    /// Human-readable explanation suitable for operators and reports.
    pub fn description(&self) -> &'static str {
        match self {
            Self::MaxMessagesReached => "Maximum message limit reached",
            Self::MaxDurationReached => "Maximum conversation duration reached",
            Self::InactivityTimeout => "Counterparty stopped responding",
            Self::ExtractionComplete => "Sufficient intelligence extracted",
            Self::ScammerSuspicious => "Counterparty became suspicious of the engagement",
            Self::ScammerFrustrated => "Counterparty frustration reached the disengagement level",
            Self::ManualTermination => "Conversation terminated manually",
            Self::Unknown => "Conversation ended",
        }
    }

    /// True for the caps that end a session regardless of content.
    pub fn is_hard_limit(&self) -> bool {
        matches!(
            self,
            Self::MaxMessagesReached | Self::MaxDurationReached | Self::InactivityTimeout
        )
    }
}

/// Describes an arbitrary reason code, falling back to a generic text.
pub fn describe_reason_code(code: &str) -> &'static str {
    TerminationReason::from_code(code).description()
}
