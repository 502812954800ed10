//! Transcript replay.
//!
//! Feeds a recorded conversation through a fresh engine, driving a manual
//! clock from the per-message offsets so that duration and inactivity
//! limits behave as they did live.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use decoy_application::{ConversationEngine, ProcessOutcome, TrackerRegistry};
use decoy_core::{
    AdvisoryService, CallbackPayload, EngineConfig, ManualClock, Sender, StructuredAnalysis,
    ThresholdSampler,
};
use decoy_interaction::{ClaudeAdvisoryAgent, HttpAdvisoryService};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A recorded conversation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcript {
    #[serde(default = "default_session_id")]
    pub session_id: String,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    pub messages: Vec<TranscriptMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptMessage {
    pub sender: Sender,
    pub text: String,
    /// Seconds since the start of the conversation.
    #[serde(default)]
    pub offset_secs: Option<u64>,
    /// Upstream classifier output recorded with the message.
    #[serde(default)]
    pub analysis: Option<serde_json::Value>,
}

fn default_session_id() -> String {
    "replay".to_string()
}

pub enum AdvisoryChoice {
    None,
    Http(String),
    Claude,
}

pub struct ReplayOptions {
    pub transcript: PathBuf,
    pub config: Option<PathBuf>,
    pub advisory: AdvisoryChoice,
    pub seed: Option<u64>,
}

/// One processed message.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayStep {
    pub index: usize,
    pub sender: Sender,
    pub outcome: ProcessOutcome,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayResult {
    pub steps: Vec<ReplayStep>,
    pub skipped: usize,
    pub payload: CallbackPayload,
}

/// Runs a replay and prints each step followed by the callback payload.
pub async fn run(options: ReplayOptions) -> Result<()> {
    let result = replay(&options).await?;
    for step in &result.steps {
        println!("{}", serde_json::to_string(step)?);
    }
    println!("{}", serde_json::to_string_pretty(&result.payload)?);
    Ok(())
}

pub async fn replay(options: &ReplayOptions) -> Result<ReplayResult> {
    let config = match &options.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let transcript = load_transcript(&options.transcript)?;
    let start = transcript.started_at.unwrap_or_else(Utc::now);

    let clock = Arc::new(ManualClock::new(start));
    let sampler = match options.seed {
        Some(seed) => ThresholdSampler::seeded(
            config.completeness_threshold_base,
            config.completeness_threshold_jitter,
            seed,
        ),
        None => ThresholdSampler::from_config(&config),
    };
    let registry = Arc::new(TrackerRegistry::new(&config, sampler, clock.clone()));
    let mut engine = ConversationEngine::new(&config, registry);
    if let Some(advisory) = build_advisory(&options.advisory, &config)? {
        tracing::info!("[Replay] Using advisory service '{}'", advisory.name());
        engine = engine.with_advisory(advisory);
    }

    let session_id = transcript.session_id.as_str();
    let total = transcript.messages.len();
    let mut steps = Vec::with_capacity(total);
    for (index, message) in transcript.messages.into_iter().enumerate() {
        if let Some(offset) = message.offset_secs {
            clock.set(offset_time(start, offset).with_context(|| {
                format!("Message {index} has an out-of-range offsetSecs ({offset})")
            })?);
        }
        let analysis = message.analysis.map(StructuredAnalysis::from_value);
        let outcome = engine
            .process_message(session_id, message.sender, &message.text, analysis.as_ref(), None)
            .await;
        let terminated = outcome.is_terminated();
        steps.push(ReplayStep {
            index,
            sender: message.sender,
            outcome,
        });
        if terminated {
            break;
        }
    }

    let skipped = total - steps.len();
    if skipped > 0 {
        tracing::info!(
            "[Replay] Session {} ended at message {}; {} message(s) not replayed",
            session_id,
            steps.len(),
            skipped
        );
    }

    let payload = engine
        .callback_payload(session_id)
        .await
        .context("Transcript produced no session")?;
    Ok(ReplayResult {
        steps,
        skipped,
        payload,
    })
}

fn offset_time(start: DateTime<Utc>, offset_secs: u64) -> Option<DateTime<Utc>> {
    let secs = i64::try_from(offset_secs).ok()?;
    start.checked_add_signed(chrono::Duration::try_seconds(secs)?)
}

fn load_transcript(path: &Path) -> Result<Transcript> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read transcript {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse transcript {}", path.display()))
}

fn build_advisory(
    choice: &AdvisoryChoice,
    config: &EngineConfig,
) -> Result<Option<Arc<dyn AdvisoryService>>> {
    let timeout = config.advisory.timeout();
    Ok(match choice {
        AdvisoryChoice::None => None,
        AdvisoryChoice::Http(url) => Some(Arc::new(
            HttpAdvisoryService::new(url.clone(), std::env::var("DECOY_ADVISORY_API_KEY").ok())
                .with_timeout(timeout),
        )),
        AdvisoryChoice::Claude => Some(Arc::new(
            ClaudeAdvisoryAgent::try_from_env()
                .context("Claude advisory requested but not configured")?
                .with_timeout(timeout),
        )),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use decoy_core::{TerminationReason, TrackerStatus};
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn options(path: &Path) -> ReplayOptions {
        ReplayOptions {
            transcript: path.to_path_buf(),
            config: None,
            advisory: AdvisoryChoice::None,
            seed: Some(42),
        }
    }

    #[tokio::test]
    async fn test_replay_stops_at_termination() {
        let file = write_temp(
            r#"{
  "sessionId": "demo",
  "startedAt": "2026-02-01T12:00:00Z",
  "messages": [
    {"sender": "scammer", "text": "Send your OTP code now, urgent!", "offsetSecs": 0,
     "analysis": {"scamTypes": ["OTP_THEFT"], "psychologicalTechniques": ["URGENCY"],
                  "extraction": {"requestedData": ["OTP"], "attackMethod": ["CREDENTIAL_REQUEST"],
                                 "links": ["http://sbi-kyc.top"], "phoneNumbers": ["+91 98765 43210"]}}},
    {"sender": "agent", "text": "what otp?", "offsetSecs": 20},
    {"sender": "scammer", "text": "your account will be blocked", "offsetSecs": 40},
    {"sender": "scammer", "text": "hello?", "offsetSecs": 60},
    {"sender": "scammer", "text": "reply fast", "offsetSecs": 80},
    {"sender": "scammer", "text": "pay the processing fee", "offsetSecs": 100},
    {"sender": "scammer", "text": "never replayed", "offsetSecs": 120}
  ]
}"#,
        );

        let result = replay(&options(file.path())).await.unwrap();
        assert_eq!(result.steps.len(), 6);
        assert_eq!(result.skipped, 1);
        assert_eq!(
            result.steps.last().unwrap().outcome.reason(),
            Some(TerminationReason::ExtractionComplete)
        );
        assert_eq!(result.payload.session_id, "demo");
        assert_eq!(result.payload.status, TrackerStatus::Completed);
        assert_eq!(result.payload.total_messages_exchanged, 6);
        assert_eq!(
            result.payload.final_report.as_ref().unwrap().summary.duration_ms,
            100_000
        );
    }

    #[tokio::test]
    async fn test_replay_offsets_drive_inactivity() {
        let file = write_temp(
            r#"{"messages": [
    {"sender": "scammer", "text": "hello", "offsetSecs": 0},
    {"sender": "scammer", "text": "hello??", "offsetSecs": 600}
]}"#,
        );
        let result = replay(&options(file.path())).await.unwrap();
        assert_eq!(result.payload.session_id, "replay");
        assert_eq!(
            result.steps[1].outcome.reason(),
            Some(TerminationReason::InactivityTimeout)
        );
    }

    #[tokio::test]
    async fn test_replay_applies_recorded_analysis() {
        let file = write_temp(
            r#"{"messages": [
    {"sender": "scammer", "text": "hi", "analysis": {"isScam": true, "extraction": {"phoneNumbers": ["+1 415 555 0100"]}}}
]}"#,
        );
        let result = replay(&options(file.path())).await.unwrap();
        assert!(result.payload.scam_detected);
        assert_eq!(
            result.payload.extracted_intelligence.phone_numbers,
            vec!["+14155550100"]
        );
        assert_eq!(result.payload.status, TrackerStatus::Active);
    }

    #[tokio::test]
    async fn test_replay_rejects_out_of_range_offset() {
        let file = write_temp(
            r#"{"messages": [
    {"sender": "scammer", "text": "hi", "offsetSecs": 18446744073709551615}
]}"#,
        );
        let err = replay(&options(file.path())).await.unwrap_err();
        assert!(err.to_string().contains("out-of-range offsetSecs"));

        let start = Utc::now();
        assert!(offset_time(start, i64::MAX as u64).is_none());
        assert_eq!(
            offset_time(start, 90),
            Some(start + chrono::Duration::seconds(90))
        );
    }

    #[tokio::test]
    async fn test_replay_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = replay(&options(&dir.path().join("nope.json"))).await.unwrap_err();
        assert!(err.to_string().contains("Failed to read transcript"));
    }

    #[tokio::test]
    async fn test_replay_with_config_file() {
        let config = write_temp("max_messages = 2\n");
        let transcript = write_temp(
            r#"{"messages": [
    {"sender": "scammer", "text": "a"},
    {"sender": "scammer", "text": "b"}
]}"#,
        );
        let mut opts = options(transcript.path());
        opts.config = Some(config.path().to_path_buf());
        let result = replay(&opts).await.unwrap();
        assert_eq!(
            result.steps[1].outcome.reason(),
            Some(TerminationReason::MaxMessagesReached)
        );
    }
}
