use super::*;
use crate::intel::PatternExtractor;
use crate::tracker::Sender;
use chrono::TimeZone;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap()
}

fn secs(n: i64) -> chrono::Duration {
    chrono::Duration::seconds(n)
}

fn policy() -> TerminationPolicy {
    TerminationPolicy::from_config(&EngineConfig::default())
}

/// Feeds `text` and returns the activity preceding it.
fn feed(tracker: &mut SessionTracker, text: &str, at: DateTime<Utc>) -> DateTime<Utc> {
    let local = PatternExtractor::new().extract(text);
    tracker
        .record_counterparty_message(text, &local, None, 15, at)
        .unwrap()
}

fn response(should_terminate: bool, reason: AdvisoryVerdict, confidence: f64) -> AdvisoryResponse {
    AdvisoryResponse {
        should_terminate,
        reason,
        confidence,
        ..Default::default()
    }
}

#[test]
fn test_message_cap_applies_to_benign_messages() {
    let policy = policy();
    let mut tracker = SessionTracker::new("s", 75, 50, t0());
    let mut decision = None;
    for i in 0..30 {
        let at = t0() + secs(i);
        let previous = feed(&mut tracker, "", at);
        decision = policy.check_hard_limits(&tracker, previous, at);
        if i < 29 {
            assert_eq!(decision, None, "terminated early at message {}", i + 1);
        }
    }
    assert_eq!(decision, Some(TerminationReason::MaxMessagesReached));
}

#[test]
fn test_message_cap_precedes_duration() {
    let policy = policy();
    let mut tracker = SessionTracker::new("s", 75, 50, t0());
    for i in 0..29 {
        feed(&mut tracker, "hi", t0() + secs(i * 60));
    }
    let at = t0() + secs(3600);
    let previous = feed(&mut tracker, "hi", at);
    assert_eq!(
        policy.check_hard_limits(&tracker, previous, at),
        Some(TerminationReason::MaxMessagesReached)
    );
}

#[test]
fn test_duration_cap() {
    let policy = policy();
    let mut tracker = SessionTracker::new("s", 75, 50, t0());
    for i in 1..=7 {
        let at = t0() + secs(i * 250);
        let previous = feed(&mut tracker, "hi", at);
        assert_eq!(policy.check_hard_limits(&tracker, previous, at), None);
    }
    // 1800s since start, 50s since the previous message.
    let at = t0() + secs(1800);
    let previous = feed(&mut tracker, "hi", at);
    assert_eq!(
        policy.check_hard_limits(&tracker, previous, at),
        Some(TerminationReason::MaxDurationReached)
    );
}

#[test]
fn test_inactivity_measured_from_previous_activity() {
    let policy = policy();
    let mut tracker = SessionTracker::new("s", 75, 50, t0());
    feed(&mut tracker, "hi", t0() + secs(10));
    tracker.record_agent_message("hello?", t0() + secs(20));

    let at = t0() + secs(20 + 299);
    let previous = feed(&mut tracker, "still here", at);
    assert_eq!(previous, t0() + secs(20));
    assert_eq!(policy.check_hard_limits(&tracker, previous, at), None);

    let at = at + secs(300);
    let previous = feed(&mut tracker, "back", at);
    assert_eq!(
        policy.check_hard_limits(&tracker, previous, at),
        Some(TerminationReason::InactivityTimeout)
    );
}

#[test]
fn test_should_consult_advisory_gates() {
    let policy = policy();
    let mut tracker = SessionTracker::new("s", 75, 50, t0());
    feed(&mut tracker, "a", t0());
    feed(&mut tracker, "b", t0());
    assert!(!policy.should_consult_advisory(&tracker, 10));
    feed(&mut tracker, "c", t0());
    assert!(!policy.should_consult_advisory(&tracker, 3));
    assert!(policy.should_consult_advisory(&tracker, 4));

    let mut config = EngineConfig::default();
    config.advisory.enabled = false;
    let disabled = TerminationPolicy::from_config(&config);
    assert!(!disabled.should_consult_advisory(&tracker, 10));
}

#[test]
fn test_interpret_advisory() {
    let policy = policy();
    assert_eq!(
        policy.interpret_advisory(&response(true, AdvisoryVerdict::Success, 0.9)),
        Some(TerminationReason::ExtractionComplete)
    );
    assert_eq!(
        policy.interpret_advisory(&response(true, AdvisoryVerdict::Complete, 0.6)),
        Some(TerminationReason::ExtractionComplete)
    );
    assert_eq!(
        policy.interpret_advisory(&response(true, AdvisoryVerdict::Suspicious, 0.7)),
        Some(TerminationReason::ScammerSuspicious)
    );
    assert_eq!(
        policy.interpret_advisory(&response(true, AdvisoryVerdict::Frustration, 1.0)),
        Some(TerminationReason::ScammerFrustrated)
    );
    assert_eq!(policy.interpret_advisory(&response(true, AdvisoryVerdict::Continue, 1.0)), None);
    assert_eq!(policy.interpret_advisory(&response(false, AdvisoryVerdict::Success, 1.0)), None);
    assert_eq!(policy.interpret_advisory(&response(true, AdvisoryVerdict::Success, 0.59)), None);
}

#[test]
fn test_fallback_requires_minimum_messages() {
    let policy = policy();
    let mut tracker = SessionTracker::new("s", 75, 50, t0());
    feed(&mut tracker, "Send your OTP code now, urgent!", t0());
    assert!(tracker.completeness_score() >= 75);
    assert_eq!(policy.fallback(&tracker), None);

    for i in 1..5 {
        feed(&mut tracker, "ok", t0() + secs(i));
    }
    assert_eq!(policy.fallback(&tracker), Some(TerminationReason::ExtractionComplete));
}

#[test]
fn test_fallback_frustration() {
    let policy = policy();
    let mut tracker = SessionTracker::new("s", 85, 50, t0());
    for i in 0..6 {
        feed(&mut tracker, "hurry up", t0() + secs(i));
    }
    assert_eq!(tracker.frustration_level(), 90);
    assert_eq!(policy.fallback(&tracker), Some(TerminationReason::ScammerFrustrated));
}

#[test]
fn test_advisory_request_windows_history() {
    let mut config = EngineConfig::default();
    config.advisory.history_window = 2;
    let policy = TerminationPolicy::from_config(&config);
    let mut tracker = SessionTracker::new("s", 75, 50, t0());
    feed(&mut tracker, "one", t0());
    tracker.record_agent_message("two", t0() + secs(1));
    feed(&mut tracker, "three", t0() + secs(2));

    let request = policy.advisory_request(&tracker, None, t0() + secs(4));
    let texts: Vec<&str> = request.recent_history.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, vec!["two", "three"]);
    assert_eq!(request.stats.message_count, 2);
    assert_eq!(request.stats.duration_ms, 4_000);

    let supplied = vec![
        HistoryEntry::new(Sender::Agent, "x", t0()),
        HistoryEntry::new(Sender::Counterparty, "y", t0()),
        HistoryEntry::new(Sender::Agent, "z", t0()),
    ];
    let request = policy.advisory_request(&tracker, Some(&supplied), t0());
    assert_eq!(request.recent_history, supplied[1..].to_vec());
}
