use decoy_core::termination::{AdvisoryStats, AdvisoryVerdict};
use decoy_core::{AdvisoryRequest, AdvisoryService, ExtractedData};
use decoy_interaction::{ClaudeAdvisoryAgent, HttpAdvisoryService};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

fn request() -> AdvisoryRequest {
    AdvisoryRequest {
        session_id: "it-1".to_string(),
        recent_history: Vec::new(),
        extracted_data_snapshot: ExtractedData::new(),
        stats: AdvisoryStats {
            message_count: 5,
            duration_ms: 30_000,
            completeness_score: 80,
            frustration_level: 0,
        },
    }
}

/// Serves a single canned HTTP response and hands back the raw request.
async fn serve_once(status: &'static str, body: &'static str) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let raw = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        let _ = tx.send(raw);
    });

    (format!("http://{addr}/advise"), rx)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

#[tokio::test]
async fn test_http_advisory_posts_request_and_parses_verdict() {
    let (url, raw) = serve_once(
        "200 OK",
        r#"{"shouldTerminate": true, "reason": "SUCCESS", "confidence": 0.92, "reasoning": "enough", "riskLevel": "HIGH"}"#,
    )
    .await;

    let service = HttpAdvisoryService::new(url, Some("secret".to_string()));
    let response = service.recommend(&request()).await.unwrap();
    assert!(response.should_terminate);
    assert_eq!(response.reason, AdvisoryVerdict::Success);

    let raw = raw.await.unwrap();
    assert!(raw.starts_with("POST /advise"));
    assert!(raw.to_ascii_lowercase().contains("authorization: bearer secret"));
    assert!(raw.contains("\"sessionId\":\"it-1\""));
    assert!(raw.contains("\"completenessScore\":80"));
}

#[tokio::test]
async fn test_http_advisory_error_status_is_advisory_error() {
    let (url, _raw) = serve_once("503 Service Unavailable", "overloaded").await;
    let err = HttpAdvisoryService::new(url, None)
        .recommend(&request())
        .await
        .unwrap_err();
    assert!(err.is_advisory());
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn test_http_advisory_non_json_body_is_advisory_error() {
    let (url, _raw) = serve_once("200 OK", "I think you should continue").await;
    let err = HttpAdvisoryService::new(url, None)
        .recommend(&request())
        .await
        .unwrap_err();
    assert!(err.is_advisory());
}

#[tokio::test]
async fn test_http_advisory_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (_socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
    });

    let service = HttpAdvisoryService::new(format!("http://{addr}/"), None)
        .with_timeout(Duration::from_millis(100));
    let err = service.recommend(&request()).await.unwrap_err();
    assert!(err.is_advisory());
}

#[tokio::test]
async fn test_claude_agent_reads_fenced_verdict() {
    let (url, raw) = serve_once(
        "200 OK",
        r#"{"content":[{"type":"text","text":"```json\n{\"shouldTerminate\":true,\"reason\":\"SUSPICIOUS\",\"confidence\":80}\n```"}]}"#,
    )
    .await;

    let agent = ClaudeAdvisoryAgent::new("test-key", "claude-test").with_base_url(url);
    let response = agent.recommend(&request()).await.unwrap();
    assert_eq!(response.reason, AdvisoryVerdict::Suspicious);
    assert!((response.confidence - 0.8).abs() < 1e-9);

    let raw = raw.await.unwrap();
    assert!(raw.to_ascii_lowercase().contains("x-api-key: test-key"));
    assert!(raw.contains("\"model\":\"claude-test\""));
}
