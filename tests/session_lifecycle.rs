//! End-to-end session lifecycle tests over the public API.
//!
//! Uses a scripted in-process client for the remote outcomes and the
//! real Gemini client for the no-address path (which never touches the
//! network).

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use genovate::ai::{AiConfig, AnalysisClient, GeminiClient, Memo};
use genovate::context::InMemoryDealStore;
use genovate::error::{AnalysisError, AnalysisResult};
use genovate::session::{AnalysisSession, Snapshot};

struct FixedClient {
    reply: Box<dyn Fn() -> AnalysisResult<Memo> + Send + Sync>,
    calls: AtomicUsize,
}

impl FixedClient {
    fn ok(text: &'static str) -> Self {
        Self {
            reply: Box::new(move || Ok(Memo::new(text))),
            calls: AtomicUsize::new(0),
        }
    }

    fn err(message: &'static str) -> Self {
        Self {
            reply: Box::new(move || Err(AnalysisError::Api(message.to_string()))),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl AnalysisClient for FixedClient {
    async fn analyze(&self, _input: &str) -> AnalysisResult<Memo> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.reply)()
    }
}

#[tokio::test]
async fn full_lifecycle_success() {
    let client = Arc::new(FixedClient::ok("Deal Memo: proceed with caution"));
    let session = AnalysisSession::new(client.clone() as Arc<dyn AnalysisClient>);

    let transitions: Arc<Mutex<Vec<Snapshot>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = transitions.clone();
    session.subscribe(move |snap| sink.lock().unwrap().push(snap.clone()));

    session.submit("123 Main St, $2M loan").await;

    assert_eq!(client.calls.load(Ordering::SeqCst), 1);

    let seen = transitions.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert!(seen[0].in_flight);
    assert_eq!(
        seen[1].result.as_deref(),
        Some("Deal Memo: proceed with caution")
    );
    assert_eq!(seen[1].error, None);
    assert!(!seen[1].in_flight);
}

#[tokio::test]
async fn full_lifecycle_remote_failure() {
    let client = Arc::new(FixedClient::err("503 Service Unavailable"));
    let session = AnalysisSession::new(client as Arc<dyn AnalysisClient>);

    session.submit("bad input").await;

    let snap = session.snapshot();
    assert_eq!(snap.result, None);
    assert_eq!(snap.error.as_deref(), Some("503 Service Unavailable"));
    assert!(!snap.in_flight);
}

#[tokio::test]
async fn validation_failure_never_reaches_client() {
    let client = Arc::new(FixedClient::ok("unused"));
    let session = AnalysisSession::new(client.clone() as Arc<dyn AnalysisClient>);

    session.submit("").await;

    assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    let snap = session.snapshot();
    assert_eq!(snap.error.as_deref(), Some("The provided input is empty."));
    assert_eq!(snap.result, None);
    assert!(!snap.in_flight);
}

#[tokio::test]
async fn gemini_client_guides_when_no_address_found() {
    let config = AiConfig {
        api_key: "test-key".to_string(),
        ..AiConfig::default()
    };
    let store = Arc::new(InMemoryDealStore::with_sample_data());
    let client = Arc::new(GeminiClient::new(config, store).expect("client builds"));
    let session = AnalysisSession::new(client as Arc<dyn AnalysisClient>);

    // No street address in the input: the client answers locally with a
    // guidance memo instead of calling the API.
    session.submit("A building somewhere in Chicago.").await;

    let snap = session.snapshot();
    let memo = snap.result.expect("guidance memo expected");
    assert!(memo.contains("Could not identify a property address"));
    assert_eq!(snap.error, None);
}
