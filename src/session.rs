//! Analysis session state machine
//!
//! [`AnalysisSession`] owns the lifecycle of one analysis request at a
//! time: validate, run the remote call, settle, publish. It is the only
//! state machine in the crate. Callers drive it with [`submit`] and read
//! it through [`snapshot`] or a subscription; no error ever propagates
//! out of `submit`.
//!
//! Overlapping submissions are allowed. Each submission takes a fresh
//! generation number, and a resolution is applied only if its generation
//! is still current — a late result from a superseded attempt is dropped
//! without mutating or notifying.
//!
//! [`submit`]: AnalysisSession::submit
//! [`snapshot`]: AnalysisSession::snapshot

use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::ai::{AnalysisClient, Memo};
use crate::error::AnalysisError;

/// Lifecycle state of the current (or most recent) submission.
#[derive(Debug)]
pub enum SessionState {
    /// No submission yet.
    Idle,
    /// A submission is awaiting its remote resolution.
    Running,
    /// The latest submission produced a memo.
    Succeeded(Memo),
    /// The latest submission failed, locally or remotely.
    Failed(AnalysisError),
}

impl SessionState {
    fn snapshot(&self) -> Snapshot {
        match self {
            SessionState::Idle => Snapshot {
                result: None,
                error: None,
                in_flight: false,
            },
            SessionState::Running => Snapshot {
                result: None,
                error: None,
                in_flight: true,
            },
            SessionState::Succeeded(memo) => Snapshot {
                result: Some(memo.text.clone()),
                error: None,
                in_flight: false,
            },
            SessionState::Failed(err) => Snapshot {
                result: None,
                error: Some(err.to_string()),
                in_flight: false,
            },
        }
    }
}

/// Point-in-time view of a session. Settled states carry exactly one of
/// `result`/`error`; `Idle` and `Running` carry neither.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub result: Option<String>,
    pub error: Option<String>,
    pub in_flight: bool,
}

/// Handle returned by [`AnalysisSession::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn Fn(&Snapshot) + Send + Sync>;

struct Inner {
    state: SessionState,
    /// Bumped on every submission; guards against stale resolutions.
    generation: u64,
}

struct Listeners {
    next_id: u64,
    subs: Vec<(u64, Callback)>,
}

/// Stateful controller for the analysis request lifecycle.
///
/// Construct one per use-case over a shared [`AnalysisClient`]. State is
/// mutated only in short synchronous sections; the lock is never held
/// across the remote call.
pub struct AnalysisSession {
    id: Uuid,
    client: Arc<dyn AnalysisClient>,
    inner: Mutex<Inner>,
    listeners: Mutex<Listeners>,
}

impl AnalysisSession {
    /// Create an idle session over `client`.
    pub fn new(client: Arc<dyn AnalysisClient>) -> Self {
        Self {
            id: Uuid::new_v4(),
            client,
            inner: Mutex::new(Inner {
                state: SessionState::Idle,
                generation: 0,
            }),
            listeners: Mutex::new(Listeners {
                next_id: 0,
                subs: Vec::new(),
            }),
        }
    }

    /// Session identifier, stable for the session's lifetime. Appears in
    /// log output only.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current `{result, error, in_flight}` view. Idempotent between
    /// transitions.
    pub fn snapshot(&self) -> Snapshot {
        self.inner.lock().unwrap().state.snapshot()
    }

    /// Register an observer called on every state transition, including
    /// the `Running` transition that clears a prior outcome.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Snapshot) + Send + Sync + 'static,
    {
        let mut listeners = self.listeners.lock().unwrap();
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.subs.push((id, Box::new(callback)));
        SubscriptionId(id)
    }

    /// Remove a previously registered observer. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        let mut listeners = self.listeners.lock().unwrap();
        listeners.subs.retain(|(sub_id, _)| *sub_id != id.0);
    }

    /// Submit raw deal text for analysis.
    ///
    /// Empty or whitespace-only input settles synchronously as a
    /// validation failure without invoking the client. Otherwise the
    /// session enters `Running`, awaits exactly one `analyze` call, and
    /// settles with its outcome — unless a newer submission supersedes
    /// this one, in which case the outcome is discarded.
    pub async fn submit(&self, input: &str) {
        if input.trim().is_empty() {
            debug!(session = %self.id, "rejecting empty input");
            let snap = {
                let mut inner = self.inner.lock().unwrap();
                inner.generation += 1;
                inner.state = SessionState::Failed(AnalysisError::EmptyInput);
                inner.state.snapshot()
            };
            self.notify(&snap);
            return;
        }

        let (generation, running) = {
            let mut inner = self.inner.lock().unwrap();
            inner.generation += 1;
            inner.state = SessionState::Running;
            (inner.generation, inner.state.snapshot())
        };
        info!(session = %self.id, generation, "analysis request started");
        self.notify(&running);

        let outcome = self.client.analyze(input).await;

        let settled = {
            let mut inner = self.inner.lock().unwrap();
            if inner.generation != generation {
                // A newer submission owns the state now.
                warn!(
                    session = %self.id,
                    generation,
                    current = inner.generation,
                    "discarding stale resolution"
                );
                return;
            }
            inner.state = match outcome {
                Ok(memo) => {
                    info!(session = %self.id, generation, "analysis succeeded");
                    SessionState::Succeeded(memo)
                }
                Err(err) => {
                    warn!(session = %self.id, generation, error = %err, "analysis failed");
                    SessionState::Failed(err)
                }
            };
            inner.state.snapshot()
        };
        self.notify(&settled);
    }

    fn notify(&self, snapshot: &Snapshot) {
        let listeners = self.listeners.lock().unwrap();
        for (_, callback) in listeners.subs.iter() {
            callback(snapshot);
        }
    }
}
