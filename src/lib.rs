//! Genovate - AI-powered CRE deal memo generation
//!
//! Takes raw property/loan text and produces a narrative deal memo via
//! the Gemini API. The request lifecycle is owned by one state machine:
//!
//! raw text -> validate -> AnalysisClient::analyze -> Succeeded | Failed
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use genovate::ai::{AiConfig, AnalysisClient, GeminiClient};
//! use genovate::context::InMemoryDealStore;
//! use genovate::session::AnalysisSession;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let store = Arc::new(InMemoryDealStore::with_sample_data());
//! let client = Arc::new(GeminiClient::new(AiConfig::from_env(), store)?);
//! let session = AnalysisSession::new(client as Arc<dyn AnalysisClient>);
//!
//! session.submit(genovate::samples::sample_deal_text()).await;
//! let snapshot = session.snapshot();
//! # Ok(())
//! # }
//! ```

// Core error handling
pub mod error;

// AI analysis integration (client trait, Gemini transport, prompts)
pub mod ai;

// Deal context assembly (address extraction, data source seam)
pub mod context;

// The analysis request state machine
pub mod session;

// Bundled sample deal text
pub mod samples;

pub use ai::{AiConfig, AnalysisClient, GeminiClient, Memo};
pub use error::{AnalysisError, AnalysisResult};
pub use session::{AnalysisSession, SessionState, Snapshot, SubscriptionId};
