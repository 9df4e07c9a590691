//! The borrowed view a plugin gets for one observe or execute call.

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use quill_config::QuillConfig;
use quill_core::Transcript;
use quill_llm::{EmbeddingProvider, SearchProvider, TextProvider};
use quill_memory::{Brain, ResearchStore};

use crate::state::AgentState;

/// Shared handles plus the per-tick snapshot (`now`, `idle`,
/// `session_count`). Plugins borrow this for the duration of a call and
/// never hold it across ticks.
#[derive(Clone)]
pub struct PluginContext {
    pub now: DateTime<Utc>,
    /// Time since the last user message; `None` before first contact.
    pub idle: Option<Duration>,
    pub session_count: usize,
    pub config: Arc<QuillConfig>,
    pub state: Arc<RwLock<AgentState>>,
    pub brain: Arc<Mutex<Brain>>,
    pub transcript: Arc<dyn Transcript>,
    pub text: Arc<dyn TextProvider>,
    pub embedder: Option<Arc<dyn EmbeddingProvider>>,
    pub search: Option<Arc<dyn SearchProvider>>,
    pub research: ResearchStore,
    pub cancel: CancellationToken,
}

impl PluginContext {
    /// Whether the user has been quiet long enough for background work.
    pub fn is_idle(&self) -> bool {
        self.idle
            .is_some_and(|d| d >= self.config.scheduler.idle_threshold())
    }

    /// Embed one text, or `None` when no provider is configured or the call
    /// fails. Embedding failures degrade to keyword-only matching and are
    /// never fatal.
    pub async fn embed(&self, text: &str) -> Option<Vec<f32>> {
        let embedder = self.embedder.as_ref()?;
        match embedder.embed(&[text]).await {
            Ok(mut vectors) if !vectors.is_empty() => Some(vectors.swap_remove(0)),
            Ok(_) => None,
            Err(e) => {
                debug!(error = %e, "embedding failed, degrading to keyword matching");
                None
            }
        }
    }
}
