//! The foreground chat path.
//!
//! One synchronous, explicit sequence per user message: log, embed, run the
//! memory policy, log whatever line it wants woven in. No event bus sits
//! between the transcript and the Brain.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use quill_core::{Message, Role, Transcript};
use quill_llm::EmbeddingProvider;
use quill_memory::{Brain, BrainInsert};

pub struct ChatTurn {
    brain: Arc<Mutex<Brain>>,
    transcript: Arc<dyn Transcript>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
}

impl ChatTurn {
    pub fn new(
        brain: Arc<Mutex<Brain>>,
        transcript: Arc<dyn Transcript>,
        embedder: Option<Arc<dyn EmbeddingProvider>>,
    ) -> Self {
        Self {
            brain,
            transcript,
            embedder,
        }
    }

    /// Process one user message. Returns the insert the Brain produced, if
    /// any; it is also logged to the transcript as a System line.
    pub async fn handle_user_message(
        &self,
        text: &str,
        now: DateTime<Utc>,
    ) -> Option<BrainInsert> {
        self.transcript.log_message(Role::User, text);

        let embedding = match &self.embedder {
            Some(embedder) => match embedder.embed(&[text]).await {
                Ok(mut vectors) if !vectors.is_empty() => Some(vectors.swap_remove(0)),
                Ok(_) => None,
                Err(e) => {
                    debug!(error = %e, "message embedding failed, keyword matching only");
                    None
                }
            },
            None => None,
        };

        let msg = Message::text_at(Role::User, text, now);
        let insert = self
            .brain
            .lock()
            .await
            .handle_message(&msg, embedding.as_deref(), now);

        if let Some(insert) = &insert {
            let line = match insert {
                BrainInsert::Away { text } => text.clone(),
                BrainInsert::Eureka { name, content } => {
                    info!(name = %name, "weaving eureka into conversation");
                    format!("The assistant suddenly remembers about {name}: {content}")
                }
            };
            self.transcript.log_message(Role::System, &line);
        }
        insert
    }
}
