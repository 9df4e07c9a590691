use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::message::{Message, Role};

/// A topic the assistant encountered in a session but knows little about.
/// Urgency runs 0 (idle curiosity) to 10 (blocking the user).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnfamiliarTopic {
    pub topic: String,
    pub urgency: u8,
}

/// Summary record of an archived session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub id: Uuid,
    pub archived_at: DateTime<Utc>,
    /// Topics flagged during the session that background research may pick up.
    pub unfamiliar_topics: Vec<UnfamiliarTopic>,
}

/// The chat-transcript collaborator, at its interface boundary.
///
/// The core reads the last user message, the archived-session list, and the
/// current session's messages, and writes system messages for eureka/away
/// delivery. Storage format and summarization are out of scope here.
pub trait Transcript: Send + Sync {
    /// Append a message to the current session.
    fn log_message(&self, role: Role, text: &str);

    /// Most recent message with the given role, if any.
    fn last_message_from(&self, role: Role) -> Option<Message>;

    /// Archived sessions, oldest first.
    fn sessions(&self) -> Vec<SessionInfo>;

    /// Messages of the current (not yet archived) session, oldest first.
    fn current_messages(&self) -> Vec<Message>;

    /// Archive the current session, attaching any unfamiliar topics spotted
    /// during it, and start a fresh one.
    fn archive_current(&self, unfamiliar_topics: Vec<UnfamiliarTopic>) -> SessionInfo;

    /// Total number of sessions seen (archived + the current one if nonempty).
    fn session_count(&self) -> usize {
        let archived = self.sessions().len();
        if self.current_messages().is_empty() {
            archived
        } else {
            archived + 1
        }
    }
}

/// In-process transcript used by the runtime and by tests.
#[derive(Default)]
pub struct MemoryTranscript {
    inner: RwLock<TranscriptInner>,
}

#[derive(Default)]
struct TranscriptInner {
    current: Vec<Message>,
    archived: Vec<SessionInfo>,
}

impl MemoryTranscript {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transcript for MemoryTranscript {
    fn log_message(&self, role: Role, text: &str) {
        self.inner.write().current.push(Message::text(role, text));
    }

    fn last_message_from(&self, role: Role) -> Option<Message> {
        self.inner
            .read()
            .current
            .iter()
            .rev()
            .find(|m| m.role == role)
            .cloned()
    }

    fn sessions(&self) -> Vec<SessionInfo> {
        self.inner.read().archived.clone()
    }

    fn current_messages(&self) -> Vec<Message> {
        self.inner.read().current.clone()
    }

    fn archive_current(&self, unfamiliar_topics: Vec<UnfamiliarTopic>) -> SessionInfo {
        let mut inner = self.inner.write();
        inner.current.clear();
        let info = SessionInfo {
            id: Uuid::new_v4(),
            archived_at: Utc::now(),
            unfamiliar_topics,
        };
        inner.archived.push(info.clone());
        info
    }
}
