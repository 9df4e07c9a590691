//! # quill-core
//!
//! Core types shared across the Quill assistant core: the unified error
//! type, chat messages, and the transcript collaborator trait.

pub mod error;
pub mod message;
pub mod transcript;

pub use error::{QuillError, Result};
pub use message::{Message, Role};
pub use transcript::{MemoryTranscript, SessionInfo, Transcript, UnfamiliarTopic};

/// Unique identifier for a session.
pub type SessionId = uuid::Uuid;

/// Stable string identity of a plugin.
pub type PluginId = String;
