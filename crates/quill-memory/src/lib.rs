//! # quill-memory
//!
//! The long-term memory subsystem ("Brain") of the Quill assistant core:
//!
//! - **Memory units**: facts with categories, insertion strategies, and
//!   optional embeddings.
//! - **Policy**: decay, similarity dedup, and the eureka insertion timing
//!   that decides when a learned fact gets woven back into conversation.
//! - **Research persistence**: per-session JSON documents of web research.
//!
//! Both the foreground chat path and background plugins read and write the
//! Brain concurrently; access is serialized by the caller's mutex.

pub mod brain;
pub mod keywords;
pub mod mood;
pub mod research;
pub mod unit;

pub use brain::{Brain, BrainInsert};
pub use mood::Mood;
pub use research::{
    QueryResults, ResearchDocument, ResearchResult, ResearchStore, TopicResearch,
    MAX_RESULTS_PER_QUERY,
};
pub use unit::{cosine_distance, Insertion, MemoryCategory, MemoryUnit};
