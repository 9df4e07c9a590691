//! # quill-llm
//!
//! Collaborator boundary for the Quill core: text generation, embeddings,
//! and web search as traits, plus one thin HTTP implementation of each and
//! mock providers for tests. The core degrades to keyword-only matching
//! when no embedding provider is configured.

pub mod embedding;
pub mod mock;
pub mod provider;
pub mod search;

pub use embedding::{cosine_distance, cosine_similarity, EmbeddingProvider, OpenAiEmbedding};
pub use provider::TextProvider;
pub use search::{BraveSearch, SearchHit, SearchProvider};
