//! Mock providers for deterministic testing.
//!
//! No HTTP calls; responses are scripted up front and every request is
//! captured for assertions.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::embedding::EmbeddingProvider;
use crate::provider::TextProvider;
use crate::search::{SearchHit, SearchProvider};
use quill_core::{QuillError, Result};

/// A mock text provider that returns pre-configured responses in order.
/// When the script runs out, the last response repeats.
pub struct MockText {
    responses: Mutex<Vec<String>>,
    /// All prompts received, for assertions in tests.
    pub prompts: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl MockText {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(vec![]),
            prompts: Arc::new(Mutex::new(vec![])),
            fail: false,
        }
    }

    pub fn with_response(self, text: &str) -> Self {
        self.responses.lock().push(text.to_string());
        self
    }

    /// Every query fails with a provider error.
    pub fn failing() -> Self {
        Self {
            responses: Mutex::new(vec![]),
            prompts: Arc::new(Mutex::new(vec![])),
            fail: true,
        }
    }
}

impl Default for MockText {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextProvider for MockText {
    async fn query(
        &self,
        prompt: &str,
        _max_tokens: u32,
        cancel: &CancellationToken,
    ) -> Result<String> {
        if cancel.is_cancelled() {
            return Err(QuillError::Cancelled);
        }
        if self.fail {
            return Err(QuillError::Provider("mock text provider failure".into()));
        }
        self.prompts.lock().push(prompt.to_string());
        let mut responses = self.responses.lock();
        if responses.is_empty() {
            return Ok("ok".into());
        }
        if responses.len() == 1 {
            return Ok(responses[0].clone());
        }
        Ok(responses.remove(0))
    }

    fn name(&self) -> &str {
        "mock-text"
    }
}

/// A mock embedding provider backed by a preset text→vector table.
///
/// Unknown texts get a deterministic vector derived from their bytes, so
/// distinct strings land far apart and equal strings coincide.
pub struct MockEmbedding {
    presets: Mutex<HashMap<String, Vec<f32>>>,
    dims: usize,
}

impl MockEmbedding {
    pub fn new() -> Self {
        Self {
            presets: Mutex::new(HashMap::new()),
            dims: 4,
        }
    }

    pub fn with_vector(self, text: &str, vector: Vec<f32>) -> Self {
        self.presets.lock().insert(text.to_string(), vector);
        self
    }

    fn fallback(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dims];
        for (i, b) in text.bytes().enumerate() {
            v[i % self.dims] += b as f32;
        }
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut v {
                *x /= norm;
            }
        }
        v
    }
}

impl Default for MockEmbedding {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbedding {
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let presets = self.presets.lock();
        Ok(texts
            .iter()
            .map(|t| presets.get(*t).cloned().unwrap_or_else(|| self.fallback(t)))
            .collect())
    }

    fn dimensions(&self) -> usize {
        self.dims
    }

    fn name(&self) -> &str {
        "mock-embedding"
    }
}

/// A mock search provider with preset hits and a call counter.
pub struct MockSearch {
    hits: Mutex<HashMap<String, Vec<SearchHit>>>,
    default_hits: Mutex<Vec<SearchHit>>,
    /// Number of search calls made.
    pub calls: Arc<AtomicUsize>,
    fail: bool,
}

impl MockSearch {
    pub fn new() -> Self {
        Self {
            hits: Mutex::new(HashMap::new()),
            default_hits: Mutex::new(vec![SearchHit {
                title: "Example result".into(),
                url: "https://example.com".into(),
                snippet: "An example search hit.".into(),
            }]),
            calls: Arc::new(AtomicUsize::new(0)),
            fail: false,
        }
    }

    pub fn with_hits(self, query: &str, hits: Vec<SearchHit>) -> Self {
        self.hits.lock().insert(query.to_string(), hits);
        self
    }

    pub fn failing() -> Self {
        let mut s = Self::new();
        s.fail = true;
        s
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockSearch {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchProvider for MockSearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(QuillError::Provider("mock search failure".into()));
        }
        if let Some(hits) = self.hits.lock().get(query) {
            return Ok(hits.clone());
        }
        Ok(self.default_hits.lock().clone())
    }

    fn name(&self) -> &str {
        "mock-search"
    }
}
