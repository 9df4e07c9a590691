use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

use quill_core::{QuillError, Result};

/// A single persisted search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Results of one query under a topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResults {
    pub query: String,
    pub results: Vec<ResearchResult>,
}

/// Everything researched for one topic within a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicResearch {
    pub topic: String,
    pub queries: Vec<QueryResults>,
}

/// The per-session research document, one JSON file per session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchDocument {
    pub session: Uuid,
    pub topics: Vec<TopicResearch>,
}

/// On-disk research persistence: `<dir>/<session>.json`, written whole on
/// every append, read lazily. A missing file is the valid "no research yet"
/// state.
#[derive(Debug, Clone)]
pub struct ResearchStore {
    dir: PathBuf,
    max_results: usize,
}

/// Hard ceiling on results kept per query; a configured cap may lower it
/// but never raise it.
pub const MAX_RESULTS_PER_QUERY: usize = 8;

impl ResearchStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            max_results: MAX_RESULTS_PER_QUERY,
        }
    }

    /// Keep fewer results per query than the ceiling allows.
    pub fn with_max_results(mut self, cap: usize) -> Self {
        self.max_results = cap.clamp(1, MAX_RESULTS_PER_QUERY);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, session: Uuid) -> PathBuf {
        self.dir.join(format!("{session}.json"))
    }

    /// Load the document for a session, or `None` if nothing was researched.
    pub fn load(&self, session: Uuid) -> Result<Option<ResearchDocument>> {
        let path = self.path_for(session);
        if !path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&path)?;
        let doc = serde_json::from_str::<ResearchDocument>(&raw).map_err(|e| {
            QuillError::Memory(format!("corrupt research document {}: {e}", path.display()))
        })?;
        Ok(Some(doc))
    }

    /// Whether any research is stored for the session.
    pub fn has_results(&self, session: Uuid) -> bool {
        matches!(self.load(session), Ok(Some(doc)) if !doc.topics.is_empty())
    }

    /// Whether a document exists at all, even an empty one. An empty
    /// document marks a session as claimed by research planning.
    pub fn has_document(&self, session: Uuid) -> bool {
        self.path_for(session).exists()
    }

    /// Create an empty document for the session if none exists yet.
    pub fn ensure_document(&self, session: Uuid) -> Result<()> {
        if self.has_document(session) {
            return Ok(());
        }
        std::fs::create_dir_all(&self.dir)?;
        let doc = ResearchDocument {
            session,
            topics: Vec::new(),
        };
        let json = serde_json::to_string_pretty(&doc)?;
        std::fs::write(self.path_for(session), json)?;
        debug!(session = %session, "created empty research document");
        Ok(())
    }

    /// Topics already researched for the session.
    pub fn topics(&self, session: Uuid) -> Vec<String> {
        self.load(session)
            .ok()
            .flatten()
            .map(|doc| doc.topics.into_iter().map(|t| t.topic).collect())
            .unwrap_or_default()
    }

    /// Append one query's results under a topic and rewrite the document.
    pub fn append_results(
        &self,
        session: Uuid,
        topic: &str,
        query: &str,
        mut results: Vec<ResearchResult>,
    ) -> Result<()> {
        results.truncate(self.max_results);

        let mut doc = self.load(session)?.unwrap_or(ResearchDocument {
            session,
            topics: Vec::new(),
        });

        let entry = QueryResults {
            query: query.to_string(),
            results,
        };
        match doc.topics.iter_mut().find(|t| t.topic == topic) {
            Some(t) => t.queries.push(entry),
            None => doc.topics.push(TopicResearch {
                topic: topic.to_string(),
                queries: vec![entry],
            }),
        }

        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(session);
        let json = serde_json::to_string_pretty(&doc)?;
        std::fs::write(&path, json)?;
        debug!(session = %session, topic, query, "persisted research results");
        Ok(())
    }

    /// Delete the document for a session, if present.
    pub fn clear(&self, session: Uuid) -> Result<bool> {
        let path = self.path_for(session);
        if path.exists() {
            std::fs::remove_file(&path)?;
            info!(session = %session, "cleared research document");
            return Ok(true);
        }
        Ok(false)
    }
}
