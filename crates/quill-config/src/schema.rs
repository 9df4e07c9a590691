use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration — maps to `quill.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct QuillConfig {
    pub scheduler: SchedulerConfig,
    pub brain: BrainConfig,
    pub research: ResearchConfig,
    pub services: ServicesConfig,
    pub logging: LoggingConfig,
}

// ── Scheduler ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Minutes the user must be idle before background work may run.
    pub idle_minutes: u64,
    /// Maximum web searches per calendar day (UTC).
    pub daily_search_budget: u32,
    /// Seconds a staged message stays deliverable before it is discarded.
    pub staged_ttl_secs: u64,
    /// Seconds between reflection passes.
    pub reflection_interval_secs: u64,
    /// How far ahead the event-reminder plugin looks for due events.
    pub reminder_lookahead_secs: u64,
    /// Default delay before a deferred task returns to the queue.
    pub defer_retry_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            idle_minutes: 10,
            daily_search_budget: 10,
            staged_ttl_secs: 6 * 3600,
            reflection_interval_secs: 6 * 3600,
            reminder_lookahead_secs: 3600,
            defer_retry_secs: 300,
        }
    }
}

impl SchedulerConfig {
    pub fn idle_threshold(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.idle_minutes as i64)
    }
}

// ── Brain / memory policy ──────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrainConfig {
    /// Whether opportunistic ("eureka") insertions are allowed at all.
    pub eurekas_enabled: bool,
    /// Seconds a Natural/NaturalForced unit stays eligible for eureka delivery.
    pub eureka_cutoff_secs: u64,
    /// User messages that must pass before a timed eureka insertion.
    pub min_message_delay: u32,
    /// Wall-clock seconds that must pass between eureka insertions.
    pub min_insert_delay_secs: u64,
    /// Seconds of silence after which the user counts as away.
    pub away_threshold_secs: u64,
    /// Base of the trigger-memory decay formula, in days.
    pub decay_base_days: f64,
    /// Embedding distance below which two units are the same memory.
    pub duplicate_distance: f32,
    /// Effective-distance ceiling for a semantic eureka match.
    pub eureka_match_distance: f32,
    /// Distance ceiling for the recent-searches semantic check.
    pub recent_search_distance: f32,
    /// Phrases that count as the user explicitly asking for updates.
    pub update_phrases: Vec<String>,
}

impl Default for BrainConfig {
    fn default() -> Self {
        Self {
            eurekas_enabled: true,
            eureka_cutoff_secs: 48 * 3600,
            min_message_delay: 4,
            min_insert_delay_secs: 900,
            away_threshold_secs: 3 * 3600,
            decay_base_days: 3.0,
            duplicate_distance: 0.07,
            eureka_match_distance: 0.085,
            recent_search_distance: 0.075,
            update_phrases: vec![
                "any updates".into(),
                "anything new".into(),
                "any news".into(),
                "what did you find".into(),
            ],
        }
    }
}

// ── Research ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchConfig {
    /// Directory for per-session research documents. Empty = data dir default.
    pub dir: PathBuf,
    /// Topics researched per session, highest urgency first.
    pub max_topics: usize,
    /// Search queries planned per topic.
    pub max_queries_per_topic: usize,
    /// Results kept per query in the persisted document.
    pub max_results_per_query: usize,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::new(),
            max_topics: 3,
            max_queries_per_topic: 3,
            max_results_per_query: 8,
        }
    }
}

impl ResearchConfig {
    /// Resolve the research directory, falling back to the platform data dir.
    pub fn resolved_dir(&self) -> PathBuf {
        if self.dir.as_os_str().is_empty() {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("quill")
                .join("research")
        } else {
            self.dir.clone()
        }
    }
}

// ── Services ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ServicesConfig {
    /// API key for the OpenAI-style embedding endpoint.
    pub openai_api_key: Option<String>,
    /// Embedding model name (None = provider default).
    pub embedding_model: Option<String>,
    /// API key for Brave web search.
    pub brave_api_key: Option<String>,
}

// ── Logging ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// tracing filter, e.g. "info" or "quill_runtime=debug,info".
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

impl QuillConfig {
    /// Validate the config. Returns warnings; hard errors fail the load.
    pub fn validate(&self) -> Result<Vec<String>, String> {
        let mut warnings = Vec::new();

        if self.brain.duplicate_distance <= 0.0 || self.brain.duplicate_distance >= 1.0 {
            return Err(format!(
                "brain.duplicate_distance must be in (0, 1), got {}",
                self.brain.duplicate_distance
            ));
        }
        if self.scheduler.daily_search_budget == 0 {
            warnings.push("scheduler.daily_search_budget is 0 — research is disabled".into());
        }
        if self.brain.min_message_delay == 0 {
            warnings.push("brain.min_message_delay is 0 — eurekas fire on every message".into());
        }
        if self.research.max_results_per_query > 8 {
            warnings.push(format!(
                "research.max_results_per_query capped at 8 (configured {})",
                self.research.max_results_per_query
            ));
        }
        Ok(warnings)
    }
}
