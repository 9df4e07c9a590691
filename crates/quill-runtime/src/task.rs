//! The background task model.
//!
//! Tasks are produced by plugin observation, ordered by the priority queue,
//! and executed by the plugin that claims their kind. Priorities run 1
//! (background housekeeping) to 5 (user-facing urgency).

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a task asks for. `PluginSpecific` lets third-party plugins define
/// kinds the core does not know about.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum TaskKind {
    Reflect,
    PlanSearch,
    ExecuteSearch,
    StageMessage,
    PluginSpecific(String),
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskKind::Reflect => write!(f, "reflect"),
            TaskKind::PlanSearch => write!(f, "plan_search"),
            TaskKind::ExecuteSearch => write!(f, "execute_search"),
            TaskKind::StageMessage => write!(f, "stage_message"),
            TaskKind::PluginSpecific(name) => write!(f, "plugin:{name}"),
        }
    }
}

/// Lifecycle of a task. Completed, Failed, and Deferred are terminal for
/// the current pass; Deferred tasks re-enter the queue later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Queued,
    Running,
    Completed,
    Failed,
    Deferred,
}

/// One unit of background work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentTask {
    pub id: Uuid,
    pub kind: TaskKind,
    /// 1 = background/low, 5 = user-facing.
    pub priority: u32,
    /// Plugin-interpreted arguments; the scheduler never looks inside.
    pub payload: serde_json::Value,
    /// At most one live task per key; duplicates are dropped at enqueue.
    pub correlation_key: Option<String>,
    /// Whether execution is expected to call the language model.
    pub needs_inference: bool,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
}

impl AgentTask {
    pub fn new(kind: TaskKind, priority: u32, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            priority,
            payload: serde_json::Value::Null,
            correlation_key: None,
            needs_inference: false,
            status: TaskStatus::Queued,
            created_at: now,
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    pub fn with_correlation_key(mut self, key: impl Into<String>) -> Self {
        self.correlation_key = Some(key.into());
        self
    }

    pub fn needs_inference(mut self) -> Self {
        self.needs_inference = true;
        self
    }
}

/// A message drafted by a plugin, held in the outbox until delivery or
/// expiry. The rationale is for logs only and never shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagedMessage {
    pub topic: String,
    pub draft: String,
    pub rationale: String,
    pub expires_at: DateTime<Utc>,
}

/// A request to put the task back in the queue later instead of
/// completing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Defer {
    /// Come back after the configured default retry delay.
    Retry,
    /// Come back after an explicit delay.
    After(Duration),
}

/// Everything a successful execution hands back to the scheduler. Plugins
/// mutate scheduler state only through this.
#[derive(Debug, Default)]
pub struct TaskOutcome {
    pub staged: Vec<StagedMessage>,
    pub follow_ups: Vec<AgentTask>,
    pub tokens_used: u32,
    pub searches_performed: u32,
    /// When set, the task re-enters the queue later instead of completing.
    pub defer: Option<Defer>,
}

impl TaskOutcome {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_staged(mut self, msg: StagedMessage) -> Self {
        self.staged.push(msg);
        self
    }

    pub fn with_follow_up(mut self, task: AgentTask) -> Self {
        self.follow_ups.push(task);
        self
    }

    pub fn deferred(delay: Duration) -> Self {
        Self {
            defer: Some(Defer::After(delay)),
            ..Self::default()
        }
    }

    /// Defer with the host-configured default retry delay.
    pub fn deferred_retry() -> Self {
        Self {
            defer: Some(Defer::Retry),
            ..Self::default()
        }
    }
}
