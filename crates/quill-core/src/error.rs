use thiserror::Error;

/// Unified error type for the entire Quill core.
#[derive(Error, Debug)]
pub enum QuillError {
    // ── Scheduler / task errors ────────────────────────────────
    #[error("task error: {0}")]
    Task(String),

    #[error("malformed task payload: {0}")]
    MalformedPayload(String),

    // ── Plugin errors ──────────────────────────────────────────
    #[error("plugin error: {plugin}: {reason}")]
    Plugin { plugin: String, reason: String },

    // ── Collaborator errors ────────────────────────────────────
    #[error("provider error: {0}")]
    Provider(String),

    #[error("operation cancelled")]
    Cancelled,

    // ── Memory errors ──────────────────────────────────────────
    #[error("memory error: {0}")]
    Memory(String),

    // ── Budget / gating errors ─────────────────────────────────
    #[error("budget exceeded: {resource}: used {used}, limit {limit}")]
    BudgetExceeded {
        resource: String,
        used: u32,
        limit: u32,
    },

    // ── Config errors ──────────────────────────────────────────
    #[error("config error: {0}")]
    Config(String),

    // ── Generic wrappers ───────────────────────────────────────
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, QuillError>;
