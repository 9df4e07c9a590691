//! # quill-runtime
//!
//! The background machinery of the Quill assistant core: a priority task
//! queue, the plugin contract and registry, the scheduler tick loop that
//! turns plugin observations into executed tasks and staged messages, and
//! the explicit foreground chat path.

pub mod chat;
pub mod context;
pub mod plugins;
pub mod queue;
pub mod registry;
pub mod scheduler;
pub mod state;
pub mod task;
pub mod telemetry;

pub use chat::ChatTurn;
pub use context::PluginContext;
pub use queue::PriorityQueue;
pub use registry::{AgentPlugin, PluginFactory, PluginRegistry};
pub use scheduler::{Scheduler, TickReport};
pub use state::AgentState;
pub use task::{AgentTask, Defer, StagedMessage, TaskKind, TaskOutcome, TaskStatus};
pub use telemetry::init_tracing;
