//! Plugin contract and registry.
//!
//! Plugins are registered once (by instance or factory), then enabled and
//! disabled independently at runtime. The scheduler resolves the enabled
//! set fresh on every tick, so a disable takes effect on the next tick
//! without touching tasks already in flight.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use quill_core::Result;

use crate::context::PluginContext;
use crate::task::{AgentTask, TaskKind, TaskOutcome};

/// A background capability. `observe` proposes work, `execute` performs it.
#[async_trait]
pub trait AgentPlugin: Send + Sync {
    /// Stable identifier, unique within a registry.
    fn id(&self) -> &str;

    /// Task kinds this plugin executes.
    fn supported(&self) -> &[TaskKind];

    /// Inspect the world and propose zero or more tasks. Must not block on
    /// long I/O; expensive work belongs in `execute`.
    async fn observe(&self, ctx: &PluginContext) -> Result<Vec<AgentTask>>;

    /// Execute one task of a supported kind.
    async fn execute(&self, task: &AgentTask, ctx: &PluginContext) -> Result<TaskOutcome>;
}

/// Builds a plugin instance on registration.
pub type PluginFactory = Box<dyn Fn() -> Arc<dyn AgentPlugin> + Send + Sync>;

struct Registration {
    plugin: Arc<dyn AgentPlugin>,
    enabled: bool,
}

/// Ordered plugin registry; registration order is dispatch order.
#[derive(Default)]
pub struct PluginRegistry {
    entries: Vec<Registration>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin instance, enabled. A second registration under the
    /// same id replaces the first.
    pub fn register(&mut self, plugin: Arc<dyn AgentPlugin>) {
        let id = plugin.id().to_string();
        self.entries.retain(|r| r.plugin.id() != id);
        info!(plugin = %id, "plugin registered");
        self.entries.push(Registration {
            plugin,
            enabled: true,
        });
    }

    /// Register via factory.
    pub fn register_factory(&mut self, factory: PluginFactory) {
        self.register(factory());
    }

    /// Remove a plugin entirely. Returns false if it was never registered.
    pub fn unregister(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|r| r.plugin.id() != id);
        let removed = self.entries.len() < before;
        if removed {
            info!(plugin = id, "plugin unregistered");
        }
        removed
    }

    pub fn enable(&mut self, id: &str) -> bool {
        self.set_enabled(id, true)
    }

    pub fn disable(&mut self, id: &str) -> bool {
        self.set_enabled(id, false)
    }

    fn set_enabled(&mut self, id: &str, enabled: bool) -> bool {
        match self.entries.iter_mut().find(|r| r.plugin.id() == id) {
            Some(r) => {
                if r.enabled != enabled {
                    info!(plugin = id, enabled, "plugin toggled");
                }
                r.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn is_enabled(&self, id: &str) -> bool {
        self.entries
            .iter()
            .any(|r| r.plugin.id() == id && r.enabled)
    }

    /// Enabled plugins in registration order.
    pub fn enabled(&self) -> Vec<Arc<dyn AgentPlugin>> {
        self.entries
            .iter()
            .filter(|r| r.enabled)
            .map(|r| r.plugin.clone())
            .collect()
    }

    /// First enabled plugin whose `supported` list contains the kind.
    pub fn supporter_for(&self, kind: &TaskKind) -> Option<Arc<dyn AgentPlugin>> {
        self.entries
            .iter()
            .filter(|r| r.enabled)
            .find(|r| r.plugin.supported().contains(kind))
            .map(|r| r.plugin.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
