//! Event reminders.
//!
//! Event-category memory units carry their moment in `expires_at`. When one
//! falls inside the lookahead window, a StageMessage task turns it into a
//! staged reminder and the unit is forgotten so it fires once.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use quill_core::{QuillError, Result};
use quill_memory::MemoryCategory;

use crate::context::PluginContext;
use crate::registry::AgentPlugin;
use crate::task::{AgentTask, StagedMessage, TaskKind, TaskOutcome};

#[derive(Debug, Serialize, Deserialize)]
struct ReminderPayload {
    unit_id: Uuid,
    name: String,
    content: String,
    due_at: DateTime<Utc>,
}

pub struct ReminderPlugin;

const SUPPORTED: &[TaskKind] = &[TaskKind::StageMessage];

#[async_trait]
impl AgentPlugin for ReminderPlugin {
    fn id(&self) -> &str {
        "reminder"
    }

    fn supported(&self) -> &[TaskKind] {
        SUPPORTED
    }

    async fn observe(&self, ctx: &PluginContext) -> Result<Vec<AgentTask>> {
        let lookahead = Duration::seconds(ctx.config.scheduler.reminder_lookahead_secs as i64);
        let horizon = ctx.now + lookahead;

        let brain = ctx.brain.lock().await;
        let tasks: Vec<AgentTask> = brain
            .units()
            .iter()
            .filter(|u| u.category == MemoryCategory::Event)
            .filter_map(|u| {
                let due_at = u.expires_at?;
                if due_at > horizon {
                    return None;
                }
                debug!(name = %u.name, due_at = %due_at, "event due within lookahead");
                Some(
                    AgentTask::new(TaskKind::StageMessage, 4, ctx.now)
                        .with_payload(json!({
                            "unit_id": u.id,
                            "name": u.name,
                            "content": u.content,
                            "due_at": due_at,
                        }))
                        .with_correlation_key(format!("reminder:{}", u.id)),
                )
            })
            .collect();
        Ok(tasks)
    }

    async fn execute(&self, task: &AgentTask, ctx: &PluginContext) -> Result<TaskOutcome> {
        let payload: ReminderPayload = serde_json::from_value(task.payload.clone())
            .map_err(|e| QuillError::MalformedPayload(e.to_string()))?;

        ctx.brain.lock().await.forget(payload.unit_id);
        info!(name = %payload.name, due_at = %payload.due_at, "reminder staged");

        let ttl = Duration::seconds(ctx.config.scheduler.staged_ttl_secs as i64);
        Ok(TaskOutcome::none().with_staged(StagedMessage {
            topic: format!("reminder:{}", payload.name),
            draft: format!("Reminder: {}", payload.content),
            rationale: format!("event \"{}\" due at {}", payload.name, payload.due_at),
            // Stale reminders are useless; the draft dies with the event or
            // the standard TTL, whichever is sooner.
            expires_at: payload.due_at.min(ctx.now + ttl),
        }))
    }
}
