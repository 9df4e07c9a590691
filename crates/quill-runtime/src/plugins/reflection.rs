//! Reflection during quiet periods.
//!
//! When the user has been idle past the threshold and enough time has
//! passed since the last reflection, the plugin asks the model for a short
//! observation about recent conversation and stages it as a low-key note.

use async_trait::async_trait;
use chrono::Duration;
use tracing::debug;

use quill_core::Result;

use crate::context::PluginContext;
use crate::registry::AgentPlugin;
use crate::task::{AgentTask, StagedMessage, TaskKind, TaskOutcome};

/// Messages from the current session included in the reflection prompt.
const CONTEXT_MESSAGES: usize = 12;
const MAX_TOKENS: u32 = 256;

pub struct ReflectionPlugin;

const SUPPORTED: &[TaskKind] = &[TaskKind::Reflect];

#[async_trait]
impl AgentPlugin for ReflectionPlugin {
    fn id(&self) -> &str {
        "reflection"
    }

    fn supported(&self) -> &[TaskKind] {
        SUPPORTED
    }

    async fn observe(&self, ctx: &PluginContext) -> Result<Vec<AgentTask>> {
        if !ctx.is_idle() || ctx.session_count < 1 {
            return Ok(vec![]);
        }
        let interval = Duration::seconds(ctx.config.scheduler.reflection_interval_secs as i64);
        let due = ctx
            .state
            .read()
            .last_reflection
            .is_none_or(|t| ctx.now - t > interval);
        if !due {
            return Ok(vec![]);
        }
        debug!("reflection due");
        Ok(vec![
            AgentTask::new(TaskKind::Reflect, 1, ctx.now)
                .with_correlation_key("reflection")
                .needs_inference(),
        ])
    }

    async fn execute(&self, _task: &AgentTask, ctx: &PluginContext) -> Result<TaskOutcome> {
        let recent: Vec<String> = ctx
            .transcript
            .current_messages()
            .iter()
            .rev()
            .take(CONTEXT_MESSAGES)
            .rev()
            .map(|m| format!("{:?}: {}", m.role, m.text))
            .collect();

        let prompt = format!(
            "You are reflecting on a quiet moment between conversations. \
             Recent exchanges:\n{}\n\
             Write one short, low-key observation or thought worth sharing \
             with the user later. One or two sentences.",
            recent.join("\n")
        );

        let note = ctx.text.query(&prompt, MAX_TOKENS, &ctx.cancel).await?;
        ctx.state.write().last_reflection = Some(ctx.now);

        let ttl = Duration::seconds(ctx.config.scheduler.staged_ttl_secs as i64);
        let tokens = estimate_tokens(&prompt) + estimate_tokens(&note);
        let mut outcome = TaskOutcome::none().with_staged(StagedMessage {
            topic: "reflection".into(),
            draft: note,
            rationale: "idle-period reflection".into(),
            expires_at: ctx.now + ttl,
        });
        outcome.tokens_used = tokens;
        Ok(outcome)
    }
}

/// Rough 4-characters-per-token estimate; providers that report real usage
/// are out of scope for the mock-friendly boundary.
fn estimate_tokens(text: &str) -> u32 {
    (text.len() / 4) as u32
}
