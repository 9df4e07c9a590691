//! Background research on unfamiliar topics.
//!
//! Two-stage pipeline. `PlanSearch` picks the most urgent topics of the
//! latest archived session and asks the model for concrete queries;
//! `ExecuteSearch` runs one query against the web, persists the results,
//! and plants a Natural memory so the findings can surface in conversation.

use async_trait::async_trait;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use quill_core::{QuillError, Result, SessionInfo};
use quill_memory::{Insertion, MemoryCategory, MemoryUnit, ResearchResult};

use crate::context::PluginContext;
use crate::registry::AgentPlugin;
use crate::task::{AgentTask, StagedMessage, TaskKind, TaskOutcome};

const PLAN_MAX_TOKENS: u32 = 512;

#[derive(Debug, Serialize, Deserialize)]
struct PlanPayload {
    session: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
struct SearchPayload {
    session: Uuid,
    topic: String,
    query: String,
}

pub struct ResearchPlugin;

const SUPPORTED: &[TaskKind] = &[TaskKind::PlanSearch, TaskKind::ExecuteSearch];

#[async_trait]
impl AgentPlugin for ResearchPlugin {
    fn id(&self) -> &str {
        "research"
    }

    fn supported(&self) -> &[TaskKind] {
        SUPPORTED
    }

    async fn observe(&self, ctx: &PluginContext) -> Result<Vec<AgentTask>> {
        if ctx.search.is_none() || !ctx.is_idle() {
            return Ok(vec![]);
        }
        if ctx.state.write().remaining_searches(ctx.now) == 0 {
            return Ok(vec![]);
        }
        let sessions = ctx.transcript.sessions();
        let Some(session) = sessions
            .iter()
            .rev()
            .find(|s| !s.unfamiliar_topics.is_empty())
        else {
            return Ok(vec![]);
        };
        // One document per session. Planning creates it immediately, so a
        // session never gets planned twice even while its searches are
        // still queued.
        if ctx.research.has_document(session.id) {
            return Ok(vec![]);
        }
        debug!(session = %session.id, topics = session.unfamiliar_topics.len(), "research candidate session");
        Ok(vec![
            AgentTask::new(TaskKind::PlanSearch, 2, ctx.now)
                .with_payload(json!({ "session": session.id }))
                .with_correlation_key(format!("research:{}", session.id))
                .needs_inference(),
        ])
    }

    async fn execute(&self, task: &AgentTask, ctx: &PluginContext) -> Result<TaskOutcome> {
        if ctx.cancel.is_cancelled() {
            return Err(QuillError::Cancelled);
        }
        match task.kind {
            TaskKind::PlanSearch => self.plan(task, ctx).await,
            TaskKind::ExecuteSearch => self.search(task, ctx).await,
            _ => Err(QuillError::Task(format!(
                "research plugin cannot execute {}",
                task.kind
            ))),
        }
    }
}

impl ResearchPlugin {
    async fn plan(&self, task: &AgentTask, ctx: &PluginContext) -> Result<TaskOutcome> {
        let payload: PlanPayload = serde_json::from_value(task.payload.clone())
            .map_err(|e| QuillError::MalformedPayload(e.to_string()))?;
        let sessions = ctx.transcript.sessions();
        let session = sessions
            .iter()
            .find(|s| s.id == payload.session)
            .ok_or_else(|| {
                QuillError::Task(format!("unknown session {} in plan", payload.session))
            })?;

        // Claim the session before planning; observation gates on this.
        ctx.research.ensure_document(payload.session)?;

        let topics = self.pick_topics(session, ctx);
        if topics.is_empty() {
            return Ok(TaskOutcome::none());
        }

        let mut outcome = TaskOutcome::none();
        for topic in &topics {
            let prompt = format!(
                "The topic \"{topic}\" came up in conversation and is unfamiliar. \
                 Write up to {} short web search queries that would teach the \
                 essentials, one per line, nothing else.",
                ctx.config.research.max_queries_per_topic
            );
            let response = ctx.text.query(&prompt, PLAN_MAX_TOKENS, &ctx.cancel).await?;
            outcome.tokens_used += ((prompt.len() + response.len()) / 4) as u32;

            let queries: Vec<String> = response
                .lines()
                .map(|l| l.trim().trim_start_matches(['-', '*', ' ']).to_string())
                .filter(|l| !l.is_empty())
                .take(ctx.config.research.max_queries_per_topic)
                .collect();

            for (n, query) in queries.iter().enumerate() {
                outcome.follow_ups.push(
                    AgentTask::new(TaskKind::ExecuteSearch, 1, ctx.now)
                        .with_payload(json!({
                            "session": payload.session,
                            "topic": topic,
                            "query": query,
                        }))
                        .with_correlation_key(format!(
                            "search:{}:{topic}:{n}",
                            payload.session
                        )),
                );
            }
        }
        info!(
            session = %payload.session,
            topics = topics.len(),
            queries = outcome.follow_ups.len(),
            "research plan ready"
        );
        Ok(outcome)
    }

    /// Topics by descending urgency, capped by config and by what the
    /// remaining search budget can actually serve. Low urgency drops first.
    fn pick_topics(&self, session: &SessionInfo, ctx: &PluginContext) -> Vec<String> {
        let per_topic = ctx.config.research.max_queries_per_topic.max(1);
        let remaining = ctx.state.write().remaining_searches(ctx.now) as usize;
        let affordable = (remaining / per_topic).max(usize::from(remaining > 0));
        let cap = ctx.config.research.max_topics.min(affordable);

        let mut topics = session.unfamiliar_topics.clone();
        topics.sort_by(|a, b| b.urgency.cmp(&a.urgency));
        topics.into_iter().take(cap).map(|t| t.topic).collect()
    }

    async fn search(&self, task: &AgentTask, ctx: &PluginContext) -> Result<TaskOutcome> {
        let payload: SearchPayload = serde_json::from_value(task.payload.clone())
            .map_err(|e| QuillError::MalformedPayload(e.to_string()))?;
        let provider = ctx
            .search
            .as_ref()
            .ok_or_else(|| QuillError::Task("no search provider configured".into()))?;

        let embedding = ctx.embed(&payload.query).await;
        {
            let brain = ctx.brain.lock().await;
            if brain.was_searched_recently(&payload.query, embedding.as_deref()) {
                debug!(query = %payload.query, "query searched recently, skipping");
                return Ok(TaskOutcome::none());
            }
        }

        // Budget check must fail before any network call.
        ctx.state.write().record_search(ctx.now)?;

        let hits = provider.search(&payload.query).await?;
        info!(query = %payload.query, hits = hits.len(), "web search complete");

        let results: Vec<ResearchResult> = hits
            .iter()
            .map(|h| ResearchResult {
                title: h.title.clone(),
                url: h.url.clone(),
                snippet: h.snippet.clone(),
            })
            .collect();
        ctx.research
            .clone()
            .with_max_results(ctx.config.research.max_results_per_query)
            .append_results(payload.session, &payload.topic, &payload.query, results)?;

        let summary = hits
            .iter()
            .take(3)
            .map(|h| format!("{}: {}", h.title, h.snippet))
            .collect::<Vec<_>>()
            .join(" ");
        let content = format!("Looked into {}. {summary}", payload.topic);
        let content_embedding = ctx.embed(&content).await;

        {
            let mut brain = ctx.brain.lock().await;
            brain.record_search(&payload.query, embedding);
            let mut unit = MemoryUnit::new(
                MemoryCategory::WebSearch,
                Insertion::Natural,
                &payload.topic,
                &content,
                2,
                ctx.now,
            );
            if let Some(e) = content_embedding {
                unit = unit.with_content_embedding(e);
            }
            brain.memorize(unit, false);
        }

        let ttl = Duration::seconds(ctx.config.scheduler.staged_ttl_secs as i64);
        let mut outcome = TaskOutcome::none().with_staged(StagedMessage {
            topic: format!("research:{}", payload.topic),
            draft: format!(
                "I looked into {} while you were away and found a few things worth sharing.",
                payload.topic
            ),
            rationale: format!("web research on unfamiliar topic \"{}\"", payload.topic),
            expires_at: ctx.now + ttl,
        });
        outcome.searches_performed = 1;
        Ok(outcome)
    }
}
