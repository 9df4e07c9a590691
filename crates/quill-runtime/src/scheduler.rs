//! The scheduler tick loop.
//!
//! One tick: requeue due deferred tasks, let every enabled plugin observe,
//! correlation-gate and enqueue the proposals, then execute at most one
//! task. Plugins never touch the queue or outbox directly; everything flows
//! through `TaskOutcome`.

use chrono::{DateTime, Utc};
use std::collections::{HashSet, VecDeque};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::context::PluginContext;
use crate::queue::PriorityQueue;
use crate::registry::PluginRegistry;
use crate::task::{AgentTask, Defer, StagedMessage, TaskStatus};

/// Terminal tasks kept for inspection before the oldest are dropped.
const HISTORY_CAP: usize = 100;

/// What one tick did, for logs and tests.
#[derive(Debug, Default)]
pub struct TickReport {
    /// Tasks that passed the correlation gate and entered the queue.
    pub enqueued: usize,
    /// The task executed this tick and its terminal status, if any ran.
    pub executed: Option<(Uuid, TaskStatus)>,
}

/// Owns the queue, the registry, the staged-message outbox, and the
/// correlation-key gate. Explicitly constructed; there is exactly one per
/// running agent and no global instance.
pub struct Scheduler {
    queue: PriorityQueue<AgentTask>,
    registry: PluginRegistry,
    outbox: Vec<StagedMessage>,
    deferred: Vec<(DateTime<Utc>, AgentTask)>,
    /// Keys of live (queued, running, or deferred) tasks.
    active_keys: HashSet<String>,
    history: VecDeque<AgentTask>,
}

impl Scheduler {
    pub fn new(registry: PluginRegistry) -> Self {
        Self {
            queue: PriorityQueue::new(),
            registry,
            outbox: Vec::new(),
            deferred: Vec::new(),
            active_keys: HashSet::new(),
            history: VecDeque::new(),
        }
    }

    /// Run one scheduling pass. `ctx.now` is the tick's clock.
    pub async fn tick(&mut self, ctx: &PluginContext) -> TickReport {
        let now = ctx.now;
        let mut report = TickReport::default();

        self.requeue_due_deferred(now);

        for plugin in self.registry.enabled() {
            match plugin.observe(ctx).await {
                Ok(tasks) => {
                    for task in tasks {
                        if self.gate_and_enqueue(task) {
                            report.enqueued += 1;
                        }
                    }
                }
                Err(e) => {
                    warn!(plugin = plugin.id(), error = %e, "plugin observation failed");
                }
            }
        }

        if let Some(mut task) = self.queue.try_dequeue() {
            task.status = TaskStatus::Running;
            report.executed = Some(self.run_task(task, ctx).await);
        } else {
            debug!("idle tick, queue empty");
        }

        self.outbox.retain(|m| m.expires_at > now);
        report
    }

    async fn run_task(&mut self, mut task: AgentTask, ctx: &PluginContext) -> (Uuid, TaskStatus) {
        let id = task.id;
        let Some(plugin) = self.registry.supporter_for(&task.kind) else {
            warn!(task_id = %id, kind = %task.kind, "no enabled plugin supports task kind");
            self.finish(task, TaskStatus::Failed);
            return (id, TaskStatus::Failed);
        };

        info!(task_id = %id, kind = %task.kind, plugin = plugin.id(), "executing task");
        match plugin.execute(&task, ctx).await {
            Ok(outcome) => {
                ctx.state.write().record_tokens(outcome.tokens_used);
                if outcome.searches_performed > 0 {
                    debug!(task_id = %id, searches = outcome.searches_performed, "task performed searches");
                }
                for follow_up in outcome.follow_ups {
                    self.gate_and_enqueue(follow_up);
                }
                for staged in outcome.staged {
                    self.merge_staged(staged, ctx.now);
                }
                if let Some(defer) = outcome.defer {
                    let delay = match defer {
                        Defer::After(d) => d,
                        Defer::Retry => chrono::Duration::seconds(
                            ctx.config.scheduler.defer_retry_secs as i64,
                        ),
                    };
                    debug!(task_id = %id, delay_secs = delay.num_seconds(), "task deferred");
                    task.status = TaskStatus::Deferred;
                    self.deferred.push((ctx.now + delay, task));
                    (id, TaskStatus::Deferred)
                } else {
                    self.finish(task, TaskStatus::Completed);
                    (id, TaskStatus::Completed)
                }
            }
            Err(e) => {
                warn!(task_id = %id, kind = %task.kind, error = %e, "task failed");
                self.finish(task, TaskStatus::Failed);
                (id, TaskStatus::Failed)
            }
        }
    }

    /// Enqueue unless the task's correlation key is already live.
    fn gate_and_enqueue(&mut self, task: AgentTask) -> bool {
        if let Some(key) = &task.correlation_key {
            if !self.active_keys.insert(key.clone()) {
                debug!(key = %key, kind = %task.kind, "duplicate task dropped by correlation gate");
                return false;
            }
        }
        let priority = task.priority;
        self.queue.enqueue(task, priority);
        true
    }

    /// A same-topic unexpired draft is replaced; otherwise the message is
    /// appended.
    fn merge_staged(&mut self, staged: StagedMessage, now: DateTime<Utc>) {
        match self
            .outbox
            .iter_mut()
            .find(|m| m.topic == staged.topic && m.expires_at > now)
        {
            Some(existing) => {
                debug!(topic = %staged.topic, "staged message replaced same-topic draft");
                *existing = staged;
            }
            None => self.outbox.push(staged),
        }
    }

    /// Terminal transition: the correlation key is released here and only
    /// here.
    fn finish(&mut self, mut task: AgentTask, status: TaskStatus) {
        if let Some(key) = &task.correlation_key {
            self.active_keys.remove(key);
        }
        task.status = status;
        self.history.push_back(task);
        while self.history.len() > HISTORY_CAP {
            self.history.pop_front();
        }
    }

    fn requeue_due_deferred(&mut self, now: DateTime<Utc>) {
        let mut still_waiting = Vec::new();
        for (due_at, mut task) in self.deferred.drain(..) {
            if due_at <= now {
                debug!(task_id = %task.id, "deferred task returning to queue");
                task.status = TaskStatus::Queued;
                // The key stayed active while deferred; skip the gate.
                let priority = task.priority;
                self.queue.enqueue(task, priority);
            } else {
                still_waiting.push((due_at, task));
            }
        }
        self.deferred = still_waiting;
    }

    /// Drain every unexpired staged message for delivery.
    pub fn take_staged(&mut self, now: DateTime<Utc>) -> Vec<StagedMessage> {
        let staged: Vec<StagedMessage> = self
            .outbox
            .drain(..)
            .filter(|m| m.expires_at > now)
            .collect();
        if !staged.is_empty() {
            info!(count = staged.len(), "delivering staged messages");
        }
        staged
    }

    /// Drop all pending work. In-flight state (deferred tasks, keys) is
    /// cleared too; staged messages already in the outbox survive.
    pub fn shutdown(&mut self) {
        let dropped = self.queue.len() + self.deferred.len();
        self.queue.clear();
        self.deferred.clear();
        self.active_keys.clear();
        if dropped > 0 {
            info!(dropped, "scheduler shut down with pending tasks");
        }
    }

    // ── Inspection ─────────────────────────────────────────────

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut PluginRegistry {
        &mut self.registry
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn deferred_len(&self) -> usize {
        self.deferred.len()
    }

    pub fn outbox_len(&self) -> usize {
        self.outbox.len()
    }

    pub fn has_active_key(&self, key: &str) -> bool {
        self.active_keys.contains(key)
    }

    /// Terminal tasks, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &AgentTask> {
        self.history.iter()
    }
}
