use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What kind of fact a memory unit holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryCategory {
    General,
    WorldInfo,
    WebSearch,
    Journal,
    Image,
    File,
    Person,
    Location,
    Event,
    ChatSummary,
}

impl MemoryCategory {
    /// Whether trigger-recalled units of this category are subject to decay.
    /// People, places, and upcoming events are kept until explicitly removed.
    pub fn decays(&self) -> bool {
        !matches!(
            self,
            MemoryCategory::Person | MemoryCategory::Location | MemoryCategory::Event
        )
    }
}

/// How a unit gets back into the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Insertion {
    /// Recalled on keyword/semantic match against incoming text.
    Trigger,
    /// Queued for opportunistic one-shot delivery.
    Natural,
    /// Queued, high priority, never silently dropped.
    NaturalForced,
    /// Inert.
    None,
}

/// A fact the assistant may recall.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryUnit {
    pub id: Uuid,
    pub category: MemoryCategory,
    pub insertion: Insertion,
    pub name: String,
    pub content: String,
    pub added: DateTime<Utc>,
    /// Hard expiry; past this the unit is removed regardless of decay state.
    pub expires_at: Option<DateTime<Utc>>,
    /// 1 = background/low … 5 = user-facing/high.
    pub priority: u32,
    pub name_embedding: Option<Vec<f32>>,
    pub content_embedding: Option<Vec<f32>>,
    /// Times this unit has been recalled.
    pub trigger_count: u32,
    pub last_recall: DateTime<Utc>,
}

impl MemoryUnit {
    pub fn new(
        category: MemoryCategory,
        insertion: Insertion,
        name: impl Into<String>,
        content: impl Into<String>,
        priority: u32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            category,
            insertion,
            name: name.into(),
            content: content.into(),
            added: now,
            expires_at: None,
            priority,
            name_embedding: None,
            content_embedding: None,
            trigger_count: 0,
            last_recall: now,
        }
    }

    pub fn with_content_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.content_embedding = Some(embedding);
        self
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Record a recall.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.trigger_count += 1;
        self.last_recall = now;
    }

    /// Whether this unit may still be delivered as a eureka.
    pub fn eureka_eligible(&self, now: DateTime<Utc>, cutoff: Duration) -> bool {
        matches!(self.insertion, Insertion::Natural | Insertion::NaturalForced)
            && now - self.added <= cutoff
    }

    /// Whether the trigger-decay formula says this unit should be dropped:
    /// gone once `now − last_recall` exceeds
    /// `base_days × (priority + 1) + trigger_count` days.
    pub fn decayed(&self, now: DateTime<Utc>, base_days: f64) -> bool {
        if self.insertion != Insertion::Trigger || !self.category.decays() {
            return false;
        }
        let allowed_days = base_days * (self.priority as f64 + 1.0) + self.trigger_count as f64;
        let idle_days = (now - self.last_recall).num_seconds() as f64 / 86_400.0;
        idle_days > allowed_days
    }
}

/// Compute cosine distance between two vectors. 0 means identical direction.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 1.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a * norm_b)
}
