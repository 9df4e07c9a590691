use chrono::{DateTime, Duration, Utc};
use std::collections::VecDeque;
use tracing::{debug, info};
use uuid::Uuid;

use quill_config::BrainConfig;
use quill_core::{Message, Role};

use crate::keywords::{keyword_match, shared_significant_words};
use crate::mood::{format_elapsed, Mood};
use crate::unit::{cosine_distance, Insertion, MemoryCategory, MemoryUnit};

/// Recent-searches list is capped at this many entries, oldest evicted first.
const RECENT_SEARCH_CAP: usize = 20;

/// A previously searched topic, kept for duplicate-work suppression.
#[derive(Debug, Clone)]
struct RecentSearch {
    topic: String,
    embedding: Option<Vec<f32>>,
}

/// A system line the Brain wants woven into the conversation.
#[derive(Debug, Clone, PartialEq)]
pub enum BrainInsert {
    /// Synthesized on return after an absence; suppresses eurekas this turn.
    Away { text: String },
    /// Opportunistic delivery of a queued memory.
    Eureka { name: String, content: String },
}

/// Long-term memory store for one persona.
///
/// Both the foreground chat path and background plugins mutate this
/// concurrently; callers wrap it in `Arc<tokio::sync::Mutex<Brain>>`.
/// Every time-sensitive operation takes `now` explicitly so tests can
/// simulate clock advance.
pub struct Brain {
    config: BrainConfig,
    units: Vec<MemoryUnit>,
    /// Eureka candidates rebuilt by `refresh_memories`, most-recent-first.
    candidates: Vec<Uuid>,
    recent_searches: VecDeque<RecentSearch>,
    /// User messages seen since the last eureka insertion.
    delay_counter: u32,
    last_insert: Option<DateTime<Utc>>,
    last_user_seen: Option<DateTime<Utc>>,
    /// Notes queued for delivery with the next away line.
    pending_returns: Vec<String>,
    mood: Mood,
}

impl Brain {
    pub fn new(config: BrainConfig) -> Self {
        Self {
            config,
            units: Vec::new(),
            candidates: Vec::new(),
            recent_searches: VecDeque::new(),
            delay_counter: 0,
            last_insert: None,
            last_user_seen: None,
            pending_returns: Vec::new(),
            mood: Mood::default(),
        }
    }

    fn eureka_cutoff(&self) -> Duration {
        Duration::seconds(self.config.eureka_cutoff_secs as i64)
    }

    // ── Write path ─────────────────────────────────────────────

    /// Store a unit, replacing a near-duplicate in place instead of
    /// appending when one exists.
    ///
    /// Person/Location units dedup by case-insensitive name first; everything
    /// else dedups by embedding distance within the same category. With
    /// `skip_duplicate_check` or no embedding the unit is appended as-is.
    pub fn memorize(&mut self, unit: MemoryUnit, skip_duplicate_check: bool) {
        if skip_duplicate_check || unit.content_embedding.is_none() {
            debug!(name = %unit.name, category = ?unit.category, "memorized (no dedup)");
            self.units.push(unit);
            return;
        }

        if matches!(
            unit.category,
            MemoryCategory::Person | MemoryCategory::Location
        ) {
            if let Some(existing) = self
                .units
                .iter_mut()
                .find(|u| u.category == unit.category && u.name.eq_ignore_ascii_case(&unit.name))
            {
                debug!(name = %unit.name, "replacing unit by name match");
                replace_in_place(existing, unit);
                return;
            }
        }

        let embedding = unit.content_embedding.as_deref().unwrap_or(&[]);
        let nearest = self
            .units
            .iter_mut()
            .filter(|u| u.category == unit.category)
            .filter_map(|u| {
                let distance = cosine_distance(embedding, u.content_embedding.as_deref()?);
                Some((distance, u))
            })
            .min_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        match nearest {
            Some((distance, existing)) if distance < self.config.duplicate_distance => {
                debug!(name = %unit.name, distance, "replacing near-duplicate unit");
                replace_in_place(existing, unit);
            }
            _ => {
                debug!(name = %unit.name, category = ?unit.category, "memorized new unit");
                self.units.push(unit);
            }
        }
    }

    /// Remove a unit by id. Returns true if it existed.
    pub fn forget(&mut self, id: Uuid) -> bool {
        let before = self.units.len();
        self.units.retain(|u| u.id != id);
        self.candidates.retain(|c| *c != id);
        self.units.len() < before
    }

    // ── Decay & eureka candidates ──────────────────────────────

    /// Run decay and rebuild the eureka candidate list. Must be called
    /// before any eureka-candidate read.
    ///
    /// Natural units past the cutoff window are deleted; NaturalForced units
    /// are demoted to Trigger insertion instead, so they are kept and stay
    /// recallable.
    pub fn refresh_memories(&mut self, now: DateTime<Utc>) {
        let cutoff = self.eureka_cutoff();
        let base_days = self.config.decay_base_days;

        let before = self.units.len();
        for unit in &mut self.units {
            if unit.insertion == Insertion::NaturalForced && now - unit.added > cutoff {
                debug!(name = %unit.name, "demoting stale forced eureka to trigger");
                unit.insertion = Insertion::Trigger;
            }
        }
        self.units.retain(|u| {
            if u.expires_at.is_some_and(|e| e < now) {
                return false;
            }
            if u.insertion == Insertion::Natural && now - u.added > cutoff {
                return false;
            }
            !u.decayed(now, base_days)
        });
        let removed = before - self.units.len();
        if removed > 0 {
            debug!(removed, remaining = self.units.len(), "decay pass removed units");
        }

        let mut eligible: Vec<&MemoryUnit> = self
            .units
            .iter()
            .filter(|u| u.eureka_eligible(now, cutoff))
            .collect();
        eligible.sort_by(|a, b| b.added.cmp(&a.added));
        self.candidates = eligible.iter().map(|u| u.id).collect();
    }

    // ── Foreground chat path ───────────────────────────────────

    /// Process one incoming message. No-op for non-user roles.
    ///
    /// Returns an away line or a eureka to weave into the conversation, or
    /// `None` when this turn stays quiet. `msg_embedding` is optional; the
    /// policy degrades to keyword matching without it.
    pub fn handle_message(
        &mut self,
        msg: &Message,
        msg_embedding: Option<&[f32]>,
        now: DateTime<Utc>,
    ) -> Option<BrainInsert> {
        if msg.role != Role::User {
            return None;
        }

        let elapsed = self.last_user_seen.map(|t| now - t);
        self.mood = Mood::derive(now, elapsed);
        self.last_user_seen = Some(now);

        let away_threshold = Duration::seconds(self.config.away_threshold_secs as i64);
        let was_away = elapsed.is_some_and(|e| e > away_threshold);
        if was_away || !self.pending_returns.is_empty() {
            return Some(self.away_insert(elapsed, was_away));
        }

        self.refresh_memories(now);
        if self.candidates.is_empty() || !self.config.eurekas_enabled {
            return None;
        }

        self.delay_counter += 1;

        // Pass 1: a candidate matching the message itself jumps the queue.
        if let Some(id) = self.find_contextual_match(&msg.text, msg_embedding) {
            return self.deliver(id, now);
        }

        // Pass 2: timed delivery, or the user explicitly asked for updates.
        let phrase_hit = self.matches_update_phrase(&msg.text);
        let min_delay = Duration::seconds(self.config.min_insert_delay_secs as i64);
        let waited_long_enough = self.last_insert.is_none_or(|t| now - t >= min_delay);
        let timed = self.delay_counter >= self.config.min_message_delay && waited_long_enough;

        if timed || phrase_hit {
            if let Some(id) = self.pick_best_candidate(phrase_hit) {
                return self.deliver(id, now);
            }
        }
        None
    }

    fn away_insert(&mut self, elapsed: Option<Duration>, was_away: bool) -> BrainInsert {
        let mut text = if was_away {
            let gone = elapsed.map(format_elapsed).unwrap_or_else(|| "a while".into());
            format!(
                "The user returns after {gone}. The assistant is feeling {}.",
                self.mood.describe()
            )
        } else {
            format!("The assistant is feeling {}.", self.mood.describe())
        };
        if !self.pending_returns.is_empty() {
            for note in self.pending_returns.drain(..) {
                text.push(' ');
                text.push_str(&note);
            }
        }
        info!(away = was_away, "synthesized away line, eurekas suppressed this turn");
        BrainInsert::Away { text }
    }

    /// Find a candidate whose content matches the message by keyword, or
    /// whose effective semantic distance clears the ceiling. Shared
    /// significant words and NaturalForced insertion each shave 0.02 off the
    /// raw distance before the comparison.
    fn find_contextual_match(&self, text: &str, msg_embedding: Option<&[f32]>) -> Option<Uuid> {
        for unit in self
            .candidates
            .iter()
            .filter_map(|id| self.units.iter().find(|u| u.id == *id))
        {
            if keyword_match(text, &unit.name, &unit.content) {
                debug!(name = %unit.name, "eureka keyword match");
                return Some(unit.id);
            }
            let (Some(msg_emb), Some(unit_emb)) = (msg_embedding, unit.content_embedding.as_deref())
            else {
                continue;
            };
            let shared = shared_significant_words(text, &unit.content) as f32;
            let mut effective = cosine_distance(msg_emb, unit_emb) - 0.02 * shared;
            if unit.insertion == Insertion::NaturalForced {
                effective -= 0.02;
            }
            if effective <= self.config.eureka_match_distance {
                debug!(name = %unit.name, effective, "eureka semantic match");
                return Some(unit.id);
            }
        }
        None
    }

    /// Highest-priority candidate; NaturalForced units win ties (and, when
    /// the trigger was an explicit update phrase, win outright).
    fn pick_best_candidate(&self, prefer_forced: bool) -> Option<Uuid> {
        let units: Vec<&MemoryUnit> = self
            .candidates
            .iter()
            .filter_map(|id| self.units.iter().find(|u| u.id == *id))
            .collect();
        if prefer_forced {
            if let Some(best) = units
                .iter()
                .filter(|u| u.insertion == Insertion::NaturalForced)
                .max_by_key(|u| u.priority)
            {
                return Some(best.id);
            }
        }
        units
            .iter()
            .max_by_key(|u| (u.priority, u.insertion == Insertion::NaturalForced))
            .map(|u| u.id)
    }

    fn matches_update_phrase(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.config
            .update_phrases
            .iter()
            .any(|p| lower.contains(p.as_str()))
    }

    /// Deliver a eureka. Priority > 1 demotes the unit to Trigger insertion
    /// (kept, no longer opportunistic); priority ≤ 1 deletes it (one-shot).
    fn deliver(&mut self, id: Uuid, now: DateTime<Utc>) -> Option<BrainInsert> {
        self.delay_counter = 0;
        self.last_insert = Some(now);
        self.candidates.retain(|c| *c != id);

        let idx = self.units.iter().position(|u| u.id == id)?;
        let insert = {
            let unit = &mut self.units[idx];
            info!(name = %unit.name, priority = unit.priority, "delivering eureka");
            let insert = BrainInsert::Eureka {
                name: unit.name.clone(),
                content: unit.content.clone(),
            };
            if unit.priority > 1 {
                unit.insertion = Insertion::Trigger;
                unit.touch(now);
            }
            insert
        };
        if self.units[idx].priority <= 1 {
            self.units.remove(idx);
        }
        Some(insert)
    }

    // ── Trigger recall ─────────────────────────────────────────

    /// Recall trigger-insertion units matching the text (keyword, or
    /// semantic when an embedding is given). Matched units are touched.
    pub fn recall_triggers(
        &mut self,
        text: &str,
        embedding: Option<&[f32]>,
        now: DateTime<Utc>,
    ) -> Vec<MemoryUnit> {
        let ceiling = self.config.eureka_match_distance;
        let mut recalled = Vec::new();
        for unit in &mut self.units {
            if unit.insertion != Insertion::Trigger {
                continue;
            }
            let hit = keyword_match(text, &unit.name, &unit.content)
                || match (embedding, unit.content_embedding.as_deref()) {
                    (Some(a), Some(b)) => cosine_distance(a, b) <= ceiling,
                    _ => false,
                };
            if hit {
                unit.touch(now);
                recalled.push(unit.clone());
            }
        }
        recalled
    }

    // ── Recent searches ────────────────────────────────────────

    /// True if the topic was searched recently: an exact case-insensitive
    /// hit in the capped list, or any recent topic within `max_distance`
    /// when embeddings are available.
    pub fn was_searched_recently_within(
        &self,
        topic: &str,
        embedding: Option<&[f32]>,
        max_distance: f32,
    ) -> bool {
        if self
            .recent_searches
            .iter()
            .any(|s| s.topic.eq_ignore_ascii_case(topic))
        {
            return true;
        }
        let Some(query) = embedding else { return false };
        self.recent_searches
            .iter()
            .filter_map(|s| s.embedding.as_deref())
            .any(|e| cosine_distance(query, e) <= max_distance)
    }

    /// `was_searched_recently_within` with the configured default distance.
    pub fn was_searched_recently(&self, topic: &str, embedding: Option<&[f32]>) -> bool {
        self.was_searched_recently_within(topic, embedding, self.config.recent_search_distance)
    }

    /// Record a performed search for duplicate-work suppression.
    pub fn record_search(&mut self, topic: &str, embedding: Option<Vec<f32>>) {
        self.recent_searches.push_back(RecentSearch {
            topic: topic.to_string(),
            embedding,
        });
        while self.recent_searches.len() > RECENT_SEARCH_CAP {
            self.recent_searches.pop_front();
        }
    }

    // ── Return inserts ─────────────────────────────────────────

    /// Queue a note to be delivered with the next away line.
    pub fn queue_return_insert(&mut self, text: impl Into<String>) {
        self.pending_returns.push(text.into());
    }

    // ── Read accessors ─────────────────────────────────────────

    pub fn units(&self) -> &[MemoryUnit] {
        &self.units
    }

    pub fn unit(&self, id: Uuid) -> Option<&MemoryUnit> {
        self.units.iter().find(|u| u.id == id)
    }

    pub fn count(&self) -> usize {
        self.units.len()
    }

    /// Current eureka candidates, most-recent-first. Reflects the last
    /// `refresh_memories` call.
    pub fn eureka_candidates(&self) -> Vec<&MemoryUnit> {
        self.candidates
            .iter()
            .filter_map(|id| self.units.iter().find(|u| u.id == *id))
            .collect()
    }

    pub fn mood(&self) -> Mood {
        self.mood
    }

    /// Time since the last user message, if one was seen.
    pub fn idle_duration(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.last_user_seen.map(|t| now - t)
    }
}

/// Replace `existing` with `incoming` in place: the incoming content wins,
/// identity and recall history of the stored unit are preserved, and the
/// recall timestamp is refreshed.
fn replace_in_place(existing: &mut MemoryUnit, incoming: MemoryUnit) {
    existing.name = incoming.name;
    existing.content = incoming.content;
    existing.name_embedding = incoming.name_embedding;
    existing.content_embedding = incoming.content_embedding;
    existing.insertion = incoming.insertion;
    existing.priority = existing.priority.max(incoming.priority);
    existing.expires_at = incoming.expires_at;
    existing.trigger_count += 1;
    existing.last_recall = incoming.added;
}
