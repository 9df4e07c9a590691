//! Mutable agent state shared between the scheduler and plugins.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use quill_core::{QuillError, Result};

/// Counters and timestamps the background machinery reads and writes.
/// Wrapped in `Arc<parking_lot::RwLock<..>>` by the runtime.
#[derive(Debug, Clone)]
pub struct AgentState {
    /// UTC calendar day the search counter belongs to.
    day: String,
    searches_today: u32,
    daily_search_budget: u32,
    pub last_reflection: Option<DateTime<Utc>>,
    pub session_count: usize,
    /// Model tokens spent by background tasks, folded in by the scheduler.
    pub tokens_today: u64,
}

impl AgentState {
    pub fn new(daily_search_budget: u32, now: DateTime<Utc>) -> Self {
        Self {
            day: day_of(now),
            searches_today: 0,
            daily_search_budget,
            last_reflection: None,
            session_count: 0,
            tokens_today: 0,
        }
    }

    /// Count one web search against today's budget. Fails without counting
    /// when the budget is already spent, so callers can bail before any
    /// network work.
    pub fn record_search(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.maybe_reset_day(now);
        if self.searches_today >= self.daily_search_budget {
            warn!(
                used = self.searches_today,
                limit = self.daily_search_budget,
                "daily search budget exhausted"
            );
            return Err(QuillError::BudgetExceeded {
                resource: "daily_searches".into(),
                used: self.searches_today,
                limit: self.daily_search_budget,
            });
        }
        self.searches_today += 1;
        Ok(())
    }

    /// Searches still allowed today.
    pub fn remaining_searches(&mut self, now: DateTime<Utc>) -> u32 {
        self.maybe_reset_day(now);
        self.daily_search_budget.saturating_sub(self.searches_today)
    }

    pub fn searches_today(&mut self, now: DateTime<Utc>) -> u32 {
        self.maybe_reset_day(now);
        self.searches_today
    }

    pub fn record_tokens(&mut self, tokens: u32) {
        self.tokens_today += tokens as u64;
    }

    fn maybe_reset_day(&mut self, now: DateTime<Utc>) {
        let day = day_of(now);
        if self.day != day {
            debug!(old = %self.day, new = %day, "day boundary, search counter reset");
            self.day = day;
            self.searches_today = 0;
            self.tokens_today = 0;
        }
    }
}

fn day_of(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d").to_string()
}
