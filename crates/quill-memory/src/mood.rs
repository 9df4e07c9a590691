use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Lightweight derived mood, consumed by away messages and plugins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Cheerful,
    #[default]
    Calm,
    Pensive,
    Drowsy,
}

impl Mood {
    /// Derive mood from the hour of day and how long the user has been away.
    pub fn derive(now: DateTime<Utc>, idle: Option<Duration>) -> Self {
        let hour = now.hour();
        if !(6..23).contains(&hour) {
            return Mood::Drowsy;
        }
        if idle.is_some_and(|d| d > Duration::hours(8)) {
            return Mood::Pensive;
        }
        if (9..18).contains(&hour) {
            Mood::Cheerful
        } else {
            Mood::Calm
        }
    }

    /// Human-readable description used in synthesized system lines.
    pub fn describe(&self) -> &'static str {
        match self {
            Mood::Cheerful => "cheerful",
            Mood::Calm => "calm",
            Mood::Pensive => "pensive",
            Mood::Drowsy => "drowsy",
        }
    }
}

/// Render a duration as "3h 12m" (or "12m" under an hour).
pub fn format_elapsed(d: Duration) -> String {
    let mins = d.num_minutes().max(0);
    if mins < 60 {
        format!("{mins}m")
    } else {
        format!("{}h {}m", mins / 60, mins % 60)
    }
}
