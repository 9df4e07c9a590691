#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use quill_config::BrainConfig;
    use quill_core::{Message, Role};
    use quill_memory::{Brain, BrainInsert, Insertion, MemoryCategory, MemoryUnit};

    fn t0() -> chrono::DateTime<Utc> {
        // A weekday mid-morning, well inside "cheerful" hours.
        Utc.with_ymd_and_hms(2025, 6, 2, 10, 0, 0).unwrap()
    }

    fn config() -> BrainConfig {
        BrainConfig {
            min_insert_delay_secs: 0,
            ..BrainConfig::default()
        }
    }

    fn unit(
        category: MemoryCategory,
        insertion: Insertion,
        name: &str,
        content: &str,
        priority: u32,
    ) -> MemoryUnit {
        MemoryUnit::new(category, insertion, name, content, priority, t0())
    }

    fn user(text: &str) -> Message {
        Message::text(Role::User, text)
    }

    // ── Memorize / dedup ───────────────────────────────────────

    mod memorize {
        use super::*;

        #[test]
        fn test_near_duplicate_replaced_in_place() {
            let mut brain = Brain::new(config());
            let first = unit(MemoryCategory::General, Insertion::Trigger, "rust", "v1", 1)
                .with_content_embedding(vec![1.0, 0.0, 0.0]);
            let first_id = first.id;
            brain.memorize(first, false);

            // Distance well below 0.07.
            let second = unit(MemoryCategory::General, Insertion::Trigger, "rust", "v2", 1)
                .with_content_embedding(vec![0.999, 0.01, 0.0]);
            brain.memorize(second, false);

            assert_eq!(brain.count(), 1);
            let stored = brain.unit(first_id).expect("identity preserved");
            assert_eq!(stored.content, "v2");
        }

        #[test]
        fn test_nearest_of_several_is_replaced() {
            let mut brain = Brain::new(config());
            let far = unit(MemoryCategory::General, Insertion::Trigger, "far", "far fact", 1)
                .with_content_embedding(vec![0.0, 1.0, 0.0]);
            let near = unit(MemoryCategory::General, Insertion::Trigger, "near", "old", 1)
                .with_content_embedding(vec![1.0, 0.0, 0.0]);
            let near_id = near.id;
            brain.memorize(far, false);
            brain.memorize(near, false);

            brain.memorize(
                unit(MemoryCategory::General, Insertion::Trigger, "near", "new", 1)
                    .with_content_embedding(vec![0.999, 0.01, 0.0]),
                false,
            );
            assert_eq!(brain.count(), 2);
            assert_eq!(brain.unit(near_id).map(|u| u.content.as_str()), Some("new"));
        }

        #[test]
        fn test_distant_unit_appended() {
            let mut brain = Brain::new(config());
            brain.memorize(
                unit(MemoryCategory::General, Insertion::Trigger, "a", "one", 1)
                    .with_content_embedding(vec![1.0, 0.0, 0.0]),
                false,
            );
            brain.memorize(
                unit(MemoryCategory::General, Insertion::Trigger, "b", "two", 1)
                    .with_content_embedding(vec![0.0, 1.0, 0.0]),
                false,
            );
            assert_eq!(brain.count(), 2);
        }

        #[test]
        fn test_same_embedding_different_category_appended() {
            let mut brain = Brain::new(config());
            brain.memorize(
                unit(MemoryCategory::General, Insertion::Trigger, "a", "one", 1)
                    .with_content_embedding(vec![1.0, 0.0, 0.0]),
                false,
            );
            brain.memorize(
                unit(MemoryCategory::Journal, Insertion::Trigger, "b", "two", 1)
                    .with_content_embedding(vec![1.0, 0.0, 0.0]),
                false,
            );
            assert_eq!(brain.count(), 2);
        }

        #[test]
        fn test_skip_duplicate_check_appends() {
            let mut brain = Brain::new(config());
            let emb = vec![1.0, 0.0, 0.0];
            brain.memorize(
                unit(MemoryCategory::General, Insertion::Trigger, "a", "one", 1)
                    .with_content_embedding(emb.clone()),
                false,
            );
            brain.memorize(
                unit(MemoryCategory::General, Insertion::Trigger, "a", "one again", 1)
                    .with_content_embedding(emb),
                true,
            );
            assert_eq!(brain.count(), 2);
        }

        #[test]
        fn test_person_replaced_by_name_case_insensitive() {
            let mut brain = Brain::new(config());
            brain.memorize(
                unit(MemoryCategory::Person, Insertion::Trigger, "Alice", "likes tea", 2)
                    .with_content_embedding(vec![1.0, 0.0, 0.0]),
                false,
            );
            brain.memorize(
                unit(MemoryCategory::Person, Insertion::Trigger, "alice", "likes coffee", 1)
                    .with_content_embedding(vec![0.0, 1.0, 0.0]),
                false,
            );
            assert_eq!(brain.count(), 1);
            let stored = &brain.units()[0];
            assert_eq!(stored.content, "likes coffee");
            // Higher of the two priorities wins.
            assert_eq!(stored.priority, 2);
        }

        #[test]
        fn test_forget() {
            let mut brain = Brain::new(config());
            let u = unit(MemoryCategory::General, Insertion::Trigger, "x", "y", 1);
            let id = u.id;
            brain.memorize(u, false);
            assert!(brain.forget(id));
            assert!(!brain.forget(id));
            assert_eq!(brain.count(), 0);
        }
    }

    // ── Decay & eureka window ──────────────────────────────────

    mod decay {
        use super::*;

        #[test]
        fn test_natural_survives_then_expires_past_cutoff() {
            let mut brain = Brain::new(config());
            brain.memorize(
                unit(MemoryCategory::WebSearch, Insertion::Natural, "qcd", "quark notes", 2),
                false,
            );

            brain.refresh_memories(t0());
            assert_eq!(brain.eureka_candidates().len(), 1);

            // Past the 48h cutoff the unit is gone entirely.
            let later = t0() + Duration::hours(49);
            brain.refresh_memories(later);
            assert!(brain.eureka_candidates().is_empty());
            assert_eq!(brain.count(), 0);
        }

        #[test]
        fn test_natural_forced_demoted_not_deleted() {
            let mut brain = Brain::new(config());
            brain.memorize(
                unit(MemoryCategory::General, Insertion::NaturalForced, "keep", "me", 3),
                false,
            );
            let later = t0() + Duration::hours(49);
            brain.refresh_memories(later);
            assert!(brain.eureka_candidates().is_empty());
            assert_eq!(brain.count(), 1);
            assert_eq!(brain.units()[0].insertion, Insertion::Trigger);
        }

        #[test]
        fn test_trigger_decay_formula() {
            let mut brain = Brain::new(config());
            // base 3.0 days × (1+1) + 0 recalls = 6 days allowed.
            brain.memorize(
                unit(MemoryCategory::General, Insertion::Trigger, "stale", "fact", 1),
                false,
            );
            brain.refresh_memories(t0() + Duration::days(5));
            assert_eq!(brain.count(), 1);
            brain.refresh_memories(t0() + Duration::days(7));
            assert_eq!(brain.count(), 0);
        }

        #[test]
        fn test_recall_extends_trigger_lifetime() {
            let mut brain = Brain::new(config());
            brain.memorize(
                unit(MemoryCategory::General, Insertion::Trigger, "rust", "rust borrow checker notes", 1),
                false,
            );
            // Recall at day 5 resets the idle clock and bumps the counter.
            let recalled = brain.recall_triggers("tell me about rust", None, t0() + Duration::days(5));
            assert_eq!(recalled.len(), 1);
            assert_eq!(recalled[0].trigger_count, 1);

            brain.refresh_memories(t0() + Duration::days(10));
            assert_eq!(brain.count(), 1);
        }

        #[test]
        fn test_person_category_never_decays() {
            let mut brain = Brain::new(config());
            brain.memorize(
                unit(MemoryCategory::Person, Insertion::Trigger, "Bob", "brother", 0),
                false,
            );
            brain.refresh_memories(t0() + Duration::days(365));
            assert_eq!(brain.count(), 1);
        }

        #[test]
        fn test_explicit_expiry_removes_unit() {
            let mut brain = Brain::new(config());
            brain.memorize(
                unit(MemoryCategory::Event, Insertion::Trigger, "dentist", "appointment", 3)
                    .with_expiry(t0() + Duration::hours(1)),
                false,
            );
            brain.refresh_memories(t0() + Duration::hours(2));
            assert_eq!(brain.count(), 0);
        }

        #[test]
        fn test_candidates_most_recent_first() {
            let mut brain = Brain::new(config());
            let mut old = unit(MemoryCategory::General, Insertion::Natural, "old", "o", 1);
            old.added = t0() - Duration::hours(10);
            brain.memorize(old, false);
            brain.memorize(unit(MemoryCategory::General, Insertion::Natural, "new", "n", 1), false);
            brain.refresh_memories(t0());
            let names: Vec<_> = brain.eureka_candidates().iter().map(|u| u.name.clone()).collect();
            assert_eq!(names, vec!["new", "old"]);
        }
    }

    // ── HandleMessages / eureka policy ─────────────────────────

    mod eureka {
        use super::*;

        #[test]
        fn test_non_user_message_is_noop() {
            let mut brain = Brain::new(BrainConfig {
                min_message_delay: 1,
                min_insert_delay_secs: 0,
                ..BrainConfig::default()
            });
            brain.memorize(
                unit(MemoryCategory::General, Insertion::Natural, "fact", "something learned", 2),
                false,
            );

            let out = brain.handle_message(&Message::text(Role::Assistant, "hello"), None, t0());
            assert!(out.is_none());
            let out = brain.handle_message(&Message::text(Role::System, "note"), None, t0());
            assert!(out.is_none());

            // The very next user message still counts as the first one.
            let out = brain.handle_message(&user("good morning"), None, t0());
            assert!(matches!(out, Some(BrainInsert::Eureka { .. })));
        }

        #[test]
        fn test_min_message_delay_scenario() {
            // 3 user messages with no match produce nothing; the 4th inserts
            // exactly one eureka.
            let mut brain = Brain::new(config());
            brain.memorize(
                unit(MemoryCategory::WebSearch, Insertion::Natural, "qcd", "quark chromodynamics flux", 2),
                false,
            );

            for i in 0..3 {
                let now = t0() + Duration::minutes(i);
                assert!(brain.handle_message(&user("nice weather"), None, now).is_none());
            }
            let out = brain.handle_message(&user("nice weather"), None, t0() + Duration::minutes(3));
            match out {
                Some(BrainInsert::Eureka { name, .. }) => assert_eq!(name, "qcd"),
                other => panic!("expected eureka, got {other:?}"),
            }
            // Priority 2 is demoted to Trigger, so nothing is left to insert.
            let out = brain.handle_message(&user("nice weather"), None, t0() + Duration::minutes(4));
            assert!(out.is_none());
            assert_eq!(brain.units()[0].insertion, Insertion::Trigger);
        }

        #[test]
        fn test_low_priority_eureka_deleted_after_delivery() {
            let mut brain = Brain::new(BrainConfig {
                min_message_delay: 1,
                min_insert_delay_secs: 0,
                ..BrainConfig::default()
            });
            brain.memorize(
                unit(MemoryCategory::General, Insertion::Natural, "minor", "a small thing", 1),
                false,
            );
            let out = brain.handle_message(&user("hello there"), None, t0());
            assert!(matches!(out, Some(BrainInsert::Eureka { .. })));
            assert_eq!(brain.count(), 0);
        }

        #[test]
        fn test_keyword_match_bypasses_delay() {
            let mut brain = Brain::new(config());
            brain.memorize(
                unit(
                    MemoryCategory::WebSearch,
                    Insertion::Natural,
                    "quantum computing",
                    "notes about quantum computing hardware",
                    2,
                ),
                false,
            );
            // First message, delay counter far below 4 — but the name matches.
            let out = brain.handle_message(&user("tell me about quantum computing"), None, t0());
            match out {
                Some(BrainInsert::Eureka { name, .. }) => assert_eq!(name, "quantum computing"),
                other => panic!("expected eureka, got {other:?}"),
            }
        }

        #[test]
        fn test_semantic_match_inserts_immediately() {
            let mut brain = Brain::new(config());
            brain.memorize(
                unit(MemoryCategory::General, Insertion::Natural, "fact", "entirely unrelated words", 2)
                    .with_content_embedding(vec![1.0, 0.0]),
                false,
            );
            // Raw distance ~0.0 — well inside the 0.085 ceiling.
            let out = brain.handle_message(&user("hello"), Some(&[0.999, 0.01]), t0());
            assert!(matches!(out, Some(BrainInsert::Eureka { .. })));
        }

        #[test]
        fn test_update_phrase_prefers_forced() {
            let mut brain = Brain::new(config());
            brain.memorize(
                unit(MemoryCategory::General, Insertion::Natural, "casual", "casual fact", 5),
                false,
            );
            brain.memorize(
                unit(MemoryCategory::General, Insertion::NaturalForced, "urgent", "urgent fact", 2),
                false,
            );
            let out = brain.handle_message(&user("any updates for me?"), None, t0());
            match out {
                Some(BrainInsert::Eureka { name, .. }) => assert_eq!(name, "urgent"),
                other => panic!("expected eureka, got {other:?}"),
            }
        }

        #[test]
        fn test_forced_wins_priority_tie() {
            let mut brain = Brain::new(BrainConfig {
                min_message_delay: 1,
                min_insert_delay_secs: 0,
                ..BrainConfig::default()
            });
            brain.memorize(
                unit(MemoryCategory::General, Insertion::Natural, "plain", "an ordinary fact", 3),
                false,
            );
            brain.memorize(
                unit(MemoryCategory::General, Insertion::NaturalForced, "pressing", "a pressing fact", 3),
                false,
            );
            let out = brain.handle_message(&user("good evening"), None, t0());
            match out {
                Some(BrainInsert::Eureka { name, .. }) => assert_eq!(name, "pressing"),
                other => panic!("expected eureka, got {other:?}"),
            }
        }

        #[test]
        fn test_eurekas_disabled() {
            let mut brain = Brain::new(BrainConfig {
                eurekas_enabled: false,
                min_message_delay: 1,
                min_insert_delay_secs: 0,
                ..BrainConfig::default()
            });
            brain.memorize(
                unit(MemoryCategory::General, Insertion::Natural, "fact", "something", 2),
                false,
            );
            assert!(brain.handle_message(&user("hello"), None, t0()).is_none());
        }

        #[test]
        fn test_away_line_suppresses_eureka() {
            let mut brain = Brain::new(config());
            brain.memorize(
                unit(MemoryCategory::General, Insertion::NaturalForced, "fact", "pending news", 3),
                false,
            );
            // First contact establishes last-seen.
            brain.handle_message(&user("hi"), None, t0());
            // Back after four hours — over the 3h away threshold.
            let out = brain.handle_message(&user("i'm back, any updates?"), None, t0() + Duration::hours(4));
            match out {
                Some(BrainInsert::Away { text }) => {
                    assert!(text.contains("4h"), "away line should mention elapsed time: {text}");
                }
                other => panic!("expected away line, got {other:?}"),
            }
        }

        #[test]
        fn test_pending_return_insert_delivered_with_away_line() {
            let mut brain = Brain::new(config());
            brain.queue_return_insert("While you were gone I finished the research.");
            let out = brain.handle_message(&user("hello"), None, t0());
            match out {
                Some(BrainInsert::Away { text }) => {
                    assert!(text.contains("finished the research"));
                }
                other => panic!("expected away line, got {other:?}"),
            }
            // Drained — next turn is back to normal.
            let out = brain.handle_message(&user("hello again"), None, t0() + Duration::minutes(1));
            assert!(out.is_none());
        }
    }

    // ── Recent searches ────────────────────────────────────────

    mod searches {
        use super::*;

        #[test]
        fn test_exact_match_case_insensitive() {
            let mut brain = Brain::new(config());
            brain.record_search("Quantum Computing", None);
            assert!(brain.was_searched_recently("quantum computing", None));
            assert!(!brain.was_searched_recently("rust lifetimes", None));
        }

        #[test]
        fn test_semantic_paraphrase_match() {
            let mut brain = Brain::new(config());
            brain.record_search("quantum computing", Some(vec![1.0, 0.0, 0.0]));
            // Distance ≈ 0.0005 — inside the 0.075 default.
            assert!(brain.was_searched_recently("quantum computers", Some(&[0.999, 0.03, 0.0])));
            // Orthogonal — no match.
            assert!(!brain.was_searched_recently("gardening", Some(&[0.0, 1.0, 0.0])));
        }

        #[test]
        fn test_capped_at_20_oldest_evicted() {
            let mut brain = Brain::new(config());
            for i in 0..25 {
                brain.record_search(&format!("topic {i}"), None);
            }
            assert!(!brain.was_searched_recently("topic 0", None));
            assert!(!brain.was_searched_recently("topic 4", None));
            assert!(brain.was_searched_recently("topic 5", None));
            assert!(brain.was_searched_recently("topic 24", None));
        }
    }
}
