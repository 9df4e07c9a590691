#[cfg(test)]
mod tests {
    use quill_config::schema::*;
    use quill_config::ConfigLoader;
    use std::io::Write;

    // ── Default tests ──────────────────────────────────────────

    #[test]
    fn test_scheduler_defaults() {
        let config = SchedulerConfig::default();
        assert_eq!(config.idle_minutes, 10);
        assert_eq!(config.daily_search_budget, 10);
        assert_eq!(config.staged_ttl_secs, 6 * 3600);
        assert_eq!(config.reflection_interval_secs, 6 * 3600);
        assert_eq!(config.idle_threshold(), chrono::Duration::minutes(10));
    }

    #[test]
    fn test_brain_defaults() {
        let config = BrainConfig::default();
        assert!(config.eurekas_enabled);
        assert_eq!(config.eureka_cutoff_secs, 48 * 3600);
        assert_eq!(config.min_message_delay, 4);
        assert_eq!(config.duplicate_distance, 0.07);
        assert_eq!(config.eureka_match_distance, 0.085);
        assert_eq!(config.recent_search_distance, 0.075);
        assert!(!config.update_phrases.is_empty());
    }

    #[test]
    fn test_research_defaults() {
        let config = ResearchConfig::default();
        assert_eq!(config.max_topics, 3);
        assert_eq!(config.max_queries_per_topic, 3);
        assert_eq!(config.max_results_per_query, 8);
    }

    // ── TOML roundtrip tests ───────────────────────────────────

    #[test]
    fn test_config_toml_roundtrip() {
        let config = QuillConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let restored: QuillConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(
            restored.scheduler.daily_search_budget,
            config.scheduler.daily_search_budget
        );
        assert_eq!(
            restored.brain.eureka_cutoff_secs,
            config.brain.eureka_cutoff_secs
        );
        assert_eq!(restored.logging.level, config.logging.level);
    }

    #[test]
    fn test_partial_toml_applies_defaults() {
        let toml_str = r#"
[scheduler]
daily_search_budget = 3

[brain]
min_message_delay = 2
"#;
        let config: QuillConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.scheduler.daily_search_budget, 3);
        assert_eq!(config.brain.min_message_delay, 2);
        // Defaults should fill in
        assert_eq!(config.scheduler.idle_minutes, 10);
        assert!(config.brain.eurekas_enabled);
        assert_eq!(config.research.max_topics, 3);
    }

    // ── Validation tests ───────────────────────────────────────

    #[test]
    fn test_validate_default_is_clean() {
        let config = QuillConfig::default();
        let warnings = config.validate().unwrap();
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_validate_warns_on_zero_budget() {
        let mut config = QuillConfig::default();
        config.scheduler.daily_search_budget = 0;
        let warnings = config.validate().unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("daily_search_budget"));
    }

    #[test]
    fn test_validate_rejects_bad_duplicate_distance() {
        let mut config = QuillConfig::default();
        config.brain.duplicate_distance = 1.5;
        assert!(config.validate().is_err());
    }

    // ── Loader tests ───────────────────────────────────────────

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        let loader = ConfigLoader::load(Some(&path)).unwrap();
        let config = loader.get();
        assert_eq!(config.scheduler.idle_minutes, 10);
    }

    #[test]
    fn test_load_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quill.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "[scheduler]\nidle_minutes = 20").unwrap();
        drop(f);

        let loader = ConfigLoader::load(Some(&path)).unwrap();
        assert_eq!(loader.get().scheduler.idle_minutes, 20);

        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "[scheduler]\nidle_minutes = 30").unwrap();
        drop(f);

        loader.reload().unwrap();
        assert_eq!(loader.get().scheduler.idle_minutes, 30);
    }
}
