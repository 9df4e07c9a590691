#[cfg(test)]
mod tests {
    use quill_memory::{ResearchResult, ResearchStore, MAX_RESULTS_PER_QUERY};
    use uuid::Uuid;

    fn hit(n: usize) -> ResearchResult {
        ResearchResult {
            title: format!("result {n}"),
            url: format!("https://example.com/{n}"),
            snippet: format!("snippet {n}"),
        }
    }

    #[test]
    fn test_missing_document_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResearchStore::new(dir.path());
        let session = Uuid::new_v4();
        assert!(store.load(session).unwrap().is_none());
        assert!(!store.has_results(session));
        assert!(store.topics(session).is_empty());
    }

    #[test]
    fn test_append_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResearchStore::new(dir.path());
        let session = Uuid::new_v4();

        store
            .append_results(session, "rust async", "tokio tutorial", vec![hit(1), hit(2)])
            .unwrap();
        store
            .append_results(session, "rust async", "async traits", vec![hit(3)])
            .unwrap();
        store
            .append_results(session, "gardening", "tomato soil ph", vec![hit(4)])
            .unwrap();

        let doc = store.load(session).unwrap().expect("document exists");
        assert_eq!(doc.session, session);
        assert_eq!(doc.topics.len(), 2);
        assert_eq!(doc.topics[0].topic, "rust async");
        assert_eq!(doc.topics[0].queries.len(), 2);
        assert_eq!(doc.topics[0].queries[1].query, "async traits");
        assert_eq!(doc.topics[1].queries[0].results[0].title, "result 4");

        assert!(store.has_results(session));
        assert_eq!(store.topics(session), vec!["rust async", "gardening"]);
    }

    #[test]
    fn test_results_truncated_per_query() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResearchStore::new(dir.path());
        let session = Uuid::new_v4();

        let many: Vec<ResearchResult> = (0..15).map(hit).collect();
        store.append_results(session, "topic", "query", many).unwrap();

        let doc = store.load(session).unwrap().unwrap();
        assert_eq!(doc.topics[0].queries[0].results.len(), MAX_RESULTS_PER_QUERY);
    }

    #[test]
    fn test_configured_cap_lowers_results_kept() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResearchStore::new(dir.path()).with_max_results(3);
        let session = Uuid::new_v4();

        let many: Vec<ResearchResult> = (0..10).map(hit).collect();
        store.append_results(session, "topic", "query", many).unwrap();

        let doc = store.load(session).unwrap().unwrap();
        assert_eq!(doc.topics[0].queries[0].results.len(), 3);
    }

    #[test]
    fn test_configured_cap_cannot_exceed_ceiling() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResearchStore::new(dir.path()).with_max_results(50);
        let session = Uuid::new_v4();

        let many: Vec<ResearchResult> = (0..15).map(hit).collect();
        store.append_results(session, "topic", "query", many).unwrap();

        let doc = store.load(session).unwrap().unwrap();
        assert_eq!(doc.topics[0].queries[0].results.len(), MAX_RESULTS_PER_QUERY);
    }

    #[test]
    fn test_ensure_document_claims_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResearchStore::new(dir.path());
        let session = Uuid::new_v4();

        assert!(!store.has_document(session));
        store.ensure_document(session).unwrap();
        assert!(store.has_document(session));
        // Empty document: claimed, but no results yet.
        assert!(!store.has_results(session));

        // Idempotent, and appending into the claimed document works.
        store.ensure_document(session).unwrap();
        store.append_results(session, "topic", "query", vec![hit(1)]).unwrap();
        assert!(store.has_results(session));
    }

    #[test]
    fn test_sessions_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResearchStore::new(dir.path());
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        store.append_results(a, "topic", "query", vec![hit(1)]).unwrap();
        assert!(store.has_results(a));
        assert!(!store.has_results(b));
    }

    #[test]
    fn test_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResearchStore::new(dir.path());
        let session = Uuid::new_v4();

        store.append_results(session, "topic", "query", vec![hit(1)]).unwrap();
        assert!(store.clear(session).unwrap());
        assert!(!store.has_results(session));
        assert!(!store.clear(session).unwrap());
    }

    #[test]
    fn test_corrupt_document_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResearchStore::new(dir.path());
        let session = Uuid::new_v4();

        std::fs::write(dir.path().join(format!("{session}.json")), "not json").unwrap();
        assert!(store.load(session).is_err());
    }
}
