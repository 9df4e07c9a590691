#[cfg(test)]
mod tests {
    use quill_runtime::PriorityQueue;
    use std::sync::Arc;

    #[test]
    fn test_higher_priority_first() {
        let q = PriorityQueue::new();
        q.enqueue("low", 1);
        q.enqueue("high", 5);
        q.enqueue("mid", 3);
        assert_eq!(q.try_dequeue(), Some("high"));
        assert_eq!(q.try_dequeue(), Some("mid"));
        assert_eq!(q.try_dequeue(), Some("low"));
    }

    #[test]
    fn test_fifo_within_priority_band() {
        let q = PriorityQueue::new();
        q.enqueue("first", 2);
        q.enqueue("second", 2);
        q.enqueue("third", 2);
        assert_eq!(q.try_dequeue(), Some("first"));
        assert_eq!(q.try_dequeue(), Some("second"));
        assert_eq!(q.try_dequeue(), Some("third"));
    }

    #[test]
    fn test_fifo_survives_interleaved_priorities() {
        let q = PriorityQueue::new();
        q.enqueue("a1", 1);
        q.enqueue("b1", 5);
        q.enqueue("a2", 1);
        q.enqueue("b2", 5);
        assert_eq!(q.try_dequeue(), Some("b1"));
        assert_eq!(q.try_dequeue(), Some("b2"));
        assert_eq!(q.try_dequeue(), Some("a1"));
        assert_eq!(q.try_dequeue(), Some("a2"));
    }

    #[test]
    fn test_empty_dequeue_is_none() {
        let q: PriorityQueue<u32> = PriorityQueue::new();
        assert!(q.try_dequeue().is_none());
        assert!(q.is_empty());
        assert_eq!(q.len(), 0);
    }

    #[test]
    fn test_clear() {
        let q = PriorityQueue::new();
        q.enqueue(1, 1);
        q.enqueue(2, 2);
        assert_eq!(q.len(), 2);
        q.clear();
        assert!(q.is_empty());
        assert!(q.try_dequeue().is_none());
    }

    #[test]
    fn test_concurrent_producers() {
        let q = Arc::new(PriorityQueue::new());
        let mut handles = Vec::new();
        for t in 0..4 {
            let q = q.clone();
            handles.push(std::thread::spawn(move || {
                for i in 0..100 {
                    q.enqueue(t * 100 + i, (i % 5) as u32 + 1);
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(q.len(), 400);

        let mut last_priority = u32::MAX;
        let mut drained = 0;
        while let Some(v) = q.try_dequeue() {
            let priority = (v % 100 % 5) as u32 + 1;
            assert!(priority <= last_priority);
            last_priority = priority;
            drained += 1;
        }
        assert_eq!(drained, 400);
    }
}
