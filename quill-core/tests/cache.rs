#[cfg(test)]
mod tests {
    use quill_core::{Cache, Error};
    use std::{
        sync::{
            Arc, Barrier,
            atomic::{AtomicUsize, Ordering},
        },
        thread,
    };

    #[test]
    fn racing_threads_share_one_value() {
        const THREADS: usize = 8;
        let cache = Cache::<u32, Arc<String>>::new();
        let computed = AtomicUsize::new(0);
        let barrier = Barrier::new(THREADS);
        let results = thread::scope(|s| {
            let handles = (0..THREADS)
                .map(|i| {
                    let (cache, computed, barrier) = (&cache, &computed, &barrier);
                    s.spawn(move || {
                        barrier.wait();
                        cache
                            .get_or_insert_with(1, || {
                                computed.fetch_add(1, Ordering::Relaxed);
                                Ok(Arc::new(format!("computed by {}", i)))
                            })
                            .expect("The computation does not fail")
                    })
                })
                .collect::<Vec<_>>();
            handles
                .into_iter()
                .map(|v| v.join().expect("The thread panicked"))
                .collect::<Vec<_>>()
        });
        assert!(computed.load(Ordering::Relaxed) >= 1);
        assert_eq!(cache.len(), 1);
        let stored = cache.get(&1).expect("The value was inserted");
        for result in results {
            assert!(Arc::ptr_eq(&result, &stored));
        }
    }

    #[test]
    fn failures_are_not_stored() {
        let cache = Cache::<&'static str, i32>::new();
        assert!(cache.is_empty());
        let result = cache.get_or_insert_with("key", || Err(Error::msg("not now")));
        assert!(result.is_err());
        assert_eq!(cache.get(&"key"), None);
        assert_eq!(cache.get_or_insert_with("key", || Ok(5)).unwrap(), 5);
        // Already there, the closure does not run
        assert_eq!(
            cache
                .get_or_insert_with("key", || -> quill_core::Result<i32> {
                    panic!("The value should come from the cache")
                })
                .unwrap(),
            5
        );
    }
}
