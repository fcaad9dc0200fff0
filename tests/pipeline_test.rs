use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use std::time::Duration;

use futures::future::join_all;
use listenlens::pipeline::{LookupCache, PipelineOptions, RetryPolicy};

#[tokio::test]
async fn test_lookup_cache_fetches_each_key_once() {
    let cache: LookupCache<String, usize> = LookupCache::new();
    let calls = Arc::new(AtomicUsize::new(0));

    // Ten concurrent lookups over two keys
    let lookups = (0..10).map(|i| {
        let cache = cache.clone();
        let calls = Arc::clone(&calls);
        let key = if i % 2 == 0 { "even" } else { "odd" }.to_string();
        async move {
            cache
                .get_or_fetch(key.clone(), || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    key.len()
                })
                .await
        }
    });
    let results = join_all(lookups).await;

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(results.iter().all(|&len| len == 4 || len == 3));
    assert_eq!(cache.len().await, 2);
    assert_eq!(cache.get(&"even".to_string()).await, Some(4));
    assert_eq!(cache.get(&"missing".to_string()).await, None);
}

#[tokio::test]
async fn test_lookup_cache_clones_share_entries() {
    let cache: LookupCache<u32, &'static str> = LookupCache::new();
    assert!(cache.is_empty().await);

    cache.get_or_fetch(1, || async { "first" }).await;
    let shared = cache.clone();
    let value = shared.get_or_fetch(1, || async { "second" }).await;

    assert_eq!(value, "first");
}

#[test]
fn test_retry_policy_delays() {
    let fixed = RetryPolicy::fixed(2, Duration::from_secs(1));
    assert_eq!(fixed.delay_for(1), Duration::from_secs(1));
    assert_eq!(fixed.delay_for(3), Duration::from_secs(1));

    let linear = RetryPolicy::linear(3, Duration::from_secs(2));
    assert_eq!(linear.delay_for(1), Duration::from_secs(2));
    assert_eq!(linear.delay_for(2), Duration::from_secs(4));
}

#[tokio::test]
async fn test_retry_policy_succeeds_after_failures() {
    let policy = RetryPolicy::fixed(3, Duration::ZERO);
    let attempts = AtomicUsize::new(0);

    let result: Result<&str, String> = policy
        .run("flaky", || {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(format!("failure {}", n))
                } else {
                    Ok("done")
                }
            }
        })
        .await;

    assert_eq!(result, Ok("done"));
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_retry_policy_returns_last_error() {
    let policy = RetryPolicy::linear(2, Duration::ZERO);
    let attempts = AtomicUsize::new(0);

    let result: Result<(), String> = policy
        .run("broken", || {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move { Err(format!("failure {}", n)) }
        })
        .await;

    assert_eq!(result, Err("failure 1".to_string()));
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_retry_policy_runs_at_least_once() {
    let policy = RetryPolicy::fixed(0, Duration::ZERO);
    let attempts = AtomicUsize::new(0);

    let result: Result<(), &str> = policy
        .run("never", || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err("nope") }
        })
        .await;

    assert!(result.is_err());
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[test]
fn test_pipeline_defaults() {
    let options = PipelineOptions::default();

    assert_eq!(options.playlist_workers, 8);
    assert_eq!(options.playlist_retry, RetryPolicy::fixed(2, Duration::from_secs(1)));
    assert_eq!(options.top_limit, 50);
    assert_eq!(options.recent_limit, 50);
    assert_eq!(options.max_genres, 3);
    assert_eq!(options.max_similar, 3);
}
