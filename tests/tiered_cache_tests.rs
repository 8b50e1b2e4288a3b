//! Integration Tests for the tiered cache
//!
//! Drives `TieredCache` over the in-process remote store. Time-dependent
//! tests run on tokio's paused clock, so TTLs elapse deterministically.

use std::convert::Infallible;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tiercache::remote::{Fault, MemoryStore};
use tiercache::{CacheError, JsonCodec, RemoteStore, Settings, TieredCache, Variant};

// == Helper Types ==

#[derive(Debug, Clone, Serialize)]
struct PartnerRequest {
    id: i64,
    name: String,
    limit: i32,
    ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Partner {
    id: i64,
    name: String,
}

fn request(id: i64, limit: i32) -> PartnerRequest {
    PartnerRequest {
        id,
        name: String::new(),
        limit,
        ids: vec![],
    }
}

fn partners(ids: &[i64]) -> Vec<Partner> {
    ids.iter()
        .map(|&id| Partner {
            id,
            name: format!("te{id}"),
        })
        .collect()
}

fn settings(ttl: Duration) -> Settings {
    Settings::with_ttl(ttl)
}

fn cache_with(settings: Settings) -> TieredCache<MemoryStore> {
    TieredCache::new(MemoryStore::new(), JsonCodec, settings)
}

// == Set / ParseData ==

#[tokio::test]
async fn test_set_then_parse_data_roundtrip() {
    let cache = cache_with(settings(Duration::from_secs(300)));
    let req = request(10, 1);
    let insert = partners(&[1, 2]);

    cache.set(Variant::Raw, &req, &insert).await.unwrap();
    let data: Vec<Partner> = cache.parse_data(&req).await.unwrap();

    assert_eq!(data, insert);
    assert_eq!(cache.stats().local_hits, 1);
}

#[tokio::test]
async fn test_parse_data_falls_back_to_remote() {
    let mut settings = settings(Duration::from_secs(300));
    settings.local_enabled = false;
    let cache = cache_with(settings);
    let req = request(10, 1);

    cache.set(Variant::Raw, &req, &partners(&[7])).await.unwrap();
    let data: Vec<Partner> = cache.parse_data(&req).await.unwrap();

    assert_eq!(data, partners(&[7]));
    assert_eq!(cache.stats().remote_hits, 1);
}

#[tokio::test]
async fn test_parse_data_propagates_remote_failure() {
    let mut settings = settings(Duration::from_secs(300));
    settings.local_enabled = false;
    let cache = cache_with(settings);
    cache.remote().inject(Fault::Unavailable);

    let result: tiercache::Result<Vec<Partner>> = cache.parse_data(&request(1, 1)).await;
    assert!(matches!(result, Err(CacheError::Unavailable(_))));
}

// == Read-or-compute ==

#[tokio::test]
async fn test_list_second_call_is_cached() {
    let cache = cache_with(settings(Duration::from_secs(300)));
    let req = request(10, 2);
    let calls = AtomicU32::new(0);

    let first = cache
        .list(&req, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, Infallible>(partners(&[1, 4]))
        })
        .await
        .unwrap();
    let second = cache
        .list(&req, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, Infallible>(partners(&[99]))
        })
        .await
        .unwrap();

    assert_eq!(first, partners(&[1, 4]));
    assert_eq!(second, first);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_list_recomputes_after_remote_ttl() {
    let cache = cache_with(settings(Duration::from_secs(60)));
    let req = request(10, 2);

    cache
        .list(&req, || async { Ok::<_, Infallible>(partners(&[1])) })
        .await
        .unwrap();

    // Past the local TTL (30s) but inside the remote TTL: served remotely
    tokio::time::advance(Duration::from_secs(45)).await;
    let mid = cache
        .list(&req, || async { Ok::<_, Infallible>(partners(&[2])) })
        .await
        .unwrap();
    assert_eq!(mid, partners(&[1]));
    assert_eq!(cache.stats().remote_hits, 1);

    tokio::time::advance(Duration::from_secs(16)).await;
    let late = cache
        .list(&req, || async { Ok::<_, Infallible>(partners(&[3])) })
        .await
        .unwrap();
    assert_eq!(late, partners(&[3]));
    assert_eq!(cache.stats().handler_calls, 2);
}

#[tokio::test]
async fn test_variants_do_not_collide() {
    let cache = cache_with(settings(Duration::from_secs(300)));
    let req = request(10, 3);

    let count = cache
        .count(&req, || async { Ok::<_, Infallible>(20) })
        .await
        .unwrap();
    let computed = cache
        .compute_int(&req, || async { Ok::<_, Infallible>(7) })
        .await
        .unwrap();
    let raw: String = cache
        .get_or_store(&req, || async { Ok::<_, Infallible>("raw".to_string()) })
        .await
        .unwrap();

    assert_eq!(count, 20);
    assert_eq!(computed, 7);
    assert_eq!(raw, "raw");
    assert_eq!(cache.remote().len(), 3);
}

#[tokio::test]
async fn test_distinct_request_types_share_no_entries() {
    #[derive(Serialize)]
    struct OtherRequest {
        id: i64,
        limit: i32,
    }

    let cache = cache_with(settings(Duration::from_secs(300)));

    let a = cache
        .count(&request(10, 2), || async { Ok::<_, Infallible>(1) })
        .await
        .unwrap();
    let b = cache
        .count(&OtherRequest { id: 10, limit: 2 }, || async {
            Ok::<_, Infallible>(2)
        })
        .await
        .unwrap();

    assert_eq!((a, b), (1, 2));
}

// == Expire ==

#[tokio::test]
async fn test_expire_forces_handler_for_every_variant() {
    let cache = cache_with(settings(Duration::from_secs(300)));
    let req = request(10, 2);

    cache
        .list(&req, || async { Ok::<_, Infallible>(partners(&[1])) })
        .await
        .unwrap();
    cache
        .count(&req, || async { Ok::<_, Infallible>(1) })
        .await
        .unwrap();
    cache
        .compute_int(&req, || async { Ok::<_, Infallible>(1) })
        .await
        .unwrap();
    cache.set(Variant::Raw, &req, &"one").await.unwrap();

    cache.expire(&req).await.unwrap();

    assert!(cache.local().unwrap().is_empty());
    assert!(cache.remote().is_empty());
    assert_eq!(cache.remote().calls().deletes, 1);

    let list = cache
        .list(&req, || async { Ok::<_, Infallible>(partners(&[2])) })
        .await
        .unwrap();
    let count = cache
        .count(&req, || async { Ok::<_, Infallible>(2) })
        .await
        .unwrap();
    let computed = cache
        .compute_int(&req, || async { Ok::<_, Infallible>(2) })
        .await
        .unwrap();
    let raw: tiercache::Result<String> = cache.parse_data(&req).await;

    assert_eq!(list, partners(&[2]));
    assert_eq!((count, computed), (2, 2));
    assert!(matches!(raw, Err(CacheError::NotFound(_))));
    assert_eq!(cache.stats().handler_calls, 6);
}

#[tokio::test]
async fn test_expire_propagates_remote_failure() {
    let cache = cache_with(settings(Duration::from_secs(300)));
    let req = request(1, 1);
    cache
        .count(&req, || async { Ok::<_, Infallible>(1) })
        .await
        .unwrap();

    cache.remote().inject(Fault::Unavailable);
    let result = cache.expire(&req).await;

    assert!(matches!(result, Err(CacheError::Unavailable(_))));
    // Local removal still happened
    assert!(cache.local().unwrap().is_empty());
}

// == Local tier TTL and capacity ==

#[tokio::test(start_paused = true)]
async fn test_local_read_time_expiry() {
    let mut settings = settings(Duration::from_secs(300));
    settings.local_ttl = Duration::from_secs(1);
    let cache = cache_with(settings);
    let req = request(10, 2);

    cache.set(Variant::Count, &req, &5i64).await.unwrap();
    let logical_key = Variant::Count.logical_key(&cache.fingerprint(&req).unwrap());

    tokio::time::advance(Duration::from_millis(1001)).await;

    let local = cache.local().unwrap();
    assert!(matches!(local.get(&logical_key), Err(CacheError::Expired(_))));
    assert!(local.contains(&logical_key), "expired entry stays resident");

    // The orchestrator treats the expired entry as a miss and reads the remote tier
    let n = cache
        .count(&req, || async { Ok::<_, Infallible>(0) })
        .await
        .unwrap();
    assert_eq!(n, 5);
    assert_eq!(cache.stats().remote_hits, 1);
}

#[tokio::test]
async fn test_lru_scenario_capacity_two() {
    let mut settings = settings(Duration::from_secs(5 * 60));
    settings.local_max_entries = 2;
    let cache = cache_with(settings);
    let key = |name: &str| Variant::Raw.logical_key(&cache.fingerprint(name).unwrap());

    cache.set(Variant::Raw, "A", &"a").await.unwrap();
    cache.set(Variant::Raw, "B", &"b").await.unwrap();
    cache.set(Variant::Raw, "C", &"c").await.unwrap();
    let a: String = cache.parse_data("A").await.unwrap();
    cache.set(Variant::Raw, "D", &"d").await.unwrap();

    let local = cache.local().unwrap();
    assert_eq!(a, "a");
    assert!(!local.contains(&key("B")), "B is the least recently used entry");
    assert!(local.contains(&key("C")));
    assert!(local.contains(&key("D")));

    for (name, expected) in [("A", "a"), ("C", "c"), ("D", "d")] {
        let value: String = cache.parse_data(name).await.unwrap();
        assert_eq!(value, expected);
    }
}

#[tokio::test]
async fn test_lru_read_refreshes_recency() {
    let mut settings = settings(Duration::from_secs(5 * 60));
    settings.local_max_entries = 3;
    let cache = cache_with(settings);
    let key = |name: &str| Variant::Raw.logical_key(&cache.fingerprint(name).unwrap());

    for name in ["A", "B", "C"] {
        cache.set(Variant::Raw, name, &name).await.unwrap();
    }
    let _: String = cache.parse_data("A").await.unwrap();
    cache.set(Variant::Raw, "D", &"D").await.unwrap();

    let local = cache.local().unwrap();
    assert!(local.contains(&key("A")));
    assert!(!local.contains(&key("B")));
    assert!(local.contains(&key("C")));
    assert!(local.contains(&key("D")));
    assert_eq!(local.stats().evictions, 1);
}

// == Degraded mode ==

#[tokio::test(start_paused = true)]
async fn test_remote_timeout_degrades_compute_int() {
    let mut settings = settings(Duration::from_secs(300));
    settings.timeout = Duration::from_secs(3);
    let cache = cache_with(settings);
    let req = request(10, 3);
    cache.remote().inject(Fault::Stall(Duration::from_secs(10)));

    let n = cache
        .compute_int(&req, || async { Ok::<_, Infallible>(42) })
        .await
        .unwrap();

    assert_eq!(n, 42);
    assert_eq!(cache.stats().degraded_reads, 1);
    assert_eq!(cache.remote().calls().sets, 0, "no write-back in degraded mode");

    cache.remote().clear_fault();
    let logical_key = Variant::ComputedInt.logical_key(&cache.fingerprint(&req).unwrap());
    assert_eq!(cache.remote().get(&logical_key).await.unwrap(), None);
    assert!(!cache.local().unwrap().contains(&logical_key));
}

#[tokio::test]
async fn test_remote_unavailable_degrades_list() {
    let cache = cache_with(settings(Duration::from_secs(300)));
    cache.remote().inject(Fault::Unavailable);

    let data = cache
        .list(&request(10, 2), || async { Ok::<_, Infallible>(partners(&[1, 4])) })
        .await
        .unwrap();

    assert_eq!(data, partners(&[1, 4]));
    assert_eq!(cache.stats().degraded_reads, 1);
}

#[tokio::test]
async fn test_degraded_handler_error_is_surfaced() {
    let cache = cache_with(settings(Duration::from_secs(300)));
    cache.remote().inject(Fault::Unavailable);

    let result = cache
        .count(&request(1, 1), || async { Err::<i64, _>("count query failed") })
        .await;

    match result {
        Err(CacheError::Handler(err)) => assert_eq!(err.to_string(), "count query failed"),
        other => panic!("expected handler error, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_set_times_out_on_stalled_remote() {
    let cache = cache_with(settings(Duration::from_secs(300)));
    cache.remote().inject(Fault::Stall(Duration::from_secs(30)));

    let result = cache.set(Variant::List, &request(1, 1), &partners(&[1])).await;

    assert!(matches!(result, Err(CacheError::Timeout(t)) if t == Duration::from_secs(3)));
}

// == Construction ==

#[tokio::test]
async fn test_connect_rejects_missing_ttl() {
    let config = tiercache::Config {
        addr: "127.0.0.1:6379".into(),
        ..tiercache::Config::default()
    };
    assert!(matches!(
        TieredCache::connect(&config).await,
        Err(CacheError::Config(_))
    ));
}

#[tokio::test]
async fn test_connect_survives_unreachable_store() {
    // Nothing listens on port 1: the probe fails but construction succeeds
    let config = tiercache::Config::new("127.0.0.1:1", Duration::from_secs(60))
        .with_timeout(Duration::from_millis(200));

    let cache = TieredCache::connect(&config).await.unwrap();
    assert_eq!(cache.ttl(), Duration::from_secs(60));

    let n = cache
        .count(&request(1, 1), || async { Ok::<_, Infallible>(5) })
        .await
        .unwrap();
    assert_eq!(n, 5);
    assert_eq!(cache.stats().degraded_reads, 1);
}
