// Host-side tests for the resource cache and preload tracking.

use pano_core::{Fetch, Preload, ResourceCache};

#[test]
fn first_request_starts_later_requests_poll() {
    let mut cache: ResourceCache<u32> = ResourceCache::new();
    assert_eq!(cache.request("a.jpg"), Fetch::Start);
    assert_eq!(cache.request("a.jpg"), Fetch::InFlight);
    assert_eq!(cache.request("a.jpg"), Fetch::InFlight);
    cache.fulfill("a.jpg", 7);
    assert_eq!(cache.request("a.jpg"), Fetch::Ready);
    assert_eq!(cache.get("a.jpg"), Some(&7));
}

#[test]
fn settled_is_none_while_in_flight() {
    let mut cache: ResourceCache<u32> = ResourceCache::new();
    cache.request("a.jpg");
    assert_eq!(cache.settled("a.jpg"), None);
    cache.fulfill("a.jpg", 1);
    assert_eq!(cache.settled("a.jpg"), Some(true));
}

#[test]
fn failure_is_settled_and_retryable() {
    let mut cache: ResourceCache<u32> = ResourceCache::new();
    cache.request("bad.jpg");
    cache.fail("bad.jpg");
    assert_eq!(cache.settled("bad.jpg"), Some(false));
    assert_eq!(cache.get("bad.jpg"), None);
    // A later request retries instead of staying failed forever.
    assert_eq!(cache.request("bad.jpg"), Fetch::Start);
    cache.fulfill("bad.jpg", 9);
    assert_eq!(cache.get("bad.jpg"), Some(&9));
}

#[test]
fn duplicate_fulfill_is_last_writer_wins() {
    let mut cache: ResourceCache<u32> = ResourceCache::new();
    cache.request("a.jpg");
    cache.fulfill("a.jpg", 1);
    cache.fulfill("a.jpg", 2);
    assert_eq!(cache.get("a.jpg"), Some(&2));
    assert_eq!(cache.len(), 1);
}

#[test]
fn distinct_urls_are_independent() {
    let mut cache: ResourceCache<u32> = ResourceCache::new();
    assert_eq!(cache.request("a.jpg"), Fetch::Start);
    assert_eq!(cache.request("b.jpg"), Fetch::Start);
    cache.fulfill("a.jpg", 1);
    assert_eq!(cache.settled("b.jpg"), None);
    assert_eq!(cache.len(), 2);
}

#[test]
fn preload_completes_exactly_once() {
    let mut preload = Preload::new(3);
    assert!(!preload.is_ready());
    assert!(!preload.settle());
    assert!(!preload.settle());
    // Third settle completes the set, success or failure alike.
    assert!(preload.settle());
    assert!(preload.is_ready());
    // Stray settles never re-fire the completion.
    assert!(!preload.settle());
    assert_eq!(preload.remaining(), 0);
}

#[test]
fn empty_preload_is_ready_immediately() {
    let preload = Preload::new(0);
    assert!(preload.is_ready());
}
