//! URL-keyed resource cache with explicit residency.
//!
//! All mutation happens on the single logical render thread, so the
//! map needs no lock; what it must tolerate is several requesters
//! asking for the same key before the first fetch resolves. The first
//! caller fetches, later callers observe `InFlight` and poll; a
//! duplicate fulfil is an idempotent last-writer-wins overwrite.

use fnv::FnvHashMap;

/// Residency of one cache entry.
#[derive(Clone, Debug)]
pub enum Residency<T> {
    Pending,
    Ready(T),
    Failed,
}

/// What the caller should do after asking for a URL.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fetch {
    /// Not cached: the caller owns starting the fetch.
    Start,
    /// Another caller's fetch is in flight: poll for readiness.
    InFlight,
    /// Already resident.
    Ready,
}

#[derive(Debug, Default)]
pub struct ResourceCache<T> {
    entries: FnvHashMap<String, Residency<T>>,
}

impl<T> ResourceCache<T> {
    pub fn new() -> Self {
        Self {
            entries: FnvHashMap::default(),
        }
    }

    /// Ask for a URL. A previously failed entry is retried (the entry
    /// flips back to pending and this caller fetches again).
    pub fn request(&mut self, url: &str) -> Fetch {
        match self.entries.get(url) {
            Some(Residency::Ready(_)) => Fetch::Ready,
            Some(Residency::Pending) => Fetch::InFlight,
            Some(Residency::Failed) | None => {
                self.entries.insert(url.to_string(), Residency::Pending);
                Fetch::Start
            }
        }
    }

    /// Store a loaded resource. Always overwrites: a harmless duplicate
    /// fetch must not corrupt the map.
    pub fn fulfill(&mut self, url: &str, value: T) {
        self.entries.insert(url.to_string(), Residency::Ready(value));
    }

    /// Record a failed fetch so pollers stop waiting.
    pub fn fail(&mut self, url: &str) {
        self.entries.insert(url.to_string(), Residency::Failed);
    }

    pub fn get(&self, url: &str) -> Option<&T> {
        match self.entries.get(url) {
            Some(Residency::Ready(v)) => Some(v),
            _ => None,
        }
    }

    /// `None` while a fetch is still in flight, otherwise whether the
    /// resource resolved.
    pub fn settled(&self, url: &str) -> Option<bool> {
        match self.entries.get(url) {
            Some(Residency::Ready(_)) => Some(true),
            Some(Residency::Failed) | None => Some(false),
            Some(Residency::Pending) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Preload progress over the full scene image set.
///
/// Every referenced URL is resolved once up front; an individual
/// failure is a best-effort skip, never an overall failure, so the
/// ready transition cannot deadlock on one bad asset.
#[derive(Debug)]
pub struct Preload {
    remaining: usize,
    ready: bool,
}

impl Preload {
    pub fn new(total: usize) -> Self {
        Self {
            remaining: total,
            ready: total == 0,
        }
    }

    /// Record one settled load (success or failure). Returns `true`
    /// exactly once, on the settle that completes the set.
    pub fn settle(&mut self) -> bool {
        if self.remaining > 0 {
            self.remaining -= 1;
            if self.remaining == 0 && !self.ready {
                self.ready = true;
                return true;
            }
        }
        false
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn remaining(&self) -> usize {
        self.remaining
    }
}
