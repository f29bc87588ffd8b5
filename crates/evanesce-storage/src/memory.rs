use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use evanesce_core::error::{Result, StorageError};
use evanesce_core::{Clock, PasteId, PasteRecord, Repository, SystemClock, ViewedPaste};
use jiff::{SignedDuration, Timestamp};
use std::time::Duration;
use tracing::{debug, trace};

/// In-memory storage slot for a paste.
#[derive(Debug, Clone)]
struct StoredPaste {
    record: PasteRecord,
    expire_at: Option<Timestamp>,
}

impl StoredPaste {
    fn is_expired(&self, now: Timestamp) -> bool {
        self.expire_at.is_some_and(|expire_at| now >= expire_at)
    }
}

/// Deadline for a TTL starting at `now`. A TTL reaching past the end of
/// representable time never fires.
fn deadline(now: Timestamp, ttl: Duration) -> Option<Timestamp> {
    let ttl = SignedDuration::try_from(ttl).ok()?;
    now.checked_add(ttl).ok()
}

/// In-memory implementation of the [`Repository`] trait using DashMap.
///
/// Each operation runs under the shard lock of its key through the entry
/// API, which makes the decrement-and-maybe-delete of
/// [`consume`](Repository::consume) atomic with respect to every other
/// operation on the same paste. Expired pastes are evicted lazily when
/// touched, or in bulk by [`purge_expired`](Self::purge_expired).
#[derive(Debug)]
pub struct InMemoryRepository<C = SystemClock> {
    storage: DashMap<String, StoredPaste>,
    clock: C,
}

impl InMemoryRepository {
    /// Creates a new in-memory repository backed by the system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> InMemoryRepository<C> {
    /// Creates a new in-memory repository that reads time from `clock`.
    pub fn with_clock(clock: C) -> Self {
        Self {
            storage: DashMap::new(),
            clock,
        }
    }

    /// Removes every expired paste and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.storage.len();
        self.storage.retain(|_, stored| !stored.is_expired(now));
        let purged = before.saturating_sub(self.storage.len());
        debug!(purged, "Purged expired pastes");
        purged
    }
}

#[async_trait]
impl<C: Clock> Repository for InMemoryRepository<C> {
    async fn insert(&self, id: &PasteId, record: PasteRecord, ttl: Option<Duration>) -> Result<()> {
        let now = self.clock.now();
        let stored = StoredPaste {
            record,
            expire_at: ttl.and_then(|ttl| deadline(now, ttl)),
        };

        match self.storage.entry(id.as_str().to_owned()) {
            Entry::Occupied(mut slot) => {
                // an expired paste is gone as far as callers can tell
                if !slot.get().is_expired(now) {
                    return Err(StorageError::Conflict(id.to_string()));
                }
                slot.insert(stored);
            }
            Entry::Vacant(slot) => {
                slot.insert(stored);
            }
        }

        trace!(id = %id, "Inserted paste");
        Ok(())
    }

    async fn consume(&self, id: &PasteId) -> Result<Option<ViewedPaste>> {
        let now = self.clock.now();

        let Entry::Occupied(mut slot) = self.storage.entry(id.as_str().to_owned()) else {
            trace!(id = %id, "Paste not found");
            return Ok(None);
        };

        if slot.get().is_expired(now) {
            slot.remove();
            debug!(id = %id, "Evicted expired paste");
            return Ok(None);
        }

        match slot.get().record.views.decrement() {
            Some(views) => {
                let stored = slot.get_mut();
                stored.record.views = views;
                Ok(Some(stored.record.viewed(views.remaining())))
            }
            None => {
                let stored = slot.remove();
                debug!(id = %id, "Paste exhausted its views");
                Ok(Some(stored.record.viewed(Some(0))))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evanesce_core::{ManualClock, ViewLimit};
    use std::num::NonZeroU32;
    use std::sync::Arc;

    fn id(s: &str) -> PasteId {
        PasteId::new_unchecked(s)
    }

    fn record(content: &str, max_views: Option<u32>) -> PasteRecord {
        PasteRecord {
            content: content.to_string(),
            views: max_views.and_then(NonZeroU32::new).into(),
            created_at: Timestamp::from_second(1_700_000_000).unwrap(),
        }
    }

    fn secs(secs: u64) -> Option<Duration> {
        Some(Duration::from_secs(secs))
    }

    fn manual_repo() -> (InMemoryRepository<ManualClock>, ManualClock) {
        let clock = ManualClock::new(Timestamp::from_second(1_700_000_000).unwrap());
        (InMemoryRepository::with_clock(clock.clone()), clock)
    }

    #[tokio::test]
    async fn insert_and_consume_unbounded() {
        let repo = InMemoryRepository::new();
        repo.insert(&id("abc"), record("hello", None), None)
            .await
            .unwrap();

        for _ in 0..5 {
            let viewed = repo.consume(&id("abc")).await.unwrap().unwrap();
            assert_eq!(viewed.content, "hello");
            assert_eq!(viewed.remaining_views, None);
        }
    }

    #[tokio::test]
    async fn consume_nonexistent() {
        let repo = InMemoryRepository::new();
        assert!(repo.consume(&id("nope")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn consume_counts_down_then_deletes() {
        let repo = InMemoryRepository::new();
        repo.insert(&id("abc"), record("hello", Some(3)), None)
            .await
            .unwrap();

        let mut remaining = Vec::new();
        for _ in 0..3 {
            let viewed = repo.consume(&id("abc")).await.unwrap().unwrap();
            remaining.push(viewed.remaining_views);
        }

        assert_eq!(remaining, vec![Some(2), Some(1), Some(0)]);
        assert!(repo.consume(&id("abc")).await.unwrap().is_none());
        assert!(repo.storage.is_empty());
    }

    #[tokio::test]
    async fn stored_budget_is_never_zero() {
        let repo = InMemoryRepository::new();
        repo.insert(&id("abc"), record("hello", Some(2)), None)
            .await
            .unwrap();

        repo.consume(&id("abc")).await.unwrap();
        let stored = repo.storage.get("abc").unwrap();
        assert_eq!(
            stored.record.views,
            ViewLimit::Bounded(NonZeroU32::new(1).unwrap())
        );
    }

    #[tokio::test]
    async fn insert_conflict() {
        let repo = InMemoryRepository::new();
        repo.insert(&id("abc"), record("first", None), None)
            .await
            .unwrap();

        let err = repo
            .insert(&id("abc"), record("second", None), None)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));

        let viewed = repo.consume(&id("abc")).await.unwrap().unwrap();
        assert_eq!(viewed.content, "first");
    }

    #[tokio::test]
    async fn insert_over_expired_entry() {
        let (repo, clock) = manual_repo();
        repo.insert(&id("abc"), record("old", None), secs(10))
            .await
            .unwrap();

        clock.advance(SignedDuration::from_secs(10));

        repo.insert(&id("abc"), record("new", None), None)
            .await
            .unwrap();
        let viewed = repo.consume(&id("abc")).await.unwrap().unwrap();
        assert_eq!(viewed.content, "new");
    }

    #[tokio::test]
    async fn ttl_evicts() {
        let (repo, clock) = manual_repo();
        repo.insert(&id("abc"), record("hello", None), secs(60))
            .await
            .unwrap();

        clock.advance(SignedDuration::from_secs(59));
        assert!(repo.consume(&id("abc")).await.unwrap().is_some());

        clock.advance(SignedDuration::from_secs(1));
        assert!(repo.consume(&id("abc")).await.unwrap().is_none());
        assert!(repo.storage.is_empty());
    }

    #[tokio::test]
    async fn oversized_ttl_never_fires() {
        let (repo, clock) = manual_repo();
        repo.insert(&id("abc"), record("hello", None), secs(u64::MAX))
            .await
            .unwrap();

        clock.advance(SignedDuration::from_hours(24 * 365 * 100));
        assert!(repo.consume(&id("abc")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn purge_removes_only_expired() {
        let (repo, clock) = manual_repo();
        repo.insert(&id("short"), record("a", None), secs(5))
            .await
            .unwrap();
        repo.insert(&id("long"), record("b", None), secs(500))
            .await
            .unwrap();
        repo.insert(&id("forever"), record("c", None), None)
            .await
            .unwrap();

        clock.advance(SignedDuration::from_secs(10));

        assert_eq!(repo.purge_expired(), 1);
        assert!(repo.consume(&id("short")).await.unwrap().is_none());
        assert!(repo.consume(&id("long")).await.unwrap().is_some());
        assert!(repo.consume(&id("forever")).await.unwrap().is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_consume_never_overserves() {
        const READERS: usize = 32;
        const MAX_VIEWS: u32 = 5;

        let repo = Arc::new(InMemoryRepository::new());
        repo.insert(&id("hot"), record("hello", Some(MAX_VIEWS)), None)
            .await
            .unwrap();

        let handles: Vec<_> = (0..READERS)
            .map(|_| {
                let repo = Arc::clone(&repo);
                tokio::spawn(async move { repo.consume(&id("hot")).await.unwrap() })
            })
            .collect();

        let mut served = 0;
        for handle in handles {
            if handle.await.unwrap().is_some() {
                served += 1;
            }
        }

        assert_eq!(served, MAX_VIEWS as usize);
        assert!(repo.storage.is_empty());
    }
}
