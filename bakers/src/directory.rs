//! The single-snapshot baker directory cache.
//!
//! Owns the one cached list of bakers the staking flow works from. The
//! snapshot is replaced wholesale (an `Arc` swap) by the first successful
//! fetch, by [`BakerDirectory::force`], or by [`BakerDirectory::hydrate`];
//! individual entries are never mutated. Concurrent cold reads coalesce onto
//! a single in-flight fetch whose outcome is broadcast over a watch channel.

use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::sync::watch;

use tzwallet_types::Address;

use crate::baker::Baker;
use crate::error::DirectoryError;
use crate::source::BakerSource;

/// The current directory snapshot, shared without copying.
pub type Snapshot = Arc<Vec<Baker>>;

type FetchOutcome = Result<Snapshot, DirectoryError>;
type OutcomeReceiver = watch::Receiver<Option<FetchOutcome>>;

/// The coalesced fetch all concurrent `get` callers wait on.
///
/// Tagged with a generation id so the completing task only clears its own
/// registration, never a later fetch's.
struct Inflight {
    generation: u64,
    rx: OutcomeReceiver,
}

struct DirectoryState {
    snapshot: Option<Snapshot>,
    inflight: Option<Inflight>,
    next_generation: u64,
}

/// Cache of the remote baker directory.
///
/// Holds exactly one logical resource (the full baker list); there is no key
/// space. Cheaply cloneable; clones share the same snapshot and in-flight
/// bookkeeping.
#[derive(Clone)]
pub struct BakerDirectory {
    source: Arc<dyn BakerSource>,
    state: Arc<Mutex<DirectoryState>>,
}

impl BakerDirectory {
    /// Create an empty directory over the given source.
    pub fn new(source: impl BakerSource) -> Self {
        Self::with_source(Arc::new(source))
    }

    /// Create an empty directory over an already-shared source.
    pub fn with_source(source: Arc<dyn BakerSource>) -> Self {
        Self {
            source,
            state: Arc::new(Mutex::new(DirectoryState {
                snapshot: None,
                inflight: None,
                next_generation: 0,
            })),
        }
    }

    /// Serve the cached snapshot, fetching it first if none exists yet.
    ///
    /// Concurrent calls while a fetch is in flight share that fetch instead
    /// of issuing duplicates; every caller receives the same outcome. A
    /// failed fetch clears the in-flight slot so a later call can retry.
    pub async fn get(&self) -> Result<Snapshot, DirectoryError> {
        let rx = {
            let mut state = self.state.lock().unwrap();
            if let Some(snapshot) = &state.snapshot {
                return Ok(Arc::clone(snapshot));
            }
            match &state.inflight {
                Some(inflight) => inflight.rx.clone(),
                None => {
                    let generation = state.next_generation;
                    state.next_generation += 1;
                    let rx = self.spawn_fetch(Some(generation));
                    state.inflight = Some(Inflight {
                        generation,
                        rx: rx.clone(),
                    });
                    rx
                }
            }
        };
        await_outcome(rx).await
    }

    /// Unconditionally fetch and replace the snapshot.
    ///
    /// Runs its own fetch, never coalesced with an in-flight `get`. On
    /// failure the previous snapshot is left untouched and only this caller
    /// sees the error.
    pub async fn force(&self) -> Result<Snapshot, DirectoryError> {
        await_outcome(self.spawn_fetch(None)).await
    }

    /// Seed the snapshot from previously persisted data, without fetching.
    ///
    /// Commits immediately and never suspends. May race an in-flight fetch;
    /// the fetch's eventual success overwrites this value (last writer by
    /// completion order wins).
    pub fn hydrate(&self, bakers: Vec<Baker>) {
        tracing::debug!(count = bakers.len(), "hydrating baker snapshot");
        let mut state = self.state.lock().unwrap();
        state.snapshot = Some(Arc::new(bakers));
    }

    /// The last known snapshot, if any. Never fetches.
    pub fn snapshot(&self) -> Option<Snapshot> {
        self.state.lock().unwrap().snapshot.as_ref().map(Arc::clone)
    }

    /// Look up a baker in the last known snapshot. Never fetches.
    pub fn baker_sync(&self, address: &Address) -> Option<Baker> {
        self.snapshot()?
            .iter()
            .find(|b| b.address == *address)
            .cloned()
    }

    /// Cache-first baker lookup, falling back to a (shared) fetch when no
    /// snapshot has been loaded yet.
    pub async fn load_baker(&self, address: &Address) -> Result<Option<Baker>, DirectoryError> {
        if let Some(baker) = self.baker_sync(address) {
            return Ok(Some(baker));
        }
        let bakers = self.get().await?;
        Ok(bakers.iter().find(|b| b.address == *address).cloned())
    }

    /// Spawn a fetch task and return the receiver its outcome arrives on.
    ///
    /// The task runs to completion and commits its result even if every
    /// waiter abandons its future. `generation` is set for coalesced `get`
    /// fetches so the task can deregister itself; `force` fetches pass
    /// `None` and are never registered.
    fn spawn_fetch(&self, generation: Option<u64>) -> OutcomeReceiver {
        let (tx, rx) = watch::channel(None);
        let source = Arc::clone(&self.source);
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let outcome = fetch_snapshot(source.as_ref()).await;
            {
                let mut state = state.lock().unwrap();
                if let Ok(snapshot) = &outcome {
                    state.snapshot = Some(Arc::clone(snapshot));
                }
                if let Some(generation) = generation {
                    let ours = state
                        .inflight
                        .as_ref()
                        .is_some_and(|i| i.generation == generation);
                    if ours {
                        state.inflight = None;
                    }
                }
            }
            let _ = tx.send(Some(outcome));
        });
        rx
    }
}

/// Fetch raw records from the source, keep the active ones, and normalize.
async fn fetch_snapshot(source: &dyn BakerSource) -> FetchOutcome {
    let raw = source.fetch_raw().await?;
    tracing::debug!(count = raw.len(), "fetched raw baker records");
    let bakers: Vec<Baker> = raw
        .iter()
        .filter(|record| is_active(record))
        .filter_map(Baker::from_raw)
        .collect();
    tracing::info!(count = bakers.len(), "loaded bakers");
    Ok(Arc::new(bakers))
}

/// Records are pre-filtered on the service-health indicator before any field
/// validation happens.
fn is_active(record: &Value) -> bool {
    record.get("serviceHealth").and_then(Value::as_str) == Some("active")
}

async fn await_outcome(mut rx: OutcomeReceiver) -> FetchOutcome {
    loop {
        let current = rx.borrow_and_update().as_ref().cloned();
        if let Some(outcome) = current {
            return outcome;
        }
        if rx.changed().await.is_err() {
            return Err(DirectoryError::Aborted);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baker::CapacityStatus;
    use crate::source::NullBakerSource;
    use serde_json::json;
    use std::time::Duration;

    fn raw_record(address: &str) -> Value {
        json!({
            "address": address,
            "name": format!("Baker {address}"),
            "logo": format!("https://img.example.com/{address}.png"),
            "freeSpace": 50_000.0,
            "estimatedRoi": 0.05,
            "serviceHealth": "active",
        })
    }

    fn sample_baker(address: &str) -> Baker {
        Baker::from_raw(&raw_record(address)).unwrap()
    }

    #[tokio::test]
    async fn get_fetches_once_then_serves_cache() {
        let source = Arc::new(NullBakerSource::new(vec![raw_record("tz1aaa")]));
        let directory = BakerDirectory::with_source(source.clone());

        let first = directory.get().await.unwrap();
        let second = directory.get().await.unwrap();

        assert_eq!(first.len(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn concurrent_gets_share_one_fetch() {
        let source = Arc::new(
            NullBakerSource::new(vec![raw_record("tz1aaa"), raw_record("tz1bbb")])
                .with_delay(Duration::from_millis(30)),
        );
        let directory = BakerDirectory::with_source(source.clone());

        let (a, b, c) = tokio::join!(directory.get(), directory.get(), directory.get());
        let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());

        assert_eq!(source.calls(), 1);
        assert_eq!(a.len(), 2);
        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&b, &c));
    }

    #[tokio::test]
    async fn inactive_and_invalid_records_dropped() {
        let mut closed = raw_record("tz1bbb");
        closed["serviceHealth"] = json!("closed");
        let mut bad_logo = raw_record("tz1ccc");
        bad_logo["logo"] = json!("ipfs://nope");

        let source = NullBakerSource::new(vec![raw_record("tz1aaa"), closed, bad_logo]);
        let directory = BakerDirectory::new(source);

        let bakers = directory.get().await.unwrap();
        assert_eq!(bakers.len(), 1);
        assert_eq!(bakers[0].address.as_str(), "tz1aaa");
    }

    #[tokio::test]
    async fn force_refetches_and_replaces_snapshot() {
        let source = Arc::new(NullBakerSource::new(vec![raw_record("tz1aaa")]));
        let directory = BakerDirectory::with_source(source.clone());

        let before = directory.get().await.unwrap();
        assert_eq!(before[0].address.as_str(), "tz1aaa");

        source.set_response(Ok(vec![raw_record("tz1bbb")]));
        let after = directory.force().await.unwrap();

        assert_eq!(source.calls(), 2);
        assert_eq!(after[0].address.as_str(), "tz1bbb");
        assert_eq!(directory.snapshot().unwrap()[0].address.as_str(), "tz1bbb");
    }

    #[tokio::test]
    async fn force_failure_keeps_previous_snapshot() {
        let source = Arc::new(NullBakerSource::failing("directory offline"));
        let directory = BakerDirectory::with_source(source.clone());
        directory.hydrate(vec![sample_baker("tz1aaa")]);

        let err = directory.force().await.unwrap_err();
        assert!(matches!(err, DirectoryError::Source(_)));

        let snapshot = directory.snapshot().unwrap();
        assert_eq!(snapshot[0].address.as_str(), "tz1aaa");

        // The surviving snapshot keeps serving reads without a fetch.
        let served = directory.get().await.unwrap();
        assert_eq!(served[0].address.as_str(), "tz1aaa");
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn failed_get_resolves_all_waiters_and_allows_retry() {
        let source = Arc::new(
            NullBakerSource::failing("directory offline").with_delay(Duration::from_millis(20)),
        );
        let directory = BakerDirectory::with_source(source.clone());

        let (a, b) = tokio::join!(directory.get(), directory.get());
        assert!(a.is_err());
        assert!(b.is_err());
        assert_eq!(source.calls(), 1);

        // The failed flight is deregistered; the next call fetches again.
        source.set_response(Ok(vec![raw_record("tz1aaa")]));
        let recovered = directory.get().await.unwrap();
        assert_eq!(recovered.len(), 1);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn hydrate_then_baker_sync_needs_no_fetch() {
        let source = Arc::new(NullBakerSource::new(vec![]));
        let directory = BakerDirectory::with_source(source.clone());
        directory.hydrate(vec![sample_baker("tz1aaa"), sample_baker("tz1bbb")]);

        let found = directory.baker_sync(&Address::new("tz1bbb")).unwrap();
        assert_eq!(found.name, "Baker tz1bbb");
        assert_eq!(found.capacity_status, CapacityStatus::Normal);

        assert!(directory.baker_sync(&Address::new("tz1zzz")).is_none());
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn baker_sync_on_cold_cache_is_none() {
        let directory = BakerDirectory::new(NullBakerSource::new(vec![raw_record("tz1aaa")]));
        assert!(directory.baker_sync(&Address::new("tz1aaa")).is_none());
    }

    #[tokio::test]
    async fn load_baker_prefers_snapshot_over_fetch() {
        let source = Arc::new(NullBakerSource::new(vec![]));
        let directory = BakerDirectory::with_source(source.clone());
        directory.hydrate(vec![sample_baker("tz1aaa")]);

        let baker = directory.load_baker(&Address::new("tz1aaa")).await.unwrap();
        assert_eq!(baker.unwrap().address.as_str(), "tz1aaa");
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn load_baker_fetches_on_cold_cache() {
        let source = Arc::new(NullBakerSource::new(vec![raw_record("tz1aaa")]));
        let directory = BakerDirectory::with_source(source.clone());

        let baker = directory.load_baker(&Address::new("tz1aaa")).await.unwrap();
        assert_eq!(baker.unwrap().address.as_str(), "tz1aaa");
        assert_eq!(source.calls(), 1);

        let missing = directory.load_baker(&Address::new("tz1zzz")).await.unwrap();
        assert!(missing.is_none());
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn abandoned_get_still_commits_snapshot() {
        let source = Arc::new(
            NullBakerSource::new(vec![raw_record("tz1aaa")])
                .with_delay(Duration::from_millis(40)),
        );
        let directory = BakerDirectory::with_source(source.clone());

        let abandoned =
            tokio::time::timeout(Duration::from_millis(5), directory.get()).await;
        assert!(abandoned.is_err());

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(directory.snapshot().unwrap().len(), 1);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn inflight_fetch_overwrites_concurrent_hydrate() {
        let source = Arc::new(
            NullBakerSource::new(vec![raw_record("tz1fetched")])
                .with_delay(Duration::from_millis(40)),
        );
        let directory = BakerDirectory::with_source(source.clone());

        let pending = tokio::spawn({
            let directory = directory.clone();
            async move { directory.get().await }
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        directory.hydrate(vec![sample_baker("tz1hydrated")]);
        assert_eq!(
            directory.snapshot().unwrap()[0].address.as_str(),
            "tz1hydrated"
        );

        // The fetch that was already in flight wins by completing later.
        let fetched = pending.await.unwrap().unwrap();
        assert_eq!(fetched[0].address.as_str(), "tz1fetched");
        assert_eq!(
            directory.snapshot().unwrap()[0].address.as_str(),
            "tz1fetched"
        );
    }

    #[tokio::test]
    async fn force_runs_independently_of_inflight_get() {
        let source = Arc::new(
            NullBakerSource::new(vec![raw_record("tz1aaa")])
                .with_delay(Duration::from_millis(20)),
        );
        let directory = BakerDirectory::with_source(source.clone());

        let (got, forced) = tokio::join!(directory.get(), directory.force());
        assert!(got.is_ok());
        assert!(forced.is_ok());
        assert_eq!(source.calls(), 2);
    }
}
