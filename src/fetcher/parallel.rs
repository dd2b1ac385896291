use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::SecondsFormat;
use tokio::sync::{mpsc, Mutex};

use crate::app::{Result, TributaryError};
use crate::domain::Item;
use crate::fetcher::{FeedSource, RawEntry};
use crate::store::{DateBucketedStore, SharedStore};

pub const DEFAULT_COLLECTORS: usize = 4;

/// Counters for one collection run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectStats {
    pub sources: usize,
    pub failed_sources: usize,
    pub inserted: usize,
    pub duplicates: usize,
    pub rejected: usize,
}

#[derive(Default)]
struct Counters {
    failed_sources: AtomicUsize,
    inserted: AtomicUsize,
    duplicates: AtomicUsize,
    rejected: AtomicUsize,
}

/// Pulls many feed sources in parallel into one day-bucketed store.
#[derive(Clone)]
pub struct FeedCollector {
    source: Arc<dyn FeedSource + Send + Sync>,
    workers: usize,
}

impl FeedCollector {
    pub fn new(source: Arc<dyn FeedSource + Send + Sync>) -> Self {
        Self::with_workers(source, DEFAULT_COLLECTORS)
    }

    pub fn with_workers(source: Arc<dyn FeedSource + Send + Sync>, workers: usize) -> Self {
        Self {
            source,
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub async fn collect(&self, sources: &[String]) -> Result<DateBucketedStore> {
        self.collect_with_stats(sources).await.map(|(store, _)| store)
    }

    /// Fetch every source and merge its entries.
    ///
    /// A source that fails to fetch or parse contributes nothing; the failure is only logged.
    pub async fn collect_with_stats(
        &self,
        sources: &[String],
    ) -> Result<(DateBucketedStore, CollectStats)> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut queued = 0;
        for source in sources.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            tx.send(source.to_string()).ok();
            queued += 1;
        }
        drop(tx);

        let queue = Arc::new(Mutex::new(rx));
        let store = Arc::new(SharedStore::new());
        let counters = Arc::new(Counters::default());

        let handles: Vec<_> = (0..self.workers)
            .map(|worker| {
                let queue = queue.clone();
                let source = self.source.clone();
                let store = store.clone();
                let counters = counters.clone();
                tokio::spawn(run_worker(worker, queue, source, store, counters))
            })
            .collect();

        for joined in futures::future::join_all(handles).await {
            joined.map_err(|e| TributaryError::WorkerPanicked(e.to_string()))??;
        }

        let store = Arc::try_unwrap(store)
            .map_err(|_| TributaryError::Other("collector store still shared".into()))?
            .into_finalized()?;

        let stats = CollectStats {
            sources: queued,
            failed_sources: counters.failed_sources.load(Ordering::Relaxed),
            inserted: counters.inserted.load(Ordering::Relaxed),
            duplicates: counters.duplicates.load(Ordering::Relaxed),
            rejected: counters.rejected.load(Ordering::Relaxed),
        };

        tracing::info!(
            "Collected {} items over {} days from {} sources ({} failed, {} duplicates, {} rejected)",
            stats.inserted,
            store.day_count(),
            stats.sources,
            stats.failed_sources,
            stats.duplicates,
            stats.rejected
        );

        Ok((store, stats))
    }
}

async fn run_worker(
    worker: usize,
    queue: Arc<Mutex<mpsc::UnboundedReceiver<String>>>,
    source: Arc<dyn FeedSource + Send + Sync>,
    store: Arc<SharedStore>,
    counters: Arc<Counters>,
) -> Result<()> {
    loop {
        let next = queue.lock().await.recv().await;
        let Some(link) = next else {
            break;
        };

        let entries = match source.fetch_entries(&link).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Worker {}: failed to fetch {}: {}", worker, link, e);
                counters.failed_sources.fetch_add(1, Ordering::Relaxed);
                continue;
            }
        };

        tracing::debug!("Worker {}: {} entries from {}", worker, entries.len(), link);

        for entry in entries {
            match store.insert(item_from_entry(entry)) {
                Ok(true) => {
                    counters.inserted.fetch_add(1, Ordering::Relaxed);
                }
                Ok(false) => {
                    counters.duplicates.fetch_add(1, Ordering::Relaxed);
                }
                Err(TributaryError::MalformedTimestamp(date)) => {
                    tracing::debug!("Skipping entry from {} with timestamp {:?}", link, date);
                    counters.rejected.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => return Err(e),
            }
        }
    }

    Ok(())
}

/// Published time wins over updated time; neither leaves the item undated.
pub fn item_from_entry(entry: RawEntry) -> Item {
    let date = entry
        .published
        .or(entry.updated)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true));

    Item {
        url: entry.link,
        date,
        title: entry.title,
        content: entry.content,
        ..Item::default()
    }
}
