//! Parallel enrichment of a collected store.
//!
//! ```text
//! feeder ──▶ input queue ──▶ W workers ──▶ output queue ──▶ aggregator ──▶ new store
//! ```
//!
//! Shutdown order matters: the input queue closes once everything is fed, the output queue
//! closes only after every worker has returned, and the aggregator finalizes after that.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

use crate::app::{Result, TributaryError};
use crate::domain::{AggregateResult, Item};
use crate::enrich::Transform;
use crate::store::DateBucketedStore;

pub const DEFAULT_ENRICHMENT_WORKERS: usize = 3;

#[derive(Clone)]
pub struct EnrichmentPipeline {
    transforms: Arc<[Arc<dyn Transform>]>,
    workers: usize,
}

impl EnrichmentPipeline {
    pub fn new(transforms: Vec<Arc<dyn Transform>>) -> Self {
        Self::with_workers(transforms, DEFAULT_ENRICHMENT_WORKERS)
    }

    pub fn with_workers(transforms: Vec<Arc<dyn Transform>>, workers: usize) -> Self {
        Self {
            transforms: transforms.into(),
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn transform_names(&self) -> Vec<&str> {
        self.transforms.iter().map(|t| t.name()).collect()
    }

    /// Enrich a topic's store, keeping the topic label.
    pub async fn process(&self, result: &AggregateResult) -> Result<AggregateResult> {
        let store = self.run(&result.store).await?;
        Ok(AggregateResult::new(result.topic.clone(), store))
    }

    /// Enrich every item of `input` into a fresh store. `input` is left as it was.
    pub async fn run(&self, input: &DateBucketedStore) -> Result<DateBucketedStore> {
        let (in_tx, in_rx) = mpsc::channel::<Item>(self.workers);
        let (out_tx, out_rx) = mpsc::channel::<Item>(self.workers);
        let in_rx = Arc::new(Mutex::new(in_rx));

        let aggregator = tokio::spawn(aggregate(out_rx));

        let workers: Vec<_> = (0..self.workers)
            .map(|worker| {
                let queue = in_rx.clone();
                let out = out_tx.clone();
                let transforms = self.transforms.clone();
                tokio::spawn(run_worker(worker, queue, out, transforms))
            })
            .collect();
        drop(in_rx);

        let mut fed = 0;
        for item in input.iter() {
            if in_tx.send(item.clone()).await.is_err() {
                // Every worker is gone; their errors surface below
                break;
            }
            fed += 1;
        }
        drop(in_tx);

        let mut worker_error = None;
        for joined in futures::future::join_all(workers).await {
            let outcome = joined
                .map_err(|e| TributaryError::WorkerPanicked(e.to_string()))
                .and_then(|r| r);
            if let Err(e) = outcome {
                worker_error.get_or_insert(e);
            }
        }

        // Only now may the output queue close
        drop(out_tx);

        let store = aggregator
            .await
            .map_err(|e| TributaryError::WorkerPanicked(e.to_string()))?;

        if let Some(e) = worker_error {
            return Err(e);
        }

        tracing::info!(
            "Enriched {} of {} items with [{}] using {} workers",
            store.len(),
            fed,
            self.transform_names().join(", "),
            self.workers
        );

        Ok(store)
    }

    /// Apply every transform in order.
    ///
    /// If a transform fails, or the result no longer has a valid day-key, the item comes back
    /// exactly as it went in.
    pub fn enrich_item(&self, item: Item) -> Item {
        apply_transforms(&self.transforms, item)
    }
}

async fn run_worker(
    worker: usize,
    queue: Arc<Mutex<mpsc::Receiver<Item>>>,
    out: mpsc::Sender<Item>,
    transforms: Arc<[Arc<dyn Transform>]>,
) -> Result<()> {
    let mut processed = 0usize;

    loop {
        let next = queue.lock().await.recv().await;
        let Some(item) = next else {
            break;
        };

        let enriched = apply_transforms(&transforms, item);
        out.send(enriched)
            .await
            .map_err(|_| TributaryError::Other("enrichment output queue closed".into()))?;
        processed += 1;
    }

    tracing::debug!("Enrichment worker {} processed {} items", worker, processed);
    Ok(())
}

fn apply_transforms(transforms: &[Arc<dyn Transform>], item: Item) -> Item {
    let original = item.clone();
    let mut item = item;

    for transform in transforms {
        if let Err(e) = transform.apply(&mut item) {
            tracing::warn!(
                "Transform {} failed for {}: {}; keeping item unenriched",
                transform.name(),
                original.url,
                e
            );
            return original;
        }
    }

    if let Err(e) = item.day_key() {
        tracing::warn!(
            "Enriched item {} lost its day-key ({}); keeping item unenriched",
            original.url,
            e
        );
        return original;
    }

    item
}

async fn aggregate(mut rx: mpsc::Receiver<Item>) -> DateBucketedStore {
    let mut store = DateBucketedStore::new();

    while let Some(item) = rx.recv().await {
        let url = item.url.clone();
        match store.append(item) {
            Ok(true) => {}
            Ok(false) => tracing::warn!("Enriched items share day and URL {}; keeping both", url),
            Err(e) => tracing::warn!("Dropping enriched item {}: {}", url, e),
        }
    }

    store.finalize_ordering();
    store
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SiteTopic;
    use crate::enrich::{Gazetteer, GeoTextLocator, LanguageDetector};

    struct Tag(&'static str);

    impl Transform for Tag {
        fn name(&self) -> &str {
            "tag"
        }

        fn apply(&self, item: &mut Item) -> Result<()> {
            item.language = self.0.to_string();
            Ok(())
        }
    }

    /// Adds a country only when an earlier step set the language to `when`.
    struct CountryIf {
        when: &'static str,
        code: &'static str,
    }

    impl Transform for CountryIf {
        fn name(&self) -> &str {
            "country-if"
        }

        fn apply(&self, item: &mut Item) -> Result<()> {
            if item.language == self.when {
                item.add_country(self.code);
            }
            Ok(())
        }
    }

    struct FailOn(&'static str);

    impl Transform for FailOn {
        fn name(&self) -> &str {
            "fail-on"
        }

        fn apply(&self, item: &mut Item) -> Result<()> {
            if item.url == self.0 {
                return Err(TributaryError::Transform {
                    name: "fail-on".into(),
                    reason: "boom".into(),
                });
            }
            Ok(())
        }
    }

    struct SetDate(Option<&'static str>);

    impl Transform for SetDate {
        fn name(&self) -> &str {
            "set-date"
        }

        fn apply(&self, item: &mut Item) -> Result<()> {
            item.date = self.0.map(String::from);
            Ok(())
        }
    }

    fn sample_store(days: u32, per_day: usize) -> DateBucketedStore {
        let mut store = DateBucketedStore::new();
        for day in 1..=days {
            for n in 0..per_day {
                let item = Item::new(
                    format!("https://x/{}/{}", day, n),
                    Some(format!("2024-07-{:02}T10:00:00Z", day)),
                )
                .with_title(if n % 2 == 0 { "even" } else { "odd" });
                store.insert(item).unwrap();
            }
        }
        store.finalize_ordering();
        store
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_item_count_preserved_for_any_worker_count() {
        let input = sample_store(5, 20);
        for workers in [1, 2, 3, 8] {
            let pipeline = EnrichmentPipeline::with_workers(vec![Arc::new(Tag("en"))], workers);
            let output = pipeline.run(&input).await.unwrap();

            assert_eq!(output.len(), input.len(), "workers = {}", workers);
            assert_eq!(output.sorted_dates(), input.sorted_dates());
            for day in input.sorted_dates() {
                assert_eq!(output.get(day).unwrap().len(), 20);
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_input_store_untouched() {
        let input = sample_store(2, 3);
        let pipeline = EnrichmentPipeline::with_workers(vec![Arc::new(Tag("en"))], 2);
        let output = pipeline.run(&input).await.unwrap();

        assert!(input.iter().all(|i| i.language.is_empty()));
        assert!(output.iter().all(|i| i.language == "en"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_transforms_run_in_order_independent_of_workers() {
        let input = sample_store(3, 10);

        let mut outcomes = Vec::new();
        for workers in [1, 4] {
            let pipeline = EnrichmentPipeline::with_workers(
                vec![
                    Arc::new(Tag("en")),
                    Arc::new(CountryIf { when: "en", code: "MX" }),
                    Arc::new(Tag("zh")),
                    Arc::new(CountryIf { when: "en", code: "US" }),
                ],
                workers,
            );
            let output = pipeline.run(&input).await.unwrap();

            let mut seen: Vec<(String, String, Vec<String>)> = output
                .iter()
                .map(|i| (i.url.clone(), i.language.clone(), i.countries.clone()))
                .collect();
            seen.sort();
            outcomes.push(seen);
        }

        assert_eq!(outcomes[0], outcomes[1]);
        assert!(outcomes[0]
            .iter()
            .all(|(_, lang, countries)| lang == "zh" && countries == &vec!["MX".to_string()]));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_failed_transform_passes_item_through() {
        let input = sample_store(1, 4);
        let pipeline = EnrichmentPipeline::with_workers(
            vec![Arc::new(Tag("en")), Arc::new(FailOn("https://x/1/2"))],
            2,
        );
        let output = pipeline.run(&input).await.unwrap();

        assert_eq!(output.len(), 4);
        for item in output.iter() {
            if item.url == "https://x/1/2" {
                assert!(item.language.is_empty());
            } else {
                assert_eq!(item.language, "en");
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_rebuckets_by_transformed_date() {
        let input = sample_store(3, 2);
        let pipeline =
            EnrichmentPipeline::with_workers(vec![Arc::new(SetDate(Some("2024-08-01T00:00:00Z")))], 3);
        let output = pipeline.run(&input).await.unwrap();

        assert_eq!(output.sorted_dates(), ["2024-08-01"]);
        assert_eq!(output.len(), 6);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_rebucketing_onto_same_url_keeps_both() {
        let mut input = DateBucketedStore::new();
        for day in ["2024-07-01", "2024-07-02"] {
            input
                .insert(Item::new("https://x/same", Some(format!("{}T10:00:00Z", day))))
                .unwrap();
        }
        input.finalize_ordering();

        let pipeline =
            EnrichmentPipeline::with_workers(vec![Arc::new(SetDate(Some("2024-08-01T00:00:00Z")))], 2);
        let output = pipeline.run(&input).await.unwrap();

        assert_eq!(output.len(), 2);
        assert_eq!(output.get("2024-08-01").unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_transform_breaking_date_is_reverted() {
        let input = sample_store(2, 1);
        let pipeline = EnrichmentPipeline::with_workers(vec![Arc::new(SetDate(None))], 1);
        let output = pipeline.run(&input).await.unwrap();

        assert_eq!(output.sorted_dates(), input.sorted_dates());
        assert_eq!(output.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let pipeline = EnrichmentPipeline::new(vec![Arc::new(Tag("en"))]);
        let output = pipeline.run(&DateBucketedStore::new()).await.unwrap();
        assert!(output.is_empty());
        assert!(output.sorted_dates().is_empty());
    }

    #[tokio::test]
    async fn test_no_transforms_copies_items() {
        let input = sample_store(2, 2);
        let output = EnrichmentPipeline::with_workers(vec![], 2)
            .run(&input)
            .await
            .unwrap();
        let mut a: Vec<&Item> = input.iter().collect();
        let mut b: Vec<&Item> = output.iter().collect();
        a.sort_by(|x, y| x.url.cmp(&y.url));
        b.sort_by(|x, y| x.url.cmp(&y.url));
        assert_eq!(a, b);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_process_keeps_topic() {
        let result = AggregateResult::new(SiteTopic::new("asia", vec![]), sample_store(1, 1));
        let pipeline = EnrichmentPipeline::with_workers(vec![Arc::new(Tag("en"))], 2);
        let enriched = pipeline.process(&result).await.unwrap();
        assert_eq!(enriched.topic.name, "asia");
        assert_eq!(enriched.store.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_language_and_geo_through_pipeline() {
        let mut input = DateBucketedStore::new();
        input
            .insert(
                Item::new("https://x/en", Some("2016-02-02T12:00:00Z".into()))
                    .with_title("San Diego, Mexico is a great place!"),
            )
            .unwrap();
        input
            .insert(
                Item::new("https://x/zh", Some("2016-02-02T13:00:00Z".into()))
                    .with_title("中國積極投資新基建誰是最大贏家？ - 萬里富 - 華富財經"),
            )
            .unwrap();
        input.finalize_ordering();

        let geo = GeoTextLocator::new(Arc::new(Gazetteer::builtin()));
        let pipeline = EnrichmentPipeline::with_workers(
            vec![Arc::new(LanguageDetector::new()), Arc::new(geo)],
            3,
        );
        let output = pipeline.run(&input).await.unwrap();

        let bucket = output.get("2016-02-02").unwrap();
        let english = bucket.iter().find(|i| i.url == "https://x/en").unwrap();
        let chinese = bucket.iter().find(|i| i.url == "https://x/zh").unwrap();

        assert_eq!(english.language, "en");
        assert!(english.has_country("MX"));
        assert_eq!(chinese.language, "zh");
        assert!(chinese.countries.is_empty());
    }

    #[test]
    fn test_enrich_item_direct() {
        let pipeline = EnrichmentPipeline::with_workers(
            vec![Arc::new(Tag("en")), Arc::new(CountryIf { when: "en", code: "SG" })],
            1,
        );
        let item = pipeline.enrich_item(Item::new("u", Some("2024-01-01".into())));
        assert_eq!(item.countries, vec!["SG"]);
        assert_eq!(pipeline.transform_names(), vec!["tag", "country-if"]);
    }
}
