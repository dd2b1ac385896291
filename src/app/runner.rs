use std::time::Instant;

use crate::app::AppContext;
use crate::domain::{AggregateResult, SiteTopic};
use crate::store::{retention, DateBucketedStore};

/// Outcome of a run over every configured topic.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub results: Vec<AggregateResult>,
    pub total_rows: usize,
    pub failed_writes: usize,
}

/// Collect, trim, enrich and persist each topic in turn.
///
/// Every topic yields a result: stage failures fall back to whatever the earlier stage produced.
pub async fn run_topics(ctx: &AppContext, topics: &[SiteTopic]) -> RunSummary {
    let start = Instant::now();
    let mut summary = RunSummary::default();

    for topic in topics {
        let result = run_topic(ctx, topic).await;

        for day in result.store.sorted_dates() {
            let count = result.store.get(day).map_or(0, |items| items.len());
            tracing::info!("{} {}: {} items", topic.name, day, count);
        }
        summary.total_rows += result.store.len();

        if let Err(e) = ctx.sink.persist(&result) {
            tracing::error!("Failed to persist topic {}: {}", topic.name, e);
            summary.failed_writes += 1;
        }

        summary.results.push(result);
    }

    tracing::info!(
        "Processed {} topics, {} rows in {:.1}s ({} failed writes)",
        topics.len(),
        summary.total_rows,
        start.elapsed().as_secs_f64(),
        summary.failed_writes
    );

    summary
}

async fn run_topic(ctx: &AppContext, topic: &SiteTopic) -> AggregateResult {
    tracing::info!("Collecting topic {} from {} sources", topic.name, topic.sites.len());

    let mut store = match ctx.collector.collect(&topic.sites).await {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Collection failed for topic {}: {}", topic.name, e);
            DateBucketedStore::new()
        }
    };

    retention::trim(&mut store, ctx.config.days_back);
    let trimmed = AggregateResult::new(topic.clone(), store);

    match ctx.pipeline.process(&trimmed).await {
        Ok(enriched) => enriched,
        Err(e) => {
            tracing::error!("Enrichment failed for topic {}: {}", topic.name, e);
            trimmed
        }
    }
}
