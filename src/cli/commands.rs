use std::path::Path;

use chrono::Utc;

use crate::app::{run_topics, AppContext, Result};
use crate::cli::RunOverrides;
use crate::config::{load_topics, Config};
use crate::domain::Item;
use crate::pipeline::EnrichmentPipeline;

pub fn apply_overrides(config: &mut Config, overrides: RunOverrides) {
    if let Some(topics) = overrides.topics {
        config.topics_path = topics;
    }
    if let Some(collectors) = overrides.collectors {
        config.collectors = collectors;
    }
    if let Some(workers) = overrides.workers {
        config.enrichment_workers = workers;
    }
    if let Some(days) = overrides.days {
        config.days_back = days;
    }
    if let Some(output) = overrides.output {
        config.output_dir = output;
    }
}

pub async fn run(ctx: &AppContext) -> Result<()> {
    let topics = load_topics(&ctx.config.topics_path)?;

    if topics.is_empty() {
        println!("No topics configured in {}", ctx.config.topics_path.display());
        return Ok(());
    }

    println!(
        "Processing {} topics (keeping {} days)...",
        topics.len(),
        ctx.config.days_back
    );

    let summary = run_topics(ctx, &topics).await;

    for result in &summary.results {
        println!("{}", result.topic.name);
        for day in result.store.sorted_dates() {
            let count = result.store.get(day).map_or(0, |items| items.len());
            println!("  {} {}", day, count);
        }
    }

    println!(
        "Total rows {} ({} failed writes) in {}",
        summary.total_rows,
        summary.failed_writes,
        ctx.config.output_dir.display()
    );
    Ok(())
}

pub fn list_topics(path: &Path) -> Result<()> {
    let topics = load_topics(path)?;

    if topics.is_empty() {
        println!("No topics");
        return Ok(());
    }

    for topic in topics {
        println!("{} ({} sources)", topic.name, topic.sites.len());
        for site in &topic.sites {
            println!("  {}", site);
        }
    }

    Ok(())
}

/// Run the configured transforms over a single title.
pub fn enrich_title(config: &Config, title: &str) -> Result<Item> {
    let pipeline = EnrichmentPipeline::with_workers(AppContext::default_transforms(config)?, 1);
    // Enriched items must keep a valid day-key
    let item = Item::new("probe", Some(Utc::now().to_rfc3339())).with_title(title);
    Ok(pipeline.enrich_item(item))
}

pub fn probe(config: &Config, title: &str) -> Result<()> {
    let item = enrich_title(config, title)?;

    let language = if item.language.is_empty() {
        "(unknown)"
    } else {
        item.language.as_str()
    };
    println!("language:  {}", language);
    println!("countries: {}", item.countries.join(", "));
    Ok(())
}
