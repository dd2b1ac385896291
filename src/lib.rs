//! # Tributary
//!
//! Collects items from many RSS/Atom feeds, groups them by calendar day and enriches them
//! with the language and the countries named in their titles.
//!
//! ## Architecture
//!
//! Each configured topic runs through two concurrent stages with a trim in between:
//!
//! ```text
//! FeedCollector → retention::trim → EnrichmentPipeline → ResultSink
//! ```
//!
//! - [`fetcher`]: HTTP fetching and the parallel [`FeedCollector`](fetcher::parallel::FeedCollector)
//! - [`normalizer`]: Converts RSS/Atom/JSON feeds to raw entries
//! - [`store`]: Day-bucketed item store, retention window and JSON output
//! - [`pipeline`]: Parallel enrichment with fan-in back to a day-bucketed store
//! - [`enrich`]: Language detection and country extraction transforms
//!
//! ## Quick Start
//!
//! ```bash
//! # Run every topic from ./config.json, writing ./data/<topic>.json
//! tributary run
//!
//! # Keep a week of items, 8 parallel fetchers
//! tributary run --days 7 --collectors 8
//!
//! # Try the enrichment transforms on one title
//! tributary probe "San Diego, Mexico is a great place!"
//! ```

/// Application context, run orchestration and error types.
///
/// The [`AppContext`](app::AppContext) struct wires together the feed source,
/// collector, enrichment pipeline and result sink.
pub mod app;

/// Command-line interface using clap.
///
/// - `run` - Process every topic
/// - `topics` - List configured topics
/// - `probe <title>` - Enrich a single title
pub mod cli;

/// Settings file and topic list loading.
pub mod config;

/// Core domain models.
///
/// - [`Item`](domain::Item): One feed entry and its enrichment
/// - [`SiteTopic`](domain::SiteTopic): A configured group of feeds
/// - [`AggregateResult`](domain::AggregateResult): A topic with its collected items
pub mod domain;

/// Enrichment transforms.
///
/// - [`Transform`](enrich::Transform): One enrichment step
/// - [`LanguageDetector`](enrich::LanguageDetector): Title language
/// - [`GeoTextLocator`](enrich::GeoTextLocator): Countries named in the title
pub mod enrich;

/// Feed fetching.
///
/// - [`FeedSource`](fetcher::FeedSource): Async trait from source identifier to entries
/// - [`HttpFetcher`](fetcher::http_fetcher::HttpFetcher): reqwest-based implementation
/// - [`FeedCollector`](fetcher::parallel::FeedCollector): Worker pool over many sources
pub mod fetcher;

/// Feed parsing and normalization.
pub mod normalizer;

/// Parallel enrichment stage.
pub mod pipeline;

/// Day-bucketed storage.
///
/// - [`DateBucketedStore`](store::DateBucketedStore): Items by day, deduplicated by URL
/// - [`SharedStore`](store::SharedStore): Lock-guarded store for concurrent inserts
/// - [`retention`](store::retention): Retention window trim
/// - [`ResultSink`](store::ResultSink): Destination for finished topics
pub mod store;
