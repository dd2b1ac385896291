use std::sync::Arc;

use crate::app::Result;
use crate::config::Config;
use crate::enrich::{Gazetteer, GeoTextLocator, LanguageDetector, Transform};
use crate::fetcher::http_fetcher::HttpFetcher;
use crate::fetcher::parallel::FeedCollector;
use crate::fetcher::{FeedSource, Fetcher, HttpFeedSource};
use crate::normalizer::Normalizer;
use crate::pipeline::EnrichmentPipeline;
use crate::store::{JsonWriter, ResultSink};

pub struct AppContext {
    pub config: Config,
    pub collector: FeedCollector,
    pub pipeline: EnrichmentPipeline,
    pub sink: Arc<dyn ResultSink + Send + Sync>,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(HttpFetcher::new()?);
        let source: Arc<dyn FeedSource + Send + Sync> =
            Arc::new(HttpFeedSource::new(fetcher, Normalizer::new()));
        let transforms = Self::default_transforms(&config)?;
        let sink: Arc<dyn ResultSink + Send + Sync> = Arc::new(JsonWriter::new(&config.output_dir));

        Ok(Self::with_parts(config, source, transforms, sink))
    }

    pub fn with_parts(
        config: Config,
        source: Arc<dyn FeedSource + Send + Sync>,
        transforms: Vec<Arc<dyn Transform>>,
        sink: Arc<dyn ResultSink + Send + Sync>,
    ) -> Self {
        let collector = FeedCollector::with_workers(source, config.collectors);
        let pipeline = EnrichmentPipeline::with_workers(transforms, config.enrichment_workers);

        Self {
            config,
            collector,
            pipeline,
            sink,
        }
    }

    /// Language detection followed by country extraction.
    pub fn default_transforms(config: &Config) -> Result<Vec<Arc<dyn Transform>>> {
        let mut gazetteer = Gazetteer::builtin();
        if let Some(path) = &config.geo.cities_path {
            let rows = gazetteer.load_geonames(path)?;
            tracing::info!(
                "Loaded {} places from {} ({} cities known)",
                rows,
                path.display(),
                gazetteer.city_count()
            );
        }

        let geo = GeoTextLocator::with_skip_languages(
            Arc::new(gazetteer),
            config.geo.skip_languages.clone(),
        );

        let transforms: Vec<Arc<dyn Transform>> =
            vec![Arc::new(LanguageDetector::new()), Arc::new(geo)];
        Ok(transforms)
    }
}
