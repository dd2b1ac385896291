pub mod http_fetcher;
pub mod parallel;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::app::Result;
use crate::normalizer::Normalizer;

/// One entry as parsed out of a feed, before it becomes an [`Item`](crate::domain::Item).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawEntry {
    pub link: String,
    pub title: String,
    pub content: String,
    pub published: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
}

/// Downloads a feed body.
#[async_trait]
pub trait Fetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Turns a source identifier into its parsed entries.
#[async_trait]
pub trait FeedSource {
    async fn fetch_entries(&self, source: &str) -> Result<Vec<RawEntry>>;
}

/// [`FeedSource`] that downloads with a [`Fetcher`] and parses with the [`Normalizer`].
pub struct HttpFeedSource {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    normalizer: Normalizer,
}

impl HttpFeedSource {
    pub fn new(fetcher: Arc<dyn Fetcher + Send + Sync>, normalizer: Normalizer) -> Self {
        Self {
            fetcher,
            normalizer,
        }
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch_entries(&self, source: &str) -> Result<Vec<RawEntry>> {
        let body = self.fetcher.fetch(source).await?;
        self.normalizer.normalize(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::TributaryError;

    struct StaticFetcher(&'static str);

    #[async_trait]
    impl Fetcher for StaticFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
            if url.contains("missing") {
                return Err(TributaryError::Other(format!("404 for {}", url)));
            }
            Ok(self.0.as_bytes().to_vec())
        }
    }

    const RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>t</title>
  <item><title>One</title><link>https://example.com/1</link>
    <pubDate>Tue, 02 Jan 2024 10:00:00 GMT</pubDate></item>
</channel></rss>"#;

    #[tokio::test]
    async fn test_http_feed_source_parses_body() {
        let source = HttpFeedSource::new(Arc::new(StaticFetcher(RSS)), Normalizer::new());
        let entries = source.fetch_entries("https://example.com/rss").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].link, "https://example.com/1");
    }

    #[tokio::test]
    async fn test_http_feed_source_propagates_fetch_error() {
        let source = HttpFeedSource::new(Arc::new(StaticFetcher(RSS)), Normalizer::new());
        assert!(source.fetch_entries("https://example.com/missing").await.is_err());
    }

    #[tokio::test]
    async fn test_http_feed_source_rejects_garbage() {
        let source = HttpFeedSource::new(Arc::new(StaticFetcher("not a feed")), Normalizer::new());
        assert!(matches!(
            source.fetch_entries("https://example.com/rss").await,
            Err(TributaryError::FeedParse(_))
        ));
    }
}
