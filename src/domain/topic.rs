use serde::{Deserialize, Serialize};

use crate::store::DateBucketedStore;

/// One configured topic and the feed sources it aggregates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteTopic {
    pub name: String,
    #[serde(default)]
    pub sites: Vec<String>,
    #[serde(rename = "outputFile", default)]
    pub output_file: String,
}

impl SiteTopic {
    pub fn new(name: impl Into<String>, sites: Vec<String>) -> Self {
        Self {
            name: name.into(),
            sites,
            output_file: String::new(),
        }
    }
}

/// A topic paired with the items collected for it.
#[derive(Debug, Clone)]
pub struct AggregateResult {
    pub topic: SiteTopic,
    pub store: DateBucketedStore,
}

impl AggregateResult {
    pub fn new(topic: SiteTopic, store: DateBucketedStore) -> Self {
        Self { topic, store }
    }
}

#[derive(Serialize)]
struct AggregateResultRepr<'a> {
    #[serde(rename = "SiteConfig")]
    site_config: &'a SiteTopic,
    #[serde(rename = "SortedDate")]
    sorted_date: &'a [String],
    #[serde(rename = "AggregateMap")]
    aggregate_map: std::collections::BTreeMap<&'a str, &'a [crate::domain::Item]>,
}

impl Serialize for AggregateResult {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let aggregate_map = self
            .store
            .sorted_dates()
            .iter()
            .filter_map(|day| self.store.get(day).map(|items| (day.as_str(), items)))
            .collect();

        AggregateResultRepr {
            site_config: &self.topic,
            sorted_date: self.store.sorted_dates(),
            aggregate_map,
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Item;

    #[test]
    fn test_site_topic_from_original_config() {
        let json = r#"{"name": "tech", "sites": ["https://a.example/rss"], "outputFile": "tech.json"}"#;
        let topic: SiteTopic = serde_json::from_str(json).unwrap();
        assert_eq!(topic.name, "tech");
        assert_eq!(topic.sites, vec!["https://a.example/rss"]);
        assert_eq!(topic.output_file, "tech.json");
    }

    #[test]
    fn test_site_topic_optional_fields() {
        let topic: SiteTopic = serde_json::from_str(r#"{"name": "empty"}"#).unwrap();
        assert!(topic.sites.is_empty());
        assert!(topic.output_file.is_empty());
    }

    #[test]
    fn test_aggregate_result_serialization() {
        let mut store = DateBucketedStore::new();
        store
            .insert(Item::new("https://a/1", Some("2024-01-02T00:00:00Z".into())))
            .unwrap();
        store
            .insert(Item::new("https://a/2", Some("2024-01-01T00:00:00Z".into())))
            .unwrap();
        store.finalize_ordering();

        let result = AggregateResult::new(SiteTopic::new("news", vec![]), store);
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["SiteConfig"]["name"], "news");
        assert_eq!(json["SortedDate"], serde_json::json!(["2024-01-01", "2024-01-02"]));
        assert_eq!(json["AggregateMap"]["2024-01-02"][0]["url"], "https://a/1");
    }
}
