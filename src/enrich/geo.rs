use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::app::Result;
use crate::domain::Item;
use crate::enrich::{Gazetteer, Transform};

pub const DEFAULT_SKIP_LANGUAGES: &[&str] = &["zh"];

// Runs of capitalised words, allowing a lowercase connector between them ("Republic of China")
static PLACE_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\p{Lu}[\p{L}\p{M}'’-]*(?:\s+(?:(?:of|the|de|del|da|do)\s+)?\p{Lu}[\p{L}\p{M}'’-]*)*",
    )
    .expect("place phrase pattern is valid")
});

/// Appends ISO 3166 country codes for places named in the title.
///
/// Country names are recorded before the countries of any cities found. Items whose detected
/// language is in the skip list are left untouched, so this should run after
/// [`LanguageDetector`](crate::enrich::LanguageDetector).
#[derive(Debug, Clone)]
pub struct GeoTextLocator {
    gazetteer: Arc<Gazetteer>,
    skip_languages: Vec<String>,
}

impl GeoTextLocator {
    pub fn new(gazetteer: Arc<Gazetteer>) -> Self {
        Self::with_skip_languages(
            gazetteer,
            DEFAULT_SKIP_LANGUAGES.iter().map(|s| s.to_string()).collect(),
        )
    }

    pub fn with_skip_languages(gazetteer: Arc<Gazetteer>, skip_languages: Vec<String>) -> Self {
        Self {
            gazetteer,
            skip_languages,
        }
    }

    fn skips(&self, language: &str) -> bool {
        self.skip_languages.iter().any(|l| l == language)
    }

    /// Country codes named directly, then country codes of named cities.
    pub fn locate(&self, text: &str) -> (Vec<String>, Vec<String>) {
        let mut countries = Vec::new();
        let mut cities = Vec::new();
        let max_words = self.gazetteer.max_words().max(1);

        for phrase in PLACE_PHRASE.find_iter(text) {
            let words: Vec<&str> = phrase.as_str().split_whitespace().collect();
            let mut start = 0;

            while start < words.len() {
                let longest = max_words.min(words.len() - start);
                let mut consumed = 1;

                for len in (1..=longest).rev() {
                    let candidate = words[start..start + len].join(" ");
                    if let Some(code) = self.gazetteer.country(&candidate) {
                        countries.push(code.to_string());
                        consumed = len;
                        break;
                    }
                    if let Some(code) = self.gazetteer.city_country(&candidate) {
                        cities.push(code.to_string());
                        consumed = len;
                        break;
                    }
                }

                start += consumed;
            }
        }

        (countries, cities)
    }
}

impl Transform for GeoTextLocator {
    fn name(&self) -> &str {
        "geo"
    }

    fn apply(&self, item: &mut Item) -> Result<()> {
        if self.skips(&item.language) {
            return Ok(());
        }

        let (countries, cities) = self.locate(&item.title);
        for code in countries.iter().chain(cities.iter()) {
            item.add_country(code);
        }
        Ok(())
    }
}
