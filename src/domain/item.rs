use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::app::{Result, TributaryError};

/// Length of a `YYYY-MM-DD` day-key.
pub const DAY_KEY_LEN: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub url: String,
    /// ISO-8601 publication timestamp, if the feed provided one.
    pub date: Option<String>,
    pub title: String,
    pub content: String,
    pub language: String,
    pub translated_title: Option<String>,
    pub countries: Vec<String>,
}

impl Item {
    pub fn new(url: impl Into<String>, date: Option<String>) -> Self {
        Self {
            url: url.into(),
            date,
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// The `YYYY-MM-DD` prefix of the timestamp.
    ///
    /// Fails with [`TributaryError::MalformedTimestamp`] when the timestamp is absent, shorter
    /// than ten characters, or its prefix is not a calendar date.
    pub fn day_key(&self) -> Result<&str> {
        let malformed = || TributaryError::MalformedTimestamp(self.date.clone());
        let date = self.date.as_deref().ok_or_else(malformed)?;
        let key = date.get(..DAY_KEY_LEN).ok_or_else(malformed)?;
        NaiveDate::parse_from_str(key, "%Y-%m-%d").map_err(|_| malformed())?;
        Ok(key)
    }

    pub fn has_country(&self, code: &str) -> bool {
        self.countries.iter().any(|c| c == code)
    }

    /// Append a country code unless already present.
    pub fn add_country(&mut self, code: &str) {
        if !self.has_country(code) {
            self.countries.push(code.to_string());
        }
    }
}
