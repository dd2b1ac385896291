use std::collections::HashMap;

use chrono::NaiveDate;

use crate::app::Result;
use crate::domain::Item;

/// Items grouped by the day-key of their timestamp.
///
/// The sorted day list is only brought up to date by [`finalize_ordering`](Self::finalize_ordering),
/// so a burst of inserts pays for one sort.
#[derive(Debug, Clone, Default)]
pub struct DateBucketedStore {
    buckets: HashMap<String, Vec<Item>>,
    sorted_dates: Vec<String>,
}

impl DateBucketedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an item into its day bucket.
    ///
    /// Returns `Ok(false)` when the bucket already holds an item with the same URL; the
    /// earlier item is kept.
    pub fn insert(&mut self, item: Item) -> Result<bool> {
        let day = item.day_key()?.to_string();
        let bucket = self.buckets.entry(day).or_default();

        if bucket.iter().any(|existing| existing.url == item.url) {
            return Ok(false);
        }

        bucket.push(item);
        Ok(true)
    }

    pub fn finalize_ordering(&mut self) {
        let mut dates: Vec<String> = self.buckets.keys().cloned().collect();
        // ISO dates sort chronologically as strings
        dates.sort_unstable();
        self.sorted_dates = dates;
    }

    /// Remove every day strictly before `cutoff`.
    pub fn trim_before(&mut self, cutoff: NaiveDate) {
        let cutoff = day_key_of(cutoff);
        self.retain_days(|day| day >= cutoff.as_str());
    }

    /// Keep only the days in `first..=last`.
    pub fn retain_window(&mut self, first: NaiveDate, last: NaiveDate) {
        let (first, last) = (day_key_of(first), day_key_of(last));
        self.retain_days(|day| day >= first.as_str() && day <= last.as_str());
    }

    // The day list is filtered in place, never re-sorted
    fn retain_days(&mut self, keep: impl Fn(&str) -> bool) {
        self.buckets.retain(|day, _| keep(day.as_str()));
        let buckets = &self.buckets;
        self.sorted_dates.retain(|day| buckets.contains_key(day));
    }

    /// Append without the URL check.
    ///
    /// Used when rebuilding a store from items that were already deduplicated once, so a
    /// transform that moves two items onto the same day and URL keeps both.
    pub fn append(&mut self, item: Item) -> Result<bool> {
        let day = item.day_key()?.to_string();
        let bucket = self.buckets.entry(day).or_default();
        let collided = bucket.iter().any(|existing| existing.url == item.url);
        bucket.push(item);
        Ok(!collided)
    }

    pub fn sorted_dates(&self) -> &[String] {
        &self.sorted_dates
    }

    pub fn get(&self, day: &str) -> Option<&[Item]> {
        self.buckets.get(day).map(Vec::as_slice)
    }

    pub fn contains_day(&self, day: &str) -> bool {
        self.buckets.contains_key(day)
    }

    /// Total number of items across all days.
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn day_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(Vec::is_empty)
    }

    /// Items in sorted day order, then insertion order within a day.
    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.sorted_dates
            .iter()
            .filter_map(|day| self.buckets.get(day))
            .flatten()
    }

    pub fn into_items(mut self) -> Vec<Item> {
        let mut items = Vec::with_capacity(self.len());
        for day in &self.sorted_dates {
            if let Some(bucket) = self.buckets.remove(day) {
                items.extend(bucket);
            }
        }
        items
    }
}

fn day_key_of(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
