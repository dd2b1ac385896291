//! Retention window over day buckets.

use chrono::{Days, NaiveDate, Utc};

use crate::store::DateBucketedStore;

/// Keep the `days_back` calendar days ending today, on the UTC clock the day-keys use.
pub fn trim(store: &mut DateBucketedStore, days_back: u32) {
    trim_at(store, days_back, Utc::now().date_naive());
}

/// Same as [`trim`] with an explicit "today". Days after `today` are dropped as well.
pub fn trim_at(store: &mut DateBucketedStore, days_back: u32, today: NaiveDate) {
    let cutoff = cutoff_date(days_back, today);
    let before = store.day_count();
    store.retain_window(cutoff, today);
    tracing::debug!(
        "Retention trim at {}: kept {} of {} days",
        cutoff,
        store.day_count(),
        before
    );
}

/// First retained day: `today - days_back + 1`.
pub fn cutoff_date(days_back: u32, today: NaiveDate) -> NaiveDate {
    let start_of_tomorrow = today.succ_opt().unwrap_or(today);
    start_of_tomorrow
        .checked_sub_days(Days::new(u64::from(days_back)))
        .unwrap_or(NaiveDate::MIN)
}
