pub mod bucketed;
pub mod json;
pub mod retention;
pub mod shared;

use crate::app::Result;
use crate::domain::AggregateResult;

pub use bucketed::DateBucketedStore;
pub use json::JsonWriter;
pub use shared::SharedStore;

/// Destination for finished, finalized topic results.
pub trait ResultSink {
    fn persist(&self, result: &AggregateResult) -> Result<()>;
}
