pub mod item;
pub mod topic;

pub use item::Item;
pub use topic::{AggregateResult, SiteTopic};
