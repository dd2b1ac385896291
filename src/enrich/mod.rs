//! Per-item enrichment transforms.

pub mod gazetteer;
pub mod geo;
pub mod language;

use crate::app::Result;
use crate::domain::Item;

pub use gazetteer::Gazetteer;
pub use geo::GeoTextLocator;
pub use language::LanguageDetector;

/// One enrichment step.
///
/// Implementations are shared between pipeline workers and called concurrently on
/// independent items, so any capability they need is owned by the transform itself.
pub trait Transform: Send + Sync {
    fn name(&self) -> &str;

    fn apply(&self, item: &mut Item) -> Result<()>;
}
