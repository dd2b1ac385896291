pub mod context;
pub mod error;
pub mod runner;

pub use context::AppContext;
pub use error::{Result, TributaryError};
pub use runner::{run_topics, RunSummary};
