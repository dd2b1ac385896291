use std::fs;
use std::path::{Path, PathBuf};

use crate::app::{Result, TributaryError};
use crate::domain::AggregateResult;
use crate::store::ResultSink;

/// Writes each topic to `<dir>/<outputFile>`, or `<dir>/<topic name>.json` when no file is set.
pub struct JsonWriter {
    dir: PathBuf,
}

impl JsonWriter {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// The file name must be a single path component inside the output directory.
    pub fn path_for(&self, result: &AggregateResult) -> Result<PathBuf> {
        let topic = &result.topic;
        let file_name = if topic.output_file.is_empty() {
            format!("{}.json", topic.name)
        } else {
            topic.output_file.clone()
        };

        let bare = file_name.trim_end_matches(".json");
        if bare.is_empty() || bare == "." || bare == ".." || file_name.contains(['/', '\\']) {
            return Err(TributaryError::Config(format!(
                "topic {:?} has an unusable output file name {:?}",
                topic.name, file_name
            )));
        }

        Ok(self.dir.join(file_name))
    }
}

impl ResultSink for JsonWriter {
    fn persist(&self, result: &AggregateResult) -> Result<()> {
        let path = self.path_for(result)?;
        fs::create_dir_all(&self.dir)?;
        let body = serde_json::to_string_pretty(result)?;
        fs::write(&path, body)?;
        tracing::info!("Wrote {} items to {}", result.store.len(), path.display());
        Ok(())
    }
}
