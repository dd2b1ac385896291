use std::fs;
use std::path::Path;

use crate::config::ConfigError;
use crate::domain::SiteTopic;

/// Read the topic list: a JSON array of `{"name", "sites", "outputFile"}` objects.
pub fn load_topics<P: AsRef<Path>>(path: P) -> Result<Vec<SiteTopic>, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    serde_json::from_str(&content).map_err(|e| ConfigError::Topics {
        path: path.to_path_buf(),
        source: e,
    })
}
