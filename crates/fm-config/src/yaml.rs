//! YAML reading for site configuration files.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

/// Parse YAML content into a JSON value tree.
///
/// Empty content yields an empty object.
pub(crate) fn parse_yaml(content: &str) -> Result<Value, serde_yaml::Error> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    match serde_yaml::from_str(trimmed)? {
        Value::Null => Ok(Value::Object(Map::new())),
        value => Ok(value),
    }
}

/// Read and parse a YAML file.
///
/// Returns `None` (after logging a warning) when the file cannot be read or
/// is not valid YAML. A single broken file must never abort a whole load.
pub(crate) fn read_yaml_file(path: &Path) -> Option<Value> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Cannot read YAML file");
            return None;
        }
    };

    match parse_yaml(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Cannot parse YAML file");
            None
        }
    }
}
