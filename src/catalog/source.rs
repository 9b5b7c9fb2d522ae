use crate::error::{Result, SbrError};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Where static mappings (market taxonomies, rosters, templates) come from.
pub trait MappingSource: Send + Sync {
    fn load_mapping(&self, key: &str) -> Result<Value>;
}

/// Reads `<dir>/<key>.toml`, falling back to `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct DirSource {
    dir: PathBuf,
}

impl DirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl MappingSource for DirSource {
    fn load_mapping(&self, key: &str) -> Result<Value> {
        let toml_path = self.dir.join(format!("{}.toml", key));
        if toml_path.is_file() {
            let text = read(&toml_path)?;
            let value: toml::Value = toml::from_str(&text)
                .map_err(|e| SbrError::Config(format!("{}: {}", toml_path.display(), e)))?;
            tracing::debug!(key, path = %toml_path.display(), "loaded mapping");
            return serde_json::to_value(value)
                .map_err(|e| SbrError::Config(format!("{}: {}", toml_path.display(), e)));
        }

        let json_path = self.dir.join(format!("{}.json", key));
        if json_path.is_file() {
            let text = read(&json_path)?;
            tracing::debug!(key, path = %json_path.display(), "loaded mapping");
            return serde_json::from_str(&text)
                .map_err(|e| SbrError::Config(format!("{}: {}", json_path.display(), e)));
        }

        Err(SbrError::Config(format!(
            "no mapping '{}' in {}",
            key,
            self.dir.display()
        )))
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| SbrError::Config(format!("failed to read {}: {}", path.display(), e)))
}

/// In-memory mappings.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    mappings: HashMap<String, Value>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: Value) -> Self {
        self.mappings.insert(key.to_string(), value);
        self
    }
}

impl MappingSource for StaticSource {
    fn load_mapping(&self, key: &str) -> Result<Value> {
        self.mappings
            .get(key)
            .cloned()
            .ok_or_else(|| SbrError::Config(format!("no mapping '{}'", key)))
    }
}
