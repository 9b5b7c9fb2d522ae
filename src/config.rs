use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const ENDPOINT_ENV: &str = "SBR_ENDPOINT";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub service: ServiceConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub endpoint: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
}

fn default_request_timeout() -> u64 { 10_000 }

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_dir")]
    pub dir: PathBuf,
}

fn default_catalog_dir() -> PathBuf {
    PathBuf::from("catalog")
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            dir: default_catalog_dir(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "sbr_client=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .with_context(|| "Failed to parse config TOML")?;
        if config.service.endpoint.trim().is_empty() {
            anyhow::bail!("service.endpoint cannot be empty");
        }
        Ok(config)
    }

    /// Service endpoint. A non-empty `SBR_ENDPOINT` env var takes precedence.
    pub fn endpoint(&self) -> String {
        match std::env::var(ENDPOINT_ENV) {
            Ok(url) if !url.trim().is_empty() => url.trim().to_string(),
            _ => self.service.endpoint.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_parses() {
        let config = Config::load(Path::new("config.toml")).unwrap();
        assert!(config.service.endpoint.starts_with("https://"));
        assert_eq!(config.service.request_timeout_ms, 10_000);
        assert_eq!(config.catalog.dir, PathBuf::from("catalog"));
        assert_eq!(config.logging.filter, "sbr_client=info");
    }

    #[test]
    fn test_defaults_fill_optional_sections() {
        let config = Config::parse("[service]\nendpoint = \"http://localhost:4000\"\n").unwrap();
        assert_eq!(config.service.request_timeout_ms, 10_000);
        assert_eq!(config.catalog.dir, PathBuf::from("catalog"));
        assert_eq!(config.logging.filter, "sbr_client=info");
    }

    #[test]
    fn test_missing_endpoint_is_rejected() {
        assert!(Config::parse("[service]\nrequest_timeout_ms = 5\n").is_err());
        assert!(Config::parse("[service]\nendpoint = \"  \"\n").is_err());
    }
}
