//! CLI configuration
//!
//! Stored as TOML at `<config dir>/entigraph/config.toml`. A missing file
//! yields the defaults.

use std::path::{Path, PathBuf};

use entigraph_core::CatalogLists;
use entigraph_server::ServerConfig;
use serde::{Deserialize, Serialize};

/// Default location of the config file
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("entigraph")
        .join("config.toml")
}

/// Where catalog metadata comes from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Snapshot file; takes precedence over the Dataverse settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Build graphs from the curated entity set
    pub curated: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self { curated: true }
    }
}

/// Configuration for the CLI
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub server: ServerConfig,
    pub graph: GraphConfig,
    /// Overrides of the classifier lists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog: Option<CatalogLists>,
}

const KEYS: &[&str] = &[
    "source.resource_url",
    "source.authority",
    "source.client_id",
    "source.client_secret",
    "source.scope",
    "source.snapshot",
    "server.host",
    "server.port",
    "server.allowed_origins",
    "graph.curated",
];

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl Config {
    /// Load from `path`, falling back to defaults when the file is missing
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config file {}: {}", path.display(), e))
    }

    /// Write to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        crate::output::write_private(path, &content)?;
        tracing::debug!("Saved config to {:?}", path);
        Ok(())
    }

    /// Settable scalar keys
    pub fn keys() -> &'static [&'static str] {
        KEYS
    }

    /// Current value of `key`, `None` when unset
    pub fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let value = match key {
            "source.resource_url" => self.source.resource_url.clone(),
            "source.authority" => self.source.authority.clone(),
            "source.client_id" => self.source.client_id.clone(),
            "source.client_secret" => self.source.client_secret.clone(),
            "source.scope" => self.source.scope.clone(),
            "source.snapshot" => self
                .source
                .snapshot
                .as_ref()
                .map(|p| p.display().to_string()),
            "server.host" => Some(self.server.host.clone()),
            "server.port" => Some(self.server.port.to_string()),
            "server.allowed_origins" => Some(self.server.allowed_origins.join(",")),
            "graph.curated" => Some(self.graph.curated.to_string()),
            other => anyhow::bail!(
                "Unknown config key: {}. Available keys: {}",
                other,
                KEYS.join(", ")
            ),
        };
        Ok(value)
    }

    /// Set `key` from its string form; an empty value unsets optional keys
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "source.resource_url" => self.source.resource_url = optional(value),
            "source.authority" => self.source.authority = optional(value),
            "source.client_id" => self.source.client_id = optional(value),
            "source.client_secret" => self.source.client_secret = optional(value),
            "source.scope" => self.source.scope = optional(value),
            "source.snapshot" => self.source.snapshot = optional(value).map(PathBuf::from),
            "server.host" => {
                self.server.host = optional(value)
                    .ok_or_else(|| anyhow::anyhow!("server.host cannot be empty"))?
            }
            "server.port" => {
                self.server.port = value
                    .trim()
                    .parse()
                    .map_err(|_| anyhow::anyhow!("Invalid port: {}", value))?
            }
            "server.allowed_origins" => {
                self.server.allowed_origins = entigraph_core::split_prefixes(value)
            }
            "graph.curated" => {
                self.graph.curated = value
                    .trim()
                    .parse()
                    .map_err(|_| anyhow::anyhow!("Invalid boolean: {}", value))?
            }
            other => anyhow::bail!(
                "Unknown config key: {}. Available keys: {}",
                other,
                KEYS.join(", ")
            ),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert!(config.graph.curated);
        assert!(config.source.snapshot.is_none());
    }

    #[test]
    fn test_set_and_get() {
        let mut config = Config::default();
        config.set("server.port", "9000").unwrap();
        config.set("graph.curated", "false").unwrap();
        config
            .set("server.allowed_origins", "http://a.test, http://b.test")
            .unwrap();
        config.set("source.client_id", "abc").unwrap();

        assert_eq!(config.get("server.port").unwrap().as_deref(), Some("9000"));
        assert!(!config.graph.curated);
        assert_eq!(config.server.allowed_origins, vec!["http://a.test", "http://b.test"]);
        assert_eq!(config.get("source.client_id").unwrap().as_deref(), Some("abc"));

        config.set("source.client_id", "").unwrap();
        assert_eq!(config.get("source.client_id").unwrap(), None);
    }

    #[test]
    fn test_invalid_values() {
        let mut config = Config::default();
        assert!(config.set("server.port", "eighty").is_err());
        assert!(config.set("graph.curated", "maybe").is_err());
        assert!(config.set("nope", "1").is_err());
        assert!(config.get("nope").is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.set("source.snapshot", "/tmp/catalog.json").unwrap();
        config.set("server.port", "8123").unwrap();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn test_catalog_overrides() {
        let config: Config = toml::from_str(
            r#"
            [catalog]
            team_prefix = "abc_"
            "#,
        )
        .unwrap();

        let lists = config.catalog.unwrap();
        assert_eq!(lists.team_prefix, "abc_");
        assert!(lists.core_entities.contains("account"));
    }
}
