//! Configuration system for memograph.
//!
//! Configuration is resolved once, when the manager is constructed. Sources
//! are a TOML/JSON/YAML file or the process environment.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{MemographError, MemographResult};
use crate::traits::{GraphStoreConfig, GraphStoreProvider};

/// Default similarity cutoff for fuzzy search (0 = exact, 1 = anything).
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.4;

/// Default number of characters after which match position costs a full point.
pub const DEFAULT_FUZZY_DISTANCE: usize = 100;

/// Fuzzy search tuning for the search mirror.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum score a fuzzy hit may have.
    pub threshold: f64,
    /// How far into a field a match may start before it is penalized out.
    pub distance: usize,
    /// Score matches without regard to where they start.
    pub ignore_location: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_FUZZY_THRESHOLD,
            distance: DEFAULT_FUZZY_DISTANCE,
            ignore_location: false,
        }
    }
}

/// Main manager configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Graph store configuration.
    pub graph_store: GraphStoreConfig,
    /// Fuzzy search configuration.
    pub search: SearchConfig,
}

impl ManagerConfig {
    /// Load configuration from a file (TOML, JSON, or YAML).
    pub fn from_file(path: impl AsRef<std::path::Path>) -> MemographResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let ext = path.as_ref().extension().and_then(|e| e.to_str());

        match ext {
            Some("toml") => {
                toml::from_str(&content).map_err(|e| MemographError::Configuration(e.to_string()))
            }
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| MemographError::Configuration(e.to_string())),
            Some("yaml" | "yml") => serde_yaml::from_str(&content)
                .map_err(|e| MemographError::Configuration(e.to_string())),
            _ => Err(MemographError::Configuration(
                "Unsupported config file format. Use .toml, .json, or .yaml".to_string(),
            )),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// `MEMOGRAPH_CONFIG`, when set, names a config file that is used instead.
    pub fn from_env() -> MemographResult<Self> {
        if let Ok(path) = std::env::var("MEMOGRAPH_CONFIG") {
            return Self::from_file(path);
        }
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build configuration from a variable lookup.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> MemographResult<Self> {
        let mut config = Self::default();

        if let Some(provider) = lookup("MEMOGRAPH_STORE") {
            config.graph_store.provider = provider.parse()?;
        }

        match config.graph_store.provider {
            GraphStoreProvider::Neo4j => {
                config.graph_store.url =
                    lookup("NEO4J_URI").unwrap_or_else(|| "bolt://localhost:7687".to_string());
                config.graph_store.username =
                    Some(lookup("NEO4J_USER").unwrap_or_else(|| "neo4j".to_string()));
                config.graph_store.password =
                    Some(lookup("NEO4J_PASSWORD").unwrap_or_else(|| "password".to_string()));
                config.graph_store.database =
                    Some(lookup("NEO4J_DATABASE").unwrap_or_else(|| "neo4j".to_string()));
            }
            GraphStoreProvider::Embedded => {
                config.graph_store.url = lookup("MEMOGRAPH_DB_PATH")
                    .unwrap_or_else(|| default_embedded_path().to_string_lossy().into_owned());
            }
        }

        if let Some(threshold) = lookup("MEMOGRAPH_SEARCH_THRESHOLD") {
            config.search.threshold = threshold.parse().map_err(|_| {
                MemographError::Configuration(format!(
                    "MEMOGRAPH_SEARCH_THRESHOLD must be a number, got '{}'",
                    threshold
                ))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the manager cannot work with.
    pub fn validate(&self) -> MemographResult<()> {
        if !(0.0..=1.0).contains(&self.search.threshold) {
            return Err(MemographError::Configuration(format!(
                "search threshold must be within 0.0..=1.0, got {}",
                self.search.threshold
            )));
        }
        if self.search.distance == 0 && !self.search.ignore_location {
            return Err(MemographError::Configuration(
                "search distance must be positive unless ignore_location is set".to_string(),
            ));
        }
        if self.graph_store.url.trim().is_empty() {
            return Err(MemographError::Configuration(
                "graph store url cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Build configuration using builder pattern.
    pub fn builder() -> ManagerConfigBuilder {
        ManagerConfigBuilder::default()
    }
}

/// Default location of the embedded database.
pub fn default_embedded_path() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".memograph"))
        .unwrap_or_else(|| PathBuf::from(".memograph"))
        .join("graph.db")
}

/// Builder for ManagerConfig.
#[derive(Default)]
pub struct ManagerConfigBuilder {
    config: ManagerConfig,
}

impl ManagerConfigBuilder {
    /// Set graph store configuration.
    pub fn graph_store(mut self, config: GraphStoreConfig) -> Self {
        self.config.graph_store = config;
        self
    }

    /// Set search configuration.
    pub fn search(mut self, config: SearchConfig) -> Self {
        self.config.search = config;
        self
    }

    /// Set the fuzzy threshold.
    pub fn fuzzy_threshold(mut self, threshold: f64) -> Self {
        self.config.search.threshold = threshold;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ManagerConfig {
        self.config
    }
}
