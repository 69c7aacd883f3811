//! Neo4j connection settings.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Configuration for connecting to Neo4j.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub database: String,
    /// Upper bound on pooled Bolt connections shared by all callers.
    pub max_connections: usize,
    pub fetch_size: usize,
    /// Only applies to [`crate::GraphClient::verify`].
    pub connect_timeout_secs: u64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: "neo4j_password".to_string(),
            database: "neo4j".to_string(),
            max_connections: 50,
            fetch_size: 200,
            connect_timeout_secs: 5,
        }
    }
}

/// Top-level config file layout (`[graph]` table).
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    graph: GraphConfig,
}

impl GraphConfig {
    /// Parse a TOML document with a `[graph]` table.
    pub fn from_toml(text: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(text).context("Invalid graph configuration")?;
        Ok(file.graph)
    }

    /// Load from an optional TOML file, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file {}", path.display()))?;
                Self::from_toml(&text)?
            }
            None => Self::default(),
        };
        config.with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `NEO4J_*` overrides from the given lookup.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(uri) = lookup("NEO4J_URI") {
            self.uri = uri;
        }
        if let Some(user) = lookup("NEO4J_USER") {
            self.user = user;
        }
        if let Some(password) = lookup("NEO4J_PASSWORD") {
            self.password = password;
        }
        if let Some(database) = lookup("NEO4J_DATABASE") {
            self.database = database;
        }
        if let Some(max) = lookup("NEO4J_MAX_CONNECTIONS") {
            self.max_connections = max
                .parse()
                .with_context(|| format!("NEO4J_MAX_CONNECTIONS is not a number: {}", max))?;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = GraphConfig::default();
        assert_eq!(config.uri, "bolt://localhost:7687");
        assert_eq!(config.max_connections, 50);
    }

    #[test]
    fn test_from_toml_partial() {
        let config = GraphConfig::from_toml(
            r#"
            [graph]
            uri = "bolt://neo4j:7687"
            max_connections = 8
            "#,
        )
        .unwrap();
        assert_eq!(config.uri, "bolt://neo4j:7687");
        assert_eq!(config.max_connections, 8);
        assert_eq!(config.user, "neo4j");
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(GraphConfig::from_toml("").unwrap(), GraphConfig::default());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("NEO4J_URI", "bolt://graph:7687"),
            ("NEO4J_PASSWORD", "s3cret"),
            ("NEO4J_MAX_CONNECTIONS", "12"),
        ]
        .into_iter()
        .collect();

        let config = GraphConfig::default()
            .with_env_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.uri, "bolt://graph:7687");
        assert_eq!(config.password, "s3cret");
        assert_eq!(config.max_connections, 12);
        assert_eq!(config.user, "neo4j");
    }

    #[test]
    fn test_env_override_rejects_bad_pool_size() {
        let result = GraphConfig::default()
            .with_env_overrides(|k| (k == "NEO4J_MAX_CONNECTIONS").then(|| "many".to_string()));
        assert!(result.is_err());
    }
}
