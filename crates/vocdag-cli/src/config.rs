//! Load settings read from `.vocdag/config.json`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use vocdag_graph::BuildOptions;

pub const CONFIG_DIR: &str = ".vocdag";
pub const CONFIG_FILE: &str = "config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Which parts of an ontology file to load, and how strictly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    pub exclude_namespaces: Vec<String>,
    /// Relationship types to keep besides `is_a`; absent keeps all.
    pub relationship_types: Option<Vec<String>>,
    pub include_obsolete: bool,
    pub fail_on_cycles: bool,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            exclude_namespaces: Vec::new(),
            relationship_types: None,
            include_obsolete: true,
            fail_on_cycles: true,
        }
    }
}

impl LoadConfig {
    pub fn path_in(root: &Path) -> PathBuf {
        root.join(CONFIG_DIR).join(CONFIG_FILE)
    }

    /// Reads the config at `explicit`, or `./.vocdag/config.json` if present.
    ///
    /// Only an explicit path is required to exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = Self::path_in(Path::new("."));
                if !path.exists() {
                    debug!("No config at {}, using defaults", path.display());
                    return Ok(Self::default());
                }
                path
            }
        };
        Self::read(&path)
    }

    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            exclude_namespaces: self.exclude_namespaces.clone(),
            relationship_types: self.relationship_types.clone(),
            include_obsolete: self.include_obsolete,
        }
    }
}
