//! Configuration file parsing and merging
//!
//! This module handles parsing of the optional `vst3build.toml` and
//! `vst3build.local.toml` files found in the project root. Command-line flags
//! take precedence over anything loaded here.

use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;

use crate::{Error, Result};

/// Base configuration file name
pub const CONFIG_FILE: &str = "vst3build.toml";

/// Per-developer override file name
pub const LOCAL_CONFIG_FILE: &str = "vst3build.local.toml";

/// Build configuration understood by the native toolchains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
pub enum BuildConfig {
    /// Optimized build, the only configuration distributed without asking
    #[default]
    #[value(name = "Release")]
    Release,
    /// Debug build
    #[value(name = "Debug")]
    Debug,
}

impl BuildConfig {
    /// Name as passed to MSBuild/xcodebuild and used in output paths
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildConfig::Release => "Release",
            BuildConfig::Debug => "Debug",
        }
    }

    pub fn is_release(&self) -> bool {
        matches!(self, BuildConfig::Release)
    }
}

impl std::fmt::Display for BuildConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main configuration structure for vst3build
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build settings
    pub build: BuildSettings,

    /// Install (copy) settings
    pub install: InstallSettings,

    /// Distribution settings
    pub dist: DistSettings,
}

/// Build settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BuildSettings {
    /// Default build configuration when `--config` is not given
    pub config: BuildConfig,

    /// Default exporter tag when `--exporter` is not given
    pub exporter: Option<String>,
}

/// Install settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InstallSettings {
    /// Overrides the platform default VST3 directory
    pub vst3_dir: Option<Utf8PathBuf>,
}

/// Distribution settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DistSettings {
    /// Archive output directory, relative to the project root (default: "dist")
    pub dir: Utf8PathBuf,
}

impl Default for DistSettings {
    fn default() -> Self {
        Self {
            dir: Utf8PathBuf::from("dist"),
        }
    }
}

impl Config {
    /// Load configuration from a project directory.
    ///
    /// This loads `vst3build.toml` and merges `vst3build.local.toml` over it if
    /// present. Missing files yield the defaults.
    pub fn load(project_root: &Utf8Path) -> Result<Self> {
        let config_path = project_root.join(CONFIG_FILE);
        let local_config_path = project_root.join(LOCAL_CONFIG_FILE);

        let base_config = if config_path.exists() {
            tracing::debug!("Loading {}", config_path);
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str::<toml::Value>(&content)?
        } else {
            toml::Value::Table(toml::map::Map::new())
        };

        let local_config = if local_config_path.exists() {
            tracing::debug!("Loading {}", local_config_path);
            let content = std::fs::read_to_string(&local_config_path)?;
            Some(toml::from_str::<toml::Value>(&content)?)
        } else {
            None
        };

        let merged = match local_config {
            Some(local) => merge_toml_values(base_config, local),
            None => base_config,
        };

        merged.try_into().map_err(|e: toml::de::Error| {
            Error::config(
                format!("Invalid configuration in {}: {}", project_root, e),
                format!("Check {} and {}", CONFIG_FILE, LOCAL_CONFIG_FILE),
            )
        })
    }

    /// Load configuration from a string (for testing)
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Resolve the distribution directory against the project root
    pub fn dist_dir(&self, project_root: &Utf8Path) -> Utf8PathBuf {
        project_root.join(&self.dist.dir)
    }
}

/// Merge two TOML values:
/// - Tables: recursively merged
/// - Arrays: local replaces base (not merged)
/// - Primitives: local overrides base
fn merge_toml_values(base: toml::Value, local: toml::Value) -> toml::Value {
    match (base, local) {
        (toml::Value::Table(mut base_table), toml::Value::Table(local_table)) => {
            for (key, local_value) in local_table {
                if let Some(base_value) = base_table.remove(&key) {
                    base_table.insert(key, merge_toml_values(base_value, local_value));
                } else {
                    base_table.insert(key, local_value);
                }
            }
            toml::Value::Table(base_table)
        }
        (_, local) => local,
    }
}
