// Copyright (C) 2026 by GiGa infosystems

//! Configuration of recognized repository hosts & the development version rule

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::url::ProviderKind;

/// The configuration file that gets picked up from the working directory if it exists
pub const DEFAULT_CONFIG_FILE: &str = "lockdiff.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read the configuration at {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid configuration at {path:?}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// One recognized repository host
#[derive(Clone, PartialEq, Eq, Debug, Deserialize)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    /// The exact host name, e.g. `gitlab.example.org`
    pub host: String,
}

impl ProviderConfig {
    pub fn new(kind: ProviderKind, host: impl Into<String>) -> Self {
        ProviderConfig {
            kind,
            host: host.into(),
        }
    }

    /// The publicly hosted instances of every provider
    pub fn defaults() -> Vec<Self> {
        vec![
            ProviderConfig::new(ProviderKind::GitHub, "github.com"),
            ProviderConfig::new(ProviderKind::GitLab, "gitlab.com"),
            ProviderConfig::new(ProviderKind::Bitbucket, "bitbucket.org"),
        ]
    }
}

/// Decides whether a pretty version is a development version (a branch), which gets linked by
/// its source reference instead of its version
#[derive(Clone, PartialEq, Eq, Debug, Deserialize)]
#[serde(default)]
pub struct DevVersionRule {
    pub prefixes: Vec<String>,
    pub suffixes: Vec<String>,
}

impl Default for DevVersionRule {
    fn default() -> Self {
        DevVersionRule {
            prefixes: vec!["dev-".to_owned()],
            suffixes: vec!["-dev".to_owned()],
        }
    }
}

impl DevVersionRule {
    pub fn matches(&self, pretty_version: &str) -> bool {
        self.prefixes
            .iter()
            .any(|prefix| pretty_version.starts_with(prefix.as_str()))
            || self
                .suffixes
                .iter()
                .any(|suffix| pretty_version.ends_with(suffix.as_str()))
    }
}

/// The contents of a configuration file
#[derive(Clone, Default, Debug, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Extra hosts, e.g. self-hosted GitLab instances. These are added to
    /// [`ProviderConfig::defaults`].
    pub providers: Vec<ProviderConfig>,
    pub dev_versions: DevVersionRule,
}

impl Config {
    pub fn parse(path: &Path, contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Toml {
            path: path.to_owned(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::parse(path, &contents)
    }

    /// Load the configuration at `path`, or [`DEFAULT_CONFIG_FILE`] if it exists, or fall back to
    /// the default configuration
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::load(Path::new(DEFAULT_CONFIG_FILE))
            }
            None => Ok(Config::default()),
        }
    }

    /// Add GitLab instances at the given hosts
    pub fn with_gitlab_domains(mut self, hosts: impl IntoIterator<Item = String>) -> Self {
        self.providers.extend(
            hosts
                .into_iter()
                .map(|host| ProviderConfig::new(ProviderKind::GitLab, host)),
        );
        self
    }

    /// The default providers followed by the configured ones
    pub fn all_providers(&self) -> Vec<ProviderConfig> {
        let mut providers = ProviderConfig::defaults();
        providers.extend(self.providers.iter().cloned());
        providers
    }
}
