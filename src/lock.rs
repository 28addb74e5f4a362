// Copyright (C) 2026 by GiGa infosystems

//! Read `composer.lock` files from the filesystem or from `git` revisions into
//! [`RepositorySet`]s

use camino::Utf8PathBuf;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::{fmt, fs};

use crate::cmd::CommandError;
use crate::config::DevVersionRule;
use crate::git::Repository;
use crate::package::{Package, RepositorySet, Source};

/// The lock file name used if a locator doesn't name one
pub const DEFAULT_LOCK_FILE: &str = "composer.lock";

/// Where to read a lock file from
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Locator {
    /// A file on the filesystem
    Path(Utf8PathBuf),
    /// A file as of a `git` revision, the path is relative to the working directory
    GitRef { rev: String, path: String },
}

impl Locator {
    /// Interpret a user-provided locator:
    /// * An empty string is `default_file` in the working directory
    /// * Existing files are read from the filesystem
    /// * `<rev>:<path>` reads `path` at the revision `rev`
    /// * Anything else is a revision to read `default_file` at
    pub fn parse(locator: &str, default_file: &str) -> Self {
        if locator.is_empty() {
            return Locator::Path(default_file.into());
        }

        if Utf8PathBuf::from(locator).is_file() {
            return Locator::Path(locator.into());
        }

        match locator.split_once(':') {
            Some((rev, path)) if !path.is_empty() => Locator::GitRef {
                rev: rev.to_owned(),
                path: path.to_owned(),
            },
            Some((rev, _)) => Locator::GitRef {
                rev: rev.to_owned(),
                path: default_file.to_owned(),
            },
            None => Locator::GitRef {
                rev: locator.to_owned(),
                path: default_file.to_owned(),
            },
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Path(path) => write!(f, "{path}"),
            Locator::GitRef { rev, path } => write!(f, "{rev}:{path}"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ResolutionErrorKind {
    #[error("Failed to read the lock file")]
    Io(#[source] std::io::Error),
    #[error("Failed to read the lock file from git")]
    Git(#[source] CommandError),
    #[error("Invalid lock file")]
    Json(#[source] serde_json::Error),
}

/// A lock file couldn't be materialized into a [`RepositorySet`]
#[derive(Debug, thiserror::Error)]
#[error("Failed to resolve packages from `{locator}`")]
pub struct ResolutionError {
    pub locator: Locator,
    #[source]
    pub kind: ResolutionErrorKind,
}

#[derive(Deserialize, Debug)]
struct LockedSource {
    url: String,
    reference: Option<String>,
}

#[derive(Deserialize, Debug)]
struct LockedPackage {
    name: String,
    version: String,
    source: Option<LockedSource>,
    dist: Option<LockedSource>,
}

#[derive(Deserialize, Debug)]
struct LockedAlias {
    package: String,
    version: String,
    alias: String,
    alias_normalized: Option<String>,
}

/// PHP serializes empty objects as empty arrays
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum PlatformRequirements {
    Map(BTreeMap<String, String>),
    List(Vec<serde_json::Value>),
}

impl Default for PlatformRequirements {
    fn default() -> Self {
        PlatformRequirements::Map(BTreeMap::new())
    }
}

impl PlatformRequirements {
    fn into_map(self) -> BTreeMap<String, String> {
        match self {
            PlatformRequirements::Map(map) => map,
            PlatformRequirements::List(_) => BTreeMap::new(),
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "kebab-case")]
struct LockFile {
    #[serde(default)]
    packages: Vec<LockedPackage>,
    #[serde(default)]
    packages_dev: Vec<LockedPackage>,
    #[serde(default)]
    aliases: Vec<LockedAlias>,
    #[serde(default)]
    platform: PlatformRequirements,
    #[serde(default)]
    platform_dev: PlatformRequirements,
}

/// The canonical version: branches include their reference, releases lose a `v` prefix
fn canonical_version(
    pretty_version: &str,
    reference: Option<&str>,
    rule: &DevVersionRule,
) -> String {
    if rule.matches(pretty_version) {
        match reference {
            Some(reference) => format!("{pretty_version}#{reference}"),
            None => pretty_version.to_owned(),
        }
    } else {
        pretty_version
            .strip_prefix(['v', 'V'])
            .filter(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
            .unwrap_or(pretty_version)
            .to_owned()
    }
}

impl LockedPackage {
    fn into_package(self, is_dev: bool, rule: &DevVersionRule) -> Package {
        let source = self
            .source
            .or(self.dist)
            .map(|source| Source::new(source.url, source.reference));
        let reference = source.as_ref().and_then(|source| source.reference.as_deref());
        let version = canonical_version(&self.version, reference, rule);

        let mut package = Package::new(self.name, version).with_pretty_version(self.version);
        package.source = source;
        package.is_dev = is_dev;
        package
    }
}

/// Parse the contents of a `composer.lock` file
pub fn parse(contents: &str, rule: &DevVersionRule) -> Result<RepositorySet, serde_json::Error> {
    let lock: LockFile = serde_json::from_str(contents)?;

    let mut aliases = lock
        .aliases
        .into_iter()
        .map(|alias| ((alias.package.clone(), alias.version.clone()), alias))
        .collect::<BTreeMap<_, _>>();

    let packages = lock
        .packages
        .into_iter()
        .map(|package| (package, false))
        .chain(lock.packages_dev.into_iter().map(|package| (package, true)))
        .map(|(locked, is_dev)| {
            let alias = aliases.remove(&(locked.name.clone(), locked.version.clone()));
            let package = locked.into_package(is_dev, rule);
            match alias {
                Some(alias) => {
                    tracing::trace!(package = %package, alias = alias.alias.as_str(), "Aliased");
                    let version = alias.alias_normalized.unwrap_or_else(|| alias.alias.clone());
                    package.alias(version, alias.alias)
                }
                None => package,
            }
        });

    let platform = lock.platform.into_map();
    let platform_dev = lock
        .platform_dev
        .into_map()
        .into_iter()
        .filter(|(name, _)| !platform.contains_key(name))
        .collect::<Vec<_>>();
    let platform = platform
        .into_iter()
        .map(|requirement| (requirement, false))
        .chain(platform_dev.into_iter().map(|requirement| (requirement, true)))
        .map(|((name, constraint), is_dev)| {
            let package = Package::new(name, constraint).platform();
            if is_dev { package.dev() } else { package }
        });

    Ok(packages.chain(platform).collect())
}

/// Read the lock file at `locator`, resolving `git` revisions in `repository`
pub fn load(
    locator: &Locator,
    repository: &Repository,
    rule: &DevVersionRule,
) -> Result<RepositorySet, ResolutionError> {
    let error = |kind| ResolutionError {
        locator: locator.clone(),
        kind,
    };

    let contents = match locator {
        Locator::Path(path) => fs::read_to_string(path)
            .map_err(ResolutionErrorKind::Io)
            .map_err(error)?,
        Locator::GitRef { rev, path } => repository
            .show_file(rev, path)
            .map_err(ResolutionErrorKind::Git)
            .map_err(error)?,
    };

    let set = parse(&contents, rule)
        .map_err(ResolutionErrorKind::Json)
        .map_err(error)?;
    tracing::debug!(%locator, packages = set.len(), "Loaded lock file");
    Ok(set)
}
