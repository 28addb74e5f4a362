// Copyright (C) 2026 by GiGa infosystems

//! The resolved package model that gets diffed, see [`Package`] & [`RepositorySet`]

use serde::Serialize;
use std::fmt;

use crate::config::DevVersionRule;

/// Where the code of a [`Package`] lives
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct Source {
    /// The repository URL, in any of the forms accepted by [`crate::url::RepositoryLocation`]
    pub url: String,
    /// A full or abbreviated commit hash, or a symbolic tag/branch name
    pub reference: Option<String>,
}

impl Source {
    pub fn new(url: impl Into<String>, reference: Option<String>) -> Self {
        Source {
            url: url.into(),
            reference,
        }
    }
}

/// A single resolved package
///
/// An aliased package decorates another [`Package`] (see [`Package::alias`]): it displays its own
/// versions, but its identity is that of [`Package::real`].
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct Package {
    pub name: String,
    /// The canonical version, which for branches includes the resolved reference
    pub version: String,
    /// The version as it should be displayed
    pub pretty_version: String,
    /// The package this one is an alias of
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias_of: Option<Box<Package>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
    pub is_platform: bool,
    pub is_dev: bool,
}

impl Package {
    /// A regular package where the canonical & pretty version are the same
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        let version = version.into();
        Package {
            name: name.into(),
            pretty_version: version.clone(),
            version,
            alias_of: None,
            source: None,
            is_platform: false,
            is_dev: false,
        }
    }

    pub fn with_pretty_version(mut self, pretty_version: impl Into<String>) -> Self {
        self.pretty_version = pretty_version.into();
        self
    }

    pub fn with_source(mut self, source: Source) -> Self {
        self.source = Some(source);
        self
    }

    pub fn platform(mut self) -> Self {
        self.is_platform = true;
        self
    }

    pub fn dev(mut self) -> Self {
        self.is_dev = true;
        self
    }

    /// Wrap this package into an alias displayed as `version`/`pretty_version`.
    ///
    /// The alias shares the name & classification of the aliased package.
    pub fn alias(self, version: impl Into<String>, pretty_version: impl Into<String>) -> Self {
        Package {
            name: self.name.clone(),
            version: version.into(),
            pretty_version: pretty_version.into(),
            source: None,
            is_platform: self.is_platform,
            is_dev: self.is_dev,
            alias_of: Some(Box::new(self)),
        }
    }

    /// Follow all alias links to the package that is not an alias
    pub fn real(&self) -> &Package {
        let mut package = self;
        while let Some(ref aliased) = package.alias_of {
            package = aliased;
        }
        package
    }

    pub fn is_alias(&self) -> bool {
        self.alias_of.is_some()
    }

    /// The source of this package, or of the first aliased package that has one
    pub fn source(&self) -> Option<&Source> {
        let mut package = self;
        loop {
            if let Some(ref source) = package.source {
                return Some(source);
            }
            package = package.alias_of.as_deref()?;
        }
    }

    pub fn source_reference(&self) -> Option<&str> {
        self.source()?.reference.as_deref()
    }

    /// Whether the pretty version is a development version (a branch) under the given rule
    pub fn is_dev_version(&self, rule: &DevVersionRule) -> bool {
        rule.matches(&self.pretty_version)
    }

    /// The pretty version, followed by the abbreviated reference for development versions
    pub fn full_pretty_version(&self, rule: &DevVersionRule) -> String {
        match self.source_reference() {
            Some(reference) if self.is_dev_version(rule) => {
                format!("{} {}", self.pretty_version, abbreviate_reference(reference))
            }
            _ => self.pretty_version.clone(),
        }
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.pretty_version)
    }
}

/// The length references get abbreviated to, the same as `git` short hashes
pub const SHORT_REFERENCE_LENGTH: usize = 7;

/// Cut a reference down to [`SHORT_REFERENCE_LENGTH`] characters, if it's longer than that
pub fn abbreviate_reference(reference: &str) -> &str {
    reference
        .char_indices()
        .nth(SHORT_REFERENCE_LENGTH)
        .map_or(reference, |(end, _)| &reference[..end])
}

/// A set of packages that should be distinct by name.
///
/// Nothing is checked on construction, duplicates get reported by [`crate::diff::diff`].
#[derive(Clone, Default, Debug)]
pub struct RepositorySet {
    packages: Vec<Package>,
}

impl RepositorySet {
    pub fn iter(&self) -> std::slice::Iter<'_, Package> {
        self.packages.iter()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl FromIterator<Package> for RepositorySet {
    fn from_iter<T: IntoIterator<Item = Package>>(iter: T) -> Self {
        RepositorySet {
            packages: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RepositorySet {
    type Item = &'a Package;
    type IntoIter = std::slice::Iter<'a, Package>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
