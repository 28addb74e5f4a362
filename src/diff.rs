// Copyright (C) 2026 by GiGa infosystems

//! Reconcile two [`RepositorySet`]s into an ordered list of [`Operation`]s, see [`diff`].

use crate::package::{Package, RepositorySet};
use itertools::Itertools;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Which of the two sets given to [`diff`] something is about
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Old,
    New,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Old => f.write_str("old"),
            Side::New => f.write_str("new"),
        }
    }
}

/// The input sets of [`diff`] were malformed
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DiffError {
    #[error("Invalid input: the package `{name}` is included more than once in the {side} set")]
    DuplicatePackage { side: Side, name: String },
}

/// A single change between two sets, always referring to the real (non-alias) packages
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(tag = "operation", rename_all = "lowercase")]
pub enum Operation<'a> {
    Install {
        package: &'a Package,
    },
    Update {
        from: &'a Package,
        to: &'a Package,
    },
    Uninstall {
        package: &'a Package,
    },
}

impl<'a> Operation<'a> {
    /// The package after the operation, or the removed package for [`Operation::Uninstall`]
    pub fn package(&self) -> &'a Package {
        match *self {
            Operation::Install { package } | Operation::Uninstall { package } => package,
            Operation::Update { to, .. } => to,
        }
    }

    pub fn name(&self) -> &'a str {
        &self.package().name
    }
}

impl fmt::Display for Operation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Install { package } => write!(f, "install {package}"),
            Operation::Update { from, to } => write!(
                f,
                "update {} from {} to {}",
                to.name, from.pretty_version, to.pretty_version
            ),
            Operation::Uninstall { package } => write!(f, "uninstall {package}"),
        }
    }
}

/// Real packages by name, split into regular & platform packages
#[derive(Default)]
struct Resolved<'a> {
    regular: BTreeMap<&'a str, &'a Package>,
    platform: BTreeMap<&'a str, &'a Package>,
}

impl<'a> Resolved<'a> {
    fn resolve(
        side: Side,
        set: &'a RepositorySet,
        include_dev: bool,
        include_platform: bool,
    ) -> Result<Self, DiffError> {
        let mut seen = BTreeSet::new();
        let mut out = Resolved::default();
        for package in set {
            let real = package.real();
            if !seen.insert(real.name.as_str()) {
                return Err(DiffError::DuplicatePackage {
                    side,
                    name: real.name.clone(),
                });
            }

            if (real.is_dev && !include_dev) || (real.is_platform && !include_platform) {
                tracing::trace!(%side, package = %real, "Filtered out");
                continue;
            }

            let group = if real.is_platform {
                &mut out.platform
            } else {
                &mut out.regular
            };
            group.insert(&real.name, real);
        }

        Ok(out)
    }
}

fn diff_group<'a>(
    old: &BTreeMap<&'a str, &'a Package>,
    new: &BTreeMap<&'a str, &'a Package>,
    out: &mut Vec<Operation<'a>>,
) {
    let removed = old
        .iter()
        .filter(|(name, _)| !new.contains_key(*name))
        .map(|(_, &package)| Operation::Uninstall { package });

    let added = new
        .iter()
        .filter(|(name, _)| !old.contains_key(*name))
        .map(|(_, &package)| Operation::Install { package });

    let changed = new
        .iter()
        .filter_map(|(name, &to)| old.get(name).map(|&from| (from, to)))
        // NOTE: Only real versions are compared, so changed alias versions are no update
        .filter(|(from, to)| from.version != to.version)
        .map(|(from, to)| Operation::Update { from, to });

    out.extend(
        removed
            .chain(added)
            .chain(changed)
            .sorted_by(|a, b| a.name().cmp(b.name())),
    );
}

/// Returns the operations turning `old` into `new`.
///
/// Dev & platform packages are only considered if `include_dev` & `include_platform` are set.
/// Aliases are resolved to the packages they decorate before comparing, so only changes of the
/// real versions are reported.
///
/// The result lists regular packages first and then platform packages, each ordered by name.
pub fn diff<'a>(
    old: &'a RepositorySet,
    new: &'a RepositorySet,
    include_dev: bool,
    include_platform: bool,
) -> Result<Vec<Operation<'a>>, DiffError> {
    let old = Resolved::resolve(Side::Old, old, include_dev, include_platform)?;
    let new = Resolved::resolve(Side::New, new, include_dev, include_platform)?;

    let mut out = Vec::new();
    diff_group(&old.regular, &new.regular, &mut out);
    diff_group(&old.platform, &new.platform, &mut out);

    tracing::debug!(
        operations = out.len(),
        old = old.regular.len() + old.platform.len(),
        new = new.regular.len() + new.platform.len(),
        "Diffed repository sets"
    );

    Ok(out)
}
