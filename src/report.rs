// Copyright (C) 2026 by GiGa infosystems

//! Turn [`Operation`]s into display rows with links, split into production & development
//! sections

use semver::{Prerelease, Version};
use serde::Serialize;
use std::cmp::Ordering;

use crate::config::DevVersionRule;
use crate::diff::Operation;
use crate::url::UrlGenerators;

/// What happened to a package, with the direction of updates where it can be determined
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Install,
    Upgrade,
    Downgrade,
    /// An update between versions that can't be ordered, e.g. branches
    Change,
    Uninstall,
}

impl ChangeKind {
    pub fn label(self) -> &'static str {
        match self {
            ChangeKind::Install => "New",
            ChangeKind::Upgrade => "Upgraded",
            ChangeKind::Downgrade => "Downgraded",
            ChangeKind::Change => "Changed",
            ChangeKind::Uninstall => "Removed",
        }
    }
}

/// Parse release versions such as `v5.1.2`, `2.1` or `1.0.0-beta1`.
///
/// Branches, constraints and versions with more than three numeric components return `None`.
pub fn parse_release_version(pretty_version: &str) -> Option<Version> {
    let version = pretty_version
        .strip_prefix(['v', 'V'])
        .unwrap_or(pretty_version);
    let (numbers, pre) = match version.split_once('-') {
        Some((numbers, pre)) => (numbers, Some(pre)),
        None => (version, None),
    };

    let mut components = [0u64; 3];
    let mut count = 0;
    for component in numbers.split('.') {
        *components.get_mut(count)? = component.parse().ok()?;
        count += 1;
    }

    let pre = match pre {
        Some(pre) => Prerelease::new(&pre.replace('_', ".")).ok()?,
        None => Prerelease::EMPTY,
    };

    let [major, minor, patch] = components;
    Some(Version {
        major,
        minor,
        patch,
        pre,
        build: semver::BuildMetadata::EMPTY,
    })
}

/// Classify an update by comparing the pretty versions, if both are release versions
pub fn classify_update(from: &str, to: &str) -> ChangeKind {
    match (parse_release_version(from), parse_release_version(to)) {
        (Some(from), Some(to)) => match from.cmp(&to) {
            Ordering::Less => ChangeKind::Upgrade,
            Ordering::Greater => ChangeKind::Downgrade,
            Ordering::Equal => ChangeKind::Change,
        },
        _ => ChangeKind::Change,
    }
}

/// One displayed change
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct Entry {
    pub name: String,
    pub kind: ChangeKind,
    pub label: &'static str,
    /// The version before the change, with an abbreviated reference for branches
    pub from: Option<String>,
    /// The version after the change, with an abbreviated reference for branches
    pub to: Option<String>,
    pub link: Option<String>,
    pub is_platform: bool,
}

impl Entry {
    /// Build an entry, with links if `generators` are given.
    ///
    /// Installs & removals link to the release, updates to a comparison, all falling back to the
    /// project page.
    pub fn new(
        operation: &Operation<'_>,
        generators: Option<&UrlGenerators>,
        rule: &DevVersionRule,
    ) -> Self {
        let (kind, from, to) = match *operation {
            Operation::Install { package } => (
                ChangeKind::Install,
                None,
                Some(package.full_pretty_version(rule)),
            ),
            Operation::Update { from, to } => (
                classify_update(&from.pretty_version, &to.pretty_version),
                Some(from.full_pretty_version(rule)),
                Some(to.full_pretty_version(rule)),
            ),
            Operation::Uninstall { package } => (
                ChangeKind::Uninstall,
                Some(package.full_pretty_version(rule)),
                None,
            ),
        };

        let link = generators.and_then(|generators| {
            let package = operation.package();
            match *operation {
                Operation::Install { package } | Operation::Uninstall { package } => {
                    generators.release_url(package)
                }
                Operation::Update { from, to } => generators.compare_url(from, to),
            }
            .or_else(|| generators.project_url(package))
        });

        let package = operation.package();
        Entry {
            name: package.name.clone(),
            kind,
            label: kind.label(),
            from,
            to,
            link,
            is_platform: package.is_platform,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Production,
    Development,
}

/// The changes of either production or development packages
#[derive(Clone, Debug, Serialize)]
pub struct Section {
    pub kind: SectionKind,
    pub title: &'static str,
    pub entries: Vec<Entry>,
}

/// All changes, ready for rendering
#[derive(Clone, Debug, Serialize)]
pub struct Report {
    pub sections: Vec<Section>,
    pub with_links: bool,
}

impl Report {
    /// Split the operations into sections, keeping their order
    pub fn new(
        operations: &[Operation<'_>],
        generators: Option<&UrlGenerators>,
        rule: &DevVersionRule,
    ) -> Self {
        let (development, production): (Vec<_>, Vec<_>) = operations
            .iter()
            .partition(|operation| operation.package().is_dev);

        let section = |kind, title, operations: Vec<&Operation<'_>>| Section {
            kind,
            title,
            entries: operations
                .into_iter()
                .map(|operation| Entry::new(operation, generators, rule))
                .collect(),
        };

        Report {
            sections: vec![
                section(SectionKind::Production, "Prod Packages", production),
                section(SectionKind::Development, "Dev Packages", development),
            ],
            with_links: generators.is_some(),
        }
    }

    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|section| section.kind == kind)
    }

    pub fn has_changes(&self, kind: SectionKind) -> bool {
        self.section(kind)
            .is_some_and(|section| !section.entries.is_empty())
    }
}
