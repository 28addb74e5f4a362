// Copyright (C) 2026 by GiGa infosystems

//! Generate links to releases, projects & comparisons on the hosts packages are sourced from.
//!
//! Every [`UrlGenerator`] matches exactly one host. Packages sourced from another host (or
//! without a parseable source) simply don't get a URL from it, see [`UrlGenerators`] for
//! dispatching between several hosts.

mod bitbucket;
mod github;
mod gitlab;

use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::sync::LazyLock;

use crate::config::{Config, DevVersionRule, ProviderConfig};
use crate::package::{Package, abbreviate_reference};

/// The location of a repository on a host
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct RepositoryLocation {
    /// The lowercase host name, without a port
    pub host: String,
    /// A port given in an HTTPS URL, kept for links to self-hosted instances
    pub port: Option<u16>,
    /// The `/`-separated path, without a trailing `.git`
    pub path: String,
}

static HTTPS_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?:[^/@]+@)?([^/:]+)(?::(\d+))?/(.+?)(?:\.git)?/?$")
        .expect("valid regex")
});

static SSH_SHORTHAND_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@/]+@([^:/]+):/?(.+?)(?:\.git)?/?$").expect("valid regex"));

impl RepositoryLocation {
    /// Parse `https://<host>/<path>[.git]` or `git@<host>:<path>[.git]`
    pub fn parse(url: &str) -> Option<Self> {
        let (host, port, path) = match HTTPS_URL.captures(url) {
            Some(captures) => {
                let port = match captures.get(2) {
                    Some(port) => Some(port.as_str().parse::<u16>().ok()?),
                    None => None,
                };
                (captures.get(1)?, port, captures.get(3)?)
            }
            None => {
                let captures = SSH_SHORTHAND_URL.captures(url)?;
                (captures.get(1)?, None, captures.get(2)?)
            }
        };

        let path = path.as_str().trim_matches('/');
        if path.is_empty() || path.split('/').any(str::is_empty) {
            return None;
        }

        Some(RepositoryLocation {
            host: host.as_str().to_ascii_lowercase(),
            port,
            path: path.to_owned(),
        })
    }

    /// The parsed source location of a package
    pub fn of(package: &Package) -> Option<Self> {
        Self::parse(&package.source()?.url)
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path.split('/')
    }

    /// The first path segment (the user or top-level group)
    pub fn owner(&self) -> &str {
        self.path
            .split_once('/')
            .map_or(self.path.as_str(), |(owner, _)| owner)
    }

    /// Whether both locations point to the same repository, hosts handle paths case-insensitively
    pub fn is_same_repository(&self, other: &RepositoryLocation) -> bool {
        self.host == other.host && self.path.eq_ignore_ascii_case(&other.path)
    }

    /// The browsable HTTPS URL of the repository
    pub fn https_url(&self) -> String {
        format!("https://{self}")
    }
}

impl fmt::Display for RepositoryLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}:{port}/{}", self.host, self.path),
            None => write!(f, "{}/{}", self.host, self.path),
        }
    }
}

/// The hosting software of a repository host
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    GitHub,
    GitLab,
    Bitbucket,
}

impl ProviderKind {
    /// Whether repositories can be nested in (sub)groups, instead of only `owner/repo`
    pub fn supports_subgroups(self) -> bool {
        matches!(self, ProviderKind::GitLab)
    }
}

/// A package whose source is on the host of some [`UrlGenerator`]
struct Hosted<'a> {
    package: &'a Package,
    location: RepositoryLocation,
}

impl Hosted<'_> {
    fn repository_url(&self) -> String {
        self.location.https_url()
    }
}

/// Generates URLs for packages sourced from one host
#[derive(Clone, Debug)]
pub struct UrlGenerator {
    kind: ProviderKind,
    host: String,
    dev_versions: DevVersionRule,
}

impl UrlGenerator {
    pub fn new(kind: ProviderKind, host: impl Into<String>, dev_versions: DevVersionRule) -> Self {
        UrlGenerator {
            kind,
            host: host.into().to_ascii_lowercase(),
            dev_versions,
        }
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn hosted<'a>(&self, package: &'a Package) -> Option<Hosted<'a>> {
        let location = RepositoryLocation::of(package)?;
        if location.host != self.host {
            return None;
        }
        if !self.kind.supports_subgroups() && location.segments().count() != 2 {
            return None;
        }
        Some(Hosted { package, location })
    }

    /// Whether the source of this package is on this host
    pub fn supports(&self, package: &Package) -> bool {
        self.hosted(package).is_some()
    }

    /// The version for a release link: the pretty version, or the full reference for branches
    fn release_identifier<'a>(&self, package: &'a Package) -> Option<&'a str> {
        if package.is_dev_version(&self.dev_versions) {
            package.source_reference()
        } else {
            Some(package.pretty_version.as_str())
        }
    }

    /// The version for a comparison: the pretty version, or the abbreviated reference for branches
    fn compare_identifier<'a>(&self, package: &'a Package) -> Option<&'a str> {
        if package.is_dev_version(&self.dev_versions) {
            package.source_reference().map(abbreviate_reference)
        } else {
            Some(package.pretty_version.as_str())
        }
    }

    pub fn project_url(&self, package: &Package) -> Option<String> {
        Some(self.hosted(package)?.repository_url())
    }

    pub fn release_url(&self, package: &Package) -> Option<String> {
        let hosted = self.hosted(package)?;
        self.release_url_for(&hosted)
    }

    fn release_url_for(&self, hosted: &Hosted<'_>) -> Option<String> {
        let is_dev_version = hosted.package.is_dev_version(&self.dev_versions);
        if is_dev_version && self.kind != ProviderKind::Bitbucket {
            // NOTE: There are only tag pages for releases
            return None;
        }

        let identifier = self.release_identifier(hosted.package)?;
        let url = match self.kind {
            ProviderKind::GitHub => github::release_url(hosted, identifier),
            ProviderKind::GitLab => gitlab::release_url(hosted, identifier),
            ProviderKind::Bitbucket => bitbucket::release_url(hosted, identifier),
        };
        Some(url)
    }

    /// A link comparing `old` to `new`, which is based on the repository of `new` if they differ
    pub fn compare_url(&self, old: &Package, new: &Package) -> Option<String> {
        let old = self.hosted(old)?;
        let new = self.hosted(new)?;

        let is_fork = !old.location.is_same_repository(&new.location);
        if is_fork && self.kind == ProviderKind::GitLab {
            // NOTE: Forks can't be compared across repositories, so link to the new release
            return self.release_url_for(&new);
        }

        let old_ident = self.compare_identifier(old.package)?;
        let new_ident = self.compare_identifier(new.package)?;

        let url = match self.kind {
            ProviderKind::GitHub => github::compare_url(&old, old_ident, &new, new_ident),
            ProviderKind::GitLab => gitlab::compare_url(&new, old_ident, new_ident),
            ProviderKind::Bitbucket => bitbucket::compare_url(&old, old_ident, &new, new_ident),
        };
        Some(url)
    }
}

/// All configured [`UrlGenerator`]s, checked in order
#[derive(Clone, Debug)]
pub struct UrlGenerators {
    generators: Vec<UrlGenerator>,
}

impl UrlGenerators {
    /// Generators for the default hosts plus the configured ones
    pub fn from_config(config: &Config) -> Self {
        Self::from_providers(config.all_providers(), &config.dev_versions)
    }

    pub fn from_providers(
        providers: impl IntoIterator<Item = ProviderConfig>,
        dev_versions: &DevVersionRule,
    ) -> Self {
        let generators = providers
            .into_iter()
            .map(|provider| UrlGenerator::new(provider.kind, provider.host, dev_versions.clone()))
            .collect();
        UrlGenerators { generators }
    }

    /// The first generator supporting `package`
    pub fn generator_for(&self, package: &Package) -> Option<&UrlGenerator> {
        self.generators
            .iter()
            .find(|generator| generator.supports(package))
    }

    pub fn project_url(&self, package: &Package) -> Option<String> {
        self.generator_for(package)?.project_url(package)
    }

    pub fn release_url(&self, package: &Package) -> Option<String> {
        self.generator_for(package)?.release_url(package)
    }

    /// Compare using the generator of `new`; `old` has to be on the same host
    pub fn compare_url(&self, old: &Package, new: &Package) -> Option<String> {
        self.generator_for(new)?.compare_url(old, new)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::ProviderConfig;
    use crate::package::Source;

    pub(crate) fn package_with_source(
        name: &str,
        version: &str,
        url: &str,
        reference: Option<&str>,
    ) -> Package {
        Package::new(name, version)
            .with_source(Source::new(url, reference.map(ToOwned::to_owned)))
    }

    #[test]
    fn normalizes_all_url_forms() {
        let expected = RepositoryLocation {
            host: "github.com".to_owned(),
            port: None,
            path: "owner/repo".to_owned(),
        };
        for url in [
            "https://github.com/owner/repo.git",
            "https://github.com/owner/repo",
            "git@github.com:owner/repo.git",
            "git@github.com:owner/repo",
            "https://github.com/owner/repo/",
            "http://user@github.com/owner/repo.git",
        ] {
            assert_eq!(RepositoryLocation::parse(url).as_ref(), Some(&expected), "{url}");
        }
    }

    #[test]
    fn keeps_ports_for_links() {
        let location = RepositoryLocation::parse("https://gitlab.acme.org:8443/acme/package.git");
        assert_eq!(
            location,
            Some(RepositoryLocation {
                host: "gitlab.acme.org".to_owned(),
                port: Some(8443),
                path: "acme/package".to_owned(),
            })
        );
        assert_eq!(
            RepositoryLocation::parse("https://gitlab.acme.org:99999/acme/package.git"),
            None
        );

        let generator = UrlGenerator::new(
            ProviderKind::GitLab,
            "gitlab.acme.org",
            DevVersionRule::default(),
        );
        let package = package_with_source(
            "acme/package",
            "1.0.1",
            "https://gitlab.acme.org:8443/acme/package.git",
            None,
        );
        assert_eq!(
            generator.project_url(&package).as_deref(),
            Some("https://gitlab.acme.org:8443/acme/package")
        );
        assert_eq!(
            generator.release_url(&package).as_deref(),
            Some("https://gitlab.acme.org:8443/acme/package/tags/1.0.1")
        );
    }

    #[test]
    fn same_repository_ignores_case() {
        let old = RepositoryLocation::parse("https://GitHub.com/Acme/Package.git").unwrap();
        let new = RepositoryLocation::parse("git@github.com:acme/package.git").unwrap();
        assert!(old.is_same_repository(&new));

        let fork = RepositoryLocation::parse("git@github.com:other/package.git").unwrap();
        assert!(!old.is_same_repository(&fork));
    }

    #[test]
    fn keeps_subgroups() {
        let location = RepositoryLocation::parse("git@gitlab.acme.org:ac/me/package.git").unwrap();
        assert_eq!(location.host, "gitlab.acme.org");
        assert_eq!(location.path, "ac/me/package");
        assert_eq!(location.owner(), "ac");
    }

    #[test]
    fn rejects_unparseable_urls() {
        for url in ["", "not a url", "https://github.com", "https://github.com/", "/local/path"] {
            assert_eq!(RepositoryLocation::parse(url), None, "{url}");
        }
    }

    #[test]
    fn same_project_url_for_all_url_forms() {
        let generators = UrlGenerators::from_providers(
            ProviderConfig::defaults(),
            &DevVersionRule::default(),
        );
        let urls = [
            "https://bitbucket.org/owner/repo.git",
            "https://bitbucket.org/owner/repo",
            "git@bitbucket.org:owner/repo.git",
            "git@bitbucket.org:owner/repo",
        ]
        .map(|url| generators.project_url(&package_with_source("owner/repo", "1.0", url, None)));
        for url in urls {
            assert_eq!(url.as_deref(), Some("https://bitbucket.org/owner/repo"));
        }
    }

    #[test]
    fn dispatches_by_host() {
        let generators = UrlGenerators::from_providers(
            ProviderConfig::defaults(),
            &DevVersionRule::default(),
        );
        let github = package_with_source("a/b", "1.0.0", "https://github.com/a/b.git", None);
        let gitlab = package_with_source("a/b", "1.0.0", "https://gitlab.com/a/b.git", None);
        let unknown = package_with_source("a/b", "1.0.0", "https://example.org/a/b.git", None);

        assert_eq!(
            generators.generator_for(&github).map(UrlGenerator::kind),
            Some(ProviderKind::GitHub)
        );
        assert_eq!(
            generators.generator_for(&gitlab).map(UrlGenerator::kind),
            Some(ProviderKind::GitLab)
        );
        assert!(generators.generator_for(&unknown).is_none());
        assert_eq!(generators.release_url(&unknown), None);
        assert_eq!(generators.project_url(&Package::new("a/b", "1.0.0")), None);
    }

    #[test]
    fn no_compare_between_providers() {
        let generators = UrlGenerators::from_providers(
            ProviderConfig::defaults(),
            &DevVersionRule::default(),
        );
        let old = package_with_source("a/b", "1.0.0", "https://github.com/a/b.git", None);
        let new = package_with_source("a/b", "1.0.1", "https://gitlab.com/a/b.git", None);
        assert_eq!(generators.compare_url(&old, &new), None);
        assert_eq!(generators.compare_url(&new, &old), None);
    }

    #[test]
    fn custom_dev_version_rule() {
        let rule = DevVersionRule {
            prefixes: vec!["branch-".to_owned()],
            suffixes: Vec::new(),
        };
        let generator = UrlGenerator::new(ProviderKind::Bitbucket, "bitbucket.org", rule);
        let package = package_with_source(
            "acme/package",
            "branch-main",
            "https://bitbucket.org/acme/package",
            Some("abcdef0123"),
        );
        assert_eq!(
            generator.release_url(&package).as_deref(),
            Some("https://bitbucket.org/acme/package/src/abcdef0123")
        );
    }
}
