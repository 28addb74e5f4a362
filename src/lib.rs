// Copyright (C) 2026 by GiGa infosystems

//! `lockdiff` is an application that lists the changes between two resolved dependency lock
//! files, with links to the releases & comparisons on the hosts the packages are sourced from.
//!
//! The order of operations is:
//! * Read both lock files from the filesystem or `git` revisions with [`lock::load`]
//! * Get the ordered operations between both [`package::RepositorySet`]s with [`diff::diff`]
//! * Generate links for each operation with [`url::UrlGenerators`]
//! * Collect everything for display in a [`report::Report`]
//!
//! Currently, only `composer.lock` files are read, and links are generated for GitHub, GitLab
//! (including self-hosted instances) & Bitbucket.

mod cmd;

pub mod config;
pub mod diff;
pub mod git;
pub mod lock;
pub mod package;
pub mod report;
pub mod url;

pub use cmd::CommandError;
