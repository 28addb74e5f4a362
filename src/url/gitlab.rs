// Copyright (C) 2026 by GiGa infosystems

//! GitLab, including self-hosted instances & nested subgroups

use super::Hosted;

pub(super) fn release_url(hosted: &Hosted<'_>, version: &str) -> String {
    format!("{}/tags/{version}", hosted.repository_url())
}

/// NOTE: GitLab can't compare across forks, so this is only called for the same repository
pub(super) fn compare_url(hosted: &Hosted<'_>, old: &str, new: &str) -> String {
    format!("{}/compare/{old}...{new}", hosted.repository_url())
}
