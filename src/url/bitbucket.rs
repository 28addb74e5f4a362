// Copyright (C) 2026 by GiGa infosystems

//! Bitbucket, which supports cross-repository comparisons by full repository path

use super::Hosted;

/// The encoded carriage return Bitbucket separates both sides of a comparison with
const COMPARE_SEPARATOR: &str = "%0D";

pub(super) fn release_url(hosted: &Hosted<'_>, version: &str) -> String {
    format!("{}/src/{version}", hosted.repository_url())
}

pub(super) fn compare_url(
    old_hosted: &Hosted<'_>,
    old: &str,
    new_hosted: &Hosted<'_>,
    new: &str,
) -> String {
    let base = new_hosted.repository_url();
    if old_hosted.location.is_same_repository(&new_hosted.location) {
        format!("{base}/branches/compare/{old}{COMPARE_SEPARATOR}{new}")
    } else {
        format!(
            "{base}/branches/compare/{}:{old}{COMPARE_SEPARATOR}{}:{new}",
            old_hosted.location.path, new_hosted.location.path,
        )
    }
}
