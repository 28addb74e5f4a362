// Copyright (C) 2026 by GiGa infosystems

//! GitHub, which compares forks by their owners

use super::Hosted;

pub(super) fn release_url(hosted: &Hosted<'_>, version: &str) -> String {
    format!("{}/releases/tag/{version}", hosted.repository_url())
}

pub(super) fn compare_url(
    old_hosted: &Hosted<'_>,
    old: &str,
    new_hosted: &Hosted<'_>,
    new: &str,
) -> String {
    let base = new_hosted.repository_url();
    if old_hosted.location.is_same_repository(&new_hosted.location) {
        format!("{base}/compare/{old}...{new}")
    } else {
        let old_owner = old_hosted.location.owner();
        let new_owner = new_hosted.location.owner();
        format!("{base}/compare/{old_owner}:{old}...{new_owner}:{new}")
    }
}
