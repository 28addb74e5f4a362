// Copyright (C) 2026 by GiGa infosystems

//! Git helpers to read files as they were at a given revision

use crate::cmd::{CommandError, cmd};
use std::path::PathBuf;

/// A `git` repository
pub struct Repository {
    /// The path to the repository, or `None` for the current working directory
    path: Option<PathBuf>,
}

impl Repository {
    /// Open an existing [`Repository`] at the given path.
    ///
    /// This does not check if the repository actually exist, methods on this type will simply fail
    /// if it doesn't.
    pub fn new(path: Option<PathBuf>) -> Self {
        Repository { path }
    }

    /// The `<rev>:<path>` object name for `git show`.
    ///
    /// Relative paths are marked with `./` so they are looked up relative to the working
    /// directory of the command instead of the repository root.
    fn object_name(rev: &str, path: &str) -> String {
        if path.starts_with("./") || path.starts_with("../") || path.starts_with('/') {
            format!("{rev}:{path}")
        } else {
            format!("{rev}:./{path}")
        }
    }

    /// Returns the contents of the file at `path` as of the revision `rev`
    pub fn show_file(&self, rev: &str, path: &str) -> Result<String, CommandError> {
        let object = Self::object_name(rev, path);
        tracing::debug!(%object, "Reading file from git");
        cmd!([git show] [(&object)] -> String in &self.path)
    }
}
