//! Login-based VCS strategy (cvs)
//!
//! The origin URL carries both the repository root and the module, separated
//! by a trailing colon: `cvs://:pserver:anonymous@host:/cvsroot/project:mod`.
//! cvs has no export-to-directory primitive, so staging copies the checkout
//! and prunes every `CVS/` bookkeeping directory from the result.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{FetchError, StageError};
use crate::origin::Origin;
use crate::output;
use crate::run::Runner;

use super::DownloadStrategy;

/// The backend's private metadata folder, present in every checked-out
/// directory.
const METADATA_DIR: &str = "CVS";

pub struct CvsStrategy<'a> {
    origin: Origin,
    checkout_dir: PathBuf,
    cache_root: PathBuf,
    runner: &'a dyn Runner,
}

impl<'a> CvsStrategy<'a> {
    pub fn new(origin: Origin, config: &'a Config, runner: &'a dyn Runner) -> Self {
        let checkout_dir = config.cache_root.join(origin.cache_entry_name());
        Self {
            origin,
            checkout_dir,
            cache_root: config.cache_root.clone(),
            runner,
        }
    }

    /// Split the origin URL into `(repository_root, module)`.
    ///
    /// The module is the last colon-separated segment; everything before it
    /// is the root handed to `-d`. A URL without a module segment falls back
    /// to the package name.
    fn root_and_module(&self) -> (String, String) {
        let stripped = self
            .origin
            .url
            .strip_prefix("cvs://")
            .unwrap_or(&self.origin.url);

        match stripped.rsplit_once(':') {
            Some((root, module)) if !module.is_empty() && !module.starts_with('/') => {
                (root.to_string(), module.to_string())
            }
            _ => (stripped.to_string(), self.origin.name.clone()),
        }
    }
}

impl DownloadStrategy for CvsStrategy<'_> {
    fn fetch(&self) -> Result<PathBuf, FetchError> {
        output::action(&format!("Checking out {}", self.origin.url));
        let (root, module) = self.root_and_module();

        if self.checkout_dir.exists() {
            self.runner
                .run_quiet("cvs", &["up"], Some(&self.checkout_dir))?;
        } else {
            fs::create_dir_all(&self.cache_root)?;
            self.runner
                .run_quiet("cvs", &["-d", &root, "login"], None)?;
            let entry = self.origin.cache_entry_name();
            self.runner.run_quiet(
                "cvs",
                &["-d", &root, "checkout", "-d", &entry, &module],
                Some(&self.cache_root),
            )?;
        }
        Ok(self.checkout_dir.clone())
    }

    fn stage(&self, dest: &Path) -> Result<(), StageError> {
        copy_tree(&self.checkout_dir, dest)?;
        prune_metadata_dirs(dest, METADATA_DIR)?;
        Ok(())
    }

    fn cached_location(&self) -> PathBuf {
        self.checkout_dir.clone()
    }
}

/// Recursively copy every entry under `src` into `dest`.
fn copy_tree(src: &Path, dest: &Path) -> std::io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dest.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            fs::create_dir_all(&target)?;
            copy_tree(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Delete every directory named `name` in the staged tree.
///
/// Deleted directories are not descended into: the walk prunes at each hit
/// rather than enumerating contents that are about to go away.
fn prune_metadata_dirs(root: &Path, name: &str) -> std::io::Result<()> {
    let mut walker = walkdir::WalkDir::new(root).into_iter();
    while let Some(entry) = walker.next() {
        let entry = entry.map_err(std::io::Error::other)?;
        if entry.file_type().is_dir() && entry.file_name().to_str() == Some(name) {
            fs::remove_dir_all(entry.path())?;
            walker.skip_current_dir();
        }
    }
    Ok(())
}
