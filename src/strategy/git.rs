//! Distributed VCS strategy (git)
//!
//! Clone once into the cache, fetch updates thereafter. Staging is an index
//! export (`checkout-index` with a destination prefix), so no `.git`
//! directory ever reaches the build tree.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{FetchError, StageError};
use crate::origin::{Origin, Pin};
use crate::output;
use crate::run::Runner;

use super::DownloadStrategy;

pub struct GitStrategy<'a> {
    origin: Origin,
    clone_dir: PathBuf,
    runner: &'a dyn Runner,
}

impl<'a> GitStrategy<'a> {
    pub fn new(origin: Origin, config: &'a Config, runner: &'a dyn Runner) -> Self {
        let clone_dir = config.cache_root.join(origin.cache_entry_name());
        Self {
            origin,
            clone_dir,
            runner,
        }
    }
}

impl DownloadStrategy for GitStrategy<'_> {
    fn fetch(&self) -> Result<PathBuf, FetchError> {
        if self.clone_dir.exists() {
            output::action(&format!("Updating {}", self.clone_dir.display()));
            self.runner.run_quiet(
                "git",
                &["fetch", self.origin.url.as_str()],
                Some(&self.clone_dir),
            )?;
        } else {
            if let Some(parent) = self.clone_dir.parent() {
                fs::create_dir_all(parent)?;
            }
            output::action(&format!("Cloning {}", self.origin.url));
            // First-time clone progress is always shown, even in quiet mode.
            let dir = self.clone_dir.display().to_string();
            self.runner
                .run("git", &["clone", self.origin.url.as_str(), &dir], None)?;
        }
        Ok(self.clone_dir.clone())
    }

    fn stage(&self, dest: &Path) -> Result<(), StageError> {
        match &self.origin.pin {
            Some(Pin::Branch(r)) => {
                output::detail(&format!("Checking out branch {r}"));
                let tracking = format!("origin/{r}");
                self.runner
                    .run_quiet("git", &["checkout", &tracking], Some(&self.clone_dir))?;
            }
            Some(Pin::Tag(r)) => {
                output::detail(&format!("Checking out tag {r}"));
                self.runner
                    .run_quiet("git", &["checkout", r], Some(&self.clone_dir))?;
            }
            // A bare revision has no checkout form here; the export below
            // takes whatever is currently checked out.
            Some(Pin::Revision(_)) | None => {}
        }

        let prefix = format!("--prefix={}/", dest.display());
        self.runner.run(
            "git",
            &["checkout-index", "-af", &prefix],
            Some(&self.clone_dir),
        )?;
        Ok(())
    }

    fn cached_location(&self) -> PathBuf {
        self.clone_dir.clone()
    }
}
