//! Centralized VCS strategy (svn)
//!
//! Check out once, `svn up` thereafter. Staging uses the backend's native
//! export, which writes tracked contents without `.svn` bookkeeping; a
//! revision pin is passed straight through to the export.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{FetchError, StageError};
use crate::origin::{Origin, Pin};
use crate::output;
use crate::run::Runner;

use super::DownloadStrategy;

pub struct SubversionStrategy<'a> {
    origin: Origin,
    checkout_dir: PathBuf,
    runner: &'a dyn Runner,
}

impl<'a> SubversionStrategy<'a> {
    pub fn new(origin: Origin, config: &'a Config, runner: &'a dyn Runner) -> Self {
        let checkout_dir = config.cache_root.join(origin.cache_entry_name());
        Self {
            origin,
            checkout_dir,
            runner,
        }
    }
}

impl DownloadStrategy for SubversionStrategy<'_> {
    fn fetch(&self) -> Result<PathBuf, FetchError> {
        output::action(&format!("Checking out {}", self.origin.url));
        let dir = self.checkout_dir.display().to_string();

        if self.checkout_dir.exists() {
            self.runner.run_quiet("svn", &["up", &dir], None)?;
        } else {
            if let Some(parent) = self.checkout_dir.parent() {
                fs::create_dir_all(parent)?;
            }
            self.runner
                .run_quiet("svn", &["checkout", self.origin.url.as_str(), &dir], None)?;
        }
        Ok(self.checkout_dir.clone())
    }

    fn stage(&self, dest: &Path) -> Result<(), StageError> {
        let checkout = self.checkout_dir.display().to_string();
        let target = dest.display().to_string();

        let mut args = vec!["export", "--force", checkout.as_str(), target.as_str()];
        // Branch and tag pins mean nothing to svn; a revision rides on the
        // export itself.
        if let Some(Pin::Revision(rev)) = &self.origin.pin {
            args.push("-r");
            args.push(rev);
        }

        self.runner.run_quiet("svn", &args, None)?;
        Ok(())
    }

    fn cached_location(&self) -> PathBuf {
        self.checkout_dir.clone()
    }
}
