//! Archive-export VCS strategy (mercurial)
//!
//! The only backend with a preflight check: hg is commonly absent on a
//! default install, and "command not found" is a poor way to learn that.
//! Staging uses `hg archive`, which exports tracked files without `.hg`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{FetchError, StageError};
use crate::origin::Origin;
use crate::output;
use crate::run::Runner;

use super::DownloadStrategy;

const REMEDY: &str =
    "Install Mercurial with your system package manager (e.g. `dnf install mercurial`) \
     and try again.";

pub struct MercurialStrategy<'a> {
    origin: Origin,
    clone_dir: PathBuf,
    runner: &'a dyn Runner,
}

impl<'a> MercurialStrategy<'a> {
    pub fn new(origin: Origin, config: &'a Config, runner: &'a dyn Runner) -> Self {
        let clone_dir = config.cache_root.join(origin.cache_entry_name());
        Self {
            origin,
            clone_dir,
            runner,
        }
    }

    fn remote_url(&self) -> &str {
        self.origin.url.strip_prefix("hg://").unwrap_or(&self.origin.url)
    }
}

impl DownloadStrategy for MercurialStrategy<'_> {
    fn fetch(&self) -> Result<PathBuf, FetchError> {
        if !self.runner.has_tool("hg") {
            return Err(FetchError::ToolMissing {
                tool: "hg".to_string(),
                remedy: REMEDY.to_string(),
            });
        }

        if self.clone_dir.exists() {
            output::action(&format!("Updating {}", self.clone_dir.display()));
            self.runner
                .run_quiet("hg", &["update"], Some(&self.clone_dir))?;
        } else {
            if let Some(parent) = self.clone_dir.parent() {
                fs::create_dir_all(parent)?;
            }
            let url = self.remote_url();
            output::action(&format!("Cloning {url}"));
            let dir = self.clone_dir.display().to_string();
            self.runner.run_quiet("hg", &["clone", url, &dir], None)?;
        }
        Ok(self.clone_dir.clone())
    }

    fn stage(&self, dest: &Path) -> Result<(), StageError> {
        let target = dest.display().to_string();

        let mut args = vec!["archive", "-y"];
        if let Some(pin) = &self.origin.pin {
            args.push("-r");
            args.push(pin.reference());
        }
        args.extend(["-t", "files", target.as_str()]);

        self.runner.run_quiet("hg", &args, Some(&self.clone_dir))?;
        Ok(())
    }

    fn cached_location(&self) -> PathBuf {
        self.clone_dir.clone()
    }
}
