//! Fetch/stage strategies
//!
//! One strategy per origin kind, behind a single [`DownloadStrategy`]
//! interface. `fetch()` populates or updates the cache entry for a
//! package+version; `stage()` materializes a clean copy of the fetched
//! content into the build directory. Always call them in that order.
//!
//! [`strategy_for`] picks a strategy from the URL shape; hosting layers that
//! know better (a formula declaring its strategy explicitly) construct the
//! concrete type directly.

pub mod archive;
pub mod cvs;
pub mod detect;
pub mod git;
pub mod hg;
pub mod svn;

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{FetchError, StageError};
use crate::origin::Origin;
use crate::run::Runner;

pub use archive::{ArchiveStrategy, NoExtractArchiveStrategy};
pub use cvs::CvsStrategy;
pub use git::GitStrategy;
pub use hg::MercurialStrategy;
pub use svn::SubversionStrategy;

/// A fetch/stage algorithm for one kind of origin.
pub trait DownloadStrategy {
    /// Ensure the cache entry exists and is current.
    ///
    /// Safe to call when the entry already exists — that turns it into an
    /// update, never a re-fetch. Returns the cache entry path; checksum
    /// verification of that path is the caller's concern.
    fn fetch(&self) -> Result<PathBuf, FetchError>;

    /// Materialize a clean, metadata-free copy of the fetched source into
    /// `dest` (typically the caller's build directory). Assumes `fetch()`
    /// has already run in this process.
    fn stage(&self, dest: &Path) -> Result<(), StageError>;

    /// Where this strategy keeps its cache entry.
    fn cached_location(&self) -> PathBuf;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Backend {
    Archive,
    Git,
    Svn,
    Cvs,
    Hg,
}

fn backend_for(url: &str) -> Backend {
    if url.starts_with("cvs://") || url.starts_with(":pserver:") {
        Backend::Cvs
    } else if url.starts_with("hg://") {
        Backend::Hg
    } else if url.starts_with("svn://")
        || url.starts_with("svn+http://")
        || url.starts_with("svn+https://")
    {
        Backend::Svn
    } else if url.starts_with("git://") || url.ends_with(".git") {
        Backend::Git
    } else {
        Backend::Archive
    }
}

/// Pick a strategy from the origin's URL shape.
pub fn strategy_for<'a>(
    origin: Origin,
    config: &'a Config,
    runner: &'a dyn Runner,
) -> Box<dyn DownloadStrategy + 'a> {
    match backend_for(&origin.url) {
        Backend::Cvs => Box::new(CvsStrategy::new(origin, config, runner)),
        Backend::Hg => Box::new(MercurialStrategy::new(origin, config, runner)),
        Backend::Svn => Box::new(SubversionStrategy::new(origin, config, runner)),
        Backend::Git => Box::new(GitStrategy::new(origin, config, runner)),
        Backend::Archive => Box::new(ArchiveStrategy::new(origin, config, runner)),
    }
}
