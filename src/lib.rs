//! Source fetch-and-stage engine for package builds
//!
//! Given a package origin — an HTTP/FTP archive URL, or a git/svn/cvs/hg
//! repository URL with an optional branch/tag/revision pin — this crate
//! retrieves the source into a shared cache exactly once per package+version
//! and then stages a clean, VCS-metadata-free copy into a build directory.
//!
//! One [`DownloadStrategy`] exists per origin kind. `fetch()` populates or
//! updates the cache entry (presence alone makes a later call an update, not
//! a re-fetch); `stage()` materializes the fetched content: archives are
//! classified by their leading bytes and extracted with the system
//! `unzip`/`tar`, VCS checkouts are exported without their bookkeeping
//! directories.
//!
//! # Example
//!
//! ```no_run
//! use levitate_fetch::{strategy_for, Config, Origin, SystemRunner};
//!
//! let config = Config::new("/var/cache/srcfetch", false);
//! let runner = SystemRunner::new(config.verbose);
//! let origin = Origin::new("https://ftp.gnu.org/gnu/bash/bash-5.2.26.tar.gz", "bash", "5.2.26");
//!
//! let strategy = strategy_for(origin, &config, &runner);
//! let cached = strategy.fetch()?;
//! // hand `cached` to checksum verification here
//! strategy.stage(std::path::Path::new("/tmp/build/bash"))?;
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! Checksum verification, formula resolution, and build orchestration are
//! the hosting application's concern; this crate only fetches and stages.

pub mod config;
pub mod error;
pub mod origin;
pub mod output;
pub mod run;
pub mod strategy;

pub use config::Config;
pub use error::{FetchError, RunError, StageError};
pub use origin::{Origin, Pin};
pub use run::{Runner, SystemRunner};
pub use strategy::{
    ArchiveStrategy, CvsStrategy, DownloadStrategy, GitStrategy, MercurialStrategy,
    NoExtractArchiveStrategy, SubversionStrategy, strategy_for,
};
