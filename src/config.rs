//! Engine configuration
//!
//! The cache root and verbosity toggle are passed explicitly into every
//! strategy at construction; nothing in this crate reads ambient state.

use std::path::PathBuf;

/// Environment variable overriding the default cache root.
pub const CACHE_ENV: &str = "SRCFETCH_CACHE";

/// Configuration shared by every strategy.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding every cache entry.
    pub cache_root: PathBuf,
    /// When set, external tools run with their output visible.
    pub verbose: bool,
}

impl Config {
    pub fn new(cache_root: impl Into<PathBuf>, verbose: bool) -> Self {
        Self {
            cache_root: cache_root.into(),
            verbose,
        }
    }

    /// Default cache root (XDG compliant).
    ///
    /// `SRCFETCH_CACHE` overrides; otherwise `$XDG_CACHE_HOME/srcfetch`
    /// (usually `~/.cache/srcfetch`).
    pub fn default_cache_root() -> PathBuf {
        if let Ok(path) = std::env::var(CACHE_ENV) {
            return PathBuf::from(path);
        }

        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("srcfetch")
    }
}
