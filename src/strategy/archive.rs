//! Archive download strategy
//!
//! Downloads with `curl` into the cache, then stages by sniffing the cached
//! file and extracting with `unzip` or `tar` — or moving it into place when
//! it is not an archive at all.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{FetchError, StageError};
use crate::origin::{self, Origin};
use crate::output;
use crate::run::Runner;

use super::DownloadStrategy;
use super::detect::{self, ArchiveKind};

/// Deletes a partially-written download on any abnormal exit path.
///
/// Armed when the transfer starts, disarmed only after the transfer tool
/// reports success: a truncated file must never look complete on a later
/// run.
struct PartialFile<'a> {
    path: &'a Path,
    keep: bool,
}

impl<'a> PartialFile<'a> {
    fn new(path: &'a Path) -> Self {
        Self { path, keep: false }
    }

    fn complete(mut self) {
        self.keep = true;
    }
}

impl Drop for PartialFile<'_> {
    fn drop(&mut self) {
        if !self.keep && self.path.exists() {
            let _ = fs::remove_file(self.path);
        }
    }
}

/// Cache file name: `{cache-key}{ext}`, with the extension taken from the
/// URL — forced to `.zip`/`.tgz` for GitHub's generated ball downloads,
/// whose basenames carry none — or the bare URL basename when no key exists.
fn cache_file_name(origin: &Origin) -> String {
    match origin.cache_key() {
        Some(key) => {
            let ext = match detect::hosted_ball(&origin.url) {
                Some(ball) => ball.extension().to_string(),
                None => origin::extension(&origin.url),
            };
            format!("{key}{ext}")
        }
        None => origin::basename(&origin.url),
    }
}

/// Fetches a single archive (or plain file) over HTTP/FTP via `curl`.
pub struct ArchiveStrategy<'a> {
    origin: Origin,
    cache_file: PathBuf,
    config: &'a Config,
    runner: &'a dyn Runner,
}

impl<'a> ArchiveStrategy<'a> {
    pub fn new(origin: Origin, config: &'a Config, runner: &'a dyn Runner) -> Self {
        let cache_file = config.cache_root.join(cache_file_name(&origin));
        Self {
            origin,
            cache_file,
            config,
            runner,
        }
    }

    fn download(&self) -> Result<(), FetchError> {
        fs::create_dir_all(&self.config.cache_root)?;
        output::action(&format!("Downloading {}", self.origin.url));

        let guard = PartialFile::new(&self.cache_file);
        let dest = self.cache_file.display().to_string();
        self.runner
            .run("curl", &[self.origin.url.as_str(), "-o", &dest], None)
            .map_err(|e| FetchError::Network {
                url: self.origin.url.clone(),
                source: e,
            })?;
        guard.complete();
        Ok(())
    }

    /// Move a non-archive artifact into `dest` under its original URL
    /// basename. This consumes the cache entry: the file itself is the
    /// deliverable (a jar, a single-file installer).
    fn move_into_place(&self, dest: &Path) -> Result<(), StageError> {
        let target = dest.join(origin::basename(&self.origin.url));
        if fs::rename(&self.cache_file, &target).is_err() {
            // Cache and build directory may be on different filesystems.
            fs::copy(&self.cache_file, &target)?;
            fs::remove_file(&self.cache_file)?;
        }
        Ok(())
    }

    fn extract(&self, dest: &Path, kind: ArchiveKind) -> Result<(), StageError> {
        let cached = self.cache_file.display().to_string();
        let result = match kind {
            ArchiveKind::Zip => {
                let mut args = Vec::new();
                if !self.config.verbose {
                    args.push("-qq");
                }
                args.push(cached.as_str());
                self.runner.run("unzip", &args, Some(dest))
            }
            ArchiveKind::Tar => self.runner.run("tar", &["xf", &cached], Some(dest)),
            ArchiveKind::Opaque => return self.move_into_place(dest),
        };

        result.map_err(|e| StageError::Extraction {
            archive: self.cache_file.clone(),
            source: e,
        })?;
        normalize_extraction(dest, &self.cache_file)
    }
}

impl DownloadStrategy for ArchiveStrategy<'_> {
    fn fetch(&self) -> Result<PathBuf, FetchError> {
        if self.cache_file.exists() {
            output::skip(&format!("Already downloaded: {}", self.cache_file.display()));
        } else {
            self.download()?;
        }
        Ok(self.cache_file.clone())
    }

    fn stage(&self, dest: &Path) -> Result<(), StageError> {
        let kind = detect::classify(&self.cache_file)?;
        self.extract(dest, kind)
    }

    fn cached_location(&self) -> PathBuf {
        self.cache_file.clone()
    }
}

/// Archive variant that never extracts: the artifact is meant to stay
/// exactly as downloaded.
pub struct NoExtractArchiveStrategy<'a>(ArchiveStrategy<'a>);

impl<'a> NoExtractArchiveStrategy<'a> {
    pub fn new(origin: Origin, config: &'a Config, runner: &'a dyn Runner) -> Self {
        Self(ArchiveStrategy::new(origin, config, runner))
    }
}

impl DownloadStrategy for NoExtractArchiveStrategy<'_> {
    fn fetch(&self) -> Result<PathBuf, FetchError> {
        self.0.fetch()
    }

    fn stage(&self, dest: &Path) -> Result<(), StageError> {
        self.0.move_into_place(dest)
    }

    fn cached_location(&self) -> PathBuf {
        self.0.cached_location()
    }
}

/// Post-extraction normalization.
///
/// Zero top-level entries means the download was corrupt or mis-detected and
/// is fatal. Exactly one entry gets its contents promoted to the destination
/// root, so the build step always starts at the source root.
fn normalize_extraction(dest: &Path, archive: &Path) -> Result<(), StageError> {
    let entries = fs::read_dir(dest)?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|e| e.path())
        .collect::<Vec<_>>();

    match entries.as_slice() {
        [] => Err(StageError::EmptyArchive(archive.to_path_buf())),
        [only] => {
            promote_single_entry(dest, only)?;
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Move `entry`'s children up into `dest` and drop the wrapper directory.
///
/// Returns false without touching anything when `entry` is not a real
/// directory — a lone file at the top level stays where it is.
fn promote_single_entry(dest: &Path, entry: &Path) -> std::io::Result<bool> {
    if !entry.is_dir() {
        return Ok(false);
    }

    // Park the wrapper under a temporary name first so a child sharing the
    // wrapper's name cannot collide on the way up.
    let parked = dest.join(format!(".promote-{}", std::process::id()));
    if parked.exists() {
        fs::remove_dir_all(&parked)?;
    }
    fs::rename(entry, &parked)?;

    for child in fs::read_dir(&parked)? {
        let child = child?;
        fs::rename(child.path(), dest.join(child.file_name()))?;
    }
    fs::remove_dir(&parked)?;
    Ok(true)
}
