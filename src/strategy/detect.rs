//! Archive type detection
//!
//! HTTP rarely supplies a trustworthy content type, so downloaded blobs are
//! classified by their leading bytes. URL shape decides only for GitHub's
//! generated zipball/tarball downloads, whose basenames carry no extension
//! at all.

use std::fs::File;
use std::io::Read;
use std::path::Path;

/// What the staging extractor should do with a cached artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    /// `PK\x03\x04` — extract with `unzip`.
    Zip,
    /// gzip, bzip2, or compress(1) magic — decompress and untar in one
    /// `tar xf` step.
    Tar,
    /// Not an archive we extract; moved into place as-is.
    Opaque,
}

const ZIP_MAGIC: [u8; 4] = *b"PK\x03\x04";
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const BZIP2_MAGIC: [u8; 3] = *b"BZh";
const COMPRESS_MAGIC: [u8; 2] = [0x1f, 0x9d];

/// Classify a cached artifact by its leading bytes.
///
/// `.jar` files are zip-compatible but must reach the build step intact, so
/// they skip the sniff and classify as opaque.
pub fn classify(path: &Path) -> std::io::Result<ArchiveKind> {
    if path.extension().is_some_and(|ext| ext == "jar") {
        return Ok(ArchiveKind::Opaque);
    }

    let mut magic = Vec::with_capacity(4);
    File::open(path)?.take(4).read_to_end(&mut magic)?;
    Ok(classify_bytes(&magic))
}

fn classify_bytes(magic: &[u8]) -> ArchiveKind {
    if magic.starts_with(&ZIP_MAGIC) {
        ArchiveKind::Zip
    } else if magic.starts_with(&GZIP_MAGIC)
        || magic.starts_with(&BZIP2_MAGIC)
        || magic.starts_with(&COMPRESS_MAGIC)
    {
        ArchiveKind::Tar
    } else {
        ArchiveKind::Opaque
    }
}

/// GitHub's generated archive download convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostedBall {
    Zipball,
    Tarball,
}

impl HostedBall {
    /// Cache file extension forced for this convention.
    pub fn extension(self) -> &'static str {
        match self {
            HostedBall::Zipball => ".zip",
            HostedBall::Tarball => ".tgz",
        }
    }
}

/// Detect GitHub's `/zipball/` and `/tarball/` download URLs.
pub fn hosted_ball(url: &str) -> Option<HostedBall> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))?;

    if !rest.starts_with("github.com/") && !rest.starts_with("codeload.github.com/") {
        return None;
    }

    if rest.contains("/zipball/") {
        Some(HostedBall::Zipball)
    } else if rest.contains("/tarball/") {
        Some(HostedBall::Tarball)
    } else {
        None
    }
}
