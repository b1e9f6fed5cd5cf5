//! Integration tests for archive staging: classification, extraction
//! dispatch, single-entry promotion, and the plain-move fallback.

mod common;

use common::{Call, StubRunner};
use levitate_fetch::{
    ArchiveStrategy, Config, DownloadStrategy, NoExtractArchiveStrategy, Origin, StageError,
};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

fn test_config() -> (tempfile::TempDir, Config) {
    let temp = tempfile::tempdir().unwrap();
    let config = Config::new(temp.path().join("cache"), false);
    (temp, config)
}

/// Put `bytes` where the strategy expects its cached artifact.
fn seed_cache(strategy: &dyn DownloadStrategy, bytes: &[u8]) -> PathBuf {
    let cached = strategy.cached_location();
    fs::create_dir_all(cached.parent().unwrap()).unwrap();
    fs::write(&cached, bytes).unwrap();
    cached
}

/// Effect hook simulating an extractor that writes `names` into the staging
/// directory.
fn extracts_files(names: &'static [&'static str]) -> impl Fn(&Call) {
    move |call: &Call| {
        let dest = call.cwd.as_ref().expect("extractor runs in the staging dir");
        for name in names {
            let path = dest.join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, *name).unwrap();
        }
    }
}

// =============================================================================
// classification round-trip
// =============================================================================

#[test]
fn test_zip_magic_extracts_with_unzip() {
    let (_temp, config) = test_config();
    let runner = StubRunner::with_effect(extracts_files(&["a.txt", "b.txt"]));
    let origin = Origin::new("https://example.org/pkg-1.0.zip", "pkg", "1.0");
    let strategy = ArchiveStrategy::new(origin, &config, &runner);
    let cached = seed_cache(&strategy, b"PK\x03\x04\x00\x00rest");

    let dest = tempfile::tempdir().unwrap();
    strategy.stage(dest.path()).unwrap();

    let calls = runner.calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].line(), format!("unzip -qq {}", cached.display()));
    assert_eq!(calls[0].cwd.as_deref(), Some(dest.path()));
    assert!(dest.path().join("a.txt").exists());
}

#[test]
fn test_verbose_mode_drops_the_quiet_flag() {
    let temp = tempfile::tempdir().unwrap();
    let config = Config::new(temp.path().join("cache"), true);
    let runner = StubRunner::with_effect(extracts_files(&["a.txt", "b.txt"]));
    let origin = Origin::new("https://example.org/pkg-1.0.zip", "pkg", "1.0");
    let strategy = ArchiveStrategy::new(origin, &config, &runner);
    let cached = seed_cache(&strategy, b"PK\x03\x04\x00\x00rest");

    let dest = tempfile::tempdir().unwrap();
    strategy.stage(dest.path()).unwrap();

    assert_eq!(runner.lines()[0], format!("unzip {}", cached.display()));
}

#[test]
fn test_tar_family_magics_extract_with_tar() {
    let magics: [&[u8]; 3] = [
        &[0x1f, 0x8b, 0x08, 0x00],      // gzip
        b"BZh91AY&SY",                  // bzip2
        &[0x1f, 0x9d, 0x90, 0x00],      // compress(1)
    ];

    for magic in magics {
        let (_temp, config) = test_config();
        let runner = StubRunner::with_effect(extracts_files(&["src/main.c", "README"]));
        let origin = Origin::new("https://example.org/pkg-1.0.tar.gz", "pkg", "1.0");
        let strategy = ArchiveStrategy::new(origin, &config, &runner);
        let cached = seed_cache(&strategy, magic);

        let dest = tempfile::tempdir().unwrap();
        strategy.stage(dest.path()).unwrap();

        assert_eq!(runner.lines()[0], format!("tar xf {}", cached.display()));
        assert!(dest.path().join("README").exists());
    }
}

#[test]
fn test_real_gzip_fixture_is_classified_as_tar() {
    let (_temp, config) = test_config();
    let runner = StubRunner::with_effect(extracts_files(&["src/main.c", "README"]));
    let origin = Origin::new("https://example.org/pkg-1.0.tar.gz", "pkg", "1.0");
    let strategy = ArchiveStrategy::new(origin, &config, &runner);

    // A genuine tar.gz, not just magic bytes.
    let cached = strategy.cached_location();
    fs::create_dir_all(cached.parent().unwrap()).unwrap();
    let file = fs::File::create(&cached).unwrap();
    let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);
    let content = b"int main;";
    let mut header = tar::Header::new_gnu();
    header.set_size(content.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder.append_data(&mut header, "main.c", &content[..]).unwrap();
    builder.into_inner().unwrap().finish().unwrap();

    let dest = tempfile::tempdir().unwrap();
    strategy.stage(dest.path()).unwrap();

    assert!(runner.lines()[0].starts_with("tar xf"));
}

#[test]
fn test_real_zip_fixture_is_classified_as_zip() {
    let (_temp, config) = test_config();
    let runner = StubRunner::with_effect(extracts_files(&["a.txt", "b.txt"]));
    let origin = Origin::new("https://example.org/pkg-1.0.zip", "pkg", "1.0");
    let strategy = ArchiveStrategy::new(origin, &config, &runner);

    let cached = strategy.cached_location();
    fs::create_dir_all(cached.parent().unwrap()).unwrap();
    let file = fs::File::create(&cached).unwrap();
    let mut archive = zip::ZipWriter::new(file);
    let options =
        zip::write::SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    archive.start_file("a.txt", options).unwrap();
    archive.write_all(b"contents").unwrap();
    archive.finish().unwrap();

    let dest = tempfile::tempdir().unwrap();
    strategy.stage(dest.path()).unwrap();

    assert!(runner.lines()[0].starts_with("unzip -qq"));
}

#[test]
fn test_opaque_artifact_moves_under_url_basename() {
    let (_temp, config) = test_config();
    let runner = StubRunner::new();
    let origin = Origin::new("https://example.org/installer.bin", "pkg", "1.0");
    let strategy = ArchiveStrategy::new(origin, &config, &runner);
    let cached = seed_cache(&strategy, b"#!/bin/sh\necho install\n");

    let dest = tempfile::tempdir().unwrap();
    strategy.stage(dest.path()).unwrap();

    // No extractor ran; the file moved out of the cache, basename preserved.
    assert_eq!(runner.call_count(), 0);
    let staged = dest.path().join("installer.bin");
    assert!(staged.exists());
    assert!(!cached.exists());
    assert_eq!(fs::read(&staged).unwrap(), b"#!/bin/sh\necho install\n");
}

#[test]
fn test_jar_is_moved_intact_despite_zip_magic() {
    let (_temp, config) = test_config();
    let runner = StubRunner::new();
    let origin = Origin::new("https://example.org/tool.jar", "tool", "3.1");
    let strategy = ArchiveStrategy::new(origin, &config, &runner);
    seed_cache(&strategy, b"PK\x03\x04\x00\x00payload");

    let dest = tempfile::tempdir().unwrap();
    strategy.stage(dest.path()).unwrap();

    assert_eq!(runner.call_count(), 0);
    assert!(dest.path().join("tool.jar").exists());
}

// =============================================================================
// post-extraction normalization
// =============================================================================

#[test]
fn test_single_top_level_directory_is_promoted() {
    let (_temp, config) = test_config();
    let runner = StubRunner::with_effect(extracts_files(&[
        "pkg-1.0/README",
        "pkg-1.0/src/main.c",
    ]));
    let origin = Origin::new("https://example.org/pkg-1.0.tar.gz", "pkg", "1.0");
    let strategy = ArchiveStrategy::new(origin, &config, &runner);
    seed_cache(&strategy, &[0x1f, 0x8b, 0x08, 0x00]);

    let dest = tempfile::tempdir().unwrap();
    strategy.stage(dest.path()).unwrap();

    assert!(dest.path().join("README").exists());
    assert!(dest.path().join("src/main.c").exists());
    assert!(!dest.path().join("pkg-1.0").exists());
}

#[test]
fn test_single_top_level_file_stays_put() {
    let (_temp, config) = test_config();
    let runner = StubRunner::with_effect(extracts_files(&["payload.bin"]));
    let origin = Origin::new("https://example.org/pkg-1.0.tar.gz", "pkg", "1.0");
    let strategy = ArchiveStrategy::new(origin, &config, &runner);
    seed_cache(&strategy, &[0x1f, 0x8b, 0x08, 0x00]);

    let dest = tempfile::tempdir().unwrap();
    strategy.stage(dest.path()).unwrap();

    assert!(dest.path().join("payload.bin").exists());
}

#[test]
fn test_empty_extraction_is_fatal() {
    let (_temp, config) = test_config();
    // The extractor reports success but produces nothing.
    let runner = StubRunner::new();
    let origin = Origin::new("https://example.org/pkg-1.0.tar.gz", "pkg", "1.0");
    let strategy = ArchiveStrategy::new(origin, &config, &runner);
    seed_cache(&strategy, &[0x1f, 0x8b, 0x08, 0x00]);

    let dest = tempfile::tempdir().unwrap();
    let err = strategy.stage(dest.path()).unwrap_err();

    assert!(matches!(err, StageError::EmptyArchive(_)));
    assert_eq!(fs::read_dir(dest.path()).unwrap().count(), 0);
}

#[test]
fn test_failed_extraction_surfaces_the_tool() {
    let (_temp, config) = test_config();
    let runner = StubRunner::new().failing("tar");
    let origin = Origin::new("https://example.org/pkg-1.0.tar.gz", "pkg", "1.0");
    let strategy = ArchiveStrategy::new(origin, &config, &runner);
    seed_cache(&strategy, &[0x1f, 0x8b, 0x08, 0x00]);

    let dest = tempfile::tempdir().unwrap();
    let err = strategy.stage(dest.path()).unwrap_err();
    assert!(matches!(err, StageError::Extraction { .. }));
}

// =============================================================================
// no-extract variant
// =============================================================================

#[test]
fn test_no_extract_variant_never_extracts() {
    let (_temp, config) = test_config();
    let runner = StubRunner::new();
    let origin = Origin::new("https://example.org/pkg-1.0.zip", "pkg", "1.0");
    let strategy = NoExtractArchiveStrategy::new(origin, &config, &runner);
    seed_cache(&strategy, b"PK\x03\x04\x00\x00rest");

    let dest = tempfile::tempdir().unwrap();
    strategy.stage(dest.path()).unwrap();

    assert_eq!(runner.call_count(), 0);
    assert!(dest.path().join("pkg-1.0.zip").exists());
}

// =============================================================================
// cache naming
// =============================================================================

#[test]
fn test_hosted_ball_urls_force_the_extension() {
    let (_temp, config) = test_config();
    let runner = StubRunner::new();

    let zipball = ArchiveStrategy::new(
        Origin::new("https://github.com/user/pkg/zipball/v1.0", "pkg", "1.0"),
        &config,
        &runner,
    );
    assert_eq!(
        zipball.cached_location(),
        config.cache_root.join("pkg-1.0.zip")
    );

    let tarball = ArchiveStrategy::new(
        Origin::new("https://github.com/user/pkg/tarball/v1.0", "pkg", "1.0"),
        &config,
        &runner,
    );
    assert_eq!(
        tarball.cached_location(),
        config.cache_root.join("pkg-1.0.tgz")
    );
}

#[test]
fn test_unnamed_origin_caches_under_url_basename() {
    let (_temp, config) = test_config();
    let runner = StubRunner::new();
    let origin = Origin::new("https://example.org/blob-2.3.tar.xz", "unknown", "0");
    let strategy = ArchiveStrategy::new(origin, &config, &runner);

    assert_eq!(
        strategy.cached_location(),
        config.cache_root.join("blob-2.3.tar.xz")
    );
}
