//! Runs `AbapCleaner` against small shell scripts standing in for the binary.
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use adtsync_cleaner::{AbapCleaner, CleanerError, Normalizer};
use tempfile::TempDir;

/// Write an executable `/bin/sh` script. Arguments arrive as
/// `--sourcefile $2 --profile $4 --release $6`.
fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
    let mut perms = fs::metadata(&path).expect("meta").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).expect("chmod");
    path
}

struct Fixture {
    tools: TempDir,
    scratch: TempDir,
    profile: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let tools = TempDir::new().expect("tools");
        let scratch = TempDir::new().expect("scratch");
        let profile = tools.path().join("profile.cfj");
        fs::write(&profile, "{}").expect("profile");
        Self {
            tools,
            scratch,
            profile,
        }
    }

    fn cleaner(&self, body: &str) -> AbapCleaner {
        let program = script(self.tools.path(), "abap-cleanerc", body);
        AbapCleaner::new(program, &self.profile, "757")
            .with_scratch_root(self.scratch.path())
            .with_timeout(Duration::from_secs(10))
    }

    fn scratch_is_empty(&self) -> bool {
        fs::read_dir(self.scratch.path())
            .expect("read scratch")
            .next()
            .is_none()
    }
}

#[test]
fn stdout_is_returned_as_cleaned_source() {
    let fx = Fixture::new();
    let cleaner = fx.cleaner(r#"tr 'a-z' 'A-Z' < "$2""#);
    cleaner.preflight().expect("preflight");

    let out = cleaner.normalize("report z_test1.\n").expect("normalize");
    assert_eq!(out, "REPORT Z_TEST1.\n");
    assert!(fx.scratch_is_empty(), "scratch dir must be removed");
}

#[test]
fn profile_and_release_are_passed_through() {
    let fx = Fixture::new();
    let cleaner = fx.cleaner(r#"echo "$1 $3 $5 $6"; test "$4" -ef "$(dirname "$0")/profile.cfj" && echo profile-ok"#);

    let out = cleaner.normalize("x").expect("normalize");
    assert!(out.starts_with("--sourcefile --profile --release 757"), "got: {out}");
    assert!(out.contains("profile-ok"), "got: {out}");
}

#[test]
fn nonzero_exit_carries_stderr_and_cleans_scratch() {
    let fx = Fixture::new();
    let cleaner = fx.cleaner("echo 'syntax error line 7' >&2; echo partial; exit 3");

    let err = cleaner.normalize("x").unwrap_err();
    match &err {
        CleanerError::Failed { code, stderr, stdout } => {
            assert_eq!(*code, Some(3));
            assert!(stderr.contains("syntax error line 7"));
            assert!(stdout.contains("partial"));
        }
        other => panic!("expected Failed, got {other:?}"),
    }
    assert!(err.to_string().starts_with("cleaner failed rc=3"));
    assert!(fx.scratch_is_empty(), "scratch dir must be removed on failure");
}

#[test]
fn whitespace_only_output_is_a_failure() {
    let fx = Fixture::new();
    let cleaner = fx.cleaner("echo '   '; echo 'nothing to do' >&2");

    let err = cleaner.normalize("x").unwrap_err();
    assert!(matches!(err, CleanerError::EmptyOutput { .. }), "got: {err}");
    assert!(err.to_string().contains("nothing to do"));
}

#[test]
fn hanging_cleaner_is_killed_after_timeout() {
    let fx = Fixture::new();
    let cleaner = fx.cleaner("sleep 30").with_timeout(Duration::from_millis(200));

    let err = cleaner.normalize("x").unwrap_err();
    assert!(matches!(err, CleanerError::Timeout { .. }), "got: {err}");
    assert!(fx.scratch_is_empty(), "scratch dir must be removed on timeout");
}

#[test]
fn legacy_encoded_output_is_decoded_as_cp1252() {
    let fx = Fixture::new();
    let cleaner = fx.cleaner(r"printf 'DATA gr\366\337e.\n'");

    let out = cleaner.normalize("x").expect("normalize");
    assert_eq!(out, "DATA größe.\n");
}

#[test]
fn input_file_holds_the_source_verbatim() {
    let fx = Fixture::new();
    let cleaner = fx.cleaner(r#"cat "$2""#);
    let source = "REPORT z.\r\n\" Größe €\r\n";

    assert_eq!(cleaner.normalize(source).expect("normalize"), source);
}
