//! Runs the `tyria` binary against generated archives.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tyria::prelude::*;

fn write_archive(dir: &Path) -> PathBuf {
    let path = dir.join("assets.dat");
    let mut builder = DatBuilder::new();
    builder
        .add_file(20, b"hello\n", Compression::Deflate)
        .add_file(21, b"\xEF\xBB\xBFbom text", Compression::Zstd)
        .add_file(22, b"\x00\x01\x02\x03 blob", Compression::Store);
    builder.write_to(&path).unwrap();
    path
}

fn tyria(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tyria"))
        .args(args)
        .current_dir(dir)
        .env_remove("TYRIA_ARCHIVE")
        .env_remove("TYRIA_OUTPUT")
        .env_remove("TYRIA_INDEX")
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_extract_then_reuse_cache() {
    let dir = tempfile::tempdir().unwrap();
    write_archive(dir.path());

    let first = tyria(dir.path(), &["assets.dat", "out", "--progress-interval-ms", "10"]);
    assert!(first.status.success(), "{}", stderr(&first));
    assert!(stderr(&first).contains("Scanning archive"));
    assert!(dir.path().join(persist::DEFAULT_FILE_NAME).exists());

    let out = dir.path().join("out");
    assert_eq!(std::fs::read(out.join("Text/20.txt")).unwrap(), b"hello\n");
    assert_eq!(std::fs::read(out.join("Text/21.txt")).unwrap(), b"bom text");
    assert!(out.join("Unknown/22.raw").exists());

    let second = tyria(dir.path(), &["assets.dat", "out2"]);
    assert!(second.status.success());
    assert!(stderr(&second).contains("Using cached index"));
    assert!(dir.path().join("out2/Text/20.txt").exists());
}

#[test]
fn test_rescan_ignores_cache() {
    let dir = tempfile::tempdir().unwrap();
    write_archive(dir.path());

    assert!(tyria(dir.path(), &["assets.dat", "out"]).status.success());
    let again = tyria(dir.path(), &["assets.dat", "out", "--rescan"]);
    assert!(again.status.success());
    assert!(stderr(&again).contains("Scanning archive"));
}

#[test]
fn test_category_filter() {
    let dir = tempfile::tempdir().unwrap();
    write_archive(dir.path());

    let output = tyria(dir.path(), &["assets.dat", "out", "--category", "Unknown"]);
    assert!(output.status.success());
    assert!(dir.path().join("out/Unknown/22.raw").exists());
    assert!(!dir.path().join("out/Text").exists());

    let missing = tyria(dir.path(), &["assets.dat", "out", "--category", "Nope/Deeper"]);
    assert!(!missing.status.success());
    assert!(stderr(&missing).contains("Unknown category"));
}

#[test]
fn test_raw_extraction() {
    let dir = tempfile::tempdir().unwrap();
    write_archive(dir.path());

    let output = tyria(dir.path(), &["assets.dat", "out", "--raw"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let out = dir.path().join("out");
    assert_eq!(std::fs::read(out.join("Text/20.raw")).unwrap(), b"hello\n");
    assert_eq!(std::fs::read(out.join("Text/21.raw")).unwrap(), b"\xEF\xBB\xBFbom text");
    assert!(!out.join("Text/20.txt").exists());
}

#[test]
fn test_missing_arguments() {
    let dir = tempfile::tempdir().unwrap();
    assert!(!tyria(dir.path(), &[]).status.success());
    assert!(!tyria(dir.path(), &["only-one.dat"]).status.success());
}

#[test]
fn test_missing_archive() {
    let dir = tempfile::tempdir().unwrap();
    let output = tyria(dir.path(), &["absent.dat", "out"]);
    assert!(!output.status.success());
    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_list_json() {
    let dir = tempfile::tempdir().unwrap();
    write_archive(dir.path());

    let output = tyria(dir.path(), &["list", "assets.dat", "--json"]);
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["total"], 3);
    let names: Vec<_> = json["children"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap().to_string())
        .collect();
    assert!(names.contains(&"Text".to_string()));
    assert!(names.contains(&"Unknown".to_string()));
}
