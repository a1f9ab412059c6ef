use std::fs;
use std::path::Path;

use canopy_core::error::Error;
use canopy_core::scanner::Scanner;
use tempfile::TempDir;

fn write_manifest(root: &Path, dir: &str, content: &str) {
    let ws_dir = root.join(dir);
    fs::create_dir_all(&ws_dir).unwrap();
    fs::write(ws_dir.join("canopy.toml"), content).unwrap();
}

#[test]
fn test_scan_discovers_workspaces_sorted_by_name() {
    let tmp = TempDir::new().unwrap();
    write_manifest(
        tmp.path(),
        "zeta",
        r#"
name = "zeta"
version = "0.2.0"

[dependencies]
alpha = "^0.1.0"
"#,
    );
    write_manifest(
        tmp.path(),
        "alpha",
        r#"
name = "alpha"
version = "0.1.0"
"#,
    );

    let workspaces = Scanner::new(tmp.path()).scan().unwrap();

    assert_eq!(workspaces.len(), 2);
    assert_eq!(workspaces[0].name(), "alpha");
    assert_eq!(workspaces[1].name(), "zeta");
    assert_eq!(workspaces[0].version(), "0.1.0");
    assert_eq!(
        workspaces[1].manifest.dependencies.get("alpha"),
        Some(&"^0.1.0".to_string())
    );
}

#[test]
fn test_scan_finds_nested_workspaces() {
    let tmp = TempDir::new().unwrap();
    write_manifest(
        tmp.path(),
        "libs/deep/nested",
        r#"
name = "nested"
version = "1.0.0"
"#,
    );

    let workspaces = Scanner::new(tmp.path()).scan().unwrap();
    assert_eq!(workspaces.len(), 1);
    assert_eq!(workspaces[0].name(), "nested");
}

#[test]
fn test_scan_rejects_duplicate_names() {
    let tmp = TempDir::new().unwrap();
    for dir in ["one", "two"] {
        write_manifest(
            tmp.path(),
            dir,
            r#"
name = "dup"
version = "1.0.0"
"#,
        );
    }

    let err = Scanner::new(tmp.path()).scan().unwrap_err();
    match err {
        Error::DuplicateWorkspace { name, .. } => assert_eq!(name, "dup"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_scan_empty_directory() {
    let tmp = TempDir::new().unwrap();
    let workspaces = Scanner::new(tmp.path()).scan().unwrap();
    assert!(workspaces.is_empty());
}

#[test]
fn test_scan_reports_malformed_manifest() {
    let tmp = TempDir::new().unwrap();
    write_manifest(tmp.path(), "broken", "name = ");

    assert!(Scanner::new(tmp.path()).scan().is_err());
}
