use canopy_core::manifest::{DependencyType, Manifest};

#[test]
fn test_parse_full_manifest() {
    let manifest: Manifest = toml::from_str(
        r#"
name = "foo"
version = "1.2.3"

[dependencies]
bar = "^1.0.0"

[dev-dependencies]
baz = "~2.0.0"

[peer-dependencies]
qux = "1.0.0"

[optional-dependencies]
opt = "^0.3.0"

[scripts]
build = "make build"
test = "make test"
"#,
    )
    .unwrap();

    assert_eq!(manifest.name, "foo");
    assert_eq!(manifest.version, "1.2.3");
    assert_eq!(
        manifest.dependency_range(DependencyType::Regular, "bar"),
        Some("^1.0.0")
    );
    assert_eq!(
        manifest.dependency_range(DependencyType::Dev, "baz"),
        Some("~2.0.0")
    );
    assert_eq!(
        manifest.dependency_range(DependencyType::Peer, "qux"),
        Some("1.0.0")
    );
    assert_eq!(
        manifest.dependency_range(DependencyType::Optional, "opt"),
        Some("^0.3.0")
    );
    assert_eq!(manifest.script("build"), Some("make build"));
}

#[test]
fn test_missing_tables_default_to_empty() {
    let manifest: Manifest = toml::from_str(
        r#"
name = "bare"
version = "0.1.0"
"#,
    )
    .unwrap();

    for ty in DependencyType::ALL {
        assert!(manifest.dependencies_of(ty).is_empty());
    }
    assert!(manifest.scripts.is_empty());
}

#[test]
fn test_dependency_names_deduplicates_across_types() {
    let mut manifest = Manifest::new("foo", "1.0.0");
    manifest
        .dependencies
        .insert("bar".to_string(), "^1.0.0".to_string());
    manifest
        .dev_dependencies
        .insert("bar".to_string(), "~1.0.0".to_string());
    manifest
        .peer_dependencies
        .insert("baz".to_string(), "1.0.0".to_string());

    assert_eq!(manifest.dependency_names(), vec!["bar", "baz"]);
}

#[test]
fn test_set_dependency_range_reports_change() {
    let mut manifest = Manifest::new("foo", "1.0.0");
    manifest
        .dependencies
        .insert("bar".to_string(), "^1.0.0".to_string());

    assert!(manifest.set_dependency_range(DependencyType::Regular, "bar", "^1.2.0"));
    // Same value again: no change.
    assert!(!manifest.set_dependency_range(DependencyType::Regular, "bar", "^1.2.0"));
    // Absent entries are never created.
    assert!(!manifest.set_dependency_range(DependencyType::Regular, "missing", "^1.0.0"));
    assert!(manifest
        .dependency_range(DependencyType::Regular, "missing")
        .is_none());
}

#[test]
fn test_save_and_reload_round_trip() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("canopy.toml");

    let mut manifest = Manifest::new("foo", "1.0.0");
    manifest
        .dependencies
        .insert("bar".to_string(), "^1.0.0".to_string());
    manifest.save(&path).unwrap();

    let reloaded = Manifest::load(&path).unwrap();
    assert_eq!(reloaded.name, "foo");
    assert_eq!(
        reloaded.dependency_range(DependencyType::Regular, "bar"),
        Some("^1.0.0")
    );
}
