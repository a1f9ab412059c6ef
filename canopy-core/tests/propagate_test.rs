use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use canopy_core::diagnostics::{Diagnostic, MemorySink};
use canopy_core::error::Error;
use canopy_core::graph::WorkspaceGraph;
use canopy_core::manifest::{DependencyType, Manifest};
use canopy_core::propagate::VersionPropagator;
use canopy_core::workspace::Workspace;

fn workspace(name: &str, version: &str, deps: &[(&str, &str)]) -> Workspace {
    let mut manifest = Manifest::new(name, version);
    for (dep, range) in deps {
        manifest
            .dependencies
            .insert((*dep).to_string(), (*range).to_string());
    }
    Workspace::new(PathBuf::from(name), manifest)
}

fn version_map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(name, version)| ((*name).to_string(), (*version).to_string()))
        .collect()
}

#[test]
fn test_caret_range_preserved() {
    let mut workspaces = vec![
        workspace("bar", "1.0.0", &[]),
        workspace("foo", "1.0.0", &[("bar", "^1.0.0")]),
    ];
    let graph = WorkspaceGraph::build(&workspaces);
    let sink = Arc::new(MemorySink::new());
    let propagator = VersionPropagator::new(&graph, sink.clone());

    let edited = propagator
        .propagate(&mut workspaces, &version_map(&[("bar", "1.2.0"), ("foo", "2.0.0")]))
        .unwrap();

    assert_eq!(edited, vec![PathBuf::from("foo").join("canopy.toml")]);
    assert_eq!(
        workspaces[1]
            .manifest
            .dependency_range(DependencyType::Regular, "bar"),
        Some("^1.2.0")
    );
    // bar has no internal dependencies, so its manifest is untouched.
    assert!(workspaces[0].manifest.dependencies.is_empty());
    assert!(sink.entries().is_empty());
}

#[test]
fn test_tilde_and_exact_ranges_preserved() {
    let mut foo = Manifest::new("foo", "1.0.0");
    foo.dependencies
        .insert("bar".to_string(), "~1.0.0".to_string());
    foo.dev_dependencies
        .insert("baz".to_string(), "1.0.0".to_string());
    let mut workspaces = vec![
        Workspace::new(PathBuf::from("foo"), foo),
        workspace("bar", "1.0.0", &[]),
        workspace("baz", "1.0.0", &[]),
    ];
    let graph = WorkspaceGraph::build(&workspaces);
    let propagator = VersionPropagator::new(&graph, Arc::new(MemorySink::new()));

    let edited = propagator
        .propagate(
            &mut workspaces,
            &version_map(&[("bar", "1.1.0"), ("baz", "2.0.0"), ("foo", "1.0.1")]),
        )
        .unwrap();

    assert_eq!(edited.len(), 1);
    assert_eq!(
        workspaces[0]
            .manifest
            .dependency_range(DependencyType::Regular, "bar"),
        Some("~1.1.0")
    );
    assert_eq!(
        workspaces[0]
            .manifest
            .dependency_range(DependencyType::Dev, "baz"),
        Some("2.0.0")
    );
}

#[test]
fn test_unreleased_dependent_out_of_range_is_rejected() {
    let mut workspaces = vec![
        workspace("bar", "1.0.0", &[]),
        workspace("foo", "1.0.0", &[("bar", "1.0.0")]),
    ];
    let graph = WorkspaceGraph::build(&workspaces);
    let propagator = VersionPropagator::new(&graph, Arc::new(MemorySink::new()));

    let err = propagator
        .propagate(&mut workspaces, &version_map(&[("bar", "2.0.0")]))
        .unwrap_err();

    match err {
        Error::ReleasePlanInconsistent {
            workspace,
            dependency,
            range,
            version,
        } => {
            assert_eq!(workspace, "foo");
            assert_eq!(dependency, "bar");
            assert_eq!(range, "1.0.0");
            assert_eq!(version, "2.0.0");
        }
        other => panic!("unexpected error: {other}"),
    }
    // Detection happens before foo's own mutation.
    assert_eq!(
        workspaces[1]
            .manifest
            .dependency_range(DependencyType::Regular, "bar"),
        Some("1.0.0")
    );
}

#[test]
fn test_unreleased_dependent_still_in_range_is_rewritten() {
    let mut workspaces = vec![
        workspace("bar", "1.0.0", &[]),
        workspace("foo", "1.0.0", &[("bar", "^1.0.0")]),
    ];
    let graph = WorkspaceGraph::build(&workspaces);
    let propagator = VersionPropagator::new(&graph, Arc::new(MemorySink::new()));

    // foo is not being released, but ^1.0.0 admits 1.2.0.
    let edited = propagator
        .propagate(&mut workspaces, &version_map(&[("bar", "1.2.0")]))
        .unwrap();

    assert_eq!(edited.len(), 1);
    assert_eq!(
        workspaces[1]
            .manifest
            .dependency_range(DependencyType::Regular, "bar"),
        Some("^1.2.0")
    );
}

#[test]
fn test_external_names_are_reported_and_ignored() {
    let mut workspaces = vec![
        workspace("bar", "1.0.0", &[]),
        workspace("foo", "1.0.0", &[("bar", "^1.0.0")]),
    ];
    let graph = WorkspaceGraph::build(&workspaces);
    let sink = Arc::new(MemorySink::new());
    let propagator = VersionPropagator::new(&graph, sink.clone());

    let edited = propagator
        .propagate(
            &mut workspaces,
            &version_map(&[("ghost", "9.9.9"), ("bar", "1.2.0"), ("foo", "2.0.0")]),
        )
        .unwrap();

    assert_eq!(edited.len(), 1);
    assert_eq!(
        sink.entries(),
        vec![Diagnostic::ExternalPackagesIgnored {
            names: vec!["ghost".to_string()],
        }]
    );
}

#[test]
fn test_propagation_is_idempotent() {
    let mut workspaces = vec![
        workspace("bar", "1.0.0", &[]),
        workspace("foo", "1.0.0", &[("bar", "^1.0.0")]),
    ];
    let graph = WorkspaceGraph::build(&workspaces);
    let propagator = VersionPropagator::new(&graph, Arc::new(MemorySink::new()));
    let map = version_map(&[("bar", "1.2.0"), ("foo", "2.0.0")]);

    let first = propagator.propagate(&mut workspaces, &map).unwrap();
    assert_eq!(first.len(), 1);

    let second = propagator.propagate(&mut workspaces, &map).unwrap();
    assert!(second.is_empty());
}

#[test]
fn test_dependency_declared_under_multiple_types() {
    let mut foo = Manifest::new("foo", "1.0.0");
    foo.dependencies
        .insert("bar".to_string(), "^1.0.0".to_string());
    foo.optional_dependencies
        .insert("bar".to_string(), "~1.0.0".to_string());
    let mut workspaces = vec![
        Workspace::new(PathBuf::from("foo"), foo),
        workspace("bar", "1.0.0", &[]),
    ];
    let graph = WorkspaceGraph::build(&workspaces);
    let propagator = VersionPropagator::new(&graph, Arc::new(MemorySink::new()));

    propagator
        .propagate(
            &mut workspaces,
            &version_map(&[("bar", "1.2.0"), ("foo", "1.1.0")]),
        )
        .unwrap();

    assert_eq!(
        workspaces[0]
            .manifest
            .dependency_range(DependencyType::Regular, "bar"),
        Some("^1.2.0")
    );
    assert_eq!(
        workspaces[0]
            .manifest
            .dependency_range(DependencyType::Optional, "bar"),
        Some("~1.2.0")
    );
}
