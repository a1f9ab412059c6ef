//! Validation and version management commands.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use canopy_core::{DiagnosticSink, MemorySink, TracingSink, VersionPropagator, WorkspaceGraph};

use crate::formatting::{print_failure, print_item, print_key_value, print_section_header, print_success};

use super::load_workspaces;

pub fn cmd_validate(root: PathBuf) -> Result<()> {
    let workspaces = load_workspaces(&root)?;
    let graph = WorkspaceGraph::build(&workspaces);

    let sink = MemorySink::new();
    let valid = graph.is_valid(&sink);

    print_section_header("Validation");
    print_key_value("Workspaces", &workspaces.len().to_string());
    println!();

    if valid {
        print_success("All internal dependency ranges admit their targets' current versions");
        println!();
        return Ok(());
    }

    for diagnostic in sink.entries() {
        print_failure(&diagnostic.to_string());
    }
    println!();
    bail!("workspace dependency ranges are out of sync");
}

pub fn cmd_version(root: PathBuf, updates: Vec<String>, dry_run: bool) -> Result<()> {
    let version_map = parse_updates(&updates)?;
    if version_map.is_empty() {
        bail!("no version updates given; expected name=version pairs");
    }

    let mut workspaces = load_workspaces(&root)?;
    let graph = WorkspaceGraph::build(&workspaces);

    // Bump each named workspace's own version first; the propagator only
    // rewrites the ranges pointing at it.
    let mut bumped: Vec<PathBuf> = Vec::new();
    for workspace in workspaces.iter_mut() {
        if let Some(new_version) = version_map.get(workspace.name()) {
            if workspace.manifest.version != *new_version {
                workspace.manifest.version = new_version.clone();
                bumped.push(workspace.manifest_path());
            }
        }
    }

    let sink: Arc<dyn DiagnosticSink> = Arc::new(TracingSink);
    let propagator = VersionPropagator::new(&graph, sink);
    let edited = propagator.propagate(&mut workspaces, &version_map)?;

    let title = if dry_run {
        "Version Update (Dry Run)"
    } else {
        "Version Update"
    };
    print_section_header(title);
    print_key_value("Updated packages", &version_map.len().to_string());
    print_key_value("Rewritten manifests", &edited.len().to_string());
    println!();
    for path in &edited {
        print_item(&path.display().to_string(), "");
    }

    if !dry_run {
        let mut to_save: Vec<PathBuf> = bumped;
        to_save.extend(edited);
        to_save.sort();
        to_save.dedup();
        for workspace in &workspaces {
            if to_save.contains(&workspace.manifest_path()) {
                workspace
                    .manifest
                    .save(&workspace.manifest_path())
                    .with_context(|| {
                        format!("failed to write {}", workspace.manifest_path().display())
                    })?;
            }
        }
        print_success("Manifests updated");
    }
    println!();

    Ok(())
}

fn parse_updates(updates: &[String]) -> Result<BTreeMap<String, String>> {
    let mut map = BTreeMap::new();
    for update in updates {
        let Some((name, version)) = update.split_once('=') else {
            bail!("invalid update '{update}': expected name=version");
        };
        if name.is_empty() || version.is_empty() {
            bail!("invalid update '{update}': expected name=version");
        }
        map.insert(name.to_string(), version.to_string());
    }
    Ok(map)
}
