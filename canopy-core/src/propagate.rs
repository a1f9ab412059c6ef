//! Version propagation through internal dependency ranges.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use semver::{Version, VersionReq};

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::{Error, Result};
use crate::graph::WorkspaceGraph;
use crate::manifest::DependencyType;
use crate::workspace::Workspace;

/// Rewrites internal dependency ranges after an externally-decided set of
/// version bumps, preserving each dependent's declared range style.
///
/// The propagator mutates manifests in memory only; persisting the edited
/// manifests is the caller's job, driven by the returned edit set.
pub struct VersionPropagator<'g> {
    graph: &'g WorkspaceGraph,
    sink: Arc<dyn DiagnosticSink>,
}

impl<'g> VersionPropagator<'g> {
    pub fn new(graph: &'g WorkspaceGraph, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { graph, sink }
    }

    /// Applies `version_map` (package name -> new version) to every
    /// internal dependency declaration in `workspaces`.
    ///
    /// Map keys that name no workspace are reported once via
    /// [`Diagnostic::ExternalPackagesIgnored`] and skipped. For each
    /// declared range on an updated internal package, the leading `^` or
    /// `~` operator is kept and the rest replaced with the new version;
    /// any other range shape is rewritten to the bare new version.
    ///
    /// Returns the sorted, de-duplicated manifest paths that were changed.
    /// Unchanged declarations (range already equal to the candidate) are
    /// not counted as edits, so re-applying an already-applied map is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReleasePlanInconsistent`] when a workspace that is
    /// not itself in `version_map` declares a range that does not admit a
    /// dependency's new version: the propagator cannot release that
    /// workspace, so applying the bump would strand it. Each declaration is
    /// checked before it is rewritten, but edits already applied to other
    /// declarations in the same call are kept.
    pub fn propagate(
        &self,
        workspaces: &mut [Workspace],
        version_map: &BTreeMap<String, String>,
    ) -> Result<Vec<PathBuf>> {
        let external: Vec<String> = version_map
            .keys()
            .filter(|name| !self.graph.contains(name.as_str()))
            .cloned()
            .collect();
        if !external.is_empty() {
            self.sink
                .emit(Diagnostic::ExternalPackagesIgnored { names: external });
        }

        let mut edited: Vec<PathBuf> = Vec::new();

        for workspace in workspaces.iter_mut() {
            let released = version_map.contains_key(workspace.name());
            let mut touched = false;

            for ty in DependencyType::ALL {
                let declared: Vec<(String, String)> = workspace
                    .manifest
                    .dependencies_of(ty)
                    .iter()
                    .filter(|(name, _)| {
                        version_map.contains_key(name.as_str()) && self.graph.contains(name)
                    })
                    .map(|(name, range)| (name.clone(), range.clone()))
                    .collect();

                for (dep_name, range) in declared {
                    let new_version = &version_map[&dep_name];
                    if !released
                        && !range_admits(workspace.name(), &dep_name, &range, new_version)?
                    {
                        return Err(Error::ReleasePlanInconsistent {
                            workspace: workspace.name().to_string(),
                            dependency: dep_name,
                            range,
                            version: new_version.clone(),
                        });
                    }
                    let candidate = rewrite_range(&range, new_version);
                    if workspace
                        .manifest
                        .set_dependency_range(ty, &dep_name, candidate)
                    {
                        touched = true;
                    }
                }
            }

            if touched {
                edited.push(workspace.manifest_path());
            }
        }

        edited.sort();
        edited.dedup();
        Ok(edited)
    }
}

/// Keeps the declared range operator and swaps in the new version. Only
/// `^` and `~` are recognized; anything else (including a bare version) is
/// treated as exact.
fn rewrite_range(range: &str, new_version: &str) -> String {
    match range.chars().next() {
        Some(op @ ('^' | '~')) => format!("{op}{new_version}"),
        _ => new_version.to_string(),
    }
}

fn range_admits(workspace: &str, dependency: &str, range: &str, version: &str) -> Result<bool> {
    let req = VersionReq::parse(range).map_err(|source| Error::InvalidRange {
        workspace: workspace.to_string(),
        dependency: dependency.to_string(),
        range: range.to_string(),
        source,
    })?;
    let version = Version::parse(version).map_err(|source| Error::InvalidVersion {
        name: dependency.to_string(),
        version: version.to_string(),
        source,
    })?;
    Ok(req.matches(&version))
}
