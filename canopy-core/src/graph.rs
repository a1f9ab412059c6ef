//! Workspace dependency graph.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use semver::{Version, VersionReq};

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::{Error, Result};
use crate::manifest::DependencyType;
use crate::workspace::Workspace;

/// Directed graph of direct internal dependencies among workspaces.
///
/// Only dependency names that match another workspace in the same run
/// produce edges; everything else is an external package and invisible
/// here. Built once from an immutable workspace list and read-only
/// afterwards: if the list changes, the graph is rebuilt, never patched.
///
/// Cycles and self-loops do not fail construction. The scheduler is the
/// component that has to cope with them.
#[derive(Debug)]
pub struct WorkspaceGraph {
    graph: DiGraph<String, ()>,
    node_map: HashMap<String, NodeIndex>,
    workspaces: HashMap<NodeIndex, Workspace>,
}

impl WorkspaceGraph {
    /// Builds the graph from a list of workspaces.
    ///
    /// For every dependency declaration of every workspace, across all
    /// dependency types, an edge W -> W' is added when the declared name
    /// matches workspace W' in the input. Self-references are recorded as
    /// self-loops.
    pub fn build(workspaces: &[Workspace]) -> Self {
        let mut graph = DiGraph::new();
        let mut node_map = HashMap::new();
        let mut workspace_map = HashMap::new();

        for workspace in workspaces {
            let node = graph.add_node(workspace.name().to_string());
            node_map.insert(workspace.name().to_string(), node);
            workspace_map.insert(node, workspace.clone());
        }

        for workspace in workspaces {
            let from = node_map[workspace.name()];
            for dep_name in workspace.manifest.dependency_names() {
                if let Some(&to) = node_map.get(dep_name) {
                    graph.update_edge(from, to, ());
                }
            }
        }

        Self {
            graph,
            node_map,
            workspaces: workspace_map,
        }
    }

    /// Looks up a workspace by package name.
    ///
    /// `Some` means the name refers to an internal workspace; `None` means
    /// it is an external package. This is the internal/external
    /// classification the version propagator relies on.
    #[inline]
    pub fn get_by_name(&self, name: &str) -> Option<&Workspace> {
        self.node_map
            .get(name)
            .and_then(|idx| self.workspaces.get(idx))
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.node_map.contains_key(name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.node_map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.node_map.is_empty()
    }

    /// Direct internal dependencies of a workspace.
    ///
    /// # Errors
    ///
    /// Returns an error if the workspace is not in the graph.
    pub fn dependencies(&self, name: &str) -> Result<Vec<String>> {
        let node = self.node(name)?;
        Ok(self
            .graph
            .neighbors_directed(node, Direction::Outgoing)
            .map(|idx| self.graph[idx].clone())
            .collect())
    }

    /// Direct internal dependents of a workspace (the reverse relation).
    ///
    /// # Errors
    ///
    /// Returns an error if the workspace is not in the graph.
    pub fn dependents(&self, name: &str) -> Result<Vec<String>> {
        let node = self.node(name)?;
        Ok(self
            .graph
            .neighbors_directed(node, Direction::Incoming)
            .map(|idx| self.graph[idx].clone())
            .collect())
    }

    /// All workspaces in the graph, in input order.
    pub fn all_workspaces(&self) -> Vec<&Workspace> {
        self.graph
            .node_indices()
            .filter_map(|idx| self.workspaces.get(&idx))
            .collect()
    }

    /// Checks that every internal dependency's declared range admits the
    /// depended-upon workspace's current version.
    ///
    /// Emits one diagnostic per offending edge and returns `false` if any
    /// was found. Advisory: callers decide whether invalidity is fatal. A
    /// range or version that does not parse counts as offending, since the
    /// edge cannot be shown satisfiable.
    pub fn is_valid(&self, sink: &dyn DiagnosticSink) -> bool {
        let mut valid = true;

        for idx in self.graph.node_indices() {
            let Some(workspace) = self.workspaces.get(&idx) else {
                continue;
            };
            for ty in DependencyType::ALL {
                for (dep_name, range) in workspace.manifest.dependencies_of(ty) {
                    let Some(target) = self.get_by_name(dep_name) else {
                        continue;
                    };
                    if !range_admits(range, target.version()) {
                        valid = false;
                        sink.emit(Diagnostic::RangeUnsatisfied {
                            workspace: workspace.name().to_string(),
                            dependency: dep_name.clone(),
                            range: range.clone(),
                            version: target.version().to_string(),
                        });
                    }
                }
            }
        }

        valid
    }

    fn node(&self, name: &str) -> Result<NodeIndex> {
        self.node_map
            .get(name)
            .copied()
            .ok_or_else(|| Error::WorkspaceNotFound {
                name: name.to_string(),
                available: self.available(),
            })
    }

    fn available(&self) -> String {
        let mut names: Vec<&str> = self.node_map.keys().map(String::as_str).collect();
        names.sort_unstable();
        names.join(", ")
    }
}

fn range_admits(range: &str, version: &str) -> bool {
    match (VersionReq::parse(range), Version::parse(version)) {
        (Ok(req), Ok(version)) => req.matches(&version),
        _ => false,
    }
}
