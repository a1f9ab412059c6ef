use std::path::PathBuf;

use canopy_core::graph::WorkspaceGraph;
use canopy_core::manifest::Manifest;
use canopy_core::workspace::Workspace;
use proptest::prelude::*;

const NAMES: [&str; 5] = ["a", "b", "c", "d", "e"];

fn gen_workspaces() -> impl Strategy<Value = Vec<Workspace>> {
    // Each workspace declares a random subset of the fixed names, plus
    // possibly an external package, as caret dependencies.
    proptest::collection::vec(
        proptest::collection::vec(0usize..NAMES.len() + 1, 0..4),
        NAMES.len(),
    )
    .prop_map(|dep_indices| {
        NAMES
            .iter()
            .zip(dep_indices)
            .map(|(name, indices)| {
                let mut manifest = Manifest::new(*name, "1.0.0");
                for idx in indices {
                    let dep = if idx < NAMES.len() {
                        NAMES[idx].to_string()
                    } else {
                        "external-pkg".to_string()
                    };
                    manifest.dependencies.insert(dep, "^1.0.0".to_string());
                }
                Workspace::new(PathBuf::from(*name), manifest)
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn test_symmetry_invariant(workspaces in gen_workspaces()) {
        let graph = WorkspaceGraph::build(&workspaces);
        for ws in &workspaces {
            for dep in graph.dependencies(ws.name()).unwrap() {
                prop_assert!(
                    graph.dependents(&dep).unwrap().contains(&ws.name().to_string()),
                    "edge {} -> {} has no reverse edge", ws.name(), dep
                );
            }
        }
    }

    #[test]
    fn test_no_phantom_edges(workspaces in gen_workspaces()) {
        let graph = WorkspaceGraph::build(&workspaces);
        for ws in &workspaces {
            for dep in graph.dependencies(ws.name()).unwrap() {
                prop_assert!(graph.get_by_name(&dep).is_some());
                prop_assert_ne!(dep.as_str(), "external-pkg");
            }
        }
    }
}
