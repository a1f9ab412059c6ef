//! Workspace discovery and graph inspection commands.

use std::path::PathBuf;

use anyhow::Result;
use canopy_core::WorkspaceGraph;

use crate::formatting::{print_item, print_key_value, print_section_header};

use super::load_workspaces;

pub fn cmd_list(root: PathBuf, json: bool) -> Result<()> {
    let workspaces = load_workspaces(&root)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&workspaces)?);
        return Ok(());
    }

    print_section_header("Workspaces");
    print_key_value("Count", &workspaces.len().to_string());
    println!();
    for workspace in &workspaces {
        print_item(
            workspace.name(),
            &format!("{} ({})", workspace.version(), workspace.path.display()),
        );
    }
    println!();

    Ok(())
}

pub fn cmd_graph(root: PathBuf, json: bool) -> Result<()> {
    let workspaces = load_workspaces(&root)?;
    let graph = WorkspaceGraph::build(&workspaces);

    if json {
        let mut entries = serde_json::Map::new();
        for workspace in &workspaces {
            let mut deps = graph.dependencies(workspace.name())?;
            let mut dependents = graph.dependents(workspace.name())?;
            deps.sort_unstable();
            dependents.sort_unstable();
            entries.insert(
                workspace.name().to_string(),
                serde_json::json!({
                    "dependencies": deps,
                    "dependents": dependents,
                }),
            );
        }
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::Value::Object(entries))?
        );
        return Ok(());
    }

    print_section_header("Dependency Graph");
    for workspace in &workspaces {
        let mut deps = graph.dependencies(workspace.name())?;
        deps.sort_unstable();
        let detail = if deps.is_empty() {
            "(no internal dependencies)".to_string()
        } else {
            format!("-> {}", deps.join(", "))
        };
        print_item(workspace.name(), &detail);
    }
    println!();

    Ok(())
}
