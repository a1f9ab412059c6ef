//! Script execution across workspaces.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;

use anyhow::Result;
use canopy_core::{
    DiagnosticSink, Error, TaskScheduler, TaskStatus, TracingSink, Workspace, WorkspaceFilter,
    WorkspaceGraph,
};

use crate::formatting::{print_failure, print_key_value, print_section_header, print_success};

use super::load_workspaces;

pub async fn cmd_run(
    root: PathBuf,
    script: String,
    filter: Vec<String>,
    exclude: Vec<String>,
) -> Result<()> {
    let workspaces = load_workspaces(&root)?;
    let graph = WorkspaceGraph::build(&workspaces);

    let filter = WorkspaceFilter::new(&filter, &exclude)?;
    let selected: Vec<Workspace> = filter
        .apply(workspaces)
        .into_iter()
        .filter(|ws| ws.manifest.script(&script).is_some())
        .collect();

    if selected.is_empty() {
        print_section_header("Run");
        print_key_value("Script", &script);
        println!("  no workspace defines this script");
        println!();
        return Ok(());
    }

    print_section_header("Run");
    print_key_value("Script", &script);
    print_key_value("Workspaces", &selected.len().to_string());
    println!();

    let sink: Arc<dyn DiagnosticSink> = Arc::new(TracingSink);
    let scheduler = TaskScheduler::new(&graph, sink);
    let script_name = script.clone();

    let outcome = scheduler
        .run(&selected, move |workspace: Workspace| {
            let script = script_name.clone();
            async move { run_script(&workspace, &script).await }
        })
        .await;

    match outcome {
        Ok(report) => {
            for (name, status) in report.iter() {
                match status {
                    TaskStatus::Done => print_success(name),
                    TaskStatus::Failed => print_failure(name),
                    TaskStatus::Skipped => print_failure(&format!("{name} (skipped)")),
                }
            }
            println!();
            Ok(())
        }
        Err(err) => {
            print_failure(&err.to_string());
            println!();
            Err(err.into())
        }
    }
}

async fn run_script(workspace: &Workspace, script: &str) -> canopy_core::Result<()> {
    // Selection already guarantees the script exists.
    let Some(command) = workspace.manifest.script(script) else {
        return Ok(());
    };

    let status = tokio::process::Command::new("sh")
        .arg("-c")
        .arg(command)
        .current_dir(&workspace.path)
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .map_err(|e| Error::TaskExecution {
            workspace: workspace.name().to_string(),
            message: format!("failed to spawn '{script}': {e}"),
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(Error::TaskExecution {
            workspace: workspace.name().to_string(),
            message: format!("'{script}' exited with {status}"),
        })
    }
}
