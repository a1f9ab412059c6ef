//! Command implementations for the CLI.

mod discovery;
mod execution;
mod release;

use std::path::Path;

use anyhow::Result;
use canopy_core::{Scanner, Workspace};

pub use discovery::{cmd_graph, cmd_list};
pub use execution::cmd_run;
pub use release::{cmd_validate, cmd_version};

fn load_workspaces(root: &Path) -> Result<Vec<Workspace>> {
    Ok(Scanner::new(root).scan()?)
}
