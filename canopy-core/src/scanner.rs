//! Repository scanner for discovering workspaces.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::manifest::{Manifest, MANIFEST_FILE};
use crate::workspace::Workspace;

/// Scans a directory tree for workspaces.
///
/// Every `canopy.toml` below the root (the root itself excluded) defines
/// one workspace. Results are sorted by name so downstream consumers see a
/// deterministic input order.
pub struct Scanner {
    root: PathBuf,
}

impl Scanner {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Discovers all workspaces under the root.
    ///
    /// # Errors
    ///
    /// Returns an error if a manifest fails to parse or two workspaces
    /// declare the same name.
    pub fn scan(&self) -> Result<Vec<Workspace>> {
        let mut workspaces: Vec<Workspace> = Vec::new();
        let mut seen: HashMap<String, PathBuf> = HashMap::new();

        for entry in WalkDir::new(&self.root)
            .min_depth(2)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() || entry.file_name() != MANIFEST_FILE {
                continue;
            }

            let manifest = Manifest::load(entry.path())?;
            let dir = entry
                .path()
                .parent()
                .unwrap_or(Path::new("."))
                .to_path_buf();

            if let Some(first) = seen.get(&manifest.name) {
                return Err(Error::DuplicateWorkspace {
                    name: manifest.name,
                    first: first.clone(),
                    second: dir,
                });
            }
            seen.insert(manifest.name.clone(), dir.clone());
            workspaces.push(Workspace::new(dir, manifest));
        }

        workspaces.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(workspaces)
    }
}
