//! Workspace data model.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::manifest::{Manifest, MANIFEST_FILE};

/// A unit of the repository: a directory owning one manifest.
///
/// Identity (name and location) is fixed for the lifetime of a graph or
/// scheduling run; only the manifest's dependency ranges are ever mutated,
/// by the version propagator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    /// Directory containing the manifest.
    pub path: PathBuf,
    pub manifest: Manifest,
}

impl Workspace {
    pub fn new(path: impl Into<PathBuf>, manifest: Manifest) -> Self {
        Self {
            path: path.into(),
            manifest,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.manifest.name
    }

    #[inline]
    pub fn version(&self) -> &str {
        &self.manifest.version
    }

    /// Location of this workspace's manifest file.
    pub fn manifest_path(&self) -> PathBuf {
        self.path.join(MANIFEST_FILE)
    }

    /// Loads a workspace from a directory containing a `canopy.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest is missing or malformed.
    pub fn load(dir: impl AsRef<Path>) -> crate::Result<Self> {
        let dir = dir.as_ref();
        let manifest = Manifest::load(&dir.join(MANIFEST_FILE))?;
        Ok(Self::new(dir, manifest))
    }
}
