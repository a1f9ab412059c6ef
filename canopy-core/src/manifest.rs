//! Manifest model and `canopy.toml` parsing.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// File name of a workspace manifest.
pub const MANIFEST_FILE: &str = "canopy.toml";

/// Kind of dependency declaration.
///
/// Closed set: every site that walks dependency declarations matches on all
/// four variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyType {
    Regular,
    Dev,
    Peer,
    Optional,
}

impl DependencyType {
    pub const ALL: [DependencyType; 4] = [
        DependencyType::Regular,
        DependencyType::Dev,
        DependencyType::Peer,
        DependencyType::Optional,
    ];

    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyType::Regular => "dependencies",
            DependencyType::Dev => "dev-dependencies",
            DependencyType::Peer => "peer-dependencies",
            DependencyType::Optional => "optional-dependencies",
        }
    }
}

/// A workspace manifest as defined in `canopy.toml`.
///
/// Dependency tables map package name to a version-range string and keep
/// declaration order. Ranges on internal packages may be rewritten in place
/// by the version propagator; everything else is immutable after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub dependencies: IndexMap<String, String>,
    #[serde(
        default,
        rename = "dev-dependencies",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub dev_dependencies: IndexMap<String, String>,
    #[serde(
        default,
        rename = "peer-dependencies",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub peer_dependencies: IndexMap<String, String>,
    #[serde(
        default,
        rename = "optional-dependencies",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub optional_dependencies: IndexMap<String, String>,
    /// Named shell commands runnable via the scheduler.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub scripts: IndexMap<String, String>,
}

impl Manifest {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            dependencies: IndexMap::new(),
            dev_dependencies: IndexMap::new(),
            peer_dependencies: IndexMap::new(),
            optional_dependencies: IndexMap::new(),
            scripts: IndexMap::new(),
        }
    }

    /// Reads and parses a manifest file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable, or not valid
    /// manifest TOML.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::ManifestNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|error| Error::Toml {
            error,
            context: path.display().to_string(),
        })
    }

    /// Serializes the manifest back to its file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// The dependency table for one declaration kind.
    #[inline]
    pub fn dependencies_of(&self, ty: DependencyType) -> &IndexMap<String, String> {
        match ty {
            DependencyType::Regular => &self.dependencies,
            DependencyType::Dev => &self.dev_dependencies,
            DependencyType::Peer => &self.peer_dependencies,
            DependencyType::Optional => &self.optional_dependencies,
        }
    }

    fn dependencies_of_mut(&mut self, ty: DependencyType) -> &mut IndexMap<String, String> {
        match ty {
            DependencyType::Regular => &mut self.dependencies,
            DependencyType::Dev => &mut self.dev_dependencies,
            DependencyType::Peer => &mut self.peer_dependencies,
            DependencyType::Optional => &mut self.optional_dependencies,
        }
    }

    /// Declared range for `name` under `ty`, if any.
    #[inline]
    pub fn dependency_range(&self, ty: DependencyType, name: &str) -> Option<&str> {
        self.dependencies_of(ty).get(name).map(String::as_str)
    }

    /// Rewrites the declared range for `name` under `ty`.
    ///
    /// Returns `true` if the entry existed and its value changed.
    pub fn set_dependency_range(
        &mut self,
        ty: DependencyType,
        name: &str,
        range: impl Into<String>,
    ) -> bool {
        let range = range.into();
        match self.dependencies_of_mut(ty).get_mut(name) {
            Some(existing) if *existing != range => {
                *existing = range;
                true
            }
            _ => false,
        }
    }

    /// All declared dependency names across every declaration kind,
    /// de-duplicated, in declaration order.
    pub fn dependency_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for ty in DependencyType::ALL {
            for name in self.dependencies_of(ty).keys() {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }

    #[inline]
    pub fn script(&self, name: &str) -> Option<&str> {
        self.scripts.get(name).map(String::as_str)
    }
}
