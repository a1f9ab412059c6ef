//! Error types and result aliases.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error in {context}: {error}")]
    Toml {
        error: toml::de::Error,
        context: String,
    },

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Workspace not found: {name}. Known workspaces: {available}")]
    WorkspaceNotFound { name: String, available: String },

    #[error("Duplicate workspace name '{name}' declared at {first} and {second}")]
    DuplicateWorkspace {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Manifest not found: {0}. Expected 'canopy.toml' in workspace directory.")]
    ManifestNotFound(PathBuf),

    #[error("Invalid version '{version}' for {name}: {source}")]
    InvalidVersion {
        name: String,
        version: String,
        source: semver::Error,
    },

    #[error("Invalid version range '{range}' declared by {workspace} on {dependency}: {source}")]
    InvalidRange {
        workspace: String,
        dependency: String,
        range: String,
        source: semver::Error,
    },

    #[error("Invalid filter pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error(
        "Release plan is inconsistent: {workspace} is not part of the update set, \
         but its dependency {dependency} ({range}) does not admit {version}"
    )]
    ReleasePlanInconsistent {
        workspace: String,
        dependency: String,
        range: String,
        version: String,
    },

    #[error("Task failed for: {failed}{}", skipped_suffix(.skipped))]
    TaskFailed { failed: String, skipped: Vec<String> },

    #[error("Task execution failed for {workspace}: {message}")]
    TaskExecution { workspace: String, message: String },
}

fn skipped_suffix(skipped: &[String]) -> String {
    if skipped.is_empty() {
        String::new()
    } else {
        format!("; skipped: {}", skipped.join(", "))
    }
}

impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Error::Toml {
            error,
            context: "canopy.toml".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
