//! Core library for workspace orchestration.

pub mod diagnostics;
pub mod error;
pub mod filter;
pub mod graph;
pub mod manifest;
pub mod propagate;
pub mod scanner;
pub mod scheduler;
pub mod workspace;

pub use diagnostics::{Diagnostic, DiagnosticSink, MemorySink, TracingSink};
pub use error::{Error, Result};
pub use filter::WorkspaceFilter;
pub use graph::WorkspaceGraph;
pub use manifest::{DependencyType, Manifest, MANIFEST_FILE};
pub use propagate::VersionPropagator;
pub use scanner::Scanner;
pub use scheduler::{RunReport, TaskScheduler, TaskStatus};
pub use workspace::Workspace;
