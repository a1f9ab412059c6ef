//! Diagnostics channel for non-fatal conditions.
//!
//! Warnings are routed through an injected sink rather than a process-wide
//! logger, so each run owns its diagnostics and tests can capture them
//! deterministically. The default sink forwards to `tracing`.

use std::fmt;
use std::sync::Mutex;

/// A non-fatal condition detected while building, scheduling, or
/// propagating versions. Emitted at the moment of detection, never batched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// An internal dependency's declared range does not admit the target
    /// workspace's current version.
    RangeUnsatisfied {
        workspace: String,
        dependency: String,
        range: String,
        version: String,
    },
    /// The scheduler had to release a workspace without waiting on cyclic
    /// predecessors to avoid a deadlock.
    DependencyCycle {
        workspace: String,
        waiting_on: Vec<String>,
    },
    /// Version-map entries that do not name any workspace; they are
    /// accepted but ignored by the propagator.
    ExternalPackagesIgnored { names: Vec<String> },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::RangeUnsatisfied {
                workspace,
                dependency,
                range,
                version,
            } => write!(
                f,
                "{workspace} declares {dependency} {range}, which does not admit the current version {version}"
            ),
            Diagnostic::DependencyCycle {
                workspace,
                waiting_on,
            } => write!(
                f,
                "dependency cycle detected: running {workspace} without waiting on {}",
                waiting_on.join(", ")
            ),
            Diagnostic::ExternalPackagesIgnored { names } => write!(
                f,
                "ignoring external packages not in this workspace: {}",
                names.join(", ")
            ),
        }
    }
}

/// Sink for diagnostics, injected into the graph, scheduler, and
/// propagator. Lifecycle is scoped to one run.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, diagnostic: Diagnostic);
}

/// Default sink: forwards every diagnostic to `tracing`.
#[derive(Debug, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::ExternalPackagesIgnored { .. } => tracing::info!("{diagnostic}"),
            _ => tracing::warn!("{diagnostic}"),
        }
    }
}

/// Collects diagnostics in memory, for tests and for callers that render
/// them after the run.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<Diagnostic>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of everything emitted so far.
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl DiagnosticSink for MemorySink {
    fn emit(&self, diagnostic: Diagnostic) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(diagnostic);
        }
    }
}
