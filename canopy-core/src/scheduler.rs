//! Concurrent, dependency-ordered task scheduling.

use std::collections::{HashMap, HashSet, VecDeque};
use std::future::Future;
use std::sync::Arc;

use indexmap::IndexMap;
use smallvec::SmallVec;
use tokio::sync::mpsc;

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::{Error, Result};
use crate::graph::WorkspaceGraph;
use crate::workspace::Workspace;

/// Terminal state of one workspace after a scheduling run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Task ran and succeeded.
    Done,
    /// Task ran and failed.
    Failed,
    /// Task never ran because a dependency it was waiting on failed.
    Skipped,
}

/// Per-workspace outcome of [`TaskScheduler::run`], in input-list order.
#[derive(Debug, Default)]
pub struct RunReport {
    statuses: IndexMap<String, TaskStatus>,
}

impl RunReport {
    #[inline]
    pub fn status(&self, name: &str) -> Option<TaskStatus> {
        self.statuses.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, TaskStatus)> {
        self.statuses.iter().map(|(name, s)| (name.as_str(), *s))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }
}

enum NodeState {
    Pending,
    Running,
    Terminal(TaskStatus),
}

/// Executes one task per workspace, honoring dependency order and running
/// independent workspaces concurrently.
///
/// Guarantees, for workspaces in the input list:
///
/// - the task runs exactly once per workspace;
/// - if B is a direct dependency of A and both are in the input list, A
///   does not start before B reaches a terminal state (dependencies
///   outside the input list impose no constraint);
/// - every workspace whose in-list dependencies have completed is started
///   immediately, with no global concurrency cap;
/// - declared cycles never deadlock the run: when no progress is possible,
///   the first cycle participant in input order has its cyclic edges
///   dropped and one [`Diagnostic::DependencyCycle`] is emitted; every
///   non-cyclic edge is still honored;
/// - a failed task marks its transitive in-list dependents `Skipped`;
///   independent branches continue unaffected.
///
/// The scheduler has no intrinsic timeout and no cancellation: a hung task
/// delays its dependents indefinitely, and the caller's task function owns
/// any timeout policy.
pub struct TaskScheduler<'g> {
    graph: &'g WorkspaceGraph,
    sink: Arc<dyn DiagnosticSink>,
}

impl<'g> TaskScheduler<'g> {
    pub fn new(graph: &'g WorkspaceGraph, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { graph, sink }
    }

    /// Runs `task` once for every workspace in `workspaces`.
    ///
    /// Task futures are spawned onto the tokio runtime; completions are
    /// folded into the scheduler's bookkeeping one at a time on this call's
    /// control flow, so no scheduler state is shared between tasks.
    ///
    /// Returns the per-workspace report when every task succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TaskFailed`] naming the failed (and skipped)
    /// workspaces if any task failed.
    pub async fn run<F, Fut>(&self, workspaces: &[Workspace], task: F) -> Result<RunReport>
    where
        F: Fn(Workspace) -> Fut,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let mut order: Vec<&str> = Vec::with_capacity(workspaces.len());
        let mut by_name: HashMap<&str, &Workspace> = HashMap::with_capacity(workspaces.len());
        for workspace in workspaces {
            if by_name.insert(workspace.name(), workspace).is_none() {
                order.push(workspace.name());
            }
        }

        // In-degree bookkeeping restricted to the input list. Self-loops
        // never count: a workspace does not wait on itself.
        let mut remaining: HashMap<&str, HashSet<String>> = HashMap::new();
        let mut dependents: HashMap<&str, SmallVec<[String; 4]>> = HashMap::new();
        for &name in &order {
            let deps = if self.graph.contains(name) {
                self.graph.dependencies(name)?
            } else {
                Vec::new()
            };
            let in_list: HashSet<String> = deps
                .into_iter()
                .filter(|dep| dep != name && by_name.contains_key(dep.as_str()))
                .collect();
            for dep in &in_list {
                if let Some((dep_key, _)) = by_name.get_key_value(dep.as_str()) {
                    dependents
                        .entry(*dep_key)
                        .or_default()
                        .push(name.to_string());
                }
            }
            remaining.insert(name, in_list);
        }

        let mut state: HashMap<&str, NodeState> = order
            .iter()
            .map(|&name| (name, NodeState::Pending))
            .collect();
        let mut ready: VecDeque<&str> = order
            .iter()
            .filter(|&&name| remaining[name].is_empty())
            .copied()
            .collect();

        let (tx, mut rx) = mpsc::unbounded_channel::<(String, Result<()>)>();
        let mut running = 0usize;
        let mut done = 0usize;
        let mut failures: Vec<String> = Vec::new();
        let mut skipped: Vec<String> = Vec::new();

        while done < order.len() {
            while let Some(name) = ready.pop_front() {
                if !matches!(state[name], NodeState::Pending) {
                    continue;
                }
                state.insert(name, NodeState::Running);
                running += 1;
                let fut = task((*by_name[name]).clone());
                let tx = tx.clone();
                let task_name = name.to_string();
                tokio::spawn(async move {
                    let result = fut.await;
                    let _ = tx.send((task_name, result));
                });
            }

            if running == 0 {
                // Nothing runnable and nothing in flight: the pending set
                // contains a cycle. Pick the first workspace in input order
                // that is an actual cycle participant (it can reach itself
                // through still-pending edges) and drop only its cyclic
                // edges. Workspaces that are merely downstream of the cycle
                // keep waiting, and so do the candidate's non-cyclic edges.
                let candidate = order.iter().copied().find(|&n| {
                    matches!(state[n], NodeState::Pending)
                        && remaining[n]
                            .iter()
                            .any(|dep| reaches_back(dep.as_str(), n, &remaining, &state))
                });
                let Some(name) = candidate else {
                    break;
                };
                let mut cyclic: Vec<String> = remaining[name]
                    .iter()
                    .filter(|dep| reaches_back(dep.as_str(), name, &remaining, &state))
                    .cloned()
                    .collect();
                cyclic.sort_unstable();
                self.sink.emit(Diagnostic::DependencyCycle {
                    workspace: name.to_string(),
                    waiting_on: cyclic.clone(),
                });
                if let Some(rem) = remaining.get_mut(name) {
                    for dep in &cyclic {
                        rem.remove(dep.as_str());
                    }
                    if rem.is_empty() {
                        ready.push_back(name);
                    }
                }
                continue;
            }

            let Some((finished, result)) = rx.recv().await else {
                break;
            };
            running -= 1;
            done += 1;
            let finished = finished.as_str();
            let (finished, _) = match by_name.get_key_value(finished) {
                Some(entry) => (*entry.0, entry.1),
                None => continue,
            };

            match result {
                Ok(()) => {
                    state.insert(finished, NodeState::Terminal(TaskStatus::Done));
                    if let Some(deps) = dependents.get(finished) {
                        for dependent in deps.clone() {
                            let Some((key, _)) = by_name.get_key_value(dependent.as_str())
                            else {
                                continue;
                            };
                            if !matches!(state[key], NodeState::Pending) {
                                continue;
                            }
                            if let Some(rem) = remaining.get_mut(key) {
                                rem.remove(finished);
                                if rem.is_empty() {
                                    ready.push_back(key);
                                }
                            }
                        }
                    }
                }
                Err(err) => {
                    state.insert(finished, NodeState::Terminal(TaskStatus::Failed));
                    failures.push(format!("{finished}: {err}"));

                    // Same-branch skip: every transitive dependent still
                    // waiting is marked Skipped; independent branches are
                    // untouched.
                    let mut stack: Vec<String> = dependents
                        .get(finished)
                        .map(|d| d.to_vec())
                        .unwrap_or_default();
                    while let Some(dependent) = stack.pop() {
                        let Some((key, _)) = by_name.get_key_value(dependent.as_str())
                        else {
                            continue;
                        };
                        if !matches!(state[key], NodeState::Pending) {
                            continue;
                        }
                        state.insert(key, NodeState::Terminal(TaskStatus::Skipped));
                        skipped.push(key.to_string());
                        done += 1;
                        if let Some(next) = dependents.get(key) {
                            stack.extend(next.iter().cloned());
                        }
                    }
                }
            }
        }

        let mut report = RunReport::default();
        for name in order {
            if let Some(NodeState::Terminal(status)) = state.get(name) {
                report.statuses.insert(name.to_string(), *status);
            }
        }

        if failures.is_empty() {
            Ok(report)
        } else {
            skipped.sort_unstable();
            Err(Error::TaskFailed {
                failed: failures.join("; "),
                skipped,
            })
        }
    }
}

/// Whether `target` is reachable from `from` by walking unresolved edges
/// through still-pending workspaces. Used to tell cyclic edges (the walk
/// comes back around) from edges that merely point into a stuck set.
fn reaches_back(
    from: &str,
    target: &str,
    remaining: &HashMap<&str, HashSet<String>>,
    state: &HashMap<&str, NodeState>,
) -> bool {
    let mut stack: Vec<String> = vec![from.to_string()];
    let mut seen: HashSet<String> = HashSet::new();
    while let Some(current) = stack.pop() {
        if current == target {
            return true;
        }
        if !seen.insert(current.clone()) {
            continue;
        }
        if !matches!(state.get(current.as_str()), Some(NodeState::Pending)) {
            continue;
        }
        if let Some(deps) = remaining.get(current.as_str()) {
            stack.extend(deps.iter().cloned());
        }
    }
    false
}
