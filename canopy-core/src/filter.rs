//! Glob-style include/exclude filtering of workspace lists.

use regex::Regex;

use crate::error::{Error, Result};
use crate::workspace::Workspace;

/// Filters a workspace list by name or relative path.
///
/// Patterns support `*` (any run of characters) and `?` (one character)
/// and are matched against the whole name or path. An empty include list
/// admits everything; excludes are applied afterwards.
pub struct WorkspaceFilter {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
}

impl WorkspaceFilter {
    /// Compiles include and exclude patterns.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern does not compile.
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self> {
        Ok(Self {
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    /// Whether a workspace passes the filter, by name or path.
    pub fn matches(&self, workspace: &Workspace) -> bool {
        let name = workspace.name();
        let path = workspace.path.to_string_lossy();

        let included = self.include.is_empty()
            || self
                .include
                .iter()
                .any(|re| re.is_match(name) || re.is_match(&path));
        if !included {
            return false;
        }

        !self
            .exclude
            .iter()
            .any(|re| re.is_match(name) || re.is_match(&path))
    }

    /// Retains only the workspaces that pass the filter.
    pub fn apply(&self, workspaces: Vec<Workspace>) -> Vec<Workspace> {
        workspaces
            .into_iter()
            .filter(|ws| self.matches(ws))
            .collect()
    }
}

fn compile(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns.iter().map(|p| glob_to_regex(p)).collect()
}

fn glob_to_regex(pattern: &str) -> Result<Regex> {
    let mut regex = String::with_capacity(pattern.len() + 8);
    regex.push('^');
    for ch in pattern.chars() {
        match ch {
            '*' => regex.push_str(".*"),
            '?' => regex.push('.'),
            c => regex.push_str(&regex::escape(&c.to_string())),
        }
    }
    regex.push('$');
    Regex::new(&regex).map_err(|e| Error::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}
