//! Outcome types handed back to callers of the merge and commit workflows.
//!
//! Outcomes are built exactly once per run and never mutated afterwards.
//! `raw_output` always carries the agent's combined stdout/stderr verbatim,
//! whichever pipeline stage produced the rest of the fields.

use serde::{Deserialize, Serialize};

/// Result of an agent-driven merge-to-default run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOutcome {
    pub success: bool,
    pub message: String,
    /// Paths the agent reported as conflicting, in the order it listed them.
    pub conflicts: Vec<String>,
    pub raw_output: String,
}

impl MergeOutcome {
    /// Failure outcome with no conflict list.
    pub fn failure(message: impl Into<String>, raw_output: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            conflicts: Vec::new(),
            raw_output: raw_output.into(),
        }
    }
}

/// One commit the agent reports having created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitEntry {
    pub sha: String,
    pub message: String,
    pub files: Vec<String>,
}

/// Result of an agent-driven smart-commit run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitOutcome {
    pub success: bool,
    pub message: String,
    /// Commits the agent reported creating, in the order it listed them.
    pub commits: Vec<CommitEntry>,
    pub raw_output: String,
}

impl CommitOutcome {
    /// Failure outcome with no commit list.
    pub fn failure(message: impl Into<String>, raw_output: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            commits: Vec::new(),
            raw_output: raw_output.into(),
        }
    }
}
