//! Agent-driven git workflows for applications embedding CLI coding agents.
//!
//! This crate invokes independently-maintained, non-interactive command-line
//! coding agents (claude, codex, gemini, ...) to perform two automated git
//! workflows, merge-to-default and smart-commit, and turns each agent's raw
//! terminal output into a reliable structured outcome. The architecture
//! enforces a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (agent registry, output
//!   sanitation, JSON extraction, fallback classification). No I/O, fully
//!   testable in isolation.
//! - **[`io`]**: Side-effecting operations (process execution with deadlines,
//!   availability probes). Isolated to enable fake agents in tests.
//!
//! [`workflow`] coordinates core logic with I/O to implement the merge and
//! commit entry points. Those entry points never return errors or panic:
//! every failure mode, from an unknown agent id to unparseable output,
//! degrades to a fully-populated [`core::types::MergeOutcome`] or
//! [`core::types::CommitOutcome`].

pub mod core;
pub mod io;
pub mod logging;
pub mod workflow;
