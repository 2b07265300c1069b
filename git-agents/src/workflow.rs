//! Top-level merge and commit workflows.
//!
//! These are the only entry points callers use. They resolve the agent,
//! spawn it with the long deadline, and feed the combined output through the
//! extraction pipeline. Every failure mode terminates in a fully-populated
//! outcome; nothing here returns `Err` or panics.

use std::path::Path;

use tracing::{info, instrument, warn};

use crate::core::extract::{extract_commit, extract_merge};
use crate::core::registry::{self, AgentDescriptor};
use crate::core::types::{CommitOutcome, MergeOutcome};
use crate::io::process::{self, RUN_TIMEOUT, RawExecutionResult};

pub(crate) const NOT_CONFIGURED_MSG: &str =
    "No coding agent is configured. Select a supported agent and try again.";

/// Merge the current branch into the default branch via the given agent.
#[instrument(skip_all, fields(agent = agent_id))]
pub fn run_merge(
    agent_id: &str,
    prompt: &str,
    workdir: &Path,
    disable_sandbox: bool,
) -> MergeOutcome {
    match registry::lookup(agent_id) {
        Some(agent) => match execute(agent, prompt, workdir, disable_sandbox) {
            Execution::Finished(result) => {
                let combined = result.combined_output();
                match exit_failure(agent, &result) {
                    Some(message) => MergeOutcome::failure(message, combined),
                    None => extract_merge(&combined, agent),
                }
            }
            Execution::LaunchFailed(message) => MergeOutcome::failure(message, ""),
        },
        None => {
            warn!(agent = agent_id, "unknown agent id");
            MergeOutcome::failure(NOT_CONFIGURED_MSG, "")
        }
    }
}

/// Create commits from pending changes via the given agent.
#[instrument(skip_all, fields(agent = agent_id))]
pub fn run_commit(
    agent_id: &str,
    prompt: &str,
    workdir: &Path,
    disable_sandbox: bool,
) -> CommitOutcome {
    match registry::lookup(agent_id) {
        Some(agent) => match execute(agent, prompt, workdir, disable_sandbox) {
            Execution::Finished(result) => {
                let combined = result.combined_output();
                match exit_failure(agent, &result) {
                    Some(message) => CommitOutcome::failure(message, combined),
                    None => extract_commit(&combined, agent),
                }
            }
            Execution::LaunchFailed(message) => CommitOutcome::failure(message, ""),
        },
        None => {
            warn!(agent = agent_id, "unknown agent id");
            CommitOutcome::failure(NOT_CONFIGURED_MSG, "")
        }
    }
}

enum Execution {
    Finished(RawExecutionResult),
    LaunchFailed(String),
}

fn execute(
    agent: &AgentDescriptor,
    prompt: &str,
    workdir: &Path,
    disable_sandbox: bool,
) -> Execution {
    let argv = (agent.build_args)(prompt, disable_sandbox);
    info!(agent = agent.id, workdir = %workdir.display(), "starting agent run");
    match process::run(&argv, workdir, RUN_TIMEOUT) {
        Ok(result) => Execution::Finished(result),
        Err(err) => {
            warn!(agent = agent.id, err = %err, "failed to launch agent");
            Execution::LaunchFailed(format!("Failed to launch {}: {err:#}", agent.name))
        }
    }
}

/// Short-circuit message for runs that exited non-zero without producing any
/// stdout. Non-zero exits with real stdout still go through extraction,
/// since agents legitimately emit the payload before exiting on warnings.
fn exit_failure(agent: &AgentDescriptor, result: &RawExecutionResult) -> Option<String> {
    if !result.stdout.trim().is_empty() {
        return None;
    }
    match result.exit_code {
        Some(0) => None,
        Some(code) => Some(format!(
            "{} exited with code {code} and produced no output.",
            agent.name
        )),
        None => Some(format!(
            "{} was terminated before producing any output.",
            agent.name
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::ExtractionStrategy;

    // Fake agents built from shell argv; the prompt doubles as the payload.
    fn echo_args(prompt: &str, _disable_sandbox: bool) -> Vec<String> {
        vec!["echo".to_string(), prompt.to_string()]
    }

    fn exit_one_args(_prompt: &str, _disable_sandbox: bool) -> Vec<String> {
        vec!["sh".to_string(), "-c".to_string(), "exit 1".to_string()]
    }

    fn missing_args(_prompt: &str, _disable_sandbox: bool) -> Vec<String> {
        vec!["git-agents-test-missing-binary".to_string()]
    }

    fn fake_agent(build_args: fn(&str, bool) -> Vec<String>) -> AgentDescriptor {
        AgentDescriptor {
            id: "fake",
            name: "Fake Agent",
            executable: "fake",
            build_args,
            probe_keyword: "--help",
            strategy: ExtractionStrategy::WrappedField { field: "result" },
        }
    }

    #[test]
    fn unknown_agent_is_not_configured() {
        let outcome = run_merge("no-such-agent", "prompt", Path::new("."), false);
        assert!(!outcome.success);
        assert_eq!(outcome.message, NOT_CONFIGURED_MSG);
        assert_eq!(outcome.raw_output, "");

        let outcome = run_commit("", "prompt", Path::new("."), false);
        assert!(!outcome.success);
        assert_eq!(outcome.message, NOT_CONFIGURED_MSG);
    }

    #[test]
    fn echoed_business_json_becomes_outcome() {
        let temp = tempfile::tempdir().expect("tempdir");
        let agent = fake_agent(echo_args);
        let prompt = r#"{"success":true,"message":"merged","conflicts":[]}"#;
        let outcome = match execute(&agent, prompt, temp.path(), false) {
            Execution::Finished(result) => extract_merge(&result.combined_output(), &agent),
            Execution::LaunchFailed(message) => panic!("launch failed: {message}"),
        };
        assert!(outcome.success);
        assert_eq!(outcome.message, "merged");
    }

    /// A non-zero exit with empty stdout names the exit code.
    #[test]
    fn nonzero_exit_without_output_short_circuits() {
        let temp = tempfile::tempdir().expect("tempdir");
        let agent = fake_agent(exit_one_args);
        let Execution::Finished(result) = execute(&agent, "p", temp.path(), false) else {
            panic!("expected a finished run");
        };
        let message = exit_failure(&agent, &result).expect("short-circuit");
        assert!(message.contains('1'), "message was {message:?}");
    }

    #[test]
    fn nonzero_exit_with_stdout_still_extracts() {
        let agent = fake_agent(echo_args);
        let result = RawExecutionResult {
            stdout: r#"{"success":true,"message":"ok"}"#.to_string(),
            stderr: String::new(),
            exit_code: Some(2),
        };
        assert!(exit_failure(&agent, &result).is_none());
    }

    #[test]
    fn launch_failure_includes_os_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let agent = fake_agent(missing_args);
        let Execution::LaunchFailed(message) = execute(&agent, "p", temp.path(), false) else {
            panic!("expected a launch failure");
        };
        assert!(message.contains("Failed to launch Fake Agent"));
        assert!(message.contains("spawn"));
    }
}
