//! Command-line front end for the agent-driven git workflows.
//!
//! Prints outcomes as pretty JSON on stdout; exits 1 when a workflow
//! reports failure so scripts can branch on the status.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use git_agents::io::detect::detect_all;
use git_agents::{logging, workflow};

#[derive(Parser)]
#[command(
    name = "git-agents",
    version,
    about = "Run non-interactive CLI coding agents for automated git workflows"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Probe which registered agents are installed and scriptable.
    Detect,
    /// Merge the current branch into the default branch via an agent.
    Merge(RunArgs),
    /// Create commits from pending changes via an agent.
    Commit(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Registered agent id (e.g. claude, codex, gemini).
    #[arg(short, long)]
    agent: String,
    /// Task prompt passed verbatim to the agent.
    #[arg(short, long)]
    prompt: String,
    /// Working directory for the agent process.
    #[arg(short, long, default_value = ".")]
    dir: PathBuf,
    /// Drop the agent's sandbox restrictions where supported.
    #[arg(long)]
    no_sandbox: bool,
}

fn main() -> ExitCode {
    logging::init();
    match run() {
        Ok(success) => {
            if success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<bool> {
    let cli = Cli::parse();
    match cli.command {
        Command::Detect => {
            let availability = detect_all();
            println!("{}", serde_json::to_string_pretty(&availability)?);
            Ok(true)
        }
        Command::Merge(args) => {
            let outcome =
                workflow::run_merge(&args.agent, &args.prompt, &args.dir, args.no_sandbox);
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(outcome.success)
        }
        Command::Commit(args) => {
            let outcome =
                workflow::run_commit(&args.agent, &args.prompt, &args.dir, args.no_sandbox);
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(outcome.success)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_detect() {
        let cli = Cli::parse_from(["git-agents", "detect"]);
        assert!(matches!(cli.command, Command::Detect));
    }

    #[test]
    fn parse_merge_with_defaults() {
        let cli = Cli::parse_from([
            "git-agents", "merge", "--agent", "claude", "--prompt", "merge it",
        ]);
        let Command::Merge(args) = cli.command else {
            panic!("expected merge");
        };
        assert_eq!(args.agent, "claude");
        assert_eq!(args.prompt, "merge it");
        assert_eq!(args.dir, PathBuf::from("."));
        assert!(!args.no_sandbox);
    }

    #[test]
    fn parse_commit_with_no_sandbox() {
        let cli = Cli::parse_from([
            "git-agents",
            "commit",
            "-a",
            "codex",
            "-p",
            "commit staged work",
            "-d",
            "/tmp/repo",
            "--no-sandbox",
        ]);
        let Command::Commit(args) = cli.command else {
            panic!("expected commit");
        };
        assert_eq!(args.agent, "codex");
        assert_eq!(args.dir, PathBuf::from("/tmp/repo"));
        assert!(args.no_sandbox);
    }
}
