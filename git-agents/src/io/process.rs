//! Agent process execution: hard deadlines, full output capture, and an
//! augmented search path so agents installed outside the login PATH are
//! still found.

use std::env;
use std::ffi::{OsStr, OsString};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, instrument, warn};
use wait_timeout::ChildExt;

/// Deadline for availability probes (`--help` runs).
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);
/// Deadline for actual merge/commit runs.
pub const RUN_TIMEOUT: Duration = Duration::from_secs(600);

/// Directories searched ahead of the inherited `PATH`, relative to `$HOME`.
const HOME_SEARCH_DIRS: &[&str] = &[".local/bin", ".cargo/bin", ".opencode/bin", ".bun/bin"];
/// Absolute directories searched ahead of the inherited `PATH`.
const EXTRA_SEARCH_DIRS: &[&str] = &[
    "/opt/homebrew/bin",
    "/opt/homebrew/sbin",
    "/usr/local/bin",
    "/usr/local/sbin",
];

/// Captured output of a finished (or force-terminated) agent process.
/// Owned exclusively by the call that produced it.
#[derive(Debug, Clone)]
pub struct RawExecutionResult {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was killed by a signal (deadline included).
    pub exit_code: Option<i32>,
}

impl RawExecutionResult {
    /// Stdout, with a labelled stderr section appended when stderr is
    /// non-blank. This is the text the extraction pipeline consumes.
    pub fn combined_output(&self) -> String {
        if self.stderr.trim().is_empty() {
            self.stdout.clone()
        } else {
            format!("{}\n--- stderr ---\n{}", self.stdout, self.stderr)
        }
    }
}

/// Run `argv` in `workdir` with a hard deadline, capturing stdout and stderr
/// fully on reader threads.
///
/// On deadline expiry the process is killed and reaped, and whatever output
/// was captured up to that point is still returned; a timeout is not a
/// distinct error kind. `wait_timeout` doubles as the deadline watcher: it
/// returns on normal exit and can only kill while the child is running, so
/// it never fires twice. Errors only on spawn or pipe failures.
#[instrument(skip_all, fields(program = argv.first().map_or("", String::as_str), timeout_secs = timeout.as_secs()))]
pub fn run(argv: &[String], workdir: &Path, timeout: Duration) -> Result<RawExecutionResult> {
    let (program, args) = argv.split_first().ok_or_else(|| anyhow!("empty argv"))?;
    let mut cmd = Command::new(program);
    cmd.args(args)
        .current_dir(workdir)
        .env("PATH", augmented_path())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    debug!("spawning agent process");
    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawn {program}"))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("stdout was not piped"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| anyhow!("stderr was not piped"))?;
    let stdout_handle = thread::spawn(move || drain(stdout));
    let stderr_handle = thread::spawn(move || drain(stderr));

    let status = match child.wait_timeout(timeout).context("wait for agent")? {
        Some(status) => status,
        None => {
            warn!(timeout_secs = timeout.as_secs(), "agent deadline elapsed, killing");
            child.kill().context("kill agent")?;
            child.wait().context("reap agent after kill")?
        }
    };

    let stdout = join_reader(stdout_handle).context("join stdout reader")?;
    let stderr = join_reader(stderr_handle).context("join stderr reader")?;
    debug!(exit_code = ?status.code(), "agent process finished");
    Ok(RawExecutionResult {
        stdout,
        stderr,
        exit_code: status.code(),
    })
}

fn join_reader(handle: thread::JoinHandle<Result<String>>) -> Result<String> {
    match handle.join() {
        Ok(result) => result,
        Err(_) => Err(anyhow!("output reader thread panicked")),
    }
}

fn drain<R: Read>(mut reader: R) -> Result<String> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf).context("read output")?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// The inherited `PATH` with agent install locations prepended, first-seen
/// order preserved, duplicates dropped.
pub fn augmented_path() -> OsString {
    let existing = env::var_os("PATH");
    let dirs = search_dirs(dirs::home_dir().as_deref(), existing.as_deref());
    env::join_paths(dirs).unwrap_or_else(|_| existing.unwrap_or_default())
}

fn search_dirs(home: Option<&Path>, existing: Option<&OsStr>) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Some(home) = home {
        dirs.extend(HOME_SEARCH_DIRS.iter().map(|rel| home.join(rel)));
    }
    dirs.extend(EXTRA_SEARCH_DIRS.iter().map(PathBuf::from));
    if let Some(existing) = existing {
        dirs.extend(env::split_paths(existing));
    }

    let mut unique = Vec::with_capacity(dirs.len());
    for dir in dirs {
        if !unique.contains(&dir) {
            unique.push(dir);
        }
    }
    unique
}
