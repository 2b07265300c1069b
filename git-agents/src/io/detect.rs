//! Concurrent availability probes for registered agents.
//!
//! Each agent gets its own probe thread: locate the executable on the
//! augmented search path, then confirm `--help` mentions the agent's
//! non-interactive keyword. Probe failures and timeouts mean "unavailable",
//! never an error.

use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use std::thread;

use tracing::{debug, instrument, warn};

use crate::core::registry::{AGENTS, AgentDescriptor};
use crate::io::process::{self, PROBE_TIMEOUT, augmented_path};

/// Probe every registered agent concurrently and report which are usable.
/// All probe threads are joined before the map is returned; a panicked
/// probe counts as unavailable.
#[instrument(skip_all)]
pub fn detect_all() -> BTreeMap<String, bool> {
    let handles: Vec<_> = AGENTS
        .iter()
        .map(|agent| (agent.id, thread::spawn(move || probe_agent(agent))))
        .collect();

    handles
        .into_iter()
        .map(|(id, handle)| {
            let available = handle.join().unwrap_or(false);
            debug!(agent = id, available, "probe finished");
            (id.to_string(), available)
        })
        .collect()
}

fn probe_agent(agent: &AgentDescriptor) -> bool {
    let Some(exe) = find_executable(agent.executable) else {
        debug!(agent = agent.id, "executable not found on search path");
        return false;
    };
    help_mentions_keyword(&exe, agent.probe_keyword)
}

/// Run `<exe> --help` under the probe deadline and look for the keyword in
/// the combined output (some tools print help to stderr).
fn help_mentions_keyword(exe: &Path, keyword: &str) -> bool {
    let argv = vec![exe.display().to_string(), "--help".to_string()];
    match process::run(&argv, &env::temp_dir(), PROBE_TIMEOUT) {
        Ok(result) => result.combined_output().contains(keyword),
        Err(err) => {
            warn!(exe = %exe.display(), err = %err, "help probe failed");
            false
        }
    }
}

/// `which` equivalent against the augmented search path.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    find_in_dirs(name, env::split_paths(&augmented_path()))
}

fn find_in_dirs(name: &str, dirs: impl IntoIterator<Item = PathBuf>) -> Option<PathBuf> {
    dirs.into_iter()
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::AGENTS;

    #[test]
    fn detect_all_covers_every_registered_agent() {
        let map = detect_all();
        assert_eq!(map.len(), AGENTS.len());
        for agent in AGENTS {
            assert!(map.contains_key(agent.id), "missing {}", agent.id);
        }
    }

    #[test]
    fn find_in_dirs_misses_when_absent() {
        let temp = tempfile::tempdir().expect("tempdir");
        assert!(find_in_dirs("ghost-agent", [temp.path().to_path_buf()]).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn find_in_dirs_requires_executable_bit() {
        use std::fs;
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::tempdir().expect("tempdir");
        let plain = temp.path().join("plain-file");
        fs::write(&plain, "data").expect("write");
        assert!(find_in_dirs("plain-file", [temp.path().to_path_buf()]).is_none());

        let exe = temp.path().join("fake-agent");
        fs::write(&exe, "#!/bin/sh\nexit 0\n").expect("write");
        fs::set_permissions(&exe, fs::Permissions::from_mode(0o755)).expect("chmod");
        assert_eq!(
            find_in_dirs("fake-agent", [temp.path().to_path_buf()]),
            Some(exe)
        );
    }

    #[cfg(unix)]
    #[test]
    fn help_probe_matches_keyword() {
        use std::fs;
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::tempdir().expect("tempdir");
        let exe = temp.path().join("fake-agent");
        fs::write(&exe, "#!/bin/sh\necho 'usage: fake-agent --print <prompt>'\n")
            .expect("write");
        fs::set_permissions(&exe, fs::Permissions::from_mode(0o755)).expect("chmod");

        assert!(help_mentions_keyword(&exe, "--print"));
        assert!(!help_mentions_keyword(&exe, "--output-format"));
    }
}
