//! Static table of supported coding agents.
//!
//! Each agent is one data row: how to build its argv, which `--help`
//! substring confirms non-interactive support, and which
//! [`ExtractionStrategy`] decodes its output envelope. Adding an agent is a
//! new row here, nothing else branches on agent identity.

/// How to unwrap an agent's reply text from its output envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
    /// The whole output is one JSON object; the reply text lives in a named
    /// string field (e.g. claude's `{"result": "..."}`).
    WrappedField { field: &'static str },
    /// The output is newline-delimited JSON records; the reply text is the
    /// payload of the last record whose `type_field` equals `type_value`
    /// (e.g. codex's `{"type":"item.completed","item":{"text":"..."}}`).
    StreamLastMatch {
        type_field: &'static str,
        type_value: &'static str,
        payload_path: &'static [&'static str],
    },
}

/// One supported agent. Constructed once in [`AGENTS`], read-only thereafter.
#[derive(Debug, Clone, Copy)]
pub struct AgentDescriptor {
    /// Stable id callers select agents by.
    pub id: &'static str,
    /// Human-readable name for messages.
    pub name: &'static str,
    /// Executable probed for on the search path.
    pub executable: &'static str,
    /// Full argv (program included) for a `(prompt, disable_sandbox)` task.
    pub build_args: fn(&str, bool) -> Vec<String>,
    /// Substring that must appear in `--help` output for the agent to count
    /// as scriptable.
    pub probe_keyword: &'static str,
    pub strategy: ExtractionStrategy,
}

/// All supported agents.
pub static AGENTS: &[AgentDescriptor] = &[
    AgentDescriptor {
        id: "claude",
        name: "Claude Code",
        executable: "claude",
        build_args: claude_args,
        probe_keyword: "--output-format",
        strategy: ExtractionStrategy::WrappedField { field: "result" },
    },
    AgentDescriptor {
        id: "codex",
        name: "Codex",
        executable: "codex",
        build_args: codex_args,
        probe_keyword: "exec",
        strategy: ExtractionStrategy::StreamLastMatch {
            type_field: "type",
            type_value: "item.completed",
            payload_path: &["item", "text"],
        },
    },
    AgentDescriptor {
        id: "gemini",
        name: "Gemini CLI",
        executable: "gemini",
        build_args: gemini_args,
        probe_keyword: "--prompt",
        strategy: ExtractionStrategy::WrappedField { field: "response" },
    },
    AgentDescriptor {
        id: "qwen",
        name: "Qwen Code",
        executable: "qwen",
        build_args: qwen_args,
        probe_keyword: "--prompt",
        strategy: ExtractionStrategy::WrappedField { field: "response" },
    },
    AgentDescriptor {
        id: "opencode",
        name: "OpenCode",
        executable: "opencode",
        build_args: opencode_args,
        probe_keyword: "run",
        strategy: ExtractionStrategy::StreamLastMatch {
            type_field: "type",
            type_value: "text",
            payload_path: &["part", "text"],
        },
    },
    AgentDescriptor {
        id: "cursor",
        name: "Cursor Agent",
        executable: "cursor-agent",
        build_args: cursor_args,
        probe_keyword: "--print",
        strategy: ExtractionStrategy::WrappedField { field: "result" },
    },
];

/// Look up an agent by id.
pub fn lookup(id: &str) -> Option<&'static AgentDescriptor> {
    AGENTS.iter().find(|agent| agent.id == id)
}

fn claude_args(prompt: &str, _disable_sandbox: bool) -> Vec<String> {
    to_argv(&[
        "claude",
        "--dangerously-skip-permissions",
        "-p",
        prompt,
        "--output-format",
        "json",
    ])
}

fn codex_args(prompt: &str, disable_sandbox: bool) -> Vec<String> {
    let mode = if disable_sandbox {
        "--dangerously-bypass-approvals-and-sandbox"
    } else {
        "--full-auto"
    };
    to_argv(&["codex", mode, "exec", prompt])
}

fn gemini_args(prompt: &str, _disable_sandbox: bool) -> Vec<String> {
    to_argv(&["gemini", prompt, "-o", "json"])
}

fn qwen_args(prompt: &str, _disable_sandbox: bool) -> Vec<String> {
    to_argv(&["qwen", prompt, "-o", "json"])
}

fn opencode_args(prompt: &str, _disable_sandbox: bool) -> Vec<String> {
    to_argv(&["opencode", "run", prompt, "--format", "json"])
}

fn cursor_args(prompt: &str, _disable_sandbox: bool) -> Vec<String> {
    to_argv(&["cursor-agent", "-p", prompt, "--output-format", "json"])
}

fn to_argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|part| (*part).to_string()).collect()
}
