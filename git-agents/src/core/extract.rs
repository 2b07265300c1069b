//! Two-layer extraction of business JSON from raw agent output.
//!
//! Layer 1 unwraps the agent-specific envelope (single JSON object or
//! JSON-lines stream) to recover the agent's reply text. Layer 2 locates the
//! business `{"success": ...}` object inside that reply, or inside the raw
//! output when unwrapping yields nothing. Every field read is tolerant:
//! missing or wrong-typed fields get defaults instead of failing the parse.
//! When no structured JSON can be located anywhere, a keyword heuristic over
//! the full output decides the outcome. Nothing in here errors or panics.

use serde_json::Value;
use tracing::debug;

use crate::core::registry::{AgentDescriptor, ExtractionStrategy};
use crate::core::sanitize::{sanitize, strip_code_fence};
use crate::core::scan::scan_json_objects;
use crate::core::types::{CommitEntry, CommitOutcome, MergeOutcome};

pub(crate) const MERGE_FAILED_MSG: &str =
    "Merge failed. See the raw agent output for details.";
pub(crate) const MERGE_COMPLETED_MSG: &str = "Merge completed.";
pub(crate) const COMMIT_FAILED_MSG: &str =
    "Commit failed. See the raw agent output for details.";
pub(crate) const COMMIT_COMPLETED_MSG: &str = "Commit completed.";

/// Interpret a merge run's combined output.
pub fn extract_merge(raw_output: &str, agent: &AgentDescriptor) -> MergeOutcome {
    match locate_payload(raw_output, agent) {
        Some(payload) => MergeOutcome {
            success: read_bool(&payload, "success"),
            message: read_string(&payload, "message"),
            conflicts: read_string_array(&payload, "conflicts"),
            raw_output: raw_output.to_string(),
        },
        None => classify_merge(raw_output),
    }
}

/// Interpret a commit run's combined output.
pub fn extract_commit(raw_output: &str, agent: &AgentDescriptor) -> CommitOutcome {
    match locate_payload(raw_output, agent) {
        Some(payload) => CommitOutcome {
            success: read_bool(&payload, "success"),
            message: read_string(&payload, "message"),
            commits: read_commits(&payload),
            raw_output: raw_output.to_string(),
        },
        None => classify_commit(raw_output),
    }
}

/// Sanitize, fence-strip, unwrap the envelope, and locate the business JSON.
/// Falls back from the unwrapped reply text to the cleaned raw output.
fn locate_payload(raw_output: &str, agent: &AgentDescriptor) -> Option<Value> {
    let cleaned = strip_code_fence(&sanitize(raw_output));
    if let Some(reply) = unwrap_reply(&cleaned, agent.strategy)
        && let Some(payload) = locate_business_json(&reply)
    {
        debug!(agent = agent.id, "business JSON found in unwrapped reply");
        return Some(payload);
    }
    let payload = locate_business_json(&cleaned);
    if payload.is_some() {
        debug!(agent = agent.id, "business JSON found in raw output");
    }
    payload
}

/// Layer 1: recover the agent's reply text from its envelope. Absence of a
/// reply is not an error; the caller falls back to the raw output.
fn unwrap_reply(text: &str, strategy: ExtractionStrategy) -> Option<String> {
    match strategy {
        ExtractionStrategy::WrappedField { field } => {
            let envelope: Value = serde_json::from_str(text).ok()?;
            let reply = envelope.get(field)?.as_str()?;
            Some(strip_code_fence(reply))
        }
        ExtractionStrategy::StreamLastMatch {
            type_field,
            type_value,
            payload_path,
        } => {
            let mut last = None;
            for line in text.lines() {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                // Unparseable or non-matching lines are skipped, not fatal.
                let Ok(record) = serde_json::from_str::<Value>(line) else {
                    continue;
                };
                if record.get(type_field).and_then(Value::as_str) != Some(type_value) {
                    continue;
                }
                let mut node = Some(&record);
                for key in payload_path {
                    node = node.and_then(|n| n.get(key));
                }
                if let Some(payload) = node.and_then(Value::as_str) {
                    last = Some(payload.to_string());
                }
            }
            last
        }
    }
}

/// Layer 2: find a JSON object carrying a `success` key. Tries the whole
/// text first, then every balanced `{...}` candidate in order of appearance.
fn locate_business_json(text: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(text)
        && has_success_key(&value)
    {
        return Some(value);
    }
    for candidate in scan_json_objects(text) {
        if let Ok(value) = serde_json::from_str::<Value>(candidate)
            && has_success_key(&value)
        {
            return Some(value);
        }
    }
    None
}

fn has_success_key(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|object| object.contains_key("success"))
}

fn read_bool(value: &Value, key: &str) -> bool {
    value.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn read_string(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn read_string_array(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn read_commits(value: &Value) -> Vec<CommitEntry> {
    value
        .get("commits")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|item| CommitEntry {
                    sha: read_string(item, "sha"),
                    message: read_string(item, "message"),
                    files: read_string_array(item, "files"),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Keyword heuristic for output with no locatable JSON.
fn classify_merge(raw_output: &str) -> MergeOutcome {
    let lower = raw_output.to_lowercase();
    let failed = ["error", "fatal", "conflict"]
        .iter()
        .any(|keyword| lower.contains(keyword));
    debug!(failed, "falling back to keyword classification for merge");
    if failed {
        MergeOutcome::failure(MERGE_FAILED_MSG, raw_output)
    } else {
        MergeOutcome {
            success: true,
            message: MERGE_COMPLETED_MSG.to_string(),
            conflicts: Vec::new(),
            raw_output: raw_output.to_string(),
        }
    }
}

fn classify_commit(raw_output: &str) -> CommitOutcome {
    let lower = raw_output.to_lowercase();
    let failed = ["error", "fatal"]
        .iter()
        .any(|keyword| lower.contains(keyword));
    debug!(failed, "falling back to keyword classification for commit");
    if failed {
        CommitOutcome::failure(COMMIT_FAILED_MSG, raw_output)
    } else {
        CommitOutcome {
            success: true,
            message: COMMIT_COMPLETED_MSG.to_string(),
            commits: Vec::new(),
            raw_output: raw_output.to_string(),
        }
    }
}
