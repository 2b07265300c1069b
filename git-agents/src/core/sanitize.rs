//! Terminal-output sanitation: escape-sequence stripping and markdown fence
//! removal. Agents colorize output, spin progress indicators, and wrap JSON
//! in code fences; everything downstream assumes this module ran first.

use std::sync::LazyLock;

// CSI (`ESC [ params intermediates final`) and OSC (`ESC ] ... BEL|ST`)
// sequences. Stray escape bytes outside these forms fall to the control
// filter below.
static ANSI_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"\x1b\[[0-?]*[ -/]*[@-~]|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)")
        .expect("valid escape-sequence pattern")
});

/// Normalize CRLF to LF, strip ANSI CSI/OSC sequences, and drop every
/// scalar below U+0020 except tab, LF, and CR.
pub fn sanitize(text: &str) -> String {
    let unified = text.replace("\r\n", "\n");
    let stripped = ANSI_RE.replace_all(&unified, "");
    stripped
        .chars()
        .filter(|&c| c >= '\u{20}' || c == '\t' || c == '\n' || c == '\r')
        .collect()
}

/// Remove a single enclosing markdown code fence, optionally tagged (e.g.
/// ` ```json `), returning the inner content trimmed. Text that is not
/// exactly one fenced block comes back trimmed but otherwise unchanged.
/// Idempotent: stripping twice equals stripping once.
pub fn strip_code_fence(text: &str) -> String {
    let trimmed = text.trim();
    match fenced_body(trimmed) {
        Some(body) => body.trim().to_string(),
        None => trimmed.to_string(),
    }
}

fn fenced_body(trimmed: &str) -> Option<&str> {
    let rest = trimmed.strip_prefix("```")?;
    let newline = rest.find('\n')?;
    let (tag, body) = rest.split_at(newline);
    if !tag.trim().chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    let body = body.strip_suffix("```")?;
    // A second fence inside means this is not a single enclosing block.
    if body.contains("```") {
        return None;
    }
    Some(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_csi_sequences() {
        let colored = "\x1b[1;32msuccess\x1b[0m done";
        assert_eq!(sanitize(colored), "success done");
    }

    #[test]
    fn sanitize_strips_osc_sequences() {
        let titled = "\x1b]0;window title\x07output\x1b]8;;https://example.com\x1b\\link";
        assert_eq!(sanitize(titled), "outputlink");
    }

    #[test]
    fn sanitize_normalizes_crlf() {
        assert_eq!(sanitize("a\r\nb"), "a\nb");
    }

    #[test]
    fn sanitize_keeps_tab_lf_cr_drops_other_controls() {
        let input: String = (0u8..0x20).map(char::from).chain("x".chars()).collect();
        assert_eq!(sanitize(&input), "\t\n\rx");
    }

    #[test]
    fn sanitize_drops_stray_escape_byte() {
        assert_eq!(sanitize("a\x1bb"), "ab");
    }

    #[test]
    fn strip_fence_removes_tagged_fence() {
        let fenced = "```json\n{\"success\":true}\n```";
        assert_eq!(strip_code_fence(fenced), "{\"success\":true}");
    }

    #[test]
    fn strip_fence_removes_untagged_fence() {
        assert_eq!(strip_code_fence("```\nhello\n```"), "hello");
    }

    #[test]
    fn strip_fence_leaves_plain_text_trimmed() {
        assert_eq!(strip_code_fence("  plain text \n"), "plain text");
    }

    #[test]
    fn strip_fence_leaves_multiple_fences_alone() {
        let two = "```\none\n```\nmiddle\n```\ntwo\n```";
        assert_eq!(strip_code_fence(two), two);
    }

    #[test]
    fn strip_fence_is_idempotent() {
        let cases = [
            "```json\n{\"a\":1}\n```",
            "```\ntext\n```",
            "no fence at all",
            "```\n```json\n{\"a\":1}\n```\n```",
            "```",
            "",
        ];
        for case in cases {
            let once = strip_code_fence(case);
            assert_eq!(strip_code_fence(&once), once, "input {case:?}");
        }
    }
}
