//! Balanced-object scanner: locates top-level `{...}` JSON object substrings
//! inside arbitrary text. Quote and escape aware, so braces in string
//! literals never affect the depth count.

/// Collect every top-level brace-balanced `{...}` substring, in order of
/// appearance. Each returned slice has matching open/close braces and
/// starts/ends outside any string literal; whether it is meaningful JSON is
/// the caller's problem.
///
/// Double quotes only toggle string state inside a candidate, so stray
/// quotes in surrounding prose cannot desynchronize the scan.
pub fn scan_json_objects(text: &str) -> Vec<&str> {
    let mut objects = Vec::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut start = 0usize;

    for (i, ch) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' if depth > 0 => in_string = true,
            '{' => {
                if depth == 0 {
                    start = i;
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    objects.push(&text[start..=i]);
                }
            }
            _ => {}
        }
    }
    objects
}
