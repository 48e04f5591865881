//! In-place splice (`spec.md §4.J`): two pairs of sentinel markers delimit
//! machine-owned regions inside an otherwise user-authored file. Everything
//! outside the markers is preserved byte-for-byte; everything between a
//! matched pair is replaced wholesale on regeneration. Absence of markers
//! is permitted — a first-time compile inserts them.

pub const RUNTIME_START: &str = "// FLOW_WEAVER_RUNTIME_START — do not edit below this line";
pub const RUNTIME_END: &str = "// FLOW_WEAVER_RUNTIME_END";

pub fn body_start(function_name: &str) -> String {
    format!("  // FLOW_WEAVER_BODY_START:{function_name} — do not edit below this line")
}

pub fn body_end(function_name: &str) -> String {
    format!("  // FLOW_WEAVER_BODY_END:{function_name}")
}

/// Replaces the machine-owned runtime block, or appends one with markers if
/// absent.
pub fn splice_runtime(source: &str, runtime_block: &str) -> String {
    splice_region(source, RUNTIME_START, RUNTIME_END, runtime_block, |s| format!("{}\n\n{s}", runtime_with_markers(runtime_block)))
}

fn runtime_with_markers(runtime_block: &str) -> String {
    format!("{RUNTIME_START}\n{runtime_block}\n{RUNTIME_END}")
}

/// Replaces one workflow function's machine-owned body, or appends a
/// fresh marked block at the end of the file if absent.
pub fn splice_body(source: &str, function_name: &str, body: &str) -> String {
    let start = body_start(function_name);
    let end = body_end(function_name);
    splice_region(source, &start, &end, body, |s| format!("{s}\n\n{}\n{body}\n{end}\n", start))
}

fn splice_region(source: &str, start_marker: &str, end_marker: &str, replacement: &str, on_missing: impl FnOnce(&str) -> String) -> String {
    let Some(start_idx) = source.find(start_marker) else {
        return on_missing(source);
    };
    let Some(end_idx) = source[start_idx..].find(end_marker).map(|i| start_idx + i) else {
        return on_missing(source);
    };

    let before = &source[..start_idx];
    let after = &source[end_idx + end_marker.len()..];
    format!("{before}{start_marker}\n{replacement}\n{end_marker}{after}")
}

/// Strips every machine-owned region from `source`, leaving only
/// user-authored text — used before doc-comment classification so
/// generated code is never mistaken for an annotation (`spec.md §4.J`).
pub fn strip_generated_regions(source: &str) -> String {
    let mut out = source.to_string();
    loop {
        let Some(start_idx) = out.find(RUNTIME_START) else { break };
        let Some(end_idx) = out[start_idx..].find(RUNTIME_END).map(|i| start_idx + i + RUNTIME_END.len()) else { break };
        out.replace_range(start_idx..end_idx, "");
    }
    loop {
        let Some(start_idx) = out.find("// FLOW_WEAVER_BODY_START:") else { break };
        let Some(rel_end) = out[start_idx..].find("// FLOW_WEAVER_BODY_END:") else { break };
        let tail_start = start_idx + rel_end;
        let Some(line_end) = out[tail_start..].find('\n').map(|i| tail_start + i + 1) else { break };
        out.replace_range(start_idx..line_end, "");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_compile_appends_markers() {
        let source = "export function hello() {}\n";
        let out = splice_runtime(source, "const RUNTIME = 1;");
        assert!(out.contains(RUNTIME_START));
        assert!(out.contains(RUNTIME_END));
        assert!(out.contains("const RUNTIME = 1;"));
    }

    #[test]
    fn recompile_replaces_existing_region_only() {
        let source = format!("before\n{RUNTIME_START}\nold content\n{RUNTIME_END}\nafter");
        let out = splice_runtime(&source, "new content");
        assert!(out.contains("before"));
        assert!(out.contains("after"));
        assert!(out.contains("new content"));
        assert!(!out.contains("old content"));
    }

    #[test]
    fn body_splice_targets_named_function_only() {
        let source = format!(
            "{}\nold body\n{}\n\n{}\nother body\n{}",
            body_start("a"),
            body_end("a"),
            body_start("b"),
            body_end("b")
        );
        let out = splice_body(&source, "a", "new body");
        assert!(out.contains("new body"));
        assert!(out.contains("other body"));
        assert!(!out.contains("old body"));
    }

    #[test]
    fn strip_removes_runtime_and_body_regions() {
        let source = format!(
            "/** doc */\n{RUNTIME_START}\ngenerated\n{RUNTIME_END}\nfunction f() {{\n{}\nbody\n{}\n}}\n",
            body_start("f"),
            body_end("f")
        );
        let stripped = strip_generated_regions(&source);
        assert!(stripped.contains("/** doc */"));
        assert!(!stripped.contains("generated"));
        assert!(!stripped.contains("body\n"));
    }

    #[test]
    fn bytes_outside_markers_are_untouched() {
        let source = format!("// user comment\n{RUNTIME_START}\nx\n{RUNTIME_END}\n// trailing user comment\n");
        let out = splice_runtime(&source, "y");
        assert!(out.starts_with("// user comment\n"));
        assert!(out.ends_with("// trailing user comment\n"));
    }
}
