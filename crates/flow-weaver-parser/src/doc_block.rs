//! Doc-block extraction: finds `/** ... */` comments attached to a
//! function-like declaration and turns them into plain tag lines
//! (`spec.md §4.D`, §6: "Whitespace-tolerant. Leading `*` on each line is
//! stripped.").

use once_cell::sync::Lazy;
use regex::Regex;

static DOC_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)/\*\*(.*?)\*/").unwrap());
static NEXT_DECL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:export\s+)?(?:async\s+)?(?:function\s+(\w+)|const\s+(\w+)\s*=)").unwrap());

#[derive(Debug, Clone, PartialEq)]
pub struct RawDocBlock {
    /// Name of the function-like declaration immediately following the
    /// comment; `None` when the comment is dangling (not attached to any
    /// declaration), which callers should ignore.
    pub function_name: Option<String>,
    /// Tag lines with the leading `*`/`/**`/`*/` stripped, blank lines and
    /// the free-text description excluded from structured parsing but kept
    /// for `@description`-less blocks.
    pub lines: Vec<String>,
}

/// Scans `source` for every `/** ... */` block and pairs it with the
/// function-like declaration that immediately follows.
pub fn extract_doc_blocks(source: &str) -> Vec<RawDocBlock> {
    let mut blocks = Vec::new();
    for m in DOC_COMMENT.find_iter(source) {
        let inner = &source[m.start() + 2..m.end() - 2];
        let lines = strip_comment_lines(inner);
        let after = &source[m.end()..];
        let function_name = NEXT_DECL
            .captures(after)
            .and_then(|c| c.get(1).or_else(|| c.get(2)))
            .map(|g| g.as_str().to_string());
        blocks.push(RawDocBlock { function_name, lines });
    }
    blocks
}

fn strip_comment_lines(inner: &str) -> Vec<String> {
    inner
        .lines()
        .map(|line| {
            let trimmed = line.trim_start();
            let trimmed = trimmed.strip_prefix('*').unwrap_or(trimmed);
            trimmed.trim().to_string()
        })
        .filter(|l| !l.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_block_attached_to_function() {
        let src = "/**\n * @flowWeaver nodeType\n * @name Double\n */\nfunction double(x: number): number { return x * 2; }";
        let blocks = extract_doc_blocks(src);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].function_name.as_deref(), Some("double"));
        assert_eq!(blocks[0].lines, vec!["@flowWeaver nodeType", "@name Double"]);
    }

    #[test]
    fn extracts_block_attached_to_arrow_const() {
        let src = "/** @flowWeaver nodeType */\nconst add1 = (x: number): number => x + 1;";
        let blocks = extract_doc_blocks(src);
        assert_eq!(blocks[0].function_name.as_deref(), Some("add1"));
    }

    #[test]
    fn dangling_comment_has_no_function() {
        let src = "/** just a file header */\n\nexport const VERSION = 1;";
        let blocks = extract_doc_blocks(src);
        assert_eq!(blocks[0].function_name, None);
    }
}
