//! Comment stripping.
//!
//! Block and line comments are replaced with a single space rather than
//! removed outright, so a comment that sits between two tokens on the same
//! physical line doesn't accidentally fuse them together.

use once_cell::sync::Lazy;
use regex::Regex;

static BLOCK_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("static regex"));
static LINE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"//[^\n]*").expect("static regex"));
static HASH_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"#[^\n]*").expect("static regex"));

/// Strips `/* ... */`, `// ...` and `# ...` comments from `source`, replacing
/// each match with a single space so line/column structure downstream is
/// unaffected.
pub fn strip_comments(source: &str) -> String {
    let without_block = BLOCK_COMMENT.replace_all(source, " ");
    let without_line = LINE_COMMENT.replace_all(&without_block, " ");
    HASH_COMMENT.replace_all(&without_line, " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_block_comment_spanning_lines() {
        let src = "a /* multi\nline */ b";
        let out = strip_comments(src);
        assert!(!out.contains("multi"));
        assert!(out.contains("a "));
        assert!(out.contains(" b"));
    }

    #[test]
    fn strips_line_and_hash_comments() {
        let src = "x = 1 // trailing\ny = 2 # trailing";
        let out = strip_comments(src);
        assert!(!out.contains("trailing"));
    }

    #[test]
    fn block_comment_is_non_greedy() {
        let src = "/* one */ code /* two */";
        let out = strip_comments(src);
        assert!(out.contains("code"));
        assert!(!out.contains("one"));
        assert!(!out.contains("two"));
    }
}
