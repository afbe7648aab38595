//! The keyword set recognized across the supported C-family and Python
//! dialects. Anything outside this set that still looks like an identifier
//! normalizes to `ID`, which is what lets the fingerprinting stages survive
//! a wholesale identifier-renaming pass.

use once_cell::sync::Lazy;
use std::collections::HashSet;

pub(crate) static KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // control flow
        "if", "else", "elif", "for", "while", "return", "break", "continue", "try", "except",
        "finally", "catch", "throw", "switch", "case", "default", "do", "goto", "yield",
        // declarations / structure
        "class", "def", "function", "lambda", "struct", "enum", "trait", "impl", "fn", "let",
        "var", "const", "mut",
        // module system
        "import", "from", "as", "export", "package", "namespace", "use",
        // OOP
        "new", "this", "self", "super", "extends", "implements", "interface",
        // visibility / modifiers
        "public", "private", "protected", "static", "final", "abstract", "virtual", "override",
        "async", "await",
        // primitive types
        "void", "int", "float", "double", "boolean", "bool", "char", "string", "str", "long",
        "short", "byte", "u8", "u16", "u32", "u64", "i8", "i16", "i32", "i64", "usize", "isize",
        // literal keywords
        "true", "false", "null", "none", "nil", "undefined",
    ]
    .into_iter()
    .collect()
});

pub(crate) fn lookup(lowered: &str) -> Option<&'static str> {
    KEYWORDS.get(lowered).copied()
}
