//! Byte scanners that find a comment block in a file's raw contents.
//!
//! Both entry points work on the immutable file bytes and return a span
//! (`start..end`) covering the comment including its delimiters. Nothing is
//! copied until the caller materializes the span.

use std::ops::Range;

const BOM: &[u8] = b"\xEF\xBB\xBF";

/// Find the comment block directly above the declaration starting at
/// `decl_start`.
///
/// A block comment ending on the declaration's own line, before it, wins.
/// Otherwise the scan starts above that line, and a fully blank line
/// between the comment and the declaration yields `None`.
pub fn find_preceding_comment(src: &[u8], decl_start: usize) -> Option<Range<usize>> {
    if decl_start == 0 || decl_start > src.len() {
        return None;
    }

    let ls = line_start(src, decl_start);
    let same_line = trim_end_blanks(src, ls, decl_start);
    if same_line > ls && src[..same_line].ends_with(b"*/") {
        return block_comment_ending_at(src, same_line);
    }

    // Back up to the start of the declaration's line, then over whitespace.
    let mut idx = ls;
    while idx > 0 && src[idx - 1].is_ascii_whitespace() {
        if src[idx - 1] == b'\n' {
            let prev = line_start(src, idx - 1);
            if src[prev..idx - 1].iter().all(u8::is_ascii_whitespace) {
                return None;
            }
        }
        idx -= 1;
    }
    if idx == 0 {
        return None;
    }
    let end = idx;

    if src[..end].ends_with(b"*/") {
        return block_comment_ending_at(src, end);
    }

    // Contiguous run of `//` lines, walked upward.
    let mut start = None;
    let mut cur = end;
    loop {
        let ls = line_start(src, cur);
        let first = skip_blanks(src, ls, cur);
        if !src[first..cur].starts_with(b"//") {
            break;
        }
        start = Some(first);
        if ls == 0 {
            break;
        }
        cur = ls - 1;
    }
    start.map(|s| s..end)
}

/// Find the comment that opens the file, ignoring a byte-order mark and
/// leading whitespace.
pub fn find_leading_file_comment(src: &[u8]) -> Option<Range<usize>> {
    let mut pos = if src.starts_with(BOM) { BOM.len() } else { 0 };
    while pos < src.len() && matches!(src[pos], b' ' | b'\t' | b'\r' | b'\n') {
        pos += 1;
    }

    let rest = &src[pos..];
    if rest.starts_with(b"/*") {
        let close = rest[2..].windows(2).position(|w| w == b"*/")?;
        return Some(pos..pos + 2 + close + 2);
    }
    if !rest.starts_with(b"//") {
        return None;
    }

    let mut cur = pos;
    while cur < src.len() {
        if src[cur] != b'\r' && src[cur] != b'\n' {
            cur += 1;
            continue;
        }
        let after = if src[cur] == b'\r' && src.get(cur + 1) == Some(&b'\n') {
            cur + 2
        } else {
            cur + 1
        };
        cur = after;
        let peek = skip_blanks(src, after, src.len());
        if !src[peek..].starts_with(b"//") {
            break;
        }
    }
    Some(pos..cur)
}

/// Span of the block comment whose `*/` ends at `end`: the first `/*` after
/// the previous comment's close. A `*/` that is the tail of a `/*/` opener
/// is not a close.
fn block_comment_ending_at(src: &[u8], end: usize) -> Option<Range<usize>> {
    let body = &src[..end - 2];
    let from = body
        .windows(2)
        .enumerate()
        .filter(|&(i, w)| w == b"*/" && (i == 0 || body[i - 1] != b'/'))
        .last()
        .map_or(0, |(i, _)| i + 2);
    let open = body[from..].windows(2).position(|w| w == b"/*")?;
    Some(from + open..end)
}

/// End of `src[from..to]` with trailing spaces and tabs dropped.
fn trim_end_blanks(src: &[u8], from: usize, to: usize) -> usize {
    let mut i = to;
    while i > from && matches!(src[i - 1], b' ' | b'\t') {
        i -= 1;
    }
    i
}

/// Offset of the first byte of the line containing `pos`.
fn line_start(src: &[u8], pos: usize) -> usize {
    src[..pos]
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |nl| nl + 1)
}

/// Skip spaces and tabs in `src[from..to]`.
fn skip_blanks(src: &[u8], from: usize, to: usize) -> usize {
    let mut i = from;
    while i < to && matches!(src[i], b' ' | b'\t') {
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preceding<'a>(src: &'a str, marker: &str) -> Option<&'a str> {
        let offset = src.find(marker).unwrap();
        find_preceding_comment(src.as_bytes(), offset).map(|r| &src[r])
    }

    #[test]
    fn block_comment_above() {
        let src = "int a;\n/**\n * Max size.\n */\n#define MAX 4\n";
        assert_eq!(preceding(src, "#define"), Some("/**\n * Max size.\n */"));
    }

    #[test]
    fn blank_line_breaks_association() {
        let src = "/** Unrelated. */\n\n#define MAX 4\n";
        assert_eq!(preceding(src, "#define"), None);
    }

    #[test]
    fn whitespace_only_line_breaks_association() {
        let src = "// Unrelated.\n  \t\n#define MAX 4\n";
        assert_eq!(preceding(src, "#define"), None);
    }

    #[test]
    fn line_comment_run() {
        let src = "int a;\n// First line.\n  // Second line.\n#define MAX 4\n";
        assert_eq!(
            preceding(src, "#define"),
            Some("// First line.\n  // Second line.")
        );
    }

    #[test]
    fn line_comment_run_stops_at_blank() {
        let src = "// Old.\n\n/// New.\n#define MAX 4\n";
        assert_eq!(preceding(src, "#define"), Some("/// New."));
    }

    #[test]
    fn line_comment_run_at_file_start() {
        let src = "// Top.\n#define MAX 4\n";
        assert_eq!(preceding(src, "#define"), Some("// Top."));
    }

    #[test]
    fn trailing_code_comment_is_not_a_run() {
        let src = "int a; // note\n#define MAX 4\n";
        assert_eq!(preceding(src, "#define"), None);
    }

    #[test]
    fn nothing_above() {
        assert_eq!(preceding("int a;\n#define MAX 4\n", "#define"), None);
        assert_eq!(find_preceding_comment(b"#define MAX 4\n", 0), None);
        assert_eq!(find_preceding_comment(b"abc", 10), None);
    }

    #[test]
    fn comment_text_containing_opener() {
        let src = "/** Matches dir/*.h headers. */\n#define GLOB 1\n";
        assert_eq!(preceding(src, "#define"), Some("/** Matches dir/*.h headers. */"));
    }

    #[test]
    fn opener_search_stops_at_previous_comment() {
        let src = "/* a */ int x;\n/** See dir/*.c. */\nint f(void);\n";
        assert_eq!(preceding(src, "int f"), Some("/** See dir/*.c. */"));
    }

    #[test]
    fn slash_star_slash_is_an_opener() {
        let src = "/*/ odd */\nint f(void);\n";
        assert_eq!(preceding(src, "int f"), Some("/*/ odd */"));
    }

    #[test]
    fn block_comment_on_same_line() {
        let src = "int a;\n/** Doc. */ int f(void);\n";
        assert_eq!(preceding(src, "int f"), Some("/** Doc. */"));
        let src = "/** Above. */\nint a; int b;\n";
        assert_eq!(preceding(src, "int b"), Some("/** Above. */"));
    }

    #[test]
    fn empty_block_comment() {
        let src = "/**/\n#define MAX 4\n";
        assert_eq!(preceding(src, "#define"), Some("/**/"));
    }

    #[test]
    fn leading_block_comment_with_bom() {
        let src = "\u{FEFF}\n  /* File docs. */\n#pragma once\n";
        let span = find_leading_file_comment(src.as_bytes()).unwrap();
        assert_eq!(&src[span], "/* File docs. */");
    }

    #[test]
    fn leading_unterminated_block_comment() {
        assert_eq!(find_leading_file_comment(b"/* never closed"), None);
    }

    #[test]
    fn leading_line_comment_run() {
        let src = "// One\r\n  // Two\n\n// Three\nint x;\n";
        let span = find_leading_file_comment(src.as_bytes()).unwrap();
        assert_eq!(&src[span], "// One\r\n  // Two\n");
    }

    #[test]
    fn leading_code_has_no_comment() {
        assert_eq!(find_leading_file_comment(b"#include <x.h>\n/* late */"), None);
        assert_eq!(find_leading_file_comment(b"   \n"), None);
    }
}
