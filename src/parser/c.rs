//! C declaration walker.
//!
//! A byte-oriented scanner, not a compiler front end. Comments, preprocessor
//! lines and string contents are blanked out (every byte offset stays put),
//! what remains is split into top-level statements, and each statement is
//! classified with a handful of patterns:
//!
//! - `#define NAME ...` → macro
//! - prototypes and definitions → function
//! - `struct`/`union`/`enum` bodies → record with members
//! - `typedef ...` → typedef (plus the record for `typedef struct {...} T;`)
//!
//! Everything else (variables, forward declarations, stray tokens) is
//! skipped. `extern "C" { ... }` wrappers are transparent.

use crate::comment::find_preceding_comment;
use crate::model::{EntityKind, Member};
use crate::parser::expr;
use regex::Regex;
use std::collections::HashMap;
use std::ops::Range;
use std::sync::LazyLock;

static RE_DEFINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#\s*define\s+([A-Za-z_]\w*)").unwrap());

static RE_EXTERN_C: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^extern\s*"C(?:\+\+)?"\s*"#).unwrap());

static RE_EXTERN_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^extern\s*"C(?:\+\+)?"\s*$"#).unwrap());

static RE_TYPEDEF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^typedef\b").unwrap());

// `struct Tag`, `typedef enum`, `static const union U`, ... before a `{`
static RE_RECORD_HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:typedef|static|extern|const|volatile)\s+)*(struct|union|enum)(?:\s+([A-Za-z_]\w*))?$")
        .unwrap()
});

// `(*name)` or `(*name[4])` in a function-pointer declarator
static RE_FN_POINTER_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(\s*\*\s*([A-Za-z_]\w*)\s*(?:\[[^\]]*\]\s*)*\)").unwrap()
});

// Last identifier of a declaration, before any array dimensions and `;`
static RE_TRAILING_IDENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z_]\w*)\s*(?:\[[^\]]*\]\s*)*;?\s*$").unwrap()
});

/// Identifiers that can precede `(` without naming a function.
const NOT_FUNCTION_NAMES: &[&str] = &[
    "if",
    "while",
    "for",
    "switch",
    "return",
    "sizeof",
    "typedef",
    "_Static_assert",
    "static_assert",
    "__attribute__",
    "__declspec",
];

/// Compiler extensions whose parenthesized argument is dropped before
/// classification.
const ATTRIBUTE_KEYWORDS: &[&str] = &["__attribute__", "__declspec"];

/// One declaration as seen by the walker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub kind: EntityKind,
    pub name: String,
    pub signature: String,
    /// Byte offset of the first character of the declaration.
    pub offset: usize,
    /// 1-based line of `offset`.
    pub line: usize,
    /// Doc comment attached by the walker. Macros never get one.
    pub raw_comment: Option<String>,
    pub members: Vec<Member>,
}

impl Declaration {
    fn new(kind: EntityKind, name: String, signature: String, offset: usize) -> Self {
        Self {
            kind,
            name,
            signature,
            offset,
            line: 0,
            raw_comment: None,
            members: Vec::new(),
        }
    }
}

/// Views of one source file with different parts blanked out. All three
/// have the same length as the source.
struct Views {
    /// Comments blanked.
    stripped: Vec<u8>,
    /// Comments and preprocessor lines blanked.
    code: Vec<u8>,
    /// Additionally, string and char literal contents blanked.
    masked: Vec<u8>,
}

/// A top-level statement: `start..end` in the source, plus the interior of
/// its first top-level brace group.
#[derive(Debug)]
struct Statement {
    start: usize,
    end: usize,
    body: Option<Range<usize>>,
}

/// Walk a source file and return its declarations in source order.
pub fn walk(src: &[u8]) -> Vec<Declaration> {
    let stripped = strip_comments(src);
    let (code, directives) = blank_directives(&stripped);
    let masked = blank_literals(&code);
    let views = Views {
        stripped,
        code,
        masked,
    };

    let mut decls: Vec<Declaration> = directives
        .into_iter()
        .filter_map(|range| macro_decl(&views.stripped, range))
        .collect();
    for stmt in split_statements(&views) {
        classify(&stmt, &views, &mut decls);
    }
    decls.sort_by_key(|d| d.offset);

    let lines = LineIndex::new(src);
    for decl in &mut decls {
        decl.line = lines.line_of(decl.offset);
        if decl.kind != EntityKind::Macro {
            decl.raw_comment = doc_comment_above(src, decl.offset);
        }
    }
    decls
}

// -- Blanking passes ----------------------------------------------------------

fn blank(bytes: &mut [u8]) {
    for b in bytes.iter_mut().filter(|b| **b != b'\n') {
        *b = b' ';
    }
}

/// Index of the closing quote of the literal opening at `start`, or of the
/// end of the line when it is unterminated.
fn literal_end(src: &[u8], start: usize) -> usize {
    let quote = src[start];
    let mut i = start + 1;
    while i < src.len() {
        match src[i] {
            b'\\' => i += 2,
            b'\n' => return i,
            c if c == quote => return i,
            _ => i += 1,
        }
    }
    src.len()
}

fn strip_comments(src: &[u8]) -> Vec<u8> {
    let mut out = src.to_vec();
    let mut i = 0;
    while i < src.len() {
        match (src[i], src.get(i + 1)) {
            (b'"' | b'\'', _) => i = literal_end(src, i) + 1,
            (b'/', Some(b'*')) => {
                let end = src[i + 2..]
                    .windows(2)
                    .position(|w| w == b"*/")
                    .map_or(src.len(), |p| i + 2 + p + 2);
                blank(&mut out[i..end]);
                i = end;
            }
            (b'/', Some(b'/')) => {
                let end = src[i..]
                    .iter()
                    .position(|&b| b == b'\n')
                    .map_or(src.len(), |p| i + p);
                blank(&mut out[i..end]);
                i = end;
            }
            _ => i += 1,
        }
    }
    out
}

/// Blank every preprocessor directive (with `\` continuations) and return
/// the directive spans.
fn blank_directives(stripped: &[u8]) -> (Vec<u8>, Vec<Range<usize>>) {
    let mut code = stripped.to_vec();
    let mut directives = Vec::new();
    let mut pos = 0;
    while pos < stripped.len() {
        let mut end = line_end(stripped, pos);
        let first = pos + stripped[pos..end].iter().take_while(|&&b| matches!(b, b' ' | b'\t')).count();
        if first < end && stripped[first] == b'#' {
            while continues(&stripped[first..end]) && end < stripped.len() {
                end = line_end(stripped, end + 1);
            }
            blank(&mut code[first..end]);
            directives.push(first..end);
        }
        pos = end + 1;
    }
    (code, directives)
}

fn blank_literals(code: &[u8]) -> Vec<u8> {
    let mut masked = code.to_vec();
    let mut i = 0;
    while i < code.len() {
        if matches!(code[i], b'"' | b'\'') {
            let close = literal_end(code, i).min(code.len());
            blank(&mut masked[i + 1..close]);
            i = close + 1;
        } else {
            i += 1;
        }
    }
    masked
}

fn line_end(src: &[u8], from: usize) -> usize {
    src[from..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(src.len(), |p| from + p)
}

/// Whether a directive line ends with a `\` continuation.
fn continues(line: &[u8]) -> bool {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    line.ends_with(b"\\")
}

// -- Statements ---------------------------------------------------------------

fn split_statements(views: &Views) -> Vec<Statement> {
    let masked = &views.masked;
    let len = masked.len();
    let mut out = Vec::new();
    let mut i = 0;

    'outer: while i < len {
        while i < len && masked[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= len {
            break;
        }
        // Closing brace of an `extern "C"` block, or an empty statement.
        if matches!(masked[i], b'}' | b';') {
            i += 1;
            continue;
        }

        let start = i;
        let mut depth = 0usize;
        let mut body: Option<Range<usize>> = None;
        while i < len {
            match masked[i] {
                b'(' | b'[' => depth += 1,
                b')' | b']' => depth = depth.saturating_sub(1),
                b';' if depth == 0 => {
                    i += 1;
                    break;
                }
                b'}' if depth == 0 => break,
                b'{' if depth == 0 => {
                    let first = body.is_none();
                    if first && is_extern_block(&views.code[start..i]) {
                        i += 1;
                        continue 'outer;
                    }
                    let close = matching_brace(masked, i);
                    if first {
                        body = Some(i + 1..close);
                    }
                    let header = start..i;
                    i = (close + 1).min(len);
                    if first && is_function_definition(&masked[header]) {
                        break;
                    }
                    continue;
                }
                _ => {}
            }
            i += 1;
        }
        out.push(Statement {
            start,
            end: i,
            body,
        });
    }
    out
}

/// Index of the `}` matching the `{` at `open`, or the end of input.
fn matching_brace(masked: &[u8], open: usize) -> usize {
    let mut depth = 0usize;
    for (i, &b) in masked.iter().enumerate().skip(open) {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return i;
                }
            }
            _ => {}
        }
    }
    masked.len()
}

fn is_extern_block(header: &[u8]) -> bool {
    RE_EXTERN_BLOCK.is_match(String::from_utf8_lossy(header).trim())
}

fn is_function_definition(header: &[u8]) -> bool {
    let head = strip_attributes(&collapse(header));
    head.ends_with(')') && !RE_TYPEDEF.is_match(&head) && function_name(&head).is_some()
}

// -- Classification -----------------------------------------------------------

fn classify(stmt: &Statement, views: &Views, out: &mut Vec<Declaration>) {
    // Drop an `extern "C"` prefix on a single declaration.
    let text = String::from_utf8_lossy(&views.code[stmt.start..stmt.end]);
    let start = stmt.start + RE_EXTERN_C.find(&text).map_or(0, |m| m.end());
    let head_end = stmt.body.as_ref().map_or(stmt.end, |b| b.start - 1).max(start);
    let head = strip_attributes(&collapse(&views.masked[start..head_end]));
    if head.is_empty() {
        return;
    }

    if RE_TYPEDEF.is_match(&head) {
        typedef_decls(stmt, start, &head, views, out);
        return;
    }

    if let Some(body) = &stmt.body {
        if let Some(caps) = RE_RECORD_HEAD.captures(&head) {
            let kind = record_kind(&caps[1]);
            let tag = caps.get(2).map_or("", |m| m.as_str());
            out.push(record_decl(kind, tag.to_string(), body, start, views));
            return;
        }
    }

    if let Some(name) = function_name(&head) {
        let signature = match &stmt.body {
            Some(_) => format!("{};", collapse(&views.code[start..head_end])),
            None => collapse(&views.code[start..stmt.end]),
        };
        out.push(Declaration::new(EntityKind::Function, name, signature, start));
    }
}

fn typedef_decls(stmt: &Statement, start: usize, head: &str, views: &Views, out: &mut Vec<Declaration>) {
    let Some(body) = &stmt.body else {
        let name = RE_FN_POINTER_NAME
            .captures(head)
            .map(|caps| caps[1].to_string())
            .or_else(|| trailing_ident(head))
            .or_else(|| function_name(head));
        if let Some(name) = name {
            let signature = collapse(&views.code[start..stmt.end]);
            out.push(Declaration::new(EntityKind::Typedef, name, signature, start));
        }
        return;
    };

    let Some(caps) = RE_RECORD_HEAD.captures(head) else {
        return;
    };
    let keyword = &caps[1];
    let tag = caps.get(2).map_or("", |m| m.as_str());

    // Declarators after the closing brace: `Name;` or `Name, *NamePtr;`
    let tail_start = (body.end + 1).min(stmt.end);
    let tail = strip_attributes(&collapse(&views.masked[tail_start..stmt.end]));
    let declarator = tail.trim_end_matches(';').split(',').next().unwrap_or("").trim().to_string();
    let name = trailing_ident(&declarator);

    let record_name = if tag.is_empty() {
        name.clone().unwrap_or_default()
    } else {
        tag.to_string()
    };
    out.push(record_decl(record_kind(keyword), record_name, body, start, views));

    if let Some(name) = name {
        let target = if tag.is_empty() {
            format!("{} {{ ... }}", keyword)
        } else {
            format!("{} {}", keyword, tag)
        };
        let signature = format!("typedef {} {};", target, declarator);
        out.push(Declaration::new(EntityKind::Typedef, name, signature, start));
    }
}

fn record_kind(keyword: &str) -> EntityKind {
    match keyword {
        "union" => EntityKind::Union,
        "enum" => EntityKind::Enum,
        _ => EntityKind::Struct,
    }
}

fn record_decl(kind: EntityKind, name: String, body: &Range<usize>, offset: usize, views: &Views) -> Declaration {
    let keyword = kind.label().to_lowercase();
    let signature = format!("{} {}", keyword, name).trim_end().to_string();
    let mut decl = Declaration::new(kind, name, signature, offset);
    decl.members = if kind == EntityKind::Enum {
        enumerators(body, views)
    } else {
        fields(body, views)
    };
    decl
}

fn fields(body: &Range<usize>, views: &Views) -> Vec<Member> {
    split_top_level(&views.masked, body.clone(), b';')
        .into_iter()
        .map(|r| collapse(&views.code[r]))
        .filter(|field| !field.is_empty())
        .map(|field| Member::Field(format!("{};", field)))
        .collect()
}

fn enumerators(body: &Range<usize>, views: &Views) -> Vec<Member> {
    let mut known: HashMap<String, i64> = HashMap::new();
    let mut next = Some(0i64);
    let mut members = Vec::new();

    for range in split_top_level(&views.masked, body.clone(), b',') {
        let item = collapse(&views.code[range]);
        let (name, init) = match item.split_once('=') {
            Some((name, init)) => (name.trim(), Some(init.trim())),
            None => (item.as_str(), None),
        };
        if name.is_empty() {
            continue;
        }
        let value = match init {
            Some(init) => expr::eval(init, &known),
            None => next,
        };
        if let Some(v) = value {
            known.insert(name.to_string(), v);
        }
        next = value.and_then(|v| v.checked_add(1));
        members.push(Member::Enumerator {
            name: name.to_string(),
            value,
        });
    }
    members
}

/// Split `range` at `sep` bytes that are not nested in brackets.
fn split_top_level(masked: &[u8], range: Range<usize>, sep: u8) -> Vec<Range<usize>> {
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut piece_start = range.start;
    for i in range.clone() {
        match masked[i] {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            b if b == sep && depth == 0 => {
                pieces.push(piece_start..i);
                piece_start = i + 1;
            }
            _ => {}
        }
    }
    pieces.push(piece_start..range.end);
    pieces
}

/// Name of the function declared by `head`, if it declares one.
fn function_name(head: &str) -> Option<String> {
    let open = head.find('(')?;
    let (prefix, params) = head.split_at(open);
    if prefix.contains(['=', '[']) || params[1..].trim_start().starts_with('*') {
        return None;
    }
    let prefix = prefix.trim_end();
    let name_start = prefix
        .char_indices()
        .rev()
        .find(|&(_, c)| !is_ident_char(c))
        .map_or(0, |(p, c)| p + c.len_utf8());
    let name = &prefix[name_start..];
    let return_type = prefix[..name_start].trim();
    let valid = !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && !return_type.is_empty()
        && !NOT_FUNCTION_NAMES.contains(&name);
    valid.then(|| name.to_string())
}

/// Identifier characters, including extended (non-ASCII) ones and the
/// replacement character left by undecodable bytes.
fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || !c.is_ascii()
}

fn trailing_ident(text: &str) -> Option<String> {
    RE_TRAILING_IDENT
        .captures(text)
        .map(|caps| caps[1].to_string())
        .filter(|name| name != "typedef")
}

/// Remove `__attribute__((...))` and `__declspec(...)` from a collapsed line.
fn strip_attributes(text: &str) -> String {
    let mut out = text.to_string();
    for keyword in ATTRIBUTE_KEYWORDS {
        while let Some(at) = out.find(keyword) {
            let after = at + keyword.len();
            let open = after + (out.len() - after - out[after..].trim_start().len());
            let end = if out[open..].starts_with('(') {
                balanced_end(&out, open)
            } else {
                after
            };
            out.replace_range(at..end, " ");
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Byte index just past the `)` matching the `(` at `open`.
fn balanced_end(text: &str, open: usize) -> usize {
    let mut depth = 0usize;
    for (i, c) in text[open..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return open + i + 1;
                }
            }
            _ => {}
        }
    }
    text.len()
}

fn collapse(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn macro_decl(stripped: &[u8], range: Range<usize>) -> Option<Declaration> {
    let text = String::from_utf8_lossy(&stripped[range.clone()]);
    let name = RE_DEFINE.captures(&text)?[1].to_string();
    let joined = text
        .lines()
        .map(|line| {
            let line = line.trim_end();
            line.strip_suffix('\\').unwrap_or(line)
        })
        .collect::<Vec<_>>()
        .join(" ");
    let signature = collapse(joined.as_bytes());
    Some(Declaration::new(EntityKind::Macro, name, signature, range.start))
}

/// The comment above `offset`, when it is Doxygen-style (`/**`, `/*!`,
/// `///`, `//!`).
fn doc_comment_above(src: &[u8], offset: usize) -> Option<String> {
    let span = find_preceding_comment(src, offset)?;
    let raw = &src[span];
    let is_doc = (raw.starts_with(b"/**") && raw != b"/**/")
        || raw.starts_with(b"/*!")
        || raw.starts_with(b"///")
        || raw.starts_with(b"//!");
    is_doc.then(|| String::from_utf8_lossy(raw).into_owned())
}

/// Maps byte offsets to 1-based line numbers.
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(src: &[u8]) -> Self {
        let starts = std::iter::once(0)
            .chain(src.iter().enumerate().filter(|&(_, &b)| b == b'\n').map(|(i, _)| i + 1))
            .collect();
        Self { starts }
    }

    fn line_of(&self, offset: usize) -> usize {
        self.starts.partition_point(|&start| start <= offset)
    }
}
