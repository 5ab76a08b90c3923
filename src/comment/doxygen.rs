//! Doxygen-style tag rendering: `@param`, `@return`, `@note`, `@warning`
//! and `@code` blocks become Markdown sections.
//!
//! The renderer walks the stripped comment line by line. Exactly one
//! [`Target`] receives prose at any time; a tag line switches it. Unknown
//! tags (`@brief`, `@see`, ...) are plain prose.

use crate::textbuf::TextBuf;

/// Where prose is currently accumulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    General,
    Param(usize),
    Returns,
    Notes,
    Warnings,
}

/// A tag-introduced section that may occur several times.
#[derive(Debug, Default)]
struct Section {
    text: TextBuf,
    opened: bool,
}

impl Section {
    /// Open the section, or separate a repeated occurrence from the text
    /// already collected with one blank line.
    fn begin(&mut self) -> &mut TextBuf {
        if self.opened && !self.text.is_empty() {
            self.text.trim_trailing_whitespace();
            self.text.ensure_blank_separator();
        }
        self.opened = true;
        &mut self.text
    }
}

#[derive(Debug)]
struct Param {
    name: String,
    desc: TextBuf,
}

#[derive(Debug, Default)]
struct Sections {
    general: TextBuf,
    params: Vec<Param>,
    returns: Section,
    notes: Section,
    warnings: Section,
}

impl Sections {
    fn buf(&mut self, target: Target) -> &mut TextBuf {
        match target {
            Target::General => &mut self.general,
            Target::Param(i) => &mut self.params[i].desc,
            Target::Returns => &mut self.returns.text,
            Target::Notes => &mut self.notes.text,
            Target::Warnings => &mut self.warnings.text,
        }
    }
}

/// A recognized line-leading tag.
enum Tag<'a> {
    Code(Option<&'a str>),
    Param { name: &'a str, desc: &'a str },
    Returns(&'a str),
    Note(&'a str),
    Warning(&'a str),
}

/// Convert a stripped comment body into a Markdown fragment.
///
/// Returns `None` when the comment produces no content at all, so callers
/// never emit a heading for an empty fragment.
pub fn doxygen_to_markdown(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }

    let mut sections = Sections::default();
    let mut target = Target::General;
    let mut lines = text.split('\n');

    while let Some(line) = lines.next() {
        let trimmed = line.trim_start_matches([' ', '\t']);

        match parse_tag(trimmed) {
            Some(Tag::Code(lang)) => {
                let mut code = TextBuf::new();
                for code_line in lines.by_ref() {
                    if code_line.trim() == "@endcode" {
                        break;
                    }
                    code.append(code_line);
                    code.append_char('\n');
                }
                sections.buf(target).append_code_block(code.as_str(), lang);
            }
            Some(Tag::Param { name, desc }) => {
                let mut param = Param {
                    name: name.to_string(),
                    desc: TextBuf::new(),
                };
                append_line(&mut param.desc, desc);
                sections.params.push(param);
                target = Target::Param(sections.params.len() - 1);
            }
            Some(Tag::Returns(desc)) => {
                append_line(sections.returns.begin(), desc);
                target = Target::Returns;
            }
            Some(Tag::Note(desc)) => {
                append_line(sections.notes.begin(), desc);
                target = Target::Notes;
            }
            Some(Tag::Warning(desc)) => {
                append_line(sections.warnings.begin(), desc);
                target = Target::Warnings;
            }
            None if trimmed.trim().is_empty() => {
                let buf = sections.buf(target);
                if !buf.is_empty() {
                    buf.append_char('\n');
                }
            }
            None => append_line(sections.buf(target), trimmed),
        }
    }

    render(sections)
}

/// Append one line of prose followed by a newline. Empty text is ignored.
fn append_line(buf: &mut TextBuf, text: &str) {
    if text.is_empty() {
        return;
    }
    buf.append(text);
    buf.append_char('\n');
}

fn parse_tag(line: &str) -> Option<Tag<'_>> {
    if let Some(rest) = tag_rest(line, "@code") {
        return Some(Tag::Code(code_lang(rest)));
    }
    if let Some(rest) = tag_rest(line, "@param").or_else(|| tag_rest(line, "@params")) {
        let rest = rest.trim_start();
        let name_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let (name, desc) = rest.split_at(name_end);
        return Some(Tag::Param {
            name,
            desc: desc.trim_start(),
        });
    }
    if let Some(rest) = tag_rest(line, "@return").or_else(|| tag_rest(line, "@returns")) {
        return Some(Tag::Returns(rest.trim_start()));
    }
    if let Some(rest) = tag_rest(line, "@note") {
        return Some(Tag::Note(rest.trim_start()));
    }
    if let Some(rest) = tag_rest(line, "@warning") {
        return Some(Tag::Warning(rest.trim_start()));
    }
    None
}

/// Text after `tag` if `line` starts with it as a whole word. `@code` may
/// also be followed directly by `{lang}`.
fn tag_rest<'a>(line: &'a str, tag: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(tag)?;
    match rest.chars().next() {
        None => Some(rest),
        Some(c) if c.is_whitespace() => Some(rest),
        Some('{') if tag == "@code" => Some(rest),
        Some(_) => None,
    }
}

/// Language annotation of a `@code` line: `@code{.c}` or `@code c`.
fn code_lang(rest: &str) -> Option<&str> {
    let rest = rest.trim();
    if let Some(inner) = rest.strip_prefix('{') {
        let close = inner.find('}')?;
        return (close > 0).then(|| &inner[..close]);
    }
    (!rest.is_empty()).then_some(rest)
}

/// Indent every continuation line of a parameter description by two spaces.
fn indent_continuation(desc: &str) -> String {
    let mut out = String::with_capacity(desc.len());
    for (i, line) in desc.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
            if !line.is_empty() {
                out.push_str("  ");
            }
        }
        out.push_str(line);
    }
    out
}

fn push_block(out: &mut TextBuf, heading: &str, body: &str) {
    out.trim_trailing_whitespace();
    out.ensure_blank_separator();
    out.append("#### ");
    out.append(heading);
    out.append("\n\n");
    out.append(body);
}

fn render(mut sections: Sections) -> Option<String> {
    sections.general.trim_trailing_whitespace();
    sections.returns.text.trim_trailing_whitespace();
    sections.notes.text.trim_trailing_whitespace();
    sections.warnings.text.trim_trailing_whitespace();
    for param in &mut sections.params {
        param.desc.trim_trailing_whitespace();
    }

    let mut out = TextBuf::new();
    out.append(sections.general.as_str());

    if !sections.params.is_empty() {
        let mut list = String::new();
        for param in &sections.params {
            let entry = format!(
                "**{}** \u{2014} {}",
                param.name,
                indent_continuation(param.desc.as_str())
            );
            list.push_str(entry.trim_end());
            list.push('\n');
        }
        push_block(&mut out, "Parameters", &list);
    }

    for (heading, section) in [
        ("Returns", &sections.returns),
        ("Note", &sections.notes),
        ("Warning", &sections.warnings),
    ] {
        if section.opened && !section.text.is_empty() {
            push_block(&mut out, heading, section.text.as_str());
        }
    }

    out.trim_trailing_whitespace();
    (!out.is_empty()).then(|| out.detach())
}
