//! Remove comment syntax from a raw comment block.

/// Which delimiter style a raw comment uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Block,
    Line,
    Bare,
}

impl Style {
    fn of(raw: &str) -> Self {
        if raw.starts_with("/*") {
            Style::Block
        } else if raw.starts_with("//") {
            Style::Line
        } else {
            Style::Bare
        }
    }
}

/// Strip `/* */` or `//` decoration from every line of `raw` and return the
/// remaining text, or `None` when nothing but whitespace is left.
///
/// Leading and trailing blank lines are dropped; interior blank lines are
/// kept as paragraph breaks. Text without comment delimiters is only trimmed.
pub fn strip_comment(raw: &str) -> Option<String> {
    let style = Style::of(raw);
    if style == Style::Bare {
        let trimmed = raw.trim();
        return (!trimmed.is_empty()).then(|| trimmed.to_string());
    }

    let body = match style {
        Style::Block => {
            let rest = raw[2..].trim_start_matches('*');
            // `/*!` marks a Doxygen comment; the marker is decoration too.
            let rest = rest.strip_prefix('!').unwrap_or(rest);
            rest.strip_prefix(' ').unwrap_or(rest)
        }
        _ => raw,
    };

    let mut lines: Vec<&str> = Vec::new();
    let mut iter = body.split('\n').peekable();
    while let Some(line) = iter.next() {
        let is_last = iter.peek().is_none();
        let line = line.strip_suffix('\r').unwrap_or(line);
        let text = match style {
            Style::Block => strip_block_line(line, is_last),
            _ => strip_line_comment(line),
        };
        lines.push(text);
    }

    let first = lines.iter().position(|l| !l.trim().is_empty())?;
    let last = lines.iter().rposition(|l| !l.trim().is_empty())?;
    Some(lines[first..=last].join("\n"))
}

fn strip_block_line(line: &str, is_last: bool) -> &str {
    let s = line.trim_start_matches([' ', '\t']);
    let s = match s.strip_prefix('*') {
        Some(rest) => rest.strip_prefix(' ').unwrap_or(rest),
        None => s,
    };
    if !is_last {
        return s;
    }
    let s = s.trim_end();
    let s = s.strip_suffix("*/").unwrap_or(s).trim_end();
    // The `*` of a closing `*/` was eaten as a line decoration above.
    if s == "/" {
        ""
    } else {
        s
    }
}

fn strip_line_comment(line: &str) -> &str {
    let s = line.trim_start_matches([' ', '\t']);
    let Some(rest) = s.strip_prefix("//") else {
        return s;
    };
    let rest = rest.trim_start_matches('/');
    let rest = rest.strip_prefix('!').unwrap_or(rest);
    rest.strip_prefix(' ').unwrap_or(rest)
}
