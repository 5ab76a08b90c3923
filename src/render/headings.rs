//! Demote ATX headings so a Markdown fragment nests one level deeper.

use crate::textbuf::TextBuf;

/// Deepest heading level Markdown supports.
const MAX_LEVEL: usize = 6;

/// Add one `#` to every ATX heading outside fenced code blocks, capped at
/// level 6. Longer `#` runs are clamped to six. Fence lines and everything else pass through untouched,
/// including line terminators.
pub fn shift_headings(markdown: &str) -> String {
    let mut out = TextBuf::new();
    out.reserve(markdown.len() + 16);
    let mut in_fence = false;

    for line in markdown.split_inclusive('\n') {
        let content = line.strip_suffix('\n').unwrap_or(line);
        let indent = content.len() - content.trim_start_matches([' ', '\t']).len();
        let trimmed = &content[indent..];

        if trimmed.starts_with("```") {
            in_fence = !in_fence;
            out.append(line);
            continue;
        }

        let level = trimmed.len() - trimmed.trim_start_matches('#').len();
        if in_fence || level == 0 {
            out.append(line);
            continue;
        }

        out.append(&content[..indent]);
        out.append(&"#".repeat((level + 1).min(MAX_LEVEL)));
        out.append(&line[indent + level..]);
    }

    out.detach()
}
