//! Append-only text buffer shared by every stage that builds output.
//!
//! Capacity grows by doubling (starting at 64 bytes) so that rendering a
//! comment never reallocates once per append. Allocation failure aborts the
//! process, which is the standard library's behaviour.

/// Initial capacity of the first allocation.
const MIN_CAPACITY: usize = 64;

#[derive(Debug, Default)]
pub struct TextBuf {
    buf: String,
}

impl TextBuf {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make room for `extra` more bytes, doubling the capacity as needed.
    pub fn reserve(&mut self, extra: usize) {
        let need = self.buf.len() + extra;
        let cap = self.buf.capacity();
        if need <= cap {
            return;
        }
        let mut new_cap = if cap == 0 { MIN_CAPACITY } else { cap * 2 };
        while new_cap < need {
            new_cap *= 2;
        }
        self.buf.reserve_exact(new_cap - self.buf.len());
    }

    pub fn append(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.reserve(text.len());
        self.buf.push_str(text);
    }

    pub fn append_char(&mut self, c: char) {
        self.reserve(c.len_utf8());
        self.buf.push(c);
    }

    /// Drop trailing spaces, tabs and line breaks.
    pub fn trim_trailing_whitespace(&mut self) {
        let keep = self
            .buf
            .trim_end_matches([' ', '\t', '\n', '\r'])
            .len();
        self.buf.truncate(keep);
    }

    /// Guarantee that whatever is appended next starts after exactly one
    /// blank line. No-op on an empty buffer.
    pub fn ensure_blank_separator(&mut self) {
        if self.buf.is_empty() || self.buf.ends_with("\n\n") {
            return;
        }
        if !self.buf.ends_with('\n') {
            self.append_char('\n');
        }
        if !self.buf.ends_with("\n\n") {
            self.append_char('\n');
        }
    }

    /// Append a fenced code block. The fence always closes on its own line,
    /// whether or not `code` ends with a newline.
    pub fn append_code_block(&mut self, code: &str, lang: Option<&str>) {
        self.ensure_blank_separator();
        self.append("```");
        if let Some(lang) = lang {
            self.append(lang.strip_prefix('.').unwrap_or(lang));
        }
        self.append_char('\n');
        self.append(code);
        if !code.ends_with('\n') {
            self.append_char('\n');
        }
        self.append("```\n");
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// Take the accumulated text, leaving the buffer empty.
    pub fn detach(&mut self) -> String {
        std::mem::take(&mut self.buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_doubles_from_minimum() {
        let mut buf = TextBuf::new();
        buf.append("x");
        assert!(buf.buf.capacity() >= MIN_CAPACITY);
        let before = buf.buf.capacity();
        buf.append(&"y".repeat(before));
        assert!(buf.buf.capacity() >= before * 2);
    }

    #[test]
    fn trim_trailing() {
        let mut buf = TextBuf::new();
        buf.append("text \t\r\n\n");
        buf.trim_trailing_whitespace();
        assert_eq!(buf.as_str(), "text");
    }

    #[test]
    fn blank_separator_on_empty_is_noop() {
        let mut buf = TextBuf::new();
        buf.ensure_blank_separator();
        assert!(buf.is_empty());
    }

    #[test]
    fn blank_separator_variants() {
        for (input, expected) in [("a", "a\n\n"), ("a\n", "a\n\n"), ("a\n\n", "a\n\n")] {
            let mut buf = TextBuf::new();
            buf.append(input);
            buf.ensure_blank_separator();
            assert_eq!(buf.as_str(), expected, "input {:?}", input);
        }
    }

    #[test]
    fn code_block_drops_leading_dot() {
        let mut buf = TextBuf::new();
        buf.append("Intro");
        buf.append_code_block("int x;", Some(".c"));
        assert_eq!(buf.as_str(), "Intro\n\n```c\nint x;\n```\n");
    }

    #[test]
    fn code_block_keeps_single_trailing_newline() {
        let mut buf = TextBuf::new();
        buf.append_code_block("a\n", None);
        assert_eq!(buf.as_str(), "```\na\n```\n");
    }

    #[test]
    fn detach_resets() {
        let mut buf = TextBuf::new();
        buf.append("abc");
        assert_eq!(buf.detach(), "abc");
        assert!(buf.is_empty());
    }
}
