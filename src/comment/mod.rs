//! Comment-to-Markdown pipeline: locate, strip, render.

pub mod doxygen;
pub mod locate;
pub mod strip;

pub use doxygen::doxygen_to_markdown;
pub use locate::{find_leading_file_comment, find_preceding_comment};
pub use strip::strip_comment;

/// Strip a raw comment and render its Doxygen tags to Markdown.
pub fn normalize(raw: &str) -> Option<String> {
    strip_comment(raw).and_then(|text| doxygen_to_markdown(&text))
}

/// Documentation for one declaration.
///
/// Uses the comment the walker associated with the declaration; when there
/// is none, or it renders to nothing, falls back to the comment block
/// directly above `offset` in the file.
pub fn declaration_doc(raw_comment: Option<&str>, src: &[u8], offset: usize) -> Option<String> {
    raw_comment.and_then(normalize).or_else(|| {
        let span = find_preceding_comment(src, offset)?;
        normalize(&String::from_utf8_lossy(&src[span]))
    })
}

/// Documentation taken from the comment that opens a file.
pub fn file_doc(src: &[u8]) -> Option<String> {
    let span = find_leading_file_comment(src)?;
    normalize(&String::from_utf8_lossy(&src[span]))
}
