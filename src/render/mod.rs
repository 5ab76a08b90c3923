//! Markdown assembly and heading demotion.

pub mod headings;
pub mod markdown;

pub use markdown::render;
