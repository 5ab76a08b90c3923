//! Source parsing, dispatched by file extension.

pub mod c;
pub mod expr;

use crate::comment;
use crate::model::{Document, Entity};
use anyhow::{anyhow, Result};
use std::path::Path;

/// Parse a source file into a Document based on its extension.
pub fn parse_file(path: &Path, src: &[u8]) -> Result<Document> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("c" | "h") => Ok(parse_c(path, src)),
        _ => Err(anyhow!("unsupported file type: {}", path.display())),
    }
}

fn parse_c(path: &Path, src: &[u8]) -> Document {
    let entities: Vec<Entity> = c::walk(src)
        .into_iter()
        .map(|decl| Entity {
            doc: comment::declaration_doc(decl.raw_comment.as_deref(), src, decl.offset),
            kind: decl.kind,
            name: decl.name,
            signature: decl.signature,
            line: decl.line,
            members: decl.members,
        })
        .collect();
    log::debug!("{}: {} declarations", path.display(), entities.len());

    Document {
        path: path.to_string_lossy().into_owned(),
        file_doc: comment::file_doc(src),
        entities,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntityKind;

    #[test]
    fn rejects_other_extensions() {
        let err = parse_file(Path::new("notes.txt"), b"").unwrap_err();
        assert!(err.to_string().contains("unsupported file type"));
    }

    #[test]
    fn header_with_docs() {
        let src = b"/** @file util.h\n * Utilities. */\n\n/** Largest size. */\n#define MAX 4\n\n/// Adds.\n/// @return The sum.\nint add(int a, int b);\n";
        let doc = parse_file(Path::new("util.h"), src).unwrap();
        assert_eq!(doc.path, "util.h");
        assert_eq!(doc.file_doc.as_deref(), Some("@file util.h\nUtilities."));
        assert_eq!(doc.entities.len(), 2);
        assert_eq!(doc.entities[0].kind, EntityKind::Macro);
        assert_eq!(doc.entities[0].doc.as_deref(), Some("Largest size."));
        assert_eq!(doc.entities[1].line, 9);
        assert_eq!(
            doc.entities[1].doc.as_deref(),
            Some("Adds.\n\n#### Returns\n\nThe sum.")
        );
    }

    #[test]
    fn plain_comment_used_as_fallback() {
        let doc = parse_file(Path::new("a.c"), b"/* Helper. */\nstatic int helper(void) { return 1; }\n").unwrap();
        assert_eq!(doc.entities[0].doc.as_deref(), Some("Helper."));
        assert_eq!(doc.file_doc.as_deref(), Some("Helper."));
    }
}
