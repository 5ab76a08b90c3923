//! GitHub-flavored markdown assembly of the whole API document.
//!
//! Layout:
//!
//! ```text
//! # <title>
//! ## Macros / ## Types / ## Functions   (index, linking to anchors)
//! ## File: <path>                       (one per input file)
//!   file doc, headings demoted one level
//!   one block per entity, closed by `---`
//! ```

use crate::model::*;
use crate::render::headings::shift_headings;
use crate::textbuf::TextBuf;
use crate::toc::{self, AnchorSet};
use std::collections::HashSet;

/// Render all documents into one markdown string.
///
/// A named non-macro entity is emitted only the first time its kind and
/// name are seen, so a prototype in a header and its definition in a source
/// file produce a single entry.
pub fn render(docs: &[Document], title: &str) -> String {
    let mut anchors = AnchorSet::new();
    let mut seen: HashSet<(EntityKind, &str)> = HashSet::new();
    let mut index: Vec<(IndexGroup, String)> = Vec::new();
    let mut body = TextBuf::new();

    for doc in docs {
        body.ensure_blank_separator();
        body.append(&format!("## File: {}\n", doc.path));
        if let Some(file_doc) = &doc.file_doc {
            body.ensure_blank_separator();
            body.append(shift_headings(file_doc).trim_end());
            body.append_char('\n');
        }

        for entity in &doc.entities {
            let key = (entity.kind, entity.name.as_str());
            if entity.kind != EntityKind::Macro && !entity.name.is_empty() && !seen.insert(key) {
                continue;
            }
            let anchor = anchors.assign(entity);
            index.push((
                entity.kind.group(),
                toc::render_index_item(entity.kind, entity.display_name(), &anchor),
            ));
            render_entity(&mut body, entity, &doc.path, &anchor);
        }
    }

    let mut out = TextBuf::new();
    out.append(&format!("# {}\n", title));
    for group in IndexGroup::ALL {
        out.ensure_blank_separator();
        out.append(&format!("## {}\n\n", group.title()));
        let mut empty = true;
        for (_, item) in index.iter().filter(|(g, _)| *g == group) {
            out.append(item);
            out.append_char('\n');
            empty = false;
        }
        if empty {
            out.append(toc::render_empty_index());
            out.append_char('\n');
        }
    }
    out.ensure_blank_separator();
    out.append(body.as_str());
    out.trim_trailing_whitespace();
    out.append_char('\n');
    out.detach()
}

/// Render a single entity block.
fn render_entity(out: &mut TextBuf, entity: &Entity, path: &str, anchor: &str) {
    out.ensure_blank_separator();
    out.append(&format!("<a id=\"{}\"></a>\n", anchor));
    out.append(&format!(
        "### {}: `{}`\n",
        entity.kind.label(),
        entity.display_name()
    ));

    if let Some(doc) = &entity.doc {
        out.ensure_blank_separator();
        out.append(doc.trim_end());
        out.append_char('\n');
    }

    if entity.kind.is_record() {
        if !entity.members.is_empty() {
            out.ensure_blank_separator();
            for member in &entity.members {
                out.append(&render_member(member));
                out.append_char('\n');
            }
        }
    } else {
        out.append_code_block(&entity.signature, Some("c"));
    }

    out.ensure_blank_separator();
    out.append(&format!("*Defined at*: `{}:{}`\n", path, entity.line));
    out.ensure_blank_separator();
    out.append("---\n");
}

fn render_member(member: &Member) -> String {
    match member {
        Member::Field(decl) => format!("- `{}`", decl),
        Member::Enumerator {
            name,
            value: Some(value),
        } => format!("- `{} = {}`", name, value),
        Member::Enumerator { name, value: None } => format!("- `{}`", name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(kind: EntityKind, name: &str, signature: &str) -> Entity {
        Entity {
            kind,
            name: name.to_string(),
            signature: signature.to_string(),
            line: 3,
            doc: None,
            members: Vec::new(),
        }
    }

    fn doc(path: &str, entities: Vec<Entity>) -> Document {
        Document {
            path: path.to_string(),
            file_doc: None,
            entities,
        }
    }

    #[test]
    fn empty_document_lists_no_entries() {
        let out = render(&[], "API Documentation");
        assert_eq!(
            out,
            "# API Documentation\n\n## Macros\n\n- (none)\n\n## Types\n\n- (none)\n\n## Functions\n\n- (none)\n"
        );
    }

    #[test]
    fn function_block() {
        let mut f = entity(EntityKind::Function, "add", "int add(int a, int b);");
        f.doc = Some("Adds two numbers.".to_string());
        let out = render(&[doc("math.h", vec![f])], "API");
        assert!(out.contains("## Functions\n\n- [`add`](#function-add)\n"));
        assert!(out.ends_with(
            "## File: math.h\n\n\
             <a id=\"function-add\"></a>\n\
             ### Function: `add`\n\n\
             Adds two numbers.\n\n\
             ```c\nint add(int a, int b);\n```\n\n\
             *Defined at*: `math.h:3`\n\n\
             ---\n"
        ));
    }

    #[test]
    fn record_lists_members() {
        let mut e = entity(EntityKind::Enum, "mode", "enum mode");
        e.members = vec![
            Member::Enumerator {
                name: "A".to_string(),
                value: Some(0),
            },
            Member::Enumerator {
                name: "B".to_string(),
                value: None,
            },
        ];
        let mut s = entity(EntityKind::Struct, "", "struct");
        s.members = vec![Member::Field("int x;".to_string())];
        let out = render(&[doc("a.h", vec![e, s])], "API");
        assert!(out.contains("- [Enum `mode`](#type-enum-mode)\n"));
        assert!(out.contains("### Enum: `mode`\n\n- `A = 0`\n- `B`\n\n*Defined at*"));
        assert!(out.contains("- [Struct `(anonymous)`](#type-struct-anonymous)\n"));
        assert!(out.contains("### Struct: `(anonymous)`\n\n- `int x;`\n"));
        assert!(!out.contains("```c\nenum"));
    }

    #[test]
    fn file_doc_headings_are_demoted() {
        let mut d = doc("a.h", Vec::new());
        d.file_doc = Some("# Overview\n\nText.".to_string());
        let out = render(&[d], "API");
        assert!(out.ends_with("## File: a.h\n\n## Overview\n\nText.\n"));
    }

    #[test]
    fn duplicates_across_files_are_dropped() {
        let header = doc(
            "a.h",
            vec![
                entity(EntityKind::Function, "f", "void f(void);"),
                entity(EntityKind::Macro, "M", "#define M 1"),
            ],
        );
        let source = doc(
            "a.c",
            vec![
                entity(EntityKind::Function, "f", "void f(void);"),
                entity(EntityKind::Macro, "M", "#define M 2"),
            ],
        );
        let out = render(&[header, source], "API");
        assert_eq!(out.matches("### Function: `f`").count(), 1);
        assert_eq!(out.matches("### Macro: `M`").count(), 2);
        assert!(out.contains("(#macro-m-2)"));
        assert!(out.contains("## File: a.c\n"));
    }

    #[test]
    fn index_groups_in_order() {
        let d = doc(
            "a.h",
            vec![
                entity(EntityKind::Function, "f", "void f(void);"),
                entity(EntityKind::Typedef, "t", "typedef int t;"),
                entity(EntityKind::Macro, "M", "#define M"),
            ],
        );
        let out = render(&[d], "API");
        let macros = out.find("## Macros").unwrap();
        let types = out.find("## Types").unwrap();
        let functions = out.find("## Functions").unwrap();
        assert!(macros < types && types < functions);
        assert!(out.contains("## Types\n\n- [Typedef `t`](#type-typedef-t)\n"));
    }
}
