//! Anchor generation and index items.

use crate::model::{Entity, EntityKind};
use std::collections::HashSet;

/// HTML anchor id for an entity: `<prefix>-<name>`, lowercased, with every
/// run of characters other than ASCII alphanumerics and `_` collapsed to a
/// single `-`.
pub fn make_anchor(prefix: &str, name: &str) -> String {
    let mut anchor = String::with_capacity(prefix.len() + name.len() + 1);
    for c in format!("{}-{}", prefix, name).chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            anchor.push(c.to_ascii_lowercase());
        } else if !anchor.is_empty() && !anchor.ends_with('-') {
            anchor.push('-');
        }
    }
    let trimmed_len = anchor.trim_end_matches('-').len();
    anchor.truncate(trimmed_len);
    if anchor.is_empty() {
        anchor.push('x');
    }
    anchor
}

/// Hands out anchors that are unique within one document.
#[derive(Debug, Default)]
pub struct AnchorSet {
    used: HashSet<String>,
}

impl AnchorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Anchor for `entity`; repeats get `-2`, `-3`, ... appended.
    pub fn assign(&mut self, entity: &Entity) -> String {
        let base = make_anchor(entity.kind.anchor_prefix(), entity.display_name());
        let mut candidate = base.clone();
        let mut n = 1;
        while self.used.contains(&candidate) {
            n += 1;
            candidate = format!("{}-{}", base, n);
        }
        self.used.insert(candidate.clone());
        candidate
    }
}

/// One line of the index.
pub fn render_index_item(kind: EntityKind, name: &str, anchor: &str) -> String {
    if kind == EntityKind::Function || kind == EntityKind::Macro {
        format!("- [`{}`](#{})", name, anchor)
    } else {
        format!("- [{} `{}`](#{})", kind.label(), name, anchor)
    }
}

/// Placeholder for an index group with no entries.
pub fn render_empty_index() -> &'static str {
    "- (none)"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(kind: EntityKind, name: &str) -> Entity {
        Entity {
            kind,
            name: name.to_string(),
            signature: String::new(),
            line: 1,
            doc: None,
            members: Vec::new(),
        }
    }

    #[test]
    fn anchor_simple() {
        assert_eq!(make_anchor("function", "buf_append"), "function-buf_append");
        assert_eq!(make_anchor("type-struct", "Point"), "type-struct-point");
    }

    #[test]
    fn anchor_collapses_runs() {
        assert_eq!(make_anchor("type-struct", "(anonymous)"), "type-struct-anonymous");
        assert_eq!(make_anchor("macro", "A::B"), "macro-a-b");
    }

    #[test]
    fn anchor_fallback() {
        assert_eq!(make_anchor("", ""), "x");
        assert_eq!(make_anchor("-", "!!"), "x");
    }

    #[test]
    fn repeated_anchors_get_suffix() {
        let mut set = AnchorSet::new();
        let f = entity(EntityKind::Function, "init");
        assert_eq!(set.assign(&f), "function-init");
        assert_eq!(set.assign(&f), "function-init-2");
        assert_eq!(set.assign(&f), "function-init-3");
        assert_eq!(set.assign(&entity(EntityKind::Macro, "init")), "macro-init");
    }

    #[test]
    fn suffix_skips_taken_names() {
        let mut set = AnchorSet::new();
        assert_eq!(set.assign(&entity(EntityKind::Function, "f-2")), "function-f-2");
        assert_eq!(set.assign(&entity(EntityKind::Function, "f")), "function-f");
        assert_eq!(set.assign(&entity(EntityKind::Function, "f")), "function-f-3");
    }

    #[test]
    fn index_items() {
        assert_eq!(
            render_index_item(EntityKind::Function, "add", "function-add"),
            "- [`add`](#function-add)"
        );
        assert_eq!(
            render_index_item(EntityKind::Enum, "mode", "type-enum-mode"),
            "- [Enum `mode`](#type-enum-mode)"
        );
        assert_eq!(render_empty_index(), "- (none)");
    }
}
