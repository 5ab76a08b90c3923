//! Format-agnostic data model for documented C entities.

/// Everything extracted from a single source file.
#[derive(Debug, Default)]
pub struct Document {
    pub path: String,
    /// Rendered leading file comment, before heading demotion.
    pub file_doc: Option<String>,
    pub entities: Vec<Entity>,
}

/// A single documentable declaration.
#[derive(Debug)]
pub struct Entity {
    pub kind: EntityKind,
    /// Empty for anonymous records.
    pub name: String,
    /// One-line C text shown in the code block (prototype, typedef, #define).
    pub signature: String,
    /// 1-based line of the declaration start.
    pub line: usize,
    pub doc: Option<String>,
    /// Fields or enum constants, for records only.
    pub members: Vec<Member>,
}

impl Entity {
    /// Name used in headings, anchors and ignore matching.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "(anonymous)"
        } else {
            &self.name
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Function,
    Struct,
    Union,
    Enum,
    Typedef,
    Macro,
}

/// Top-level index groups, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexGroup {
    Macros,
    Types,
    Functions,
}

impl EntityKind {
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Function => "Function",
            EntityKind::Struct => "Struct",
            EntityKind::Union => "Union",
            EntityKind::Enum => "Enum",
            EntityKind::Typedef => "Typedef",
            EntityKind::Macro => "Macro",
        }
    }

    pub fn anchor_prefix(self) -> &'static str {
        match self {
            EntityKind::Function => "function",
            EntityKind::Struct => "type-struct",
            EntityKind::Union => "type-union",
            EntityKind::Enum => "type-enum",
            EntityKind::Typedef => "type-typedef",
            EntityKind::Macro => "macro",
        }
    }

    pub fn group(self) -> IndexGroup {
        match self {
            EntityKind::Macro => IndexGroup::Macros,
            EntityKind::Function => IndexGroup::Functions,
            _ => IndexGroup::Types,
        }
    }

    /// Records list their members instead of a signature block.
    pub fn is_record(self) -> bool {
        matches!(self, EntityKind::Struct | EntityKind::Union | EntityKind::Enum)
    }
}

impl IndexGroup {
    pub const ALL: [IndexGroup; 3] = [IndexGroup::Macros, IndexGroup::Types, IndexGroup::Functions];

    pub fn title(self) -> &'static str {
        match self {
            IndexGroup::Macros => "Macros",
            IndexGroup::Types => "Types",
            IndexGroup::Functions => "Functions",
        }
    }
}

/// A struct/union field or an enum constant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
    /// Field declaration text including the trailing `;`.
    Field(String),
    /// Enum constant; `value` is `None` when it could not be evaluated.
    Enumerator { name: String, value: Option<i64> },
}
