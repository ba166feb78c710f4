use ecow::EcoString;
use syntax::{TextRange, TextSize};

use crate::dom::NodeId;
use crate::file_system::{FilePath, FileRange};

/// Selector of definitions and context of usages coming from a `style`
/// attribute.
pub const INLINE_STYLE: &str = "inline-style";

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct VariableDefinition {
    pub name: EcoString,
    pub value: EcoString,
    pub owner: FilePath,
    pub declaration_range: TextRange,
    pub value_range: TextRange,
    /// Enclosing rule selector; `:root` at top level, [`INLINE_STYLE`] for
    /// style attributes.
    pub selector: EcoString,
    pub important: bool,
    pub inline: bool,
    /// Offset of the declaration in its own file.
    pub source_position: TextSize,
}

impl VariableDefinition {
    pub fn location(&self) -> FileRange {
        FileRange::new(self.owner.clone(), self.declaration_range)
    }

    pub fn name_range(&self) -> TextRange {
        TextRange::at(
            self.declaration_range.start(),
            TextSize::of(self.name.as_str()),
        )
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct VariableUsage {
    pub name: EcoString,
    pub owner: FilePath,
    pub range: TextRange,
    pub context: EcoString,
    pub dom_node: Option<NodeId>,
    /// Raw text after the first comma of the call.
    pub fallback: Option<EcoString>,
}

impl VariableUsage {
    pub fn location(&self) -> FileRange {
        FileRange::new(self.owner.clone(), self.range)
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Reference<'a> {
    Definition(&'a VariableDefinition),
    Usage(&'a VariableUsage),
}

impl Reference<'_> {
    pub fn name(&self) -> &EcoString {
        match self {
            Reference::Definition(definition) => &definition.name,
            Reference::Usage(usage) => &usage.name,
        }
    }

    pub fn location(&self) -> FileRange {
        match self {
            Reference::Definition(definition) => definition.location(),
            Reference::Usage(usage) => usage.location(),
        }
    }
}
