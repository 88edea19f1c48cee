//! Variable type definitions

/// The type of a planning variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableType {
    /// A genuine variable holding a single value.
    Basic,
    /// A genuine variable holding an ordered list of elements.
    List,
    /// A variable derived from a list variable by a listener.
    Shadow(ShadowVariableKind),
}

impl VariableType {
    /// Returns true if the search layer assigns this variable.
    pub fn is_genuine(&self) -> bool {
        matches!(self, VariableType::Basic | VariableType::List)
    }

    pub fn is_shadow(&self) -> bool {
        matches!(self, VariableType::Shadow(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, VariableType::List)
    }
}

/// The kind of a shadow variable sourced from a list variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShadowVariableKind {
    /// The element after this one in the same list.
    NextElement,
    /// The element before this one in the same list.
    PreviousElement,
    /// The position of this element in its list.
    Index,
    /// The entity whose list contains this element.
    InverseRelation,
}

impl ShadowVariableKind {
    pub fn label(&self) -> &'static str {
        match self {
            ShadowVariableKind::NextElement => "next element",
            ShadowVariableKind::PreviousElement => "previous element",
            ShadowVariableKind::Index => "index",
            ShadowVariableKind::InverseRelation => "inverse relation",
        }
    }
}
