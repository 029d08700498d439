use crate::field::FieldId;

/// Identity change of the selected field.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SelectionChange {
    pub previous: Option<FieldId>,
    pub next: Option<FieldId>,
}

/// Zero-or-one selected field.
///
/// Holds only the id; the field itself stays owned by the store.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    current: Option<FieldId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<FieldId> {
        self.current
    }

    /// Replaces the selection.
    ///
    /// Returns `Some` only if the identity changed, including to or from
    /// nothing.
    pub fn replace(&mut self, next: Option<FieldId>) -> Option<SelectionChange> {
        if self.current == next {
            return None;
        }
        let previous = std::mem::replace(&mut self.current, next);
        Some(SelectionChange { previous, next })
    }
}
