use scene::Field;

use crate::labels::{FieldLabel, LabelPlacement, LabelStyle, anchor_for_extent};

pub type Rgba = [f32; 4];

pub const DEFAULT_FILL: Rgba = [1.0, 0.0, 0.0, 1.0];
pub const FOCUS_FILL: Rgba = [0.0, 0.0, 1.0, 1.0];

#[derive(Debug, Clone, PartialEq)]
pub struct FieldStyle {
    pub fill: Rgba,
    pub label: FieldLabel,
}

impl FieldStyle {
    /// Layer style every field has while not selected.
    pub fn default_for(field: &Field) -> Self {
        Self {
            fill: DEFAULT_FILL,
            label: FieldLabel {
                text: field.name.clone(),
                style: LabelStyle::default(),
                overflow: false,
                placement: LabelPlacement::Interior,
            },
        }
    }

    /// Highlight for the selected field: focus fill and a label that is
    /// always drawn at the centre of the field's extent.
    pub fn focus_for(field: &Field) -> Self {
        Self {
            fill: FOCUS_FILL,
            label: FieldLabel {
                text: field.name.clone(),
                style: LabelStyle::default(),
                overflow: true,
                placement: LabelPlacement::Anchor(anchor_for_extent(&field.extent)),
            },
        }
    }

    pub fn is_focus(&self) -> bool {
        self.fill == FOCUS_FILL
    }
}
