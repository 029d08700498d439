use foundation::bounds::Aabb2;

#[derive(Debug, Clone, PartialEq)]
pub struct LabelStyle {
    pub font_size_px: f32,
    pub font_family: &'static str,
    pub color: [f32; 4],
    pub halo_color: [f32; 4],
    pub halo_width_px: f32,
}

impl Default for LabelStyle {
    fn default() -> Self {
        // 9pt sans-serif, dark text on a light halo.
        Self {
            font_size_px: 12.0,
            font_family: "sans-serif",
            color: [0.2, 0.2, 0.2, 1.0],
            halo_color: [1.0, 1.0, 1.0, 0.85],
            halo_width_px: 3.0,
        }
    }
}

impl LabelStyle {
    /// CSS font shorthand, e.g. `12px sans-serif`.
    pub fn css_font(&self) -> String {
        format!("{}px {}", self.font_size_px, self.font_family)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum LabelPlacement {
    /// Renderer picks a point inside the geometry.
    Interior,
    /// Fixed `[lon_deg, lat_deg]`.
    Anchor([f64; 2]),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldLabel {
    pub text: String,
    pub style: LabelStyle,
    /// Draw even when the text is wider than the geometry on screen.
    pub overflow: bool,
    pub placement: LabelPlacement,
}

impl FieldLabel {
    /// Whether the label is drawn when the geometry spans
    /// `available_width_px` on screen.
    pub fn visible_within(&self, available_width_px: f32) -> bool {
        self.overflow || estimate_text_size(&self.text, &self.style)[0] <= available_width_px
    }
}

/// Geometric centre of the extent.
pub fn anchor_for_extent(extent: &Aabb2) -> [f64; 2] {
    extent.center()
}

pub fn estimate_text_size(text: &str, style: &LabelStyle) -> [f32; 2] {
    let count = text.chars().count().max(1) as f32;
    let width = style.font_size_px * 0.6 * count;
    [width, style.font_size_px]
}
