use focus::{FitTarget, MapSurface, SceneSurface};
use layers::labels::LabelPlacement;
use layers::{BackgroundLayer, FieldStyle};
use runtime::{FitOptions, View, ViewportSize};
use scene::{FeatureStore, Field, FieldId};
use web_sys::{CanvasRenderingContext2d, CanvasWindingRule, HtmlCanvasElement};

/// Canvas 2D drawing on top of the headless surface state.
pub struct CanvasSurface {
    scene: SceneSurface,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(
        canvas: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
        initial: View,
        background: BackgroundLayer,
    ) -> Self {
        let size = ViewportSize::new(canvas.width() as f64, canvas.height() as f64);
        Self {
            scene: SceneSurface::new(size, initial, background),
            canvas,
            ctx,
        }
    }

    pub fn resize(&mut self, width_px: f64, height_px: f64) {
        self.canvas.set_width(width_px.max(1.0) as u32);
        self.canvas.set_height(height_px.max(1.0) as u32);
        self.scene.resize(ViewportSize::new(width_px, height_px));
    }

    pub fn is_animating(&self) -> bool {
        self.scene.is_animating()
    }

    /// Advances the view animation and redraws every field.
    pub fn draw(&mut self, store: &FeatureStore, now_ms: f64) {
        let view = self.scene.advance_to(now_ms);
        let size = self.scene.size();
        let background = self.scene.background();

        self.ctx.set_fill_style_str(&css_rgba(background.base_color()));
        self.ctx.fill_rect(0.0, 0.0, size.width_px, size.height_px);

        // Selected field last so it sits on top.
        let (focused, plain): (Vec<&Field>, Vec<&Field>) = store
            .fields()
            .iter()
            .partition(|f| self.scene.style_override(f.id).is_some());
        for field in plain.into_iter().chain(focused) {
            let style = self.scene.style_for(field);
            self.draw_field(field, &style, view, size);
        }

        self.ctx.set_font("10px sans-serif");
        self.ctx.set_text_align("right");
        self.ctx.set_fill_style_str("rgba(60,60,60,0.9)");
        let _ = self.ctx.fill_text(
            background.attribution(),
            size.width_px - 4.0,
            size.height_px - 4.0,
        );
    }

    fn draw_field(&self, field: &Field, style: &FieldStyle, view: View, size: ViewportSize) {
        self.ctx.begin_path();
        for rings in field.geometry.polygons() {
            for ring in rings {
                let mut points = ring.iter().map(|p| view.lon_lat_to_pixel(size, *p));
                let Some(first) = points.next() else {
                    continue;
                };
                self.ctx.move_to(first[0], first[1]);
                for p in points {
                    self.ctx.line_to(p[0], p[1]);
                }
                self.ctx.close_path();
            }
        }
        self.ctx.set_fill_style_str(&css_rgba(style.fill));
        self.ctx
            .fill_with_canvas_winding_rule(CanvasWindingRule::Evenodd);

        let min_px = view.lon_lat_to_pixel(size, field.extent.min);
        let max_px = view.lon_lat_to_pixel(size, field.extent.max);
        let width_px = (max_px[0] - min_px[0]).abs() as f32;
        if !style.label.visible_within(width_px) {
            return;
        }
        let anchor = match style.label.placement {
            LabelPlacement::Anchor(p) => p,
            LabelPlacement::Interior => field.extent.center(),
        };
        let at = view.lon_lat_to_pixel(size, anchor);
        let label = &style.label;
        self.ctx.set_font(&label.style.css_font());
        self.ctx.set_text_align("center");
        self.ctx.set_text_baseline("middle");
        self.ctx.set_line_width(label.style.halo_width_px as f64);
        self.ctx
            .set_stroke_style_str(&css_rgba(label.style.halo_color));
        let _ = self.ctx.stroke_text(&label.text, at[0], at[1]);
        self.ctx.set_fill_style_str(&css_rgba(label.style.color));
        let _ = self.ctx.fill_text(&label.text, at[0], at[1]);
    }
}

impl MapSurface for CanvasSurface {
    fn set_background_layer(&mut self, layer: BackgroundLayer) {
        self.scene.set_background_layer(layer);
    }

    fn hit_test_at_pixel(&self, store: &FeatureStore, pixel: [f64; 2]) -> Vec<FieldId> {
        self.scene.hit_test_at_pixel(store, pixel)
    }

    fn apply_style(&mut self, field: &Field, style: Option<FieldStyle>) {
        self.scene.apply_style(field, style);
    }

    fn fit_view_to(&mut self, target: FitTarget<'_>, opts: FitOptions) {
        self.scene.fit_view_to(target, opts);
    }
}

pub fn css_rgba(c: [f32; 4]) -> String {
    let ch = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!(
        "rgba({},{},{},{})",
        ch(c[0]),
        ch(c[1]),
        ch(c[2]),
        c[3].clamp(0.0, 1.0)
    )
}
