//! Rendering-surface contract and a headless implementation.

use std::collections::BTreeMap;

use foundation::bounds::Aabb2;
use formats::FieldGeometry;
use layers::{BackgroundLayer, FieldStyle};
use runtime::{FitOptions, View, ViewAnimator, ViewportSize};
use scene::{FeatureStore, Field, FieldId};

/// What a viewport fit should show.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FitTarget<'a> {
    Geometry(&'a FieldGeometry),
    Extent(Aabb2),
}

impl FitTarget<'_> {
    pub fn extent(&self) -> Option<Aabb2> {
        match self {
            FitTarget::Geometry(geometry) => geometry.extent(),
            FitTarget::Extent(extent) => (!extent.is_empty()).then_some(*extent),
        }
    }
}

/// The map the focus logic drives.
pub trait MapSurface {
    fn set_background_layer(&mut self, layer: BackgroundLayer);

    /// Fields drawn under `pixel` (viewport pixels, origin top-left).
    fn hit_test_at_pixel(&self, store: &FeatureStore, pixel: [f64; 2]) -> Vec<FieldId>;

    /// Sets a field's style; `None` restores the layer default.
    fn apply_style(&mut self, field: &Field, style: Option<FieldStyle>);

    /// Animates the view. A new call supersedes a running animation.
    fn fit_view_to(&mut self, target: FitTarget<'_>, opts: FitOptions);
}

/// Surface state without any drawing: view animation, background, and
/// per-field style overrides. Hosts that draw wrap it and read its state
/// every frame.
#[derive(Debug, Clone)]
pub struct SceneSurface {
    size: ViewportSize,
    animator: ViewAnimator,
    clock_ms: f64,
    background: BackgroundLayer,
    styles: BTreeMap<FieldId, FieldStyle>,
}

impl SceneSurface {
    pub fn new(size: ViewportSize, initial: View, background: BackgroundLayer) -> Self {
        Self {
            size,
            animator: ViewAnimator::new(initial),
            clock_ms: 0.0,
            background,
            styles: BTreeMap::new(),
        }
    }

    pub fn size(&self) -> ViewportSize {
        self.size
    }

    pub fn resize(&mut self, size: ViewportSize) {
        self.size = size;
    }

    /// Advances the surface clock and returns the view to draw.
    pub fn advance_to(&mut self, now_ms: f64) -> View {
        self.clock_ms = self.clock_ms.max(now_ms);
        self.animator.sample(self.clock_ms)
    }

    pub fn view(&self) -> View {
        self.animator.current()
    }

    /// Where the running animation ends, or the current view.
    pub fn target_view(&self) -> View {
        self.animator.target()
    }

    pub fn is_animating(&self) -> bool {
        self.animator.is_animating()
    }

    pub fn background(&self) -> BackgroundLayer {
        self.background
    }

    /// Style to draw `field` with.
    pub fn style_for(&self, field: &Field) -> FieldStyle {
        self.styles
            .get(&field.id)
            .cloned()
            .unwrap_or_else(|| FieldStyle::default_for(field))
    }

    pub fn style_override(&self, id: FieldId) -> Option<&FieldStyle> {
        self.styles.get(&id)
    }

    pub fn styled_fields(&self) -> impl Iterator<Item = FieldId> + '_ {
        self.styles.keys().copied()
    }
}

impl MapSurface for SceneSurface {
    fn set_background_layer(&mut self, layer: BackgroundLayer) {
        self.background = layer;
    }

    fn hit_test_at_pixel(&self, store: &FeatureStore, pixel: [f64; 2]) -> Vec<FieldId> {
        let lon_lat = self.animator.current().pixel_to_lon_lat(self.size, pixel);
        scene::picking::fields_at(store, lon_lat)
    }

    fn apply_style(&mut self, field: &Field, style: Option<FieldStyle>) {
        match style {
            Some(style) => {
                self.styles.insert(field.id, style);
            }
            None => {
                self.styles.remove(&field.id);
            }
        }
    }

    fn fit_view_to(&mut self, target: FitTarget<'_>, opts: FitOptions) {
        let Some(extent) = target.extent() else {
            return;
        };
        let to = View::fit(&extent, self.size, &opts);
        self.animator.animate_to(to, opts.duration_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::{FitTarget, MapSurface, SceneSurface};
    use formats::FieldCollection;
    use layers::{BackgroundLayer, FieldStyle};
    use runtime::{FitOptions, View, ViewportSize};
    use scene::{FeatureStore, FieldId};

    fn demo_store() -> FeatureStore {
        let payload = include_str!("../../apps/field_server/assets/geojson/oilfields.geojson");
        FeatureStore::from_collection(
            FieldCollection::from_geojson_str(payload, "fldName").expect("parse"),
        )
    }

    fn surface() -> SceneSurface {
        SceneSurface::new(
            ViewportSize::new(800.0, 600.0),
            View::default(),
            BackgroundLayer::OpenStreetMap,
        )
    }

    #[test]
    fn hit_test_uses_current_view() {
        let store = demo_store();
        let surface = surface();
        let size = surface.size();
        let troll_px = surface.view().lon_lat_to_pixel(size, [3.6, 60.6]);
        assert_eq!(surface.hit_test_at_pixel(&store, troll_px), vec![FieldId(1)]);

        let sea_px = surface.view().lon_lat_to_pixel(size, [0.0, 62.0]);
        assert!(surface.hit_test_at_pixel(&store, sea_px).is_empty());
    }

    #[test]
    fn style_override_and_reset() {
        let store = demo_store();
        let troll = &store.fields()[1];
        let mut surface = surface();

        surface.apply_style(troll, Some(FieldStyle::focus_for(troll)));
        assert!(surface.style_for(troll).is_focus());
        assert_eq!(surface.styled_fields().collect::<Vec<_>>(), vec![FieldId(1)]);

        surface.apply_style(troll, None);
        assert_eq!(surface.style_for(troll), FieldStyle::default_for(troll));
        assert_eq!(surface.styled_fields().count(), 0);
    }

    #[test]
    fn fit_animates_on_surface_clock() {
        let store = demo_store();
        let ekofisk = &store.fields()[0];
        let mut surface = surface();
        surface.advance_to(1_000.0);

        let opts = FitOptions {
            max_zoom: Some(9.0),
            duration_ms: 500.0,
            ..FitOptions::default()
        };
        surface.fit_view_to(FitTarget::Geometry(&ekofisk.geometry), opts);
        assert!(surface.is_animating());
        let target = surface.target_view();
        assert!(target.zoom <= 9.0);

        surface.advance_to(1_000.0);
        surface.advance_to(1_250.0);
        assert!(surface.is_animating());
        assert_eq!(surface.advance_to(1_500.0), target);
        assert!(!surface.is_animating());
    }

    #[test]
    fn fit_after_idle_frames_still_animates() {
        let store = demo_store();
        let troll = &store.fields()[1];
        let mut surface = surface();
        surface.advance_to(1_000.0);

        let opts = FitOptions {
            max_zoom: Some(9.0),
            duration_ms: 500.0,
            ..FitOptions::default()
        };
        surface.fit_view_to(FitTarget::Geometry(&troll.geometry), opts);
        let target = surface.target_view();

        // Host resumes its frame loop ten seconds later.
        assert_eq!(surface.advance_to(11_000.0), View::default());
        assert!(surface.is_animating());
        let mid = surface.advance_to(11_250.0);
        assert!(mid.zoom > View::default().zoom && mid.zoom < target.zoom);
        assert_eq!(surface.advance_to(11_500.0), target);
        assert!(!surface.is_animating());
    }

    #[test]
    fn empty_extent_is_not_fitted() {
        let mut surface = surface();
        surface.fit_view_to(
            FitTarget::Extent(foundation::bounds::Aabb2::empty()),
            FitOptions::default(),
        );
        assert!(!surface.is_animating());
        assert_eq!(surface.view(), View::default());
    }
}
