//! Selection and view synchronization for one mounted map.
//!
//! Three inputs drive the controller: the requested slug (from the host's
//! route), the one-shot load-complete event, and clicks. Clicks never select
//! directly; they ask the host to navigate, and the selection follows when
//! the new route comes back as a requested slug.
//!
//! Ordering contract for a selection change:
//! - the previous field's style is reset before the new field is styled
//! - the viewport fit is requested last, once per change

use foundation::slug::Slug;
use formats::FieldCollection;
use layers::{BackgroundLayer, FieldStyle, Theme};
use scene::selection::{Selection, SelectionChange};
use scene::{FeatureStore, Field, LoadError, LoadSummary};
use tracing::debug;

use crate::config::FocusConfig;
use crate::navigation::{FieldRoute, Navigator};
use crate::surface::{FitTarget, MapSurface};

pub struct FocusController<S, N> {
    config: FocusConfig,
    route: FieldRoute,
    store: FeatureStore,
    surface: S,
    navigator: N,
    selection: Selection,
    requested_slug: Option<Slug>,
}

impl<S: MapSurface, N: Navigator> FocusController<S, N> {
    pub fn new(config: FocusConfig, surface: S, navigator: N) -> Self {
        Self {
            route: FieldRoute::new(config.route_prefix.clone()),
            config,
            store: FeatureStore::new(),
            surface,
            navigator,
            selection: Selection::new(),
            requested_slug: None,
        }
    }

    pub fn config(&self) -> &FocusConfig {
        &self.config
    }

    pub fn store(&self) -> &FeatureStore {
        &self.store
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Store and surface together, for hosts that draw fields.
    pub fn store_and_surface_mut(&mut self) -> (&FeatureStore, &mut S) {
        (&self.store, &mut self.surface)
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn navigator_mut(&mut self) -> &mut N {
        &mut self.navigator
    }

    pub fn route(&self) -> &FieldRoute {
        &self.route
    }

    pub fn is_loaded(&self) -> bool {
        self.store.is_loaded()
    }

    pub fn requested_slug(&self) -> Option<&Slug> {
        self.requested_slug.as_ref()
    }

    pub fn selected(&self) -> Option<&Field> {
        self.selection.current().and_then(|id| self.store.get(id))
    }

    /// Starts the single fetch and returns the URL to load.
    pub fn begin_load(&mut self) -> Result<String, LoadError> {
        self.store.begin_load()?;
        Ok(self.config.data_url())
    }

    /// Load-complete input.
    ///
    /// The viewport is recomputed once even when the selection is unchanged
    /// (typically: nothing requested, so all fields are fitted).
    pub fn on_load_complete(
        &mut self,
        outcome: Result<FieldCollection, LoadError>,
    ) -> Option<LoadSummary> {
        let summary = self.store.finish_load(outcome)?;
        if !self.resolve() {
            self.refresh_viewport();
        }
        Some(summary)
    }

    /// Requested-slug input. Safe before loading; resolution then yields
    /// nothing and is retried at load-complete.
    pub fn on_requested_slug_change(&mut self, slug: Option<Slug>) {
        self.requested_slug = slug;
        self.resolve();
    }

    /// Same as [`Self::on_requested_slug_change`] for a full route path.
    pub fn on_route_change(&mut self, path: &str) {
        let slug = self.route.slug_from_path(path);
        self.on_requested_slug_change(slug);
    }

    /// Click input. A single hit asks the host to navigate to that field and
    /// returns its slug; zero or several hits do nothing, and so does a field
    /// whose name has no slug.
    pub fn on_click(&mut self, pixel: [f64; 2]) -> Option<Slug> {
        if self.store.is_empty() {
            return None;
        }
        let hits = self.surface.hit_test_at_pixel(&self.store, pixel);
        let [id] = hits.as_slice() else {
            debug!(hits = hits.len(), "click ignored");
            return None;
        };
        let field = self.store.get(*id)?;
        if field.slug.is_empty() {
            debug!(field = %field.name, "clicked field has no slug");
            return None;
        }
        let path = self.route.path_for(&field.slug);
        debug!(field = %field.name, %path, "navigating to clicked field");
        self.navigator.navigate(&path);
        Some(field.slug.clone())
    }

    /// Swaps the base map. Selection is untouched.
    pub fn set_theme(&mut self, theme: Theme) {
        self.surface
            .set_background_layer(BackgroundLayer::for_theme(theme));
    }

    /// Re-resolves the selection from the requested slug. Returns whether the
    /// selected identity changed.
    fn resolve(&mut self) -> bool {
        let next = self
            .requested_slug
            .as_ref()
            .and_then(|slug| self.store.find_by_slug(slug))
            .map(|field| field.id);
        match self.selection.replace(next) {
            Some(change) => {
                self.transition(change);
                true
            }
            None => false,
        }
    }

    fn transition(&mut self, change: SelectionChange) {
        debug!(previous = ?change.previous, next = ?change.next, "selection changed");
        if let Some(old) = change.previous.and_then(|id| self.store.get(id)) {
            self.surface.apply_style(old, None);
        }
        if let Some(new) = change.next.and_then(|id| self.store.get(id)) {
            self.surface.apply_style(new, Some(FieldStyle::focus_for(new)));
        }
        self.refresh_viewport();
    }

    fn refresh_viewport(&mut self) {
        if let Some(field) = self.selection.current().and_then(|id| self.store.get(id)) {
            self.surface.fit_view_to(
                FitTarget::Geometry(&field.geometry),
                self.config.focus_fit_options(),
            );
        } else if let Some(extent) = self.store.extent_of_all() {
            self.surface
                .fit_view_to(FitTarget::Extent(extent), self.config.fit_all_options());
        }
    }
}
