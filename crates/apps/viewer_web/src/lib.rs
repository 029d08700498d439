use console_error_panic_hook::set_once;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use focus::{FocusConfig, FocusController, MapSurface, Navigator};
use foundation::slug::Slug;
use layers::{BackgroundLayer, Theme};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MediaQueryList, MediaQueryListEvent};

mod canvas;
mod http;
use canvas::CanvasSurface;
use http::HttpSource;

/// Navigation requests collected while the controller is borrowed and
/// handed to the host afterwards, so the host router may call back in.
#[derive(Debug, Default)]
pub struct PendingNavigation {
    paths: Vec<String>,
}

impl Navigator for PendingNavigation {
    fn navigate(&mut self, path: &str) {
        self.paths.push(path.to_string());
    }
}

type Controller = FocusController<CanvasSurface, PendingNavigation>;

fn log(msg: &str) {
    web_sys::console::log_1(&JsValue::from_str(msg));
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn dark_mode_query() -> Option<MediaQueryList> {
    web_sys::window()?
        .match_media("(prefers-color-scheme: dark)")
        .ok()
        .flatten()
}

/// Applies an OS colour-scheme change to a still-mounted map. Returns
/// whether the theme was applied.
fn follow_color_scheme<S: MapSurface, N: Navigator>(
    map: &Weak<RefCell<FocusController<S, N>>>,
    dark: bool,
) -> bool {
    let Some(map) = map.upgrade() else {
        return false;
    };
    let Ok(mut c) = map.try_borrow_mut() else {
        log("theme change dropped: map busy");
        return false;
    };
    c.set_theme(Theme::from_prefers_dark(dark));
    true
}

/// Keeps the background in step with the OS colour scheme until dropped.
struct ThemeListener {
    query: MediaQueryList,
    on_change: Closure<dyn FnMut(MediaQueryListEvent)>,
}

impl ThemeListener {
    fn attach(query: MediaQueryList, inner: &Rc<RefCell<Controller>>) -> Result<Self, JsValue> {
        let inner = Rc::downgrade(inner);
        let on_change = Closure::<dyn FnMut(MediaQueryListEvent)>::new(
            move |event: MediaQueryListEvent| {
                follow_color_scheme(&inner, event.matches());
            },
        );
        query.add_event_listener_with_callback("change", on_change.as_ref().unchecked_ref())?;
        Ok(Self { query, on_change })
    }
}

impl Drop for ThemeListener {
    fn drop(&mut self) {
        let _ = self
            .query
            .remove_event_listener_with_callback("change", self.on_change.as_ref().unchecked_ref());
    }
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    Ok(())
}

/// One mounted oil-field map bound to a canvas.
///
/// The host drives it: route changes, clicks in canvas pixels, theme
/// changes and animation frames all come in through these methods.
#[wasm_bindgen]
pub struct OilFieldMap {
    inner: Rc<RefCell<Controller>>,
    navigate: js_sys::Function,
    _theme: Option<ThemeListener>,
}

#[wasm_bindgen]
impl OilFieldMap {
    /// `config_json` may be omitted or partial; `navigate` receives paths
    /// such as `/map/troll`.
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas_id: &str,
        config_json: Option<String>,
        navigate: js_sys::Function,
    ) -> Result<OilFieldMap, JsValue> {
        let config = match config_json.as_deref() {
            Some(json) => FocusConfig::from_json_str(json).map_err(js_err)?,
            None => FocusConfig::default(),
        };

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str(&format!("canvas #{canvas_id} not found")))?
            .dyn_into()?;
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into()?;

        let query = dark_mode_query();
        let theme = Theme::from_prefers_dark(query.as_ref().is_some_and(MediaQueryList::matches));
        let surface = CanvasSurface::new(
            canvas,
            ctx,
            config.default_view(),
            BackgroundLayer::for_theme(theme),
        );
        let controller = FocusController::new(config, surface, PendingNavigation::default());
        let inner = Rc::new(RefCell::new(controller));
        let theme_listener = match query {
            Some(query) => Some(ThemeListener::attach(query, &inner)?),
            None => None,
        };
        let map = OilFieldMap {
            inner,
            navigate,
            _theme: theme_listener,
        };
        map.load();
        Ok(map)
    }

    /// Current route path; the slug segment under the route prefix selects.
    pub fn set_route(&self, path: &str) {
        self.inner.borrow_mut().on_route_change(path);
    }

    pub fn set_requested_slug(&self, slug: Option<String>) {
        let slug = slug.filter(|s| !s.is_empty()).map(|s| Slug::from_segment(&s));
        self.inner.borrow_mut().on_requested_slug_change(slug);
    }

    /// Click at canvas pixel (`offsetX`, `offsetY`). Returns the slug
    /// navigated to, if the click hit exactly one field.
    pub fn click(&self, x: f64, y: f64) -> Result<Option<String>, JsValue> {
        let (slug, paths) = {
            let mut c = self.inner.borrow_mut();
            let slug = c.on_click([x, y]);
            (slug, std::mem::take(&mut c.navigator_mut().paths))
        };
        for path in paths {
            self.navigate.call1(&JsValue::NULL, &JsValue::from_str(&path))?;
        }
        Ok(slug.map(|s| s.as_str().to_string()))
    }

    /// Overrides the OS colour scheme until it next changes.
    pub fn set_dark_mode(&self, dark: bool) {
        self.inner
            .borrow_mut()
            .set_theme(Theme::from_prefers_dark(dark));
    }

    pub fn resize(&self, width_px: f64, height_px: f64) {
        self.inner
            .borrow_mut()
            .surface_mut()
            .resize(width_px, height_px);
    }

    /// Draws one frame at `now_ms` (e.g. the `requestAnimationFrame`
    /// timestamp). Returns whether a view animation is still running.
    pub fn frame(&self, now_ms: f64) -> bool {
        let mut c = self.inner.borrow_mut();
        let (store, surface) = c.store_and_surface_mut();
        surface.draw(store, now_ms);
        surface.is_animating()
    }

    pub fn selected_field(&self) -> Option<String> {
        self.inner.borrow().selected().map(|f| f.name.clone())
    }
}

impl OilFieldMap {
    fn load(&self) {
        let (url, name_property) = {
            let mut c = self.inner.borrow_mut();
            match c.begin_load() {
                Ok(url) => (url, c.config().name_property.clone()),
                Err(err) => {
                    log(&format!("load not started: {err}"));
                    return;
                }
            }
        };
        let inner = Rc::clone(&self.inner);
        spawn_local(async move {
            let outcome = scene::fetch_fields(&HttpSource, &url, &name_property).await;
            if let Err(err) = &outcome {
                log(&format!("Failed to load fields: {err}"));
            }
            if let Some(summary) = inner.borrow_mut().on_load_complete(outcome) {
                log(&format!(
                    "fields loaded: {} (skipped {})",
                    summary.fields, summary.skipped
                ));
            }
        });
    }
}
