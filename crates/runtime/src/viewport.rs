//! Map view state, extent fitting and view animation.
//!
//! Time is supplied by the caller in milliseconds so animations are
//! deterministic and replayable in tests.

use foundation::bounds::Aabb2;
use foundation::math::{
    extent_to_mercator, lon_lat_to_mercator, mercator_to_lon_lat, resolution_for_zoom,
    zoom_for_resolution,
};

pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 28.0;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewportSize {
    pub width_px: f64,
    pub height_px: f64,
}

impl ViewportSize {
    pub fn new(width_px: f64, height_px: f64) -> Self {
        Self {
            width_px: width_px.max(1.0),
            height_px: height_px.max(1.0),
        }
    }
}

/// Centre (`[lon_deg, lat_deg]`) and zoom of a Web Mercator map.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct View {
    pub center: [f64; 2],
    pub zoom: f64,
}

impl Default for View {
    fn default() -> Self {
        Self {
            center: [10.0, 65.0],
            zoom: 4.0,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FitOptions {
    pub max_zoom: Option<f64>,
    /// `[top, right, bottom, left]` in pixels.
    pub padding_px: [f64; 4],
    pub duration_ms: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            max_zoom: None,
            padding_px: [0.0; 4],
            duration_ms: 0.0,
        }
    }
}

impl View {
    pub fn new(center: [f64; 2], zoom: f64) -> Self {
        Self { center, zoom }
    }

    /// Meters per pixel.
    pub fn resolution(&self) -> f64 {
        resolution_for_zoom(self.zoom)
    }

    /// View that shows `extent` inside `size` minus padding.
    ///
    /// Zoom is continuous and clamped to `opts.max_zoom` (or [`MAX_ZOOM`]);
    /// asymmetric padding shifts the centre so the extent sits in the
    /// unpadded area.
    pub fn fit(extent: &Aabb2, size: ViewportSize, opts: &FitOptions) -> Self {
        let m = extent_to_mercator(extent);
        let [top, right, bottom, left] = opts.padding_px;
        let avail_w = (size.width_px - left - right).max(1.0);
        let avail_h = (size.height_px - top - bottom).max(1.0);
        let raw_res = (m.width() / avail_w).max(m.height() / avail_h);

        let max_zoom = opts.max_zoom.unwrap_or(MAX_ZOOM).min(MAX_ZOOM);
        let zoom = if raw_res > 0.0 && raw_res.is_finite() {
            zoom_for_resolution(raw_res).clamp(MIN_ZOOM, max_zoom)
        } else {
            max_zoom
        };
        let res = resolution_for_zoom(zoom);

        let c = m.center();
        let center_m = [
            c[0] + 0.5 * (right - left) * res,
            c[1] + 0.5 * (top - bottom) * res,
        ];
        Self {
            center: mercator_to_lon_lat(center_m),
            zoom,
        }
    }

    /// Map coordinate under a pixel (origin top-left, y down).
    pub fn pixel_to_lon_lat(&self, size: ViewportSize, pixel: [f64; 2]) -> [f64; 2] {
        let res = self.resolution();
        let c = lon_lat_to_mercator(self.center);
        mercator_to_lon_lat([
            c[0] + (pixel[0] - 0.5 * size.width_px) * res,
            c[1] - (pixel[1] - 0.5 * size.height_px) * res,
        ])
    }

    pub fn lon_lat_to_pixel(&self, size: ViewportSize, lon_lat: [f64; 2]) -> [f64; 2] {
        let res = self.resolution();
        let c = lon_lat_to_mercator(self.center);
        let m = lon_lat_to_mercator(lon_lat);
        [
            0.5 * size.width_px + (m[0] - c[0]) / res,
            0.5 * size.height_px - (m[1] - c[1]) / res,
        ]
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewAnimation {
    pub from: View,
    pub to: View,
    /// Set by the first frame sampled after the request.
    pub start_ms: Option<f64>,
    pub duration_ms: f64,
}

impl ViewAnimation {
    /// Interpolated view and whether the animation has finished.
    pub fn sample(&self, now_ms: f64) -> (View, bool) {
        if self.duration_ms <= 0.0 {
            return (self.to, true);
        }
        let start_ms = self.start_ms.unwrap_or(now_ms);
        let t = ((now_ms - start_ms) / self.duration_ms).clamp(0.0, 1.0);
        if t >= 1.0 {
            return (self.to, true);
        }
        let k = ease_in_out(t);
        let a = lon_lat_to_mercator(self.from.center);
        let b = lon_lat_to_mercator(self.to.center);
        let center = mercator_to_lon_lat([a[0] + (b[0] - a[0]) * k, a[1] + (b[1] - a[1]) * k]);
        let zoom = self.from.zoom + (self.to.zoom - self.from.zoom) * k;
        (View { center, zoom }, false)
    }
}

fn ease_in_out(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

/// Current view plus at most one running animation.
///
/// A new animation starts from wherever the view is at that moment and
/// replaces the running one; requests are never queued.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewAnimator {
    current: View,
    active: Option<ViewAnimation>,
}

impl ViewAnimator {
    pub fn new(initial: View) -> Self {
        Self {
            current: initial,
            active: None,
        }
    }

    pub fn current(&self) -> View {
        self.current
    }

    pub fn target(&self) -> View {
        self.active.map(|a| a.to).unwrap_or(self.current)
    }

    pub fn is_animating(&self) -> bool {
        self.active.is_some()
    }

    /// Starts from the last sampled view. The clock starts at the next
    /// `sample`, so an idle frame loop still plays the full duration.
    pub fn animate_to(&mut self, to: View, duration_ms: f64) {
        if duration_ms <= 0.0 {
            self.current = to;
            self.active = None;
            return;
        }
        self.active = Some(ViewAnimation {
            from: self.current,
            to,
            start_ms: None,
            duration_ms,
        });
    }

    /// Advances to `now_ms` and returns the view to draw.
    pub fn sample(&mut self, now_ms: f64) -> View {
        if let Some(anim) = self.active.as_mut() {
            anim.start_ms.get_or_insert(now_ms);
            let (view, done) = anim.sample(now_ms);
            self.current = view;
            if done {
                self.active = None;
            }
        }
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::{FitOptions, View, ViewAnimator, ViewportSize};
    use foundation::bounds::Aabb2;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn fit_centers_extent_and_fills_viewport() {
        let extent = Aabb2::new([3.0, 60.0], [4.0, 61.0]);
        let size = ViewportSize::new(800.0, 600.0);
        let view = View::fit(&extent, size, &FitOptions::default());

        let min_px = view.lon_lat_to_pixel(size, [extent.min[0], extent.max[1]]);
        let max_px = view.lon_lat_to_pixel(size, [extent.max[0], extent.min[1]]);
        // The tighter axis touches the viewport edges.
        let touches_x = close(min_px[0], 0.0) && close(max_px[0], 800.0);
        let touches_y = close(min_px[1], 0.0) && close(max_px[1], 600.0);
        assert!(touches_x || touches_y);
        assert!(min_px[0] >= -1e-6 && max_px[0] <= 800.0 + 1e-6);
        assert!(min_px[1] >= -1e-6 && max_px[1] <= 600.0 + 1e-6);
    }

    #[test]
    fn fit_respects_max_zoom() {
        let tiny = Aabb2::new([3.0, 60.0], [3.0001, 60.0001]);
        let opts = FitOptions {
            max_zoom: Some(9.0),
            ..FitOptions::default()
        };
        let view = View::fit(&tiny, ViewportSize::new(800.0, 600.0), &opts);
        assert_eq!(view.zoom, 9.0);

        let point = Aabb2::new([3.0, 60.0], [3.0, 60.0]);
        let view = View::fit(&point, ViewportSize::new(800.0, 600.0), &opts);
        assert_eq!(view.zoom, 9.0);
    }

    #[test]
    fn uniform_padding_keeps_center_and_zooms_out() {
        let extent = Aabb2::new([2.0, 56.0], [22.0, 72.0]);
        let size = ViewportSize::new(800.0, 600.0);
        let bare = View::fit(&extent, size, &FitOptions::default());
        let padded = View::fit(
            &extent,
            size,
            &FitOptions {
                padding_px: [10.0; 4],
                ..FitOptions::default()
            },
        );
        assert!(padded.zoom < bare.zoom);
        assert!(close(padded.center[0], bare.center[0]));
        assert!(close(padded.center[1], bare.center[1]));
    }

    #[test]
    fn pixel_mapping_round_trips() {
        let view = View::default();
        let size = ViewportSize::new(640.0, 480.0);
        let ll = view.pixel_to_lon_lat(size, [100.0, 400.0]);
        let px = view.lon_lat_to_pixel(size, ll);
        assert!(close(px[0], 100.0) && close(px[1], 400.0));
        let center = view.pixel_to_lon_lat(size, [320.0, 240.0]);
        assert!(close(center[0], 10.0) && close(center[1], 65.0));
    }

    #[test]
    fn animation_reaches_target_after_duration() {
        let mut anim = ViewAnimator::new(View::default());
        let to = View::new([3.0, 60.0], 8.0);
        anim.animate_to(to, 500.0);
        assert!(anim.is_animating());

        assert_eq!(anim.sample(0.0), View::default());
        let mid = anim.sample(250.0);
        assert!(mid.zoom > 4.0 && mid.zoom < 8.0);
        assert_eq!(anim.sample(500.0), to);
        assert!(!anim.is_animating());
    }

    #[test]
    fn later_request_supersedes_running_animation() {
        let mut anim = ViewAnimator::new(View::default());
        let first = View::new([3.0, 60.0], 8.0);
        let second = View::new([21.0, 71.0], 6.0);

        anim.animate_to(first, 500.0);
        anim.sample(0.0);
        let at_switch = anim.sample(200.0);
        anim.animate_to(second, 500.0);

        assert_eq!(anim.target(), second);
        // Continues from where the first animation was, not from its target.
        let resumed = anim.sample(200.0);
        assert!(close(resumed.zoom, at_switch.zoom));
        assert!(close(resumed.center[0], at_switch.center[0]));
        assert!(close(resumed.center[1], at_switch.center[1]));
        assert_eq!(anim.sample(700.0), second);
        assert_eq!(anim.sample(10_000.0), second);
    }

    #[test]
    fn zero_duration_jumps() {
        let mut anim = ViewAnimator::new(View::default());
        let to = View::new([3.0, 60.0], 8.0);
        anim.animate_to(to, 0.0);
        assert!(!anim.is_animating());
        assert_eq!(anim.current(), to);
    }

    #[test]
    fn idle_clock_does_not_shorten_animation() {
        let mut anim = ViewAnimator::new(View::default());
        anim.sample(1_000.0);
        let to = View::new([3.0, 60.0], 8.0);
        anim.animate_to(to, 500.0);

        // First frame arrives long after the request.
        assert_eq!(anim.sample(11_000.0), View::default());
        assert!(anim.is_animating());
        let mid = anim.sample(11_250.0);
        assert!(mid.zoom > 4.0 && mid.zoom < 8.0);
        assert_eq!(anim.sample(11_500.0), to);
        assert!(!anim.is_animating());
    }
}
