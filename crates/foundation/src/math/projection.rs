//! Spherical Web Mercator (EPSG:3857).
//!
//! Map views, fits and hit tests are computed in this projection so that
//! polygon edges and extents line up with what a tiled base map draws.

use crate::bounds::Aabb2;

/// Sphere radius used by Web Mercator (meters).
pub const MERCATOR_RADIUS: f64 = 6_378_137.0;

/// Latitude limit of the square Web Mercator world.
pub const MERCATOR_MAX_LAT_DEG: f64 = 85.051_128_779_806_59;

/// Meters per pixel at zoom 0 for 256px tiles.
pub const MERCATOR_RESOLUTION_Z0: f64 = 2.0 * std::f64::consts::PI * MERCATOR_RADIUS / 256.0;

/// Projects `[lon_deg, lat_deg]` to Web Mercator meters.
///
/// Latitude is clamped to [`MERCATOR_MAX_LAT_DEG`].
pub fn lon_lat_to_mercator(p: [f64; 2]) -> [f64; 2] {
    let lat = p[1].clamp(-MERCATOR_MAX_LAT_DEG, MERCATOR_MAX_LAT_DEG);
    let x = MERCATOR_RADIUS * p[0].to_radians();
    let y = MERCATOR_RADIUS * (std::f64::consts::FRAC_PI_4 + 0.5 * lat.to_radians()).tan().ln();
    [x, y]
}

pub fn mercator_to_lon_lat(m: [f64; 2]) -> [f64; 2] {
    let lon = (m[0] / MERCATOR_RADIUS).to_degrees();
    let lat = (2.0 * (m[1] / MERCATOR_RADIUS).exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees();
    [lon, lat]
}

/// Projects a lon/lat extent; Mercator is separable so corners suffice.
pub fn extent_to_mercator(extent: &Aabb2) -> Aabb2 {
    Aabb2::new(lon_lat_to_mercator(extent.min), lon_lat_to_mercator(extent.max))
}

pub fn resolution_for_zoom(zoom: f64) -> f64 {
    MERCATOR_RESOLUTION_Z0 / zoom.exp2()
}

pub fn zoom_for_resolution(resolution: f64) -> f64 {
    (MERCATOR_RESOLUTION_Z0 / resolution).log2()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_maps_to_origin() {
        let m = lon_lat_to_mercator([0.0, 0.0]);
        assert!(m[0].abs() < 1e-9);
        assert!(m[1].abs() < 1e-9);
    }

    #[test]
    fn inverse_recovers_lon_lat() {
        let p = [10.0, 65.0];
        let back = mercator_to_lon_lat(lon_lat_to_mercator(p));
        assert!((back[0] - p[0]).abs() < 1e-9);
        assert!((back[1] - p[1]).abs() < 1e-9);
    }

    #[test]
    fn zoom_and_resolution_are_inverse() {
        for z in [0.0, 4.0, 9.0, 17.5] {
            assert!((zoom_for_resolution(resolution_for_zoom(z)) - z).abs() < 1e-9);
        }
        assert!((resolution_for_zoom(1.0) * 2.0 - MERCATOR_RESOLUTION_Z0).abs() < 1e-6);
    }
}
