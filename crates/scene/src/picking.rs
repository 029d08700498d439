use foundation::math::lon_lat_to_mercator;

use crate::field::FieldId;
use crate::store::FeatureStore;

/// Fields whose area contains `[lon_deg, lat_deg]`.
///
/// Ordering contract:
/// - Ids are returned in ascending order.
///
/// Notes:
/// - Field extents are used as a prefilter.
/// - The even-odd rule runs in Web Mercator so edges match the drawn map;
///   holes therefore do not count as inside.
/// - Points exactly on an edge may land on either side.
pub fn fields_at(store: &FeatureStore, lon_lat: [f64; 2]) -> Vec<FieldId> {
    let p = lon_lat_to_mercator(lon_lat);
    store
        .fields()
        .iter()
        .filter(|field| field.extent.contains(lon_lat))
        .filter(|field| {
            field
                .geometry
                .polygons()
                .any(|rings| rings_contain(rings, p))
        })
        .map(|field| field.id)
        .collect()
}

fn rings_contain(rings: &[Vec<[f64; 2]>], p: [f64; 2]) -> bool {
    let mut inside = false;
    for ring in rings {
        if ring_crossings_odd(ring, p) {
            inside = !inside;
        }
    }
    inside
}

fn ring_crossings_odd(ring: &[[f64; 2]], p: [f64; 2]) -> bool {
    if ring.len() < 3 {
        return false;
    }
    let mut odd = false;
    let mut prev = lon_lat_to_mercator(ring[ring.len() - 1]);
    for vertex in ring {
        let cur = lon_lat_to_mercator(*vertex);
        if (cur[1] > p[1]) != (prev[1] > p[1]) {
            let x_at = cur[0] + (p[1] - cur[1]) * (prev[0] - cur[0]) / (prev[1] - cur[1]);
            if p[0] < x_at {
                odd = !odd;
            }
        }
        prev = cur;
    }
    odd
}

#[cfg(test)]
mod tests {
    use super::fields_at;
    use crate::field::FieldId;
    use crate::store::FeatureStore;
    use formats::FieldCollection;
    use pretty_assertions::assert_eq;

    fn demo_store() -> FeatureStore {
        let payload = include_str!("../../apps/field_server/assets/geojson/oilfields.geojson");
        FeatureStore::from_collection(
            FieldCollection::from_geojson_str(payload, "fldName").expect("parse"),
        )
    }

    #[test]
    fn hits_polygon_and_multipolygon_parts() {
        let store = demo_store();
        assert_eq!(fields_at(&store, [3.2, 56.55]), vec![FieldId(0)]);
        assert_eq!(fields_at(&store, [3.6, 60.6]), vec![FieldId(1)]);
        assert_eq!(fields_at(&store, [3.9, 60.9]), vec![FieldId(1)]);
    }

    #[test]
    fn misses_gaps_and_holes() {
        let store = demo_store();
        // Between the two Troll parts.
        assert!(fields_at(&store, [3.82, 60.82]).is_empty());
        // Inside the Johan Sverdrup hole.
        assert!(fields_at(&store, [2.77, 58.87]).is_empty());
        assert_eq!(fields_at(&store, [2.70, 58.80]), vec![FieldId(2)]);
        // Open sea.
        assert!(fields_at(&store, [0.0, 0.0]).is_empty());
    }

    #[test]
    fn overlapping_fields_are_all_reported() {
        let payload = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {"fldName": "A"},
             "geometry": {"type": "Polygon", "coordinates": [[[0,0],[2,0],[2,2],[0,2],[0,0]]]}},
            {"type": "Feature", "properties": {"fldName": "B"},
             "geometry": {"type": "Polygon", "coordinates": [[[1,1],[3,1],[3,3],[1,3],[1,1]]]}}
        ]}"#;
        let store = FeatureStore::from_collection(
            FieldCollection::from_geojson_str(payload, "fldName").expect("parse"),
        );
        assert_eq!(fields_at(&store, [1.5, 1.5]), vec![FieldId(0), FieldId(1)]);
        assert_eq!(fields_at(&store, [0.5, 0.5]), vec![FieldId(0)]);
    }

    #[test]
    fn empty_store_hits_nothing() {
        assert!(fields_at(&FeatureStore::new(), [3.2, 56.55]).is_empty());
    }
}
