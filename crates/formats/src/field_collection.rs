use foundation::bounds::Aabb2;
use serde_json::{Map, Value};

/// Closed or open ring of `[lon_deg, lat_deg]` positions.
pub type Ring = Vec<[f64; 2]>;

/// Area geometry of a field. The first ring of each polygon is the outer
/// boundary; the rest are holes.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldGeometry {
    Polygon(Vec<Ring>),
    MultiPolygon(Vec<Vec<Ring>>),
}

impl FieldGeometry {
    /// Iterates polygons as ring slices, uniformly for both variants.
    pub fn polygons(&self) -> impl Iterator<Item = &[Ring]> + '_ {
        let (single, multi) = match self {
            FieldGeometry::Polygon(rings) => (Some(rings.as_slice()), None),
            FieldGeometry::MultiPolygon(polys) => (None, Some(polys.iter().map(Vec::as_slice))),
        };
        single.into_iter().chain(multi.into_iter().flatten())
    }

    /// Extent of the outer rings; `None` when the geometry has no positions.
    pub fn extent(&self) -> Option<Aabb2> {
        Aabb2::from_points(
            self.polygons()
                .filter_map(|rings| rings.first())
                .flat_map(|outer| outer.iter().copied()),
        )
    }
}

/// One parsed GeoJSON feature that qualifies as a field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFeature {
    pub name: String,
    pub geometry: FieldGeometry,
    /// Remaining properties, without the name property.
    pub properties: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedFeature {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldCollection {
    pub fields: Vec<FieldFeature>,
    /// Features that were present but did not describe a named area.
    pub skipped: Vec<SkippedFeature>,
}

#[derive(Debug)]
pub enum FieldCollectionError {
    Json(serde_json::Error),
    NotAFeatureCollection,
}

impl std::fmt::Display for FieldCollectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldCollectionError::Json(e) => write!(f, "JSON parse error: {e}"),
            FieldCollectionError::NotAFeatureCollection => {
                write!(f, "expected GeoJSON FeatureCollection")
            }
        }
    }
}

impl std::error::Error for FieldCollectionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FieldCollectionError::Json(e) => Some(e),
            FieldCollectionError::NotAFeatureCollection => None,
        }
    }
}

impl FieldCollection {
    pub fn from_geojson_str(payload: &str, name_property: &str) -> Result<Self, FieldCollectionError> {
        let value: Value = serde_json::from_str(payload).map_err(FieldCollectionError::Json)?;
        Self::from_geojson_value(&value, name_property)
    }

    /// Parses a FeatureCollection, keeping features with a non-empty
    /// `name_property` and a Polygon/MultiPolygon geometry.
    ///
    /// Individual bad features are recorded in `skipped` instead of failing
    /// the whole collection.
    pub fn from_geojson_value(value: &Value, name_property: &str) -> Result<Self, FieldCollectionError> {
        let obj = value
            .as_object()
            .ok_or(FieldCollectionError::NotAFeatureCollection)?;
        let ty = obj
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or(FieldCollectionError::NotAFeatureCollection)?;
        if ty != "FeatureCollection" {
            return Err(FieldCollectionError::NotAFeatureCollection);
        }
        let features_val = obj
            .get("features")
            .and_then(|v| v.as_array())
            .ok_or(FieldCollectionError::NotAFeatureCollection)?;

        let mut out = FieldCollection::default();
        for (index, feat_val) in features_val.iter().enumerate() {
            match parse_feature(feat_val, name_property) {
                Ok(feature) => out.fields.push(feature),
                Err(reason) => out.skipped.push(SkippedFeature { index, reason }),
            }
        }
        Ok(out)
    }
}

fn parse_feature(value: &Value, name_property: &str) -> Result<FieldFeature, String> {
    let feat_obj = value
        .as_object()
        .ok_or("feature must be an object".to_string())?;
    match feat_obj.get("type").and_then(|v| v.as_str()) {
        Some("Feature") => {}
        Some(other) => return Err(format!("unexpected feature type: {other}")),
        None => return Err("feature missing type".to_string()),
    }

    let mut properties = feat_obj
        .get("properties")
        .and_then(|v| v.as_object())
        .cloned()
        .unwrap_or_default();
    let name = match properties.remove(name_property) {
        Some(Value::String(s)) if !s.trim().is_empty() => s,
        Some(_) => return Err(format!("property {name_property} must be a non-empty string")),
        None => return Err(format!("feature missing property {name_property}")),
    };

    let geometry_val = feat_obj
        .get("geometry")
        .ok_or("feature missing geometry".to_string())?;
    let geometry = parse_geometry(geometry_val)?;
    if geometry.extent().is_none() {
        return Err("geometry has no positions".to_string());
    }

    Ok(FieldFeature {
        name,
        geometry,
        properties,
    })
}

fn parse_geometry(value: &Value) -> Result<FieldGeometry, String> {
    let obj = value
        .as_object()
        .ok_or("geometry must be an object".to_string())?;
    let ty = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("geometry missing type".to_string())?;
    let coords = obj
        .get("coordinates")
        .ok_or("geometry missing coordinates".to_string())?;

    match ty {
        "Polygon" => Ok(FieldGeometry::Polygon(parse_polygon(coords)?)),
        "MultiPolygon" => Ok(FieldGeometry::MultiPolygon(parse_multi_polygon(coords)?)),
        other => Err(format!("unsupported geometry type: {other}")),
    }
}

fn parse_position(coords: &Value) -> Result<[f64; 2], String> {
    let arr = coords
        .as_array()
        .ok_or("position must be an array".to_string())?;
    if arr.len() < 2 {
        return Err("position must have [lon, lat]".to_string());
    }
    let lon = arr[0].as_f64().ok_or("lon must be a number".to_string())?;
    let lat = arr[1].as_f64().ok_or("lat must be a number".to_string())?;
    Ok([lon, lat])
}

fn parse_ring(coords: &Value) -> Result<Ring, String> {
    let arr = coords
        .as_array()
        .ok_or("ring must be an array of positions".to_string())?;
    arr.iter().map(parse_position).collect()
}

fn parse_polygon(coords: &Value) -> Result<Vec<Ring>, String> {
    let rings = coords
        .as_array()
        .ok_or("Polygon coordinates must be an array of rings".to_string())?;
    rings.iter().map(parse_ring).collect()
}

fn parse_multi_polygon(coords: &Value) -> Result<Vec<Vec<Ring>>, String> {
    let polys = coords
        .as_array()
        .ok_or("MultiPolygon coordinates must be an array of polygons".to_string())?;
    polys.iter().map(parse_polygon).collect()
}

#[cfg(test)]
mod tests {
    use super::{FieldCollection, FieldCollectionError, FieldGeometry};
    use foundation::bounds::Aabb2;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_demo_oilfields() {
        let payload = include_str!("../../apps/field_server/assets/geojson/oilfields.geojson");
        let collection = FieldCollection::from_geojson_str(payload, "fldName").expect("parse");
        let names: Vec<&str> = collection.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["EKOFISK", "TROLL", "JOHAN SVERDRUP", "SNØHVIT"]);
        assert!(collection.skipped.is_empty());
        assert!(matches!(
            collection.fields[1].geometry,
            FieldGeometry::MultiPolygon(_)
        ));
    }

    #[test]
    fn skips_features_without_name_or_area() {
        let payload = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"fldName": "A"},
                 "geometry": {"type": "Point", "coordinates": [1, 2]}},
                {"type": "Feature", "properties": {},
                 "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]]}},
                {"type": "Feature", "properties": {"fldName": "B", "op": "Equinor"},
                 "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]]}}
            ]
        }"#;
        let collection = FieldCollection::from_geojson_str(payload, "fldName").expect("parse");
        assert_eq!(collection.fields.len(), 1);
        assert_eq!(collection.fields[0].name, "B");
        assert_eq!(collection.fields[0].properties["op"], "Equinor");
        assert!(!collection.fields[0].properties.contains_key("fldName"));
        let skipped: Vec<usize> = collection.skipped.iter().map(|s| s.index).collect();
        assert_eq!(skipped, vec![0, 1]);
    }

    #[test]
    fn rejects_non_collections() {
        let err = FieldCollection::from_geojson_str(r#"{"type": "Feature"}"#, "fldName")
            .expect_err("not a collection");
        assert!(matches!(err, FieldCollectionError::NotAFeatureCollection));

        let err = FieldCollection::from_geojson_str("<html>", "fldName").expect_err("not json");
        assert!(matches!(err, FieldCollectionError::Json(_)));
    }

    #[test]
    fn extent_uses_outer_rings_of_all_polygons() {
        let geom = FieldGeometry::MultiPolygon(vec![
            vec![vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]],
            vec![vec![[4.0, 5.0], [6.0, 5.0], [6.0, 7.0], [4.0, 5.0]]],
        ]);
        assert_eq!(geom.extent(), Some(Aabb2::new([0.0, 0.0], [6.0, 7.0])));
        assert_eq!(geom.polygons().count(), 2);
    }
}
