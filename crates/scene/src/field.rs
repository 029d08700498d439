use foundation::bounds::Aabb2;
use foundation::slug::Slug;
use formats::{FieldFeature, FieldGeometry};
use serde_json::{Map, Value};

/// Index of a field inside its [`FeatureStore`](crate::store::FeatureStore).
///
/// Fields are never added or removed after loading, so two equal ids always
/// refer to the same field. Selection compares fields by this id.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(pub u32);

impl FieldId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// A named oil-field area.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub id: FieldId,
    pub name: String,
    pub slug: Slug,
    pub geometry: FieldGeometry,
    pub extent: Aabb2,
    pub properties: Map<String, Value>,
}

impl Field {
    /// Returns `None` when the geometry carries no positions.
    pub fn from_feature(id: FieldId, feature: FieldFeature) -> Option<Self> {
        let extent = feature.geometry.extent()?;
        Some(Self {
            id,
            slug: Slug::encode(&feature.name),
            name: feature.name,
            geometry: feature.geometry,
            extent,
            properties: feature.properties,
        })
    }
}
