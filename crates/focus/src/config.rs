use runtime::{FitOptions, View};
use serde::{Deserialize, Serialize};

/// Settings of one mounted map.
///
/// Every field has a default, so hosts only pass what they change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusConfig {
    /// Prefix for the data URL; empty means same origin.
    pub base_url: String,
    pub data_path: String,
    /// GeoJSON property holding the field name.
    pub name_property: String,
    /// Route under which field slugs live, e.g. `/map/<slug>`.
    pub route_prefix: String,
    /// Closest zoom used when fitting a selected field.
    pub max_zoom: f64,
    pub animation_ms: f64,
    /// Uniform padding when fitting all fields.
    pub fit_all_padding_px: f64,
    pub default_center: [f64; 2],
    pub default_zoom: f64,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            data_path: "/geojson/oilfields.geojson".to_string(),
            name_property: "fldName".to_string(),
            route_prefix: "/map".to_string(),
            max_zoom: 9.0,
            animation_ms: 500.0,
            fit_all_padding_px: 10.0,
            default_center: [10.0, 65.0],
            default_zoom: 4.0,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Json(serde_json::Error),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Json(e) => write!(f, "config is not valid JSON: {e}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Json(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl FocusConfig {
    pub fn from_json_str(payload: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(payload).map_err(ConfigError::Json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(runtime::MIN_ZOOM..=runtime::MAX_ZOOM).contains(&self.max_zoom) {
            return Err(ConfigError::Invalid(format!(
                "max_zoom {} outside {}..={}",
                self.max_zoom,
                runtime::MIN_ZOOM,
                runtime::MAX_ZOOM
            )));
        }
        if self.animation_ms < 0.0 || !self.animation_ms.is_finite() {
            return Err(ConfigError::Invalid("animation_ms must be >= 0".to_string()));
        }
        if self.fit_all_padding_px < 0.0 || !self.fit_all_padding_px.is_finite() {
            return Err(ConfigError::Invalid(
                "fit_all_padding_px must be >= 0".to_string(),
            ));
        }
        if !self.route_prefix.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "route_prefix {:?} must start with '/'",
                self.route_prefix
            )));
        }
        if self.name_property.is_empty() {
            return Err(ConfigError::Invalid("name_property is empty".to_string()));
        }
        Ok(())
    }

    pub fn data_url(&self) -> String {
        scene::feature_data_url(&self.base_url, &self.data_path)
    }

    pub fn default_view(&self) -> View {
        View::new(self.default_center, self.default_zoom)
    }

    /// Fit used for a selected field's geometry.
    pub fn focus_fit_options(&self) -> FitOptions {
        FitOptions {
            max_zoom: Some(self.max_zoom),
            padding_px: [0.0; 4],
            duration_ms: self.animation_ms,
        }
    }

    /// Fit used for the extent of every field.
    pub fn fit_all_options(&self) -> FitOptions {
        FitOptions {
            max_zoom: None,
            padding_px: [self.fit_all_padding_px; 4],
            duration_ms: self.animation_ms,
        }
    }
}
