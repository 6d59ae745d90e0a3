//! Layer definitions shared by the catalog, the capability factories and the
//! render engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::GeoBox;

/// Unique identifier for a layer within one catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerId(pub u64);

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Coarse grouping that drives both render order and UI grouping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Background,
    Base,
    Overlay,
    Data,
    Setting,
    Debug,
    Other(String),
}

impl Category {
    pub fn as_str(&self) -> &str {
        match self {
            Category::Background => "background",
            Category::Base => "base",
            Category::Overlay => "overlay",
            Category::Data => "data",
            Category::Setting => "setting",
            Category::Debug => "debug",
            Category::Other(name) => name,
        }
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        match s {
            "background" => Category::Background,
            "base" => Category::Base,
            "overlay" => Category::Overlay,
            "data" => Category::Data,
            "setting" => Category::Setting,
            "debug" => Category::Debug,
            other => Category::Other(other.to_string()),
        }
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        Category::from(s.as_str())
    }
}

impl From<Category> for String {
    fn from(c: Category) -> Self {
        c.as_str().to_string()
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// GetMap parameters for a WMS-backed layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WmsSource {
    /// GetMap endpoint (query string stripped)
    pub service_url: String,
    /// Value for the LAYERS parameter
    pub layer_names: String,
    /// Value for the STYLES parameter
    pub styles: Option<String>,
    pub format: String,
    pub version: String,
    /// CRS/SRS to request, e.g. "EPSG:4326"
    pub crs: String,
    pub transparent: bool,
}

/// GetTile parameters for a WMTS-backed layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WmtsSource {
    pub service_url: String,
    pub layer_identifier: String,
    pub style: String,
    pub format: String,
    pub tile_matrix_set: String,
    /// RESTful ResourceURL template, when the server advertises one
    pub resource_template: Option<String>,
}

/// Opaque rendering payload handed to the render engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerSource {
    /// A layer implemented inside the engine (star field, compass, Bing imagery, ...)
    Builtin { key: String },
    /// Container for shapes placed by the application (markers)
    Renderable,
    Wms(WmsSource),
    Wmts(WmtsSource),
    /// WMTS layer placed in the catalog while its capabilities are still loading
    PendingWmts {
        capabilities_url: String,
        layer_identifier: String,
    },
}

/// Optional settings merged onto a layer when it is added to the catalog.
///
/// Every `Some` field overwrites the layer's own value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    pub category: Option<Category>,
    pub display_name: Option<String>,
    pub enabled: Option<bool>,
    pub opacity: Option<f64>,
    pub bbox: Option<GeoBox>,
    pub min_active_altitude: Option<f64>,
    pub detail_control: Option<f64>,
    pub time: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub source: Option<LayerSource>,
}

impl LayerConfig {
    pub fn with_category(mut self, category: impl Into<Category>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn with_bbox(mut self, bbox: GeoBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    pub fn with_detail_control(mut self, detail_control: f64) -> Self {
        self.detail_control = Some(detail_control);
        self
    }

    /// Eye altitude in meters below which the layer stops drawing.
    pub fn with_min_active_altitude(mut self, altitude: f64) -> Self {
        self.min_active_altitude = Some(altitude);
        self
    }

    /// Overlay `other` on top of `self`; fields set in `other` win.
    pub fn merged_with(self, other: LayerConfig) -> LayerConfig {
        LayerConfig {
            category: other.category.or(self.category),
            display_name: other.display_name.or(self.display_name),
            enabled: other.enabled.or(self.enabled),
            opacity: other.opacity.or(self.opacity),
            bbox: other.bbox.or(self.bbox),
            min_active_altitude: other.min_active_altitude.or(self.min_active_altitude),
            detail_control: other.detail_control.or(self.detail_control),
            time: other.time.or(self.time),
            source: other.source.or(self.source),
        }
    }
}

/// A layer that has not been placed in a catalog yet.
///
/// Carries the defaults of the underlying engine layer; the category stays
/// unset until options or the catalog assign one.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLayer {
    pub category: Option<Category>,
    pub display_name: String,
    pub enabled: bool,
    pub opacity: f64,
    pub bbox: Option<GeoBox>,
    pub min_active_altitude: Option<f64>,
    pub detail_control: Option<f64>,
    pub time: Option<DateTime<Utc>>,
    pub source: LayerSource,
}

impl NewLayer {
    pub fn new(display_name: impl Into<String>, source: LayerSource) -> Self {
        Self {
            category: None,
            display_name: display_name.into(),
            enabled: true,
            opacity: 1.0,
            bbox: None,
            min_active_altitude: None,
            detail_control: None,
            time: None,
            source,
        }
    }

    /// An engine-provided layer identified by key.
    pub fn builtin(key: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self::new(display_name, LayerSource::Builtin { key: key.into() })
    }

    /// Apply options field by field.
    pub fn apply(&mut self, options: LayerConfig) {
        if let Some(category) = options.category {
            self.category = Some(category);
        }
        if let Some(name) = options.display_name {
            self.display_name = name;
        }
        if let Some(enabled) = options.enabled {
            self.enabled = enabled;
        }
        if let Some(opacity) = options.opacity {
            self.opacity = opacity;
        }
        if let Some(bbox) = options.bbox {
            self.bbox = Some(bbox);
        }
        if let Some(altitude) = options.min_active_altitude {
            self.min_active_altitude = Some(altitude);
        }
        if let Some(detail) = options.detail_control {
            self.detail_control = Some(detail);
        }
        if let Some(time) = options.time {
            self.time = Some(time);
        }
        if let Some(source) = options.source {
            self.source = source;
        }
    }

    /// Fix the category and id, producing a catalog member.
    pub fn place(self, id: LayerId) -> Layer {
        Layer {
            id,
            category: self.category.unwrap_or(Category::Overlay),
            display_name: self.display_name,
            enabled: self.enabled,
            opacity: self.opacity,
            bbox: self.bbox,
            min_active_altitude: self.min_active_altitude,
            detail_control: self.detail_control,
            time: self.time,
            source: self.source,
        }
    }
}

impl From<LayerConfig> for NewLayer {
    fn from(config: LayerConfig) -> Self {
        let mut layer = NewLayer::new(
            config.display_name.clone().unwrap_or_default(),
            LayerSource::Renderable,
        );
        layer.apply(config);
        layer
    }
}

/// A layer owned by a catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub id: LayerId,
    pub category: Category,
    pub display_name: String,
    pub enabled: bool,
    pub opacity: f64,
    pub bbox: Option<GeoBox>,
    pub min_active_altitude: Option<f64>,
    pub detail_control: Option<f64>,
    pub time: Option<DateTime<Utc>>,
    pub source: LayerSource,
}

impl Layer {
    pub fn is_base(&self) -> bool {
        self.category == Category::Base
    }

    /// True while a WMTS layer is still waiting for its capabilities.
    pub fn is_pending(&self) -> bool {
        matches!(self.source, LayerSource::PendingWmts { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trip_names() {
        for name in ["background", "base", "overlay", "data", "setting", "debug"] {
            assert_eq!(Category::from(name).as_str(), name);
        }
        assert_eq!(
            Category::from("annotations"),
            Category::Other("annotations".to_string())
        );
    }

    #[test]
    fn test_apply_overwrites_only_set_fields() {
        let mut layer = NewLayer::builtin("bing-roads", "Bing Roads");
        layer.apply(
            LayerConfig::default()
                .with_category("base")
                .with_enabled(false)
                .with_opacity(0.8),
        );

        assert_eq!(layer.category, Some(Category::Base));
        assert_eq!(layer.display_name, "Bing Roads");
        assert!(!layer.enabled);
        assert_eq!(layer.opacity, 0.8);
    }

    #[test]
    fn test_place_defaults_to_overlay() {
        let layer = NewLayer::builtin("stars", "Stars").place(LayerId(7));
        assert_eq!(layer.id, LayerId(7));
        assert_eq!(layer.category, Category::Overlay);
    }

    #[test]
    fn test_merged_with_prefers_other() {
        let base = LayerConfig::default()
            .with_display_name("from capabilities")
            .with_opacity(1.0);
        let merged = base.merged_with(LayerConfig::default().with_opacity(0.75));
        assert_eq!(merged.display_name.as_deref(), Some("from capabilities"));
        assert_eq!(merged.opacity, Some(0.75));
    }

    #[test]
    fn test_category_deserializes_from_string() {
        let config: LayerConfig =
            serde_json::from_str(r#"{"category": "setting", "enabled": false}"#).unwrap();
        assert_eq!(config.category, Some(Category::Setting));
        assert_eq!(config.enabled, Some(false));
    }
}
