//! Layer configurations derived from parsed capability documents.

use tracing::{debug, warn};

use capabilities::{WmsCapabilities, WmsLayerCapabilities, WmtsCapabilities, WmtsLayerCapabilities};
use viewer_common::{GeoBox, LayerConfig, LayerSource, WmsSource, WmtsSource};

const PREFERRED_WMS_FORMATS: [&str; 2] = ["image/png", "image/jpeg"];
const PREFERRED_CRS: [&str; 3] = ["EPSG:4326", "CRS:84", "EPSG:3857"];

/// Turns capability entries into catalog options.
///
/// A layer missing from the document yields `None`; callers treat that as
/// "nothing to add", not as a failure.
pub struct LayerFactory;

impl LayerFactory {
    /// Configuration for one named WMS layer.
    ///
    /// The bounding box is always set: the layer's own extent, the nearest
    /// ancestor's, or the whole globe when the server advertises none.
    pub fn build_from_wms(caps: &WmsCapabilities, layer_name: &str) -> Option<LayerConfig> {
        let Some(layer) = caps.named_layer(layer_name) else {
            debug!(layer = layer_name, "Layer not found in WMS capabilities");
            return None;
        };
        wms_config(caps, layer)
    }

    /// Configurations for every named layer, in document order.
    ///
    /// Only the layer whose display name equals `default_layer_name` is enabled.
    pub fn build_all_from_wms(
        caps: &WmsCapabilities,
        default_layer_name: Option<&str>,
    ) -> Vec<LayerConfig> {
        caps.named_layers()
            .into_iter()
            .filter_map(|layer| wms_config(caps, layer))
            .map(|config| {
                let enabled = default_layer_name.is_some()
                    && config.display_name.as_deref() == default_layer_name;
                config.with_enabled(enabled)
            })
            .collect()
    }

    /// Configuration for a WMTS layer.
    ///
    /// Prefers a tile matrix set the document defines in a geographic or web
    /// mercator CRS, then falls back to the first one linked.
    pub fn build_from_wmts(caps: &WmtsCapabilities, identifier: &str) -> Option<LayerConfig> {
        let Some(layer) = caps.layer(identifier) else {
            debug!(layer = identifier, "Layer not found in WMTS capabilities");
            return None;
        };

        let tile_matrix_set = pick_tile_matrix_set(caps, layer)?;
        let format = layer.formats.first().cloned()?;
        let resource_template = layer.tile_template(&format).map(str::to_string);
        let service_url = match (&caps.get_tile_url, &resource_template) {
            (Some(url), _) => strip_query(url).to_string(),
            (None, Some(template)) => template.clone(),
            (None, None) => {
                debug!(layer = identifier, "WMTS layer has no tile endpoint");
                return None;
            }
        };

        let source = WmtsSource {
            service_url,
            layer_identifier: layer.identifier.clone(),
            style: layer
                .default_style()
                .map(|s| s.identifier.clone())
                .unwrap_or_else(|| "default".to_string()),
            format,
            tile_matrix_set,
            resource_template,
        };

        let display_name = if layer.title.is_empty() {
            layer.identifier.clone()
        } else {
            layer.title.clone()
        };

        let mut config = LayerConfig::default()
            .with_display_name(display_name)
            .with_bbox(layer.wgs84_bbox.unwrap_or(GeoBox::GLOBE));
        config.source = Some(LayerSource::Wmts(source));
        Some(config)
    }
}

fn wms_config(caps: &WmsCapabilities, layer: &WmsLayerCapabilities) -> Option<LayerConfig> {
    let name = layer.name.clone()?;
    let Some(endpoint) = caps.get_map_url.as_deref() else {
        warn!(layer = %name, "WMS capabilities advertise no GetMap endpoint; layer skipped");
        return None;
    };

    let format = PREFERRED_WMS_FORMATS
        .iter()
        .find(|f| caps.get_map_formats.iter().any(|g| g == *f))
        .map(|f| f.to_string())
        .or_else(|| caps.get_map_formats.first().cloned())
        .unwrap_or_else(|| "image/png".to_string());

    let crs = PREFERRED_CRS
        .iter()
        .find(|c| layer.crs.iter().any(|l| l == *c))
        .map(|c| c.to_string())
        .or_else(|| layer.crs.first().cloned())
        .unwrap_or_else(|| "EPSG:4326".to_string());

    let source = WmsSource {
        service_url: strip_query(endpoint).to_string(),
        layer_names: name,
        styles: layer.styles.first().cloned(),
        transparent: format == "image/png",
        format,
        version: caps.version.clone(),
        crs,
    };

    let mut config = LayerConfig::default()
        .with_display_name(layer.display_name())
        .with_bbox(layer.geographic_bbox.unwrap_or(GeoBox::GLOBE));
    config.source = Some(LayerSource::Wms(source));
    Some(config)
}

fn pick_tile_matrix_set(caps: &WmtsCapabilities, layer: &WmtsLayerCapabilities) -> Option<String> {
    layer
        .tile_matrix_set_links
        .iter()
        .find(|link| {
            caps.tile_matrix_set(link).map_or(false, |set| {
                set.supported_crs.ends_with("4326") || set.supported_crs.ends_with("3857")
            })
        })
        .or_else(|| layer.tile_matrix_set_links.first())
        .cloned()
}

/// Drop everything from the first `?`.
pub(crate) fn strip_query(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::fixtures;

    fn two_layer_caps() -> WmsCapabilities {
        WmsCapabilities::parse(fixtures::WMS_130_TWO_LAYERS).unwrap()
    }

    #[test]
    fn test_build_from_wms() {
        let config = LayerFactory::build_from_wms(&two_layer_caps(), "0").unwrap();
        assert_eq!(config.display_name.as_deref(), Some("A"));
        assert_eq!(config.bbox, Some(GeoBox::new(37.55, 37.80, -112.95, -112.60)));

        let Some(LayerSource::Wms(source)) = config.source else {
            panic!("expected a WMS source");
        };
        assert_eq!(
            source.service_url,
            "http://recover.example.org/arcgis/services/RECOVER3_BrianheadFire_UT/Burn_Severity/MapServer/WMSServer"
        );
        assert_eq!(source.layer_names, "0");
        assert_eq!(source.format, "image/png");
        assert_eq!(source.crs, "EPSG:4326");
        assert_eq!(source.version, "1.3.0");
        assert!(source.transparent);
    }

    #[test]
    fn test_missing_layer_is_none() {
        assert!(LayerFactory::build_from_wms(&two_layer_caps(), "A").is_none());
    }

    #[test]
    fn test_build_all_enables_default_only() {
        let configs = LayerFactory::build_all_from_wms(&two_layer_caps(), Some("A"));
        assert_eq!(configs.len(), 2);
        assert_eq!(configs[0].enabled, Some(true));
        assert_eq!(configs[1].enabled, Some(false));
        // "B" inherits its extent from the root layer
        assert_eq!(configs[1].bbox, Some(GeoBox::new(37.5, 37.9, -113.0, -112.5)));

        let none_default = LayerFactory::build_all_from_wms(&two_layer_caps(), None);
        assert!(none_default.iter().all(|c| c.enabled == Some(false)));
    }

    #[test]
    fn test_build_from_wms_111() {
        let caps = WmsCapabilities::parse(fixtures::WMS_111_EOX).unwrap();
        let config = LayerFactory::build_from_wms(&caps, "osm").unwrap();
        let Some(LayerSource::Wms(source)) = config.source else {
            panic!("expected a WMS source");
        };
        assert_eq!(source.service_url, "https://tiles.maps.eox.at/wms");
        assert_eq!(source.format, "image/jpeg");
        assert!(!source.transparent);
        assert_eq!(config.bbox, Some(GeoBox::GLOBE));
    }

    #[test]
    fn test_build_from_wmts() {
        let caps = WmtsCapabilities::parse(fixtures::WMTS_USGS_TOPO).unwrap();
        let config = LayerFactory::build_from_wmts(&caps, "USGSTopo").unwrap();
        assert_eq!(config.display_name.as_deref(), Some("USGSTopo"));
        assert!(config.bbox.is_some());

        let Some(LayerSource::Wmts(source)) = config.source else {
            panic!("expected a WMTS source");
        };
        assert_eq!(source.tile_matrix_set, "GoogleMapsCompatible");
        assert_eq!(source.style, "default");
        assert_eq!(source.format, "image/jpgpng");
        assert!(source.resource_template.is_some());
        assert!(source.service_url.ends_with("/MapServer/WMTS"));

        assert!(LayerFactory::build_from_wmts(&caps, "USGSImageryOnly").is_none());
    }

    #[test]
    fn test_strip_query() {
        assert_eq!(strip_query("http://h/wms?service=wms"), "http://h/wms");
        assert_eq!(strip_query("http://h/wms"), "http://h/wms");
    }
}
