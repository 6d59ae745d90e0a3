//! The layer set every viewer starts with.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::info;

use layer_catalog::SharedCatalog;
use service_discovery::{add_layer_from_wmts, CapabilitiesClient};
use viewer_common::{Category, LayerConfig, NewLayer};

pub const USGS_TOPO_CAPABILITIES: &str =
    "https://basemap.nationalmap.gov/arcgis/rest/services/USGSTopo/MapServer/WMTS/1.0.0/WMTSCapabilities.xml";

struct Builtin {
    key: &'static str,
    name: &'static str,
    category: Category,
    enabled: bool,
    detail_control: Option<f64>,
    opacity: Option<f64>,
    min_active_altitude: Option<f64>,
}

impl Builtin {
    fn new(key: &'static str, name: &'static str, category: Category, enabled: bool) -> Self {
        Self {
            key,
            name,
            category,
            enabled,
            detail_control: None,
            opacity: None,
            min_active_altitude: None,
        }
    }

    fn options(&self) -> LayerConfig {
        let mut options = LayerConfig::default()
            .with_category(self.category.clone())
            .with_enabled(self.enabled);
        if let Some(detail) = self.detail_control {
            options = options.with_detail_control(detail);
        }
        if let Some(opacity) = self.opacity {
            options = options.with_opacity(opacity);
        }
        if let Some(altitude) = self.min_active_altitude {
            options = options.with_min_active_altitude(altitude);
        }
        options
    }
}

fn background_layers() -> Vec<Builtin> {
    vec![
        // Low resolution fallback; drawn at every altitude
        Builtin {
            min_active_altitude: Some(0.0),
            ..Builtin::new("bmng-one-image", "Blue Marble Image", Category::Background, true)
        },
        Builtin::new("bmng", "Blue Marble", Category::Background, true),
    ]
}

fn base_layers() -> Vec<Builtin> {
    vec![
        Builtin::new("landsat", "Landsat", Category::Base, false),
        Builtin::new("bing-aerial", "Bing Aerial", Category::Base, false),
        Builtin::new("bing-aerial-labels", "Bing Aerial with Labels", Category::Base, false),
        Builtin {
            detail_control: Some(1.5),
            opacity: Some(0.8),
            ..Builtin::new("bing-roads", "Bing Roads", Category::Base, false)
        },
        Builtin::new("usgs-imagery-topo", "USGS Imagery Topo", Category::Base, true),
    ]
}

fn upper_layers() -> Vec<Builtin> {
    vec![
        Builtin::new("markers", "Markers", Category::Data, true),
        Builtin::new("coordinates", "Coordinates", Category::Setting, true),
        Builtin::new("view-controls", "View Controls", Category::Setting, true),
        Builtin::new("compass", "Compass", Category::Setting, false),
        Builtin::new("stars", "Stars", Category::Setting, false),
        Builtin::new("atmosphere", "Atmosphere", Category::Setting, false),
        Builtin::new("show-tessellation", "Show Tessellation", Category::Debug, false),
    ]
}

/// Add the default layers and start loading the USGS topo tiles.
///
/// Returns the WMTS load tasks so callers can wait for them.
pub async fn install(
    catalog: &SharedCatalog,
    client: Arc<dyn CapabilitiesClient>,
) -> Vec<JoinHandle<bool>> {
    {
        let mut catalog = catalog.lock().await;
        for layer in background_layers().into_iter().chain(base_layers()) {
            catalog.add(NewLayer::builtin(layer.key, layer.name), layer.options());
        }
    }

    // Keeps its slot at the top of the base block while capabilities load
    let (_, topo) = add_layer_from_wmts(
        client,
        catalog.clone(),
        USGS_TOPO_CAPABILITIES,
        "USGSTopo",
        "USGS Topographic",
        LayerConfig::default()
            .with_category(Category::Base)
            .with_enabled(false),
    )
    .await;

    let mut catalog = catalog.lock().await;
    for layer in upper_layers() {
        catalog.add(NewLayer::builtin(layer.key, layer.name), layer.options());
    }
    info!(layers = catalog.len(), "Installed default layers");

    vec![topo]
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use layer_catalog::LayerCatalog;
    use test_utils::RecordingEngine;
    use viewer_common::{ViewerError, ViewerResult};

    struct Offline;

    #[async_trait]
    impl CapabilitiesClient for Offline {
        async fn fetch(&self, url: &str) -> ViewerResult<String> {
            Err(ViewerError::transport(url, None, "offline"))
        }
    }

    #[tokio::test]
    async fn test_default_layer_set() {
        let catalog = LayerCatalog::new(Arc::new(RecordingEngine::new())).into_shared();
        let handles = install(&catalog, Arc::new(Offline)).await;
        for handle in handles {
            assert!(!handle.await.unwrap());
        }

        let catalog = catalog.lock().await;
        assert_eq!(
            catalog.categories(),
            vec![
                Category::Background,
                Category::Base,
                Category::Data,
                Category::Setting,
                Category::Debug,
            ]
        );

        let backgrounds = catalog.layers_by_category(&Category::Background);
        let names: Vec<_> = backgrounds.iter().map(|l| l.display_name.as_str()).collect();
        assert_eq!(names, vec!["Blue Marble Image", "Blue Marble"]);
        assert!(backgrounds.iter().all(|l| l.enabled));
        assert_eq!(backgrounds[0].min_active_altitude, Some(0.0));
        assert_eq!(backgrounds[1].min_active_altitude, None);

        let bases = catalog.layers_by_category(&Category::Base);
        assert_eq!(bases.len(), 6);
        let enabled: Vec<_> = bases.iter().filter(|l| l.enabled).map(|l| l.display_name.as_str()).collect();
        assert_eq!(enabled, vec!["USGS Imagery Topo"]);

        let topo = bases.last().unwrap();
        assert_eq!(topo.display_name, "USGS Topographic");
        assert!(topo.is_pending());

        let roads = catalog.find_by_name("Bing Roads").unwrap();
        assert_eq!(roads.detail_control, Some(1.5));
        assert_eq!(roads.opacity, 0.8);
    }
}
