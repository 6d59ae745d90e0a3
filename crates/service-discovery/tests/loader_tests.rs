//! Adding single WMS and WMTS layers by address.

mod common;

use std::sync::Arc;
use std::time::Duration;

use service_discovery::{add_layer_from_wms, add_layer_from_wmts, CapabilitiesClient};
use test_utils::{fixtures, geo_box, EngineEvent};
use tokio_test::{assert_err, assert_ok};
use viewer_common::{Category, LayerConfig, LayerSource};

use common::*;

fn eox_caps_url() -> String {
    format!(
        "{}?service=wms&request=getcapabilities",
        fixtures::urls::EOX_WMS
    )
}

// ============================================================================
// WMS
// ============================================================================

#[tokio::test]
async fn test_wms_layer_takes_advertised_extent() {
    let (catalog, engine) = shared_catalog();
    let client = MockClient::new().with_body(wms_url(fixtures::urls::FIRE_SERVICE), fixtures::WMS_130_TWO_LAYERS);
    let address = format!(
        "{}/services/{}/MapServer/WMSServer",
        fixtures::urls::ARCGIS_ROOT,
        fixtures::urls::FIRE_SERVICE
    );

    // A caller-supplied box is ignored in favour of the capabilities
    let options = LayerConfig::default().with_bbox(geo_box(fixtures::bbox::GLOBAL));
    let result = add_layer_from_wms(&client, &catalog, &address, "0", options).await;
    let id = assert_ok!(result).unwrap();

    let catalog = catalog.lock().await;
    let layer = catalog.get(id).unwrap();
    assert_eq!(layer.display_name, "A");
    assert_eq!(layer.category, Category::Overlay);
    let bbox = layer.bbox.unwrap();
    assert_eq!(bbox.min_lat, 37.55);
    assert_eq!(bbox.max_lon, -112.6);

    match &layer.source {
        LayerSource::Wms(source) => {
            assert_eq!(source.layer_names, "0");
            assert_eq!(source.format, "image/png");
            assert!(source.transparent);
            assert!(!source.service_url.contains('?'));
        }
        other => panic!("expected a WMS source, got {:?}", other),
    }
    assert!(matches!(engine.events()[0], EngineEvent::Insert { index: 0, .. }));
}

#[tokio::test]
async fn test_wms_options_override_capabilities() {
    let (catalog, _) = shared_catalog();
    let client = MockClient::new().with_body(eox_caps_url(), fixtures::WMS_111_EOX);

    let options = LayerConfig::default()
        .with_category(Category::Base)
        .with_display_name("EOX OpenStreetMap")
        .with_opacity(0.4)
        .with_enabled(true);
    let id = assert_ok!(add_layer_from_wms(&client, &catalog, fixtures::urls::EOX_WMS, "osm", options).await)
        .unwrap();

    let catalog = catalog.lock().await;
    let layer = catalog.get(id).unwrap();
    assert_eq!(layer.display_name, "EOX OpenStreetMap");
    assert_eq!(layer.category, Category::Base);
    assert_eq!(layer.opacity, 0.4);
    assert!(layer.enabled);
}

#[tokio::test]
async fn test_wms_without_get_map_endpoint_uses_address() {
    let caps = r#"<WMS_Capabilities version="1.3.0">
  <Capability>
    <Request><GetMap><Format>image/png</Format></GetMap></Request>
    <Layer><Name>A</Name><Title>Perimeter</Title></Layer>
  </Capability>
</WMS_Capabilities>"#;
    let (catalog, _) = shared_catalog();
    let client = MockClient::new().with_body(
        "http://maps.example.org/wms?service=wms&request=getcapabilities",
        caps,
    );

    let id = assert_ok!(
        add_layer_from_wms(&client, &catalog, "http://maps.example.org/wms?layers=A", "A", LayerConfig::default()).await
    )
    .unwrap();

    let catalog = catalog.lock().await;
    let layer = catalog.get(id).unwrap();
    assert_eq!(layer.display_name, "Perimeter");
    match &layer.source {
        LayerSource::Wms(source) => {
            assert_eq!(source.service_url, "http://maps.example.org/wms");
            assert_eq!(source.layer_names, "A");
        }
        other => panic!("expected a WMS source, got {:?}", other),
    }
}

#[tokio::test]
async fn test_wms_address_query_is_replaced() {
    let (catalog, _) = shared_catalog();
    let client = MockClient::new().with_body(eox_caps_url(), fixtures::WMS_111_EOX);
    let address = format!("{}?service=WMS&version=1.1.1", fixtures::urls::EOX_WMS);

    let result = add_layer_from_wms(&client, &catalog, &address, "overlay", LayerConfig::default()).await;
    assert!(assert_ok!(result).is_some());
    assert_eq!(client.requests(), vec![eox_caps_url()]);
}

#[tokio::test]
async fn test_wms_unknown_layer_adds_nothing() {
    let (catalog, engine) = shared_catalog();
    let client = MockClient::new().with_body(eox_caps_url(), fixtures::WMS_111_EOX);

    let result = add_layer_from_wms(&client, &catalog, fixtures::urls::EOX_WMS, "nope", LayerConfig::default()).await;
    assert_eq!(assert_ok!(result), None);
    assert!(catalog.lock().await.is_empty());
    assert!(engine.events().is_empty());
}

#[tokio::test]
async fn test_wms_transport_error_is_returned() {
    let (catalog, _) = shared_catalog();
    let client = MockClient::new().with_status(eox_caps_url(), 503);

    let result = add_layer_from_wms(&client, &catalog, fixtures::urls::EOX_WMS, "osm", LayerConfig::default()).await;
    let err = assert_err!(result);
    assert_eq!(err.status_code(), Some(503));
    assert!(catalog.lock().await.is_empty());
}

// ============================================================================
// WMTS
// ============================================================================

#[tokio::test]
async fn test_wmts_layer_is_placed_before_capabilities_arrive() {
    let (catalog, engine) = shared_catalog();
    let client: Arc<dyn CapabilitiesClient> = Arc::new(MockClient::new().with_delayed_body(
        fixtures::urls::USGS_TOPO_WMTS,
        fixtures::WMTS_USGS_TOPO,
        Duration::from_millis(30),
    ));

    let options = LayerConfig::default().with_category(Category::Base).with_enabled(true);
    let (id, handle) = add_layer_from_wmts(
        client,
        catalog.clone(),
        fixtures::urls::USGS_TOPO_WMTS,
        "USGSTopo",
        "USGS Topographic",
        options,
    )
    .await;

    {
        let catalog = catalog.lock().await;
        let layer = catalog.get(id).unwrap();
        assert!(layer.is_pending());
        assert_eq!(layer.display_name, "USGS Topographic");
        assert_eq!(layer.category, Category::Base);
    }

    assert!(handle.await.unwrap());

    let catalog = catalog.lock().await;
    let layer = catalog.get(id).unwrap();
    assert!(!layer.is_pending());
    match &layer.source {
        LayerSource::Wmts(source) => {
            assert_eq!(source.layer_identifier, "USGSTopo");
            assert_eq!(source.tile_matrix_set, "GoogleMapsCompatible");
            assert_eq!(source.style, "default");
        }
        other => panic!("expected a WMTS source, got {:?}", other),
    }
    assert!(layer.bbox.is_some());

    // Placed once, then updated in place
    let events = engine.events();
    assert_eq!(
        events.iter().filter(|e| matches!(e, EngineEvent::Insert { .. })).count(),
        1
    );
    assert!(events.contains(&EngineEvent::Update { id, enabled: true }));
}

#[tokio::test]
async fn test_wmts_failure_leaves_layer_pending() {
    let (catalog, _) = shared_catalog();
    let client: Arc<dyn CapabilitiesClient> =
        Arc::new(MockClient::new().with_status(fixtures::urls::USGS_TOPO_WMTS, 500));

    let (id, handle) = add_layer_from_wmts(
        client,
        catalog.clone(),
        fixtures::urls::USGS_TOPO_WMTS,
        "USGSTopo",
        "USGS Topographic",
        LayerConfig::default(),
    )
    .await;

    assert!(!handle.await.unwrap());
    let catalog = catalog.lock().await;
    assert_eq!(catalog.len(), 1);
    assert!(catalog.get(id).unwrap().is_pending());
}

#[tokio::test]
async fn test_wmts_unknown_identifier_leaves_layer_pending() {
    let (catalog, _) = shared_catalog();
    let client: Arc<dyn CapabilitiesClient> =
        Arc::new(MockClient::new().with_body(fixtures::urls::USGS_TOPO_WMTS, fixtures::WMTS_USGS_TOPO));

    let (id, handle) = add_layer_from_wmts(
        client,
        catalog.clone(),
        fixtures::urls::USGS_TOPO_WMTS,
        "USGSImageryOnly",
        "USGS Imagery",
        LayerConfig::default(),
    )
    .await;

    assert!(!handle.await.unwrap());
    assert!(catalog.lock().await.get(id).unwrap().is_pending());
}
