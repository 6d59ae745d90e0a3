//! End-to-end discovery runs against an in-memory capabilities client.

mod common;

use std::sync::Arc;
use std::time::Duration;

use service_discovery::{BranchOutcome, DiscoveryPipeline, DiscoveryStage};
use test_utils::{assert_looks_at, fixtures};
use tokio_util::sync::CancellationToken;
use viewer_common::{Category, ViewerError};

use common::*;

// ============================================================================
// Happy path
// ============================================================================

#[tokio::test]
async fn test_discovers_named_layers_and_frames_default() {
    let (catalog, engine) = shared_catalog();
    let client = Arc::new(fire_service_client());
    let pipeline = DiscoveryPipeline::new(client.clone(), catalog.clone(), fire_context());

    let report = pipeline.run().await;
    assert!(report.catalog_error.is_none());
    assert_eq!(report.skipped_services, vec!["RECOVER3_BrianheadFire_UT/Field_Notes"]);

    let catalog = catalog.lock().await;
    let overlays = catalog.layers_by_category(&Category::Overlay);
    assert_eq!(overlays.len(), 2);

    let a = catalog.find_by_name("A").unwrap();
    let b = catalog.find_by_name("B").unwrap();
    assert!(a.enabled);
    assert!(!b.enabled);
    assert_eq!(a.opacity, 0.75);
    assert_eq!(b.opacity, 0.75);
    assert_eq!(a.category, Category::Overlay);

    let moves = engine.camera_moves();
    assert_eq!(moves.len(), 1);
    assert_looks_at!(moves[0], (37.675, -112.775), 1e-9);
    assert!(moves[0].altitude > 0.0);
}

#[tokio::test]
async fn test_branch_walks_every_stage() {
    let (catalog, _) = shared_catalog();
    let pipeline = DiscoveryPipeline::new(Arc::new(fire_service_client()), catalog, fire_context());

    let report = pipeline.run().await;
    assert_eq!(report.branches.len(), 1);

    let branch = &report.branches[0];
    assert_eq!(branch.service, fixtures::urls::FIRE_SERVICE);
    assert_eq!(
        branch.stages,
        vec![
            DiscoveryStage::FetchingServiceDescriptor,
            DiscoveryStage::FetchingWmsCapabilities,
            DiscoveryStage::LayersAdded,
            DiscoveryStage::Done,
        ]
    );
    match &branch.outcome {
        BranchOutcome::LayersAdded { layers, framing } => {
            assert_eq!(layers.len(), 2);
            assert!(framing.unwrap().moved());
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(report.layers_added().len(), 2);
}

#[tokio::test]
async fn test_requests_follow_arcgis_layout() {
    let (catalog, _) = shared_catalog();
    let client = Arc::new(fire_service_client());
    DiscoveryPipeline::new(client.clone(), catalog, fire_context())
        .run()
        .await;

    assert_eq!(
        client.requests(),
        vec![
            folder_url(),
            service_url(fixtures::urls::FIRE_SERVICE),
            wms_url(fixtures::urls::FIRE_SERVICE),
        ]
    );
}

#[tokio::test]
async fn test_no_default_layer_enables_nothing() {
    let (catalog, engine) = shared_catalog();
    let context = service_discovery::DiscoveryContext::new(fixtures::urls::ARCGIS_ROOT)
        .with_folder(fixtures::urls::FOLDER);
    DiscoveryPipeline::new(Arc::new(fire_service_client()), catalog.clone(), context)
        .run()
        .await;

    let catalog = catalog.lock().await;
    assert_eq!(catalog.len(), 2);
    assert!(catalog.layers().all(|l| !l.enabled));
    assert!(engine.camera_moves().is_empty());
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_folder_failure_adds_nothing() {
    let (catalog, engine) = shared_catalog();
    let client = Arc::new(MockClient::new().with_status(folder_url(), 500));
    let pipeline = DiscoveryPipeline::new(client.clone(), catalog.clone(), fire_context());

    let report = pipeline.run().await;

    let error = report.catalog_error.as_ref().unwrap();
    assert!(error.is_transport());
    assert_eq!(error.status_code(), Some(500));
    assert!(report.branches.is_empty());
    assert!(catalog.lock().await.is_empty());
    assert!(engine.events().is_empty());
    assert_eq!(client.requests().len(), 1);
}

#[tokio::test]
async fn test_service_without_wms_is_filtered_quietly() {
    let (catalog, _) = shared_catalog();
    let client = Arc::new(
        MockClient::new()
            .with_body(folder_url(), fixtures::ARCGIS_FOLDER_JSON)
            .with_body(
                service_url(fixtures::urls::FIRE_SERVICE),
                fixtures::ARCGIS_SERVICE_NO_WMS_JSON,
            ),
    );

    let report = DiscoveryPipeline::new(client.clone(), catalog.clone(), fire_context())
        .run()
        .await;

    assert!(matches!(report.branches[0].outcome, BranchOutcome::NoWmsSupport));
    assert_eq!(
        report.branches[0].stages,
        vec![DiscoveryStage::FetchingServiceDescriptor, DiscoveryStage::Done]
    );
    assert!(report.failures().is_empty());
    assert!(catalog.lock().await.is_empty());
    assert!(!client.requests().contains(&wms_url(fixtures::urls::FIRE_SERVICE)));
}

#[tokio::test]
async fn test_failed_branch_does_not_affect_sibling() {
    let folder = r#"{"services": [
        {"name": "RECOVER3_BrianheadFire_UT/Burn_Severity", "type": "MapServer"},
        {"name": "RECOVER3_BrianheadFire_UT/Broken", "type": "MapServer"}
    ]}"#;
    let broken = "RECOVER3_BrianheadFire_UT/Broken";

    let (catalog, _) = shared_catalog();
    let client = Arc::new(
        MockClient::new()
            .with_body(folder_url(), folder)
            .with_body(
                service_url(fixtures::urls::FIRE_SERVICE),
                fixtures::ARCGIS_SERVICE_WMS_JSON,
            )
            .with_delayed_body(
                wms_url(fixtures::urls::FIRE_SERVICE),
                fixtures::WMS_130_TWO_LAYERS,
                Duration::from_millis(20),
            )
            .with_body(service_url(broken), fixtures::ARCGIS_SERVICE_WMS_JSON)
            .with_body(wms_url(broken), "<html>Service unavailable</html>"),
    );

    let report = DiscoveryPipeline::new(client, catalog.clone(), fire_context())
        .run()
        .await;

    assert_eq!(report.branches.len(), 2);
    let failed = report
        .branches
        .iter()
        .find(|b| b.service == broken)
        .unwrap();
    assert!(matches!(
        failed.outcome,
        BranchOutcome::Failed(ViewerError::Parse { .. })
    ));
    assert_eq!(failed.stages.last(), Some(&DiscoveryStage::Done));

    assert_eq!(report.failures().len(), 1);
    assert_eq!(catalog.lock().await.len(), 2);
}

// ============================================================================
// Cancellation and background runs
// ============================================================================

#[tokio::test]
async fn test_cancelled_before_start() {
    let (catalog, _) = shared_catalog();
    let token = CancellationToken::new();
    token.cancel();

    let report = DiscoveryPipeline::new(Arc::new(fire_service_client()), catalog.clone(), fire_context())
        .with_cancellation(token)
        .run()
        .await;

    assert!(matches!(report.catalog_error, Some(ViewerError::Cancelled)));
    assert!(catalog.lock().await.is_empty());
}

#[tokio::test]
async fn test_cancel_during_wms_fetch() {
    let (catalog, _) = shared_catalog();
    let client = Arc::new(
        MockClient::new()
            .with_body(folder_url(), fixtures::ARCGIS_FOLDER_JSON)
            .with_body(
                service_url(fixtures::urls::FIRE_SERVICE),
                fixtures::ARCGIS_SERVICE_WMS_JSON,
            )
            .with_delayed_body(
                wms_url(fixtures::urls::FIRE_SERVICE),
                fixtures::WMS_130_TWO_LAYERS,
                Duration::from_secs(30),
            ),
    );
    let pipeline = DiscoveryPipeline::new(client, catalog.clone(), fire_context());
    let token = pipeline.cancellation_token();
    let handle = pipeline.spawn();

    tokio::time::sleep(Duration::from_millis(50)).await;
    token.cancel();
    let report = handle.await.unwrap();

    assert_eq!(report.branches.len(), 1);
    assert!(matches!(report.branches[0].outcome, BranchOutcome::Cancelled));
    assert!(catalog.lock().await.is_empty());
}

#[tokio::test]
async fn test_background_run_signals_overlay_category() {
    let (catalog, _) = shared_catalog();
    let mut overlay_rx = catalog.lock().await.category_signal(&Category::Overlay);

    let handle = DiscoveryPipeline::new(Arc::new(fire_service_client()), catalog.clone(), fire_context())
        .spawn();

    overlay_rx.changed().await.unwrap();
    handle.await.unwrap();
    assert_eq!(overlay_rx.borrow_and_update().version, 2);
}
