//! Common test utilities for service-discovery tests
//!
//! Provides:
//! - An in-memory `CapabilitiesClient` keyed by exact URL
//! - A catalog wired to a recording engine
//! - The URLs the fire-service fixtures are served under

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use layer_catalog::{LayerCatalog, SharedCatalog};
use service_discovery::{CapabilitiesClient, DiscoveryContext};
use test_utils::{fixtures, RecordingEngine};
use viewer_common::{ViewerError, ViewerResult};

enum Reply {
    Body(String),
    Status(u16),
}

struct Route {
    reply: Reply,
    delay: Option<Duration>,
}

/// Serves canned bodies; unknown URLs answer 404.
#[derive(Default)]
pub struct MockClient {
    routes: HashMap<String, Route>,
    requests: Mutex<Vec<String>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, url: impl Into<String>, body: &str) -> Self {
        self.routes.insert(
            url.into(),
            Route {
                reply: Reply::Body(body.to_string()),
                delay: None,
            },
        );
        self
    }

    pub fn with_status(mut self, url: impl Into<String>, status: u16) -> Self {
        self.routes.insert(
            url.into(),
            Route {
                reply: Reply::Status(status),
                delay: None,
            },
        );
        self
    }

    /// Answer `url` with `body` after `delay`.
    pub fn with_delayed_body(mut self, url: impl Into<String>, body: &str, delay: Duration) -> Self {
        self.routes.insert(
            url.into(),
            Route {
                reply: Reply::Body(body.to_string()),
                delay: Some(delay),
            },
        );
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CapabilitiesClient for MockClient {
    async fn fetch(&self, url: &str) -> ViewerResult<String> {
        self.requests.lock().unwrap().push(url.to_string());
        let Some(route) = self.routes.get(url) else {
            return Err(ViewerError::transport(url, Some(404), "HTTP 404 Not Found"));
        };
        if let Some(delay) = route.delay {
            tokio::time::sleep(delay).await;
        }
        match &route.reply {
            Reply::Body(body) => Ok(body.clone()),
            Reply::Status(status) => Err(ViewerError::transport(
                url,
                Some(*status),
                format!("HTTP {}", status),
            )),
        }
    }
}

pub fn shared_catalog() -> (SharedCatalog, Arc<RecordingEngine>) {
    let engine = Arc::new(RecordingEngine::new());
    (LayerCatalog::new(engine.clone()).into_shared(), engine)
}

pub fn fire_context() -> DiscoveryContext {
    DiscoveryContext::new(fixtures::urls::ARCGIS_ROOT)
        .with_folder(fixtures::urls::FOLDER)
        .with_default_layer("A")
}

pub fn folder_url() -> String {
    format!(
        "{}/rest/services/{}?f=json",
        fixtures::urls::ARCGIS_ROOT,
        fixtures::urls::FOLDER
    )
}

pub fn service_url(name: &str) -> String {
    format!(
        "{}/rest/services/{}/MapServer?f=json",
        fixtures::urls::ARCGIS_ROOT,
        name
    )
}

pub fn wms_url(name: &str) -> String {
    format!(
        "{}/services/{}/MapServer/WMSServer?service=wms&request=getcapabilities",
        fixtures::urls::ARCGIS_ROOT,
        name
    )
}

/// The Brian Head folder: one map service publishing WMS layers "A" and "B".
pub fn fire_service_client() -> MockClient {
    MockClient::new()
        .with_body(folder_url(), fixtures::ARCGIS_FOLDER_JSON)
        .with_body(
            service_url(fixtures::urls::FIRE_SERVICE),
            fixtures::ARCGIS_SERVICE_WMS_JSON,
        )
        .with_body(
            wms_url(fixtures::urls::FIRE_SERVICE),
            fixtures::WMS_130_TWO_LAYERS,
        )
}
