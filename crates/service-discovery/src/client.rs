//! Fetching capability documents.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use capabilities::{ArcGisCatalog, ArcGisServiceInfo, WmsCapabilities, WmtsCapabilities};
use viewer_common::{ViewerError, ViewerResult};

use crate::config::HttpConfig;

/// Source of capability documents.
///
/// Implementors provide [`fetch`](CapabilitiesClient::fetch); the typed
/// helpers build the request URL, fetch and parse. No retries are made at
/// this level: a failed fetch is returned to the caller as is.
#[async_trait]
pub trait CapabilitiesClient: Send + Sync {
    /// GET `url` and return the body. Non-success statuses and network
    /// errors become [`ViewerError::Transport`].
    async fn fetch(&self, url: &str) -> ViewerResult<String>;

    /// GetCapabilities for the WMS at `address`. Any query on the address is dropped.
    ///
    /// A document that advertises no GetMap endpoint gets `address` as one.
    async fn fetch_wms_capabilities(&self, address: &str) -> ViewerResult<WmsCapabilities> {
        let body = self.fetch(&wms_capabilities_url(address)).await?;
        let mut caps = WmsCapabilities::parse(&body)?;
        if caps.get_map_url.is_none() {
            debug!(address = address, "No GetMap endpoint advertised; using the service address");
            caps.get_map_url = Some(service_address(address).to_string());
        }
        Ok(caps)
    }

    /// WMTS capabilities document at `url`, fetched as given.
    async fn fetch_wmts_capabilities(&self, url: &str) -> ViewerResult<WmtsCapabilities> {
        let body = self.fetch(url).await?;
        WmtsCapabilities::parse(&body)
    }

    /// ArcGIS REST folder listing at `endpoint`.
    async fn fetch_arcgis_catalog(&self, endpoint: &str) -> ViewerResult<ArcGisCatalog> {
        let url = append_query(endpoint, "f=json");
        let body = self.fetch(&url).await?;
        ArcGisCatalog::parse(&url, &body)
    }

    /// ArcGIS REST service metadata at `endpoint`.
    async fn fetch_arcgis_service(&self, endpoint: &str) -> ViewerResult<ArcGisServiceInfo> {
        let url = append_query(endpoint, "f=json");
        let body = self.fetch(&url).await?;
        ArcGisServiceInfo::parse(&url, &body)
    }
}

/// `address` without its query, asking for WMS capabilities.
pub fn wms_capabilities_url(address: &str) -> String {
    format!("{}?service=wms&request=getcapabilities", service_address(address))
}

fn service_address(address: &str) -> &str {
    address.split('?').next().unwrap_or(address)
}

/// Add `query` to `url`, keeping any query already present.
pub fn append_query(url: &str, query: &str) -> String {
    if !url.contains('?') {
        format!("{}?{}", url, query)
    } else if url.ends_with('?') || url.ends_with('&') {
        format!("{}{}", url, query)
    } else {
        format!("{}&{}", url, query)
    }
}

/// [`CapabilitiesClient`] backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpCapabilitiesClient {
    client: Client,
}

impl HttpCapabilitiesClient {
    pub fn new(config: &HttpConfig) -> ViewerResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ViewerError::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl CapabilitiesClient for HttpCapabilitiesClient {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> ViewerResult<String> {
        let response = self.client.get(url).send().await.map_err(|e| {
            ViewerError::transport(url, e.status().map(|s| s.as_u16()), e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ViewerError::transport(
                url,
                Some(status.as_u16()),
                format!("HTTP {}", status),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ViewerError::transport(url, Some(status.as_u16()), e.to_string()))?;
        debug!(bytes = body.len(), "Fetched capabilities");
        Ok(body)
    }
}
