//! ArcGIS REST catalog and service metadata (`?f=json` responses).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use viewer_common::{DocumentKind, ViewerError, ViewerResult};

/// Service types an ArcGIS server publishes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ServiceType {
    MapServer,
    FeatureServer,
    ImageServer,
    GpServer,
    GeocodeServer,
    Other(String),
}

impl ServiceType {
    pub fn as_str(&self) -> &str {
        match self {
            ServiceType::MapServer => "MapServer",
            ServiceType::FeatureServer => "FeatureServer",
            ServiceType::ImageServer => "ImageServer",
            ServiceType::GpServer => "GPServer",
            ServiceType::GeocodeServer => "GeocodeServer",
            ServiceType::Other(name) => name,
        }
    }
}

impl From<String> for ServiceType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "MapServer" => ServiceType::MapServer,
            "FeatureServer" => ServiceType::FeatureServer,
            "ImageServer" => ServiceType::ImageServer,
            "GPServer" => ServiceType::GpServer,
            "GeocodeServer" => ServiceType::GeocodeServer,
            _ => ServiceType::Other(s),
        }
    }
}

impl From<ServiceType> for String {
    fn from(t: ServiceType) -> Self {
        t.as_str().to_string()
    }
}

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error body ArcGIS returns with an HTTP 200 status.
#[derive(Debug, Clone, Deserialize)]
struct ArcGisErrorBody {
    #[serde(default)]
    code: Option<u16>,
    #[serde(default)]
    message: String,
}

/// `GET {root}/rest/services/{folder}?f=json`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArcGisCatalog {
    #[serde(rename = "currentVersion", default)]
    pub current_version: Option<f64>,
    #[serde(default)]
    pub folders: Vec<String>,
    #[serde(default)]
    pub services: Vec<ArcGisServiceEntry>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ArcGisServiceEntry {
    /// Includes the folder prefix, e.g. "EDW/EDW_FireHistory_01"
    pub name: String,
    #[serde(rename = "type")]
    pub service_type: ServiceType,
}

/// `GET {root}/rest/services/{name}/{type}?f=json`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArcGisServiceInfo {
    /// Comma separated, e.g. "KmlServer, WMSServer"
    #[serde(rename = "supportedExtensions", default)]
    pub supported_extensions: String,
}

impl ArcGisServiceInfo {
    pub fn supported_protocols(&self) -> BTreeSet<String> {
        self.supported_extensions
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// A discovered remote service.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceDescriptor {
    pub name: String,
    pub service_type: ServiceType,
    pub supported_protocols: BTreeSet<String>,
}

impl ServiceDescriptor {
    pub const WMS_EXTENSION: &'static str = "WMSServer";

    pub fn new(entry: &ArcGisServiceEntry, info: &ArcGisServiceInfo) -> Self {
        Self {
            name: entry.name.clone(),
            service_type: entry.service_type.clone(),
            supported_protocols: info.supported_protocols(),
        }
    }

    pub fn supports_wms(&self) -> bool {
        self.supported_protocols.contains(Self::WMS_EXTENSION)
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: Option<ArcGisErrorBody>,
}

fn parse_json<T: serde::de::DeserializeOwned>(
    kind: DocumentKind,
    url: &str,
    json: &str,
) -> ViewerResult<T> {
    // ArcGIS reports failures in the body with a 200 status.
    if let Ok(ErrorEnvelope { error: Some(body) }) = serde_json::from_str::<ErrorEnvelope>(json) {
        return Err(ViewerError::transport(url, body.code, body.message));
    }
    serde_json::from_str(json).map_err(|e| ViewerError::parse(kind, format!("JSON error: {}", e)))
}

impl ArcGisCatalog {
    /// Parse a folder listing; `url` is only used for error reporting.
    pub fn parse(url: &str, json: &str) -> ViewerResult<Self> {
        parse_json(DocumentKind::ArcGisCatalog, url, json)
    }
}

impl ArcGisServiceInfo {
    pub fn parse(url: &str, json: &str) -> ViewerResult<Self> {
        parse_json(DocumentKind::ArcGisService, url, json)
    }
}
