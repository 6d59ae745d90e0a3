//! Settings for one discovery run.

use crate::client::append_query;
use crate::config::{ArcGisSourceConfig, ViewerConfig};

/// Where to discover services and how to present what is found.
///
/// Fixed for the duration of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryContext {
    /// ArcGIS server root, without a trailing slash
    pub root: String,
    /// Folder to list; the root folder when `None`
    pub folder: Option<String>,
    /// Display name of the layer to enable and frame
    pub default_layer: Option<String>,
    pub overlay_opacity: f64,
    /// Appended to REST requests when set
    pub token: Option<String>,
}

impl DiscoveryContext {
    pub const DEFAULT_OVERLAY_OPACITY: f64 = 0.75;

    pub fn new(root: impl Into<String>) -> Self {
        let root: String = root.into();
        Self {
            root: root.trim_end_matches('/').to_string(),
            folder: None,
            default_layer: None,
            overlay_opacity: Self::DEFAULT_OVERLAY_OPACITY,
            token: None,
        }
    }

    /// Context for the ArcGIS source in `config`, if one is configured.
    pub fn from_config(config: &ViewerConfig) -> Option<Self> {
        let ArcGisSourceConfig {
            root,
            folder,
            default_layer,
        } = config.arcgis.as_ref()?;

        let mut context = Self::new(root.as_str()).with_overlay_opacity(config.overlay_opacity);
        context.folder = folder.clone();
        context.default_layer = default_layer.clone();
        context.token = config.credentials.arcgis_token.value().map(str::to_string);
        Some(context)
    }

    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = Some(folder.into());
        self
    }

    pub fn with_default_layer(mut self, name: impl Into<String>) -> Self {
        self.default_layer = Some(name.into());
        self
    }

    pub fn with_overlay_opacity(mut self, opacity: f64) -> Self {
        self.overlay_opacity = opacity;
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// `{root}/rest/services[/{folder}]`
    pub fn folder_catalog_endpoint(&self) -> String {
        let endpoint = match &self.folder {
            Some(folder) => format!("{}/rest/services/{}", self.root, folder),
            None => format!("{}/rest/services", self.root),
        };
        self.authorize(endpoint)
    }

    /// `{root}/rest/services/{name}/{type}`
    pub fn service_endpoint(&self, name: &str, service_type: &str) -> String {
        self.authorize(format!("{}/rest/services/{}/{}", self.root, name, service_type))
    }

    /// `{root}/services/{name}/{type}/WMSServer`
    pub fn wms_address(&self, name: &str, service_type: &str) -> String {
        format!("{}/services/{}/{}/WMSServer", self.root, name, service_type)
    }

    pub fn is_default_layer(&self, display_name: &str) -> bool {
        self.default_layer.as_deref() == Some(display_name)
    }

    fn authorize(&self, endpoint: String) -> String {
        match &self.token {
            Some(token) => append_query(&endpoint, &format!("token={}", token)),
            None => endpoint,
        }
    }
}
