//! Viewer configuration.
//!
//! Loaded from a YAML file; credentials and the ArcGIS source can be
//! overridden from the environment (the binary loads `.env` first).

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use viewer_common::{DocumentKind, LayerConfig, ViewerError, ViewerResult};

/// Root configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// ArcGIS server whose WMS services are discovered at startup
    pub arcgis: Option<ArcGisSourceConfig>,
    pub wms_layers: Vec<WmsLayerSpec>,
    pub wmts_layers: Vec<WmtsLayerSpec>,
    pub credentials: Credentials,
    pub http: HttpConfig,
    /// Opacity applied to discovered overlay layers
    pub overlay_opacity: f64,
    /// Initial projection by display name, e.g. "3D" or "Mercator"
    pub projection: Option<String>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            arcgis: None,
            wms_layers: Vec::new(),
            wmts_layers: Vec::new(),
            credentials: Credentials::default(),
            http: HttpConfig::default(),
            overlay_opacity: default_overlay_opacity(),
            projection: None,
        }
    }
}

fn default_overlay_opacity() -> f64 {
    0.75
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ArcGisSourceConfig {
    /// Server root, e.g. "http://recover.giscenter.isu.edu/arcgis"
    pub root: String,
    /// Folder to load; the root folder when absent
    #[serde(default)]
    pub folder: Option<String>,
    /// Display name of the layer to enable and frame
    #[serde(default)]
    pub default_layer: Option<String>,
}

/// A WMS layer added by name at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct WmsLayerSpec {
    pub address: String,
    /// Layer name (not title) as listed in the capabilities
    pub layer: String,
    #[serde(default)]
    pub options: LayerConfig,
}

/// A WMTS layer added at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct WmtsLayerSpec {
    pub capabilities_url: String,
    pub identifier: String,
    pub display_name: String,
    #[serde(default)]
    pub options: LayerConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
            user_agent: format!("globe-viewer/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// An API key that may or may not have been supplied.
///
/// Empty strings count as missing. `Debug` never prints the key.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Option<String>")]
pub enum Credential {
    Configured(String),
    #[default]
    Missing,
}

impl Credential {
    pub fn value(&self) -> Option<&str> {
        match self {
            Credential::Configured(key) => Some(key),
            Credential::Missing => None,
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, Credential::Configured(_))
    }
}

impl From<Option<String>> for Credential {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(key) if !key.trim().is_empty() => Credential::Configured(key.trim().to_string()),
            _ => Credential::Missing,
        }
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::Configured(_) => f.write_str("Configured(***)"),
            Credential::Missing => f.write_str("Missing"),
        }
    }
}

/// State of one credential, for display in the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialStatus {
    pub name: &'static str,
    pub configured: bool,
    /// What the user loses while the credential is missing
    pub impact: &'static str,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub bing_maps_key: Credential,
    pub mapquest_key: Credential,
    pub arcgis_token: Credential,
}

impl Credentials {
    pub fn statuses(&self) -> Vec<CredentialStatus> {
        vec![
            CredentialStatus {
                name: "bing_maps_key",
                configured: self.bing_maps_key.is_configured(),
                impact: "Bing imagery uses a rate-limited developer key",
            },
            CredentialStatus {
                name: "mapquest_key",
                configured: self.mapquest_key.is_configured(),
                impact: "place search uses a rate-limited developer key",
            },
            CredentialStatus {
                name: "arcgis_token",
                configured: self.arcgis_token.is_configured(),
                impact: "secured ArcGIS services are skipped",
            },
        ]
    }

    pub fn missing(&self) -> Vec<CredentialStatus> {
        self.statuses().into_iter().filter(|s| !s.configured).collect()
    }
}

impl ViewerConfig {
    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> ViewerResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ViewerError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        let config = Self::from_yaml(&content)?;
        info!(path = %path.display(), "Loaded viewer configuration");
        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> ViewerResult<Self> {
        let config: ViewerConfig = serde_yaml::from_str(yaml)
            .map_err(|e| ViewerError::parse(DocumentKind::Config, e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from `lookup`, which maps variable names to values.
    ///
    /// Recognized: `BING_MAPS_KEY`, `MAPQUEST_API_KEY`, `ARCGIS_TOKEN`,
    /// `ARCGIS_ROOT`, `ARCGIS_FOLDER`, `ARCGIS_DEFAULT_LAYER`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for (name, slot) in [
            ("BING_MAPS_KEY", &mut self.credentials.bing_maps_key),
            ("MAPQUEST_API_KEY", &mut self.credentials.mapquest_key),
            ("ARCGIS_TOKEN", &mut self.credentials.arcgis_token),
        ] {
            if let Some(value) = lookup(name) {
                debug!(variable = name, "Credential set from environment");
                *slot = Credential::from(Some(value));
            }
        }

        if let Some(root) = lookup("ARCGIS_ROOT") {
            let source = self.arcgis.get_or_insert_with(|| ArcGisSourceConfig {
                root: String::new(),
                folder: None,
                default_layer: None,
            });
            source.root = root;
        }
        if let Some(source) = self.arcgis.as_mut() {
            if let Some(folder) = lookup("ARCGIS_FOLDER") {
                source.folder = Some(folder).filter(|f| !f.is_empty());
            }
            if let Some(layer) = lookup("ARCGIS_DEFAULT_LAYER") {
                source.default_layer = Some(layer).filter(|l| !l.is_empty());
            }
        }
    }

    pub fn validate(&self) -> ViewerResult<()> {
        if !(0.0..=1.0).contains(&self.overlay_opacity) {
            return Err(ViewerError::Config(format!(
                "overlay_opacity must be between 0 and 1, got {}",
                self.overlay_opacity
            )));
        }
        if let Some(source) = &self.arcgis {
            if source.root.trim().is_empty() {
                return Err(ViewerError::Config("arcgis.root must not be empty".to_string()));
            }
        }
        if self.http.timeout_secs == 0 {
            return Err(ViewerError::Config("http.timeout_secs must be positive".to_string()));
        }
        Ok(())
    }
}
