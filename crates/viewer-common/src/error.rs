//! Error types for the globe viewer.

use thiserror::Error;

/// Result type alias using ViewerError.
pub type ViewerResult<T> = Result<T, ViewerError>;

/// Which kind of document failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    WmsCapabilities,
    WmtsCapabilities,
    ArcGisCatalog,
    ArcGisService,
    Config,
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DocumentKind::WmsCapabilities => "WMS capabilities",
            DocumentKind::WmtsCapabilities => "WMTS capabilities",
            DocumentKind::ArcGisCatalog => "ArcGIS catalog",
            DocumentKind::ArcGisService => "ArcGIS service",
            DocumentKind::Config => "configuration",
        };
        f.write_str(name)
    }
}

/// Primary error type for capability fetching and layer composition.
///
/// Framing a layer without a usable bounding box is not an error; see
/// `FramingOutcome` in the catalog crate.
#[derive(Debug, Error)]
pub enum ViewerError {
    // === Remote service errors ===
    #[error("Request to {url} failed: {message}")]
    Transport {
        url: String,
        status: Option<u16>,
        message: String,
    },

    #[error("Malformed {kind} document: {message}")]
    Parse { kind: DocumentKind, message: String },

    #[error("Layer not found in capabilities: {0}")]
    NotFoundInCapabilities(String),

    // === Local errors ===
    #[error("Unknown projection: {0}")]
    UnknownProjection(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl ViewerError {
    pub fn transport(url: impl Into<String>, status: Option<u16>, message: impl Into<String>) -> Self {
        ViewerError::Transport {
            url: url.into(),
            status,
            message: message.into(),
        }
    }

    pub fn parse(kind: DocumentKind, message: impl Into<String>) -> Self {
        ViewerError::Parse {
            kind,
            message: message.into(),
        }
    }

    /// True for failures raised by the network layer.
    pub fn is_transport(&self) -> bool {
        matches!(self, ViewerError::Transport { .. })
    }

    /// HTTP status of a transport failure, when the server answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ViewerError::Transport { status, .. } => *status,
            _ => None,
        }
    }
}
