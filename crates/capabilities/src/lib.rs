//! Capability documents published by remote map services.
//!
//! Supports:
//! - WMS 1.1.1 and 1.3.0 GetCapabilities
//! - WMTS 1.0.0 Capabilities
//! - ArcGIS REST catalog and service metadata (JSON)

pub mod arcgis;
pub mod wms;
pub mod wmts;
mod xml;

pub use arcgis::{
    ArcGisCatalog, ArcGisServiceEntry, ArcGisServiceInfo, ServiceDescriptor, ServiceType,
};
pub use wms::{WmsCapabilities, WmsLayerCapabilities};
pub use wmts::{
    WmtsCapabilities, WmtsLayerCapabilities, WmtsResourceUrl, WmtsStyle, WmtsTileMatrix,
    WmtsTileMatrixSet,
};
