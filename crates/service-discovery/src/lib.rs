//! Remote map-service access for the globe viewer.
//!
//! - [`CapabilitiesClient`]: one GET per capabilities document, plus typed helpers
//! - [`DiscoveryPipeline`]: walks an ArcGIS folder and adds every WMS layer it finds
//! - [`add_layer_from_wms`] / [`add_layer_from_wmts`]: single-layer loaders
//! - [`ViewerConfig`]: YAML configuration with typed credentials

pub mod client;
pub mod config;
pub mod context;
pub mod loaders;
pub mod pipeline;

pub use client::{CapabilitiesClient, HttpCapabilitiesClient};
pub use config::{
    ArcGisSourceConfig, Credential, CredentialStatus, Credentials, HttpConfig, ViewerConfig,
    WmsLayerSpec, WmtsLayerSpec,
};
pub use context::DiscoveryContext;
pub use loaders::{add_layer_from_wms, add_layer_from_wmts};
pub use pipeline::{BranchOutcome, BranchReport, DiscoveryPipeline, DiscoveryReport, DiscoveryStage};
