//! Headless globe viewer.
//!
//! Builds the layer catalog the way the interactive viewer does at startup:
//! - Installs the default background, base, data and settings layers
//! - Adds the WMS/WMTS layers listed in the configuration
//! - Discovers WMS layers on the configured ArcGIS folder
//! - Prints each category's layer panel

mod defaults;
mod engine;
mod panels;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use layer_catalog::{LayerCatalog, SharedCatalog};
use service_discovery::{
    add_layer_from_wms, add_layer_from_wmts, CapabilitiesClient, DiscoveryContext,
    DiscoveryPipeline, HttpCapabilitiesClient, ViewerConfig,
};
use viewer_common::Projection;

use engine::TracingEngine;

#[derive(Parser, Debug)]
#[command(name = "viewer")]
#[command(about = "Globe viewer layer catalog with ArcGIS WMS discovery")]
struct Args {
    /// Configuration file path
    #[arg(short, long, env = "VIEWER_CONFIG")]
    config: Option<PathBuf>,

    /// ArcGIS folder to discover (overrides the configuration)
    #[arg(long)]
    folder: Option<String>,

    /// Layer to enable and frame once discovered
    #[arg(long)]
    default_layer: Option<String>,

    /// Initial projection, e.g. "3D", "Mercator", "North Polar"
    #[arg(long)]
    projection: Option<String>,

    /// Skip ArcGIS discovery
    #[arg(long)]
    no_discovery: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args)?;

    info!("Starting globe viewer");

    let mut config = match &args.config {
        Some(path) => ViewerConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => ViewerConfig::default(),
    };
    config.apply_env();
    if let Some(source) = config.arcgis.as_mut() {
        if let Some(folder) = &args.folder {
            source.folder = Some(folder.clone());
        }
        if let Some(layer) = &args.default_layer {
            source.default_layer = Some(layer.clone());
        }
    }
    config.validate().context("invalid configuration")?;

    for status in config.credentials.missing() {
        warn!(credential = status.name, impact = status.impact, "Credential not configured");
    }

    let engine = Arc::new(TracingEngine::new());
    let catalog: SharedCatalog = LayerCatalog::new(engine.clone()).into_shared();
    let client: Arc<dyn CapabilitiesClient> = Arc::new(
        HttpCapabilitiesClient::new(&config.http).context("building HTTP client")?,
    );

    if let Some(name) = args.projection.as_deref().or(config.projection.as_deref()) {
        let projection = Projection::from_name(name)?;
        catalog.lock().await.engine().set_projection(projection);
    }

    let mut pending = defaults::install(&catalog, client.clone()).await;
    pending.extend(add_configured_layers(&config, &catalog, &client).await);

    // Ctrl+C stops discovery; layers already added stay
    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received shutdown signal");
        shutdown.cancel();
    });

    match DiscoveryContext::from_config(&config) {
        Some(context) if !args.no_discovery => {
            let report = DiscoveryPipeline::new(client.clone(), catalog.clone(), context)
                .with_cancellation(cancel.clone())
                .run()
                .await;
            if let Some(e) = &report.catalog_error {
                warn!(error = %e, "ArcGIS discovery added no layers");
            }
            info!(
                layers = report.layers_added().len(),
                failed_services = report.failures().len(),
                "Discovery complete"
            );
        }
        Some(_) => info!("Discovery disabled"),
        None => info!("No ArcGIS source configured"),
    }

    let loaded = join_all(pending).await;
    let attached = loaded.iter().filter(|r| matches!(r, Ok(true))).count();
    info!(attached = attached, total = loaded.len(), "WMTS layers settled");

    let catalog = catalog.lock().await;
    for panel in panels::build_panels(&catalog) {
        print!("{}", panel);
    }
    if let Some(camera) = engine.camera() {
        println!(
            "camera: lat {:.4} lon {:.4} altitude {:.0} m ({})",
            camera.lat,
            camera.lon,
            camera.altitude,
            engine.projection().name()
        );
    }

    Ok(())
}

fn init_tracing(args: &Args) -> Result<()> {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    if args.json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

/// Add the WMS and WMTS layers listed in the configuration.
///
/// A WMS layer that cannot be loaded is logged and skipped.
async fn add_configured_layers(
    config: &ViewerConfig,
    catalog: &SharedCatalog,
    client: &Arc<dyn CapabilitiesClient>,
) -> Vec<tokio::task::JoinHandle<bool>> {
    for entry in &config.wms_layers {
        match add_layer_from_wms(client.as_ref(), catalog, &entry.address, &entry.layer, entry.options.clone()).await {
            Ok(Some(id)) => info!(id = %id, layer = %entry.layer, "Added configured WMS layer"),
            Ok(None) => warn!(address = %entry.address, layer = %entry.layer, "Configured WMS layer not advertised"),
            Err(e) => warn!(address = %entry.address, layer = %entry.layer, error = %e, "Failed to add WMS layer"),
        }
    }

    let mut handles = Vec::with_capacity(config.wmts_layers.len());
    for entry in &config.wmts_layers {
        let (_, handle) = add_layer_from_wmts(
            client.clone(),
            catalog.clone(),
            &entry.capabilities_url,
            &entry.identifier,
            &entry.display_name,
            entry.options.clone(),
        )
        .await;
        handles.push(handle);
    }
    handles
}
