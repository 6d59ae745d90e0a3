//! ArcGIS service discovery.
//!
//! A run lists one folder of an ArcGIS server, then walks every map service
//! in it on its own task:
//!
//! ```text
//! Idle -> FetchingFolderCatalog -> (per MapServer) FetchingServiceDescriptor
//!      -> FetchingWmsCapabilities -> LayersAdded -> Done
//! ```
//!
//! Branches are independent; a failure ends only the branch it happened in.
//! Layers from different services land in the overlay block in whatever
//! order their branches finish.

use std::future::Future;
use std::sync::Arc;

use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use capabilities::{ArcGisServiceEntry, ServiceDescriptor, ServiceType};
use layer_catalog::{FramingOutcome, LayerFactory, SharedCatalog};
use viewer_common::{Category, LayerConfig, LayerId, NewLayer, ViewerError, ViewerResult};

use crate::client::CapabilitiesClient;
use crate::context::DiscoveryContext;

/// Stages a run, and each of its branches, passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryStage {
    Idle,
    FetchingFolderCatalog,
    FetchingServiceDescriptor,
    FetchingWmsCapabilities,
    LayersAdded,
    Done,
}

/// How a branch ended.
#[derive(Debug)]
pub enum BranchOutcome {
    LayersAdded {
        layers: Vec<LayerId>,
        /// Framing of the default layer, when this service had it
        framing: Option<FramingOutcome>,
    },
    /// The service does not publish WMS; nothing to do
    NoWmsSupport,
    Failed(ViewerError),
    Cancelled,
}

/// Result of one per-service branch.
#[derive(Debug)]
pub struct BranchReport {
    pub correlation_id: Uuid,
    pub service: String,
    /// Stages visited, in order; always ends with `Done`
    pub stages: Vec<DiscoveryStage>,
    pub outcome: BranchOutcome,
}

/// Result of a whole run.
#[derive(Debug, Default)]
pub struct DiscoveryReport {
    /// Set when the folder listing could not be fetched; no branches ran
    pub catalog_error: Option<ViewerError>,
    /// Services listed in the folder that are not map services
    pub skipped_services: Vec<String>,
    pub branches: Vec<BranchReport>,
}

impl DiscoveryReport {
    pub fn layers_added(&self) -> Vec<LayerId> {
        self.branches
            .iter()
            .filter_map(|b| match &b.outcome {
                BranchOutcome::LayersAdded { layers, .. } => Some(layers.iter().copied()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    pub fn failures(&self) -> Vec<&ViewerError> {
        self.catalog_error
            .iter()
            .chain(self.branches.iter().filter_map(|b| match &b.outcome {
                BranchOutcome::Failed(e) => Some(e),
                _ => None,
            }))
            .collect()
    }
}

/// Discovers WMS layers on an ArcGIS server and adds them to a catalog.
pub struct DiscoveryPipeline {
    client: Arc<dyn CapabilitiesClient>,
    catalog: SharedCatalog,
    context: Arc<DiscoveryContext>,
    cancel: CancellationToken,
}

impl DiscoveryPipeline {
    pub fn new(
        client: Arc<dyn CapabilitiesClient>,
        catalog: SharedCatalog,
        context: DiscoveryContext,
    ) -> Self {
        Self {
            client,
            catalog,
            context: Arc::new(context),
            cancel: CancellationToken::new(),
        }
    }

    /// Stop the run when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that cancels this run.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn context(&self) -> &DiscoveryContext {
        &self.context
    }

    /// Run discovery in the background.
    pub fn spawn(self) -> JoinHandle<DiscoveryReport> {
        tokio::spawn(async move { self.run().await })
    }

    /// Run discovery and wait for every branch to finish.
    ///
    /// Never fails: fetch and parse errors are logged and recorded in the report.
    pub async fn run(&self) -> DiscoveryReport {
        let span = info_span!(
            "discovery",
            root = %self.context.root,
            folder = self.context.folder.as_deref().unwrap_or("/")
        );
        self.run_inner().instrument(span).await
    }

    async fn run_inner(&self) -> DiscoveryReport {
        let mut report = DiscoveryReport::default();

        debug!(stage = ?DiscoveryStage::FetchingFolderCatalog, "Listing folder");
        let endpoint = self.context.folder_catalog_endpoint();
        let listing = cancellable(&self.cancel, self.client.fetch_arcgis_catalog(&endpoint)).await;
        let catalog = match listing {
            Ok(catalog) => catalog,
            Err(e) => {
                warn!(error = %e, "Folder listing failed; no layers added");
                report.catalog_error = Some(e);
                return report;
            }
        };

        let mut tasks = JoinSet::new();
        for entry in catalog.services {
            if entry.service_type != ServiceType::MapServer {
                debug!(service = %entry.name, service_type = %entry.service_type, "Skipping service");
                report.skipped_services.push(entry.name);
                continue;
            }
            let branch = Branch {
                correlation_id: Uuid::new_v4(),
                entry,
                client: self.client.clone(),
                catalog: self.catalog.clone(),
                context: self.context.clone(),
                cancel: self.cancel.child_token(),
            };
            tasks.spawn(branch.run());
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(branch) => report.branches.push(branch),
                Err(e) => warn!(error = %e, "Discovery branch did not complete"),
            }
        }

        info!(
            services = report.branches.len(),
            skipped = report.skipped_services.len(),
            layers = report.layers_added().len(),
            failures = report.failures().len(),
            "Discovery finished"
        );
        report
    }
}

/// One map service being turned into overlay layers.
struct Branch {
    correlation_id: Uuid,
    entry: ArcGisServiceEntry,
    client: Arc<dyn CapabilitiesClient>,
    catalog: SharedCatalog,
    context: Arc<DiscoveryContext>,
    cancel: CancellationToken,
}

impl Branch {
    async fn run(self) -> BranchReport {
        let span = info_span!(
            "discovery_branch",
            correlation_id = %self.correlation_id,
            service = %self.entry.name
        );
        let mut stages = Vec::new();
        let outcome = match self.drive(&mut stages).instrument(span.clone()).await {
            Ok(outcome) => outcome,
            Err(ViewerError::Cancelled) => BranchOutcome::Cancelled,
            Err(e) => {
                span.in_scope(|| warn!(error = %e, stage = ?stages.last(), "Discovery branch failed"));
                BranchOutcome::Failed(e)
            }
        };
        stages.push(DiscoveryStage::Done);

        BranchReport {
            correlation_id: self.correlation_id,
            service: self.entry.name,
            stages,
            outcome,
        }
    }

    async fn drive(&self, stages: &mut Vec<DiscoveryStage>) -> ViewerResult<BranchOutcome> {
        let service_type = self.entry.service_type.as_str();

        enter(stages, DiscoveryStage::FetchingServiceDescriptor);
        let endpoint = self.context.service_endpoint(&self.entry.name, service_type);
        let info = cancellable(&self.cancel, self.client.fetch_arcgis_service(&endpoint)).await?;
        let descriptor = ServiceDescriptor::new(&self.entry, &info);
        if !descriptor.supports_wms() {
            debug!(protocols = ?descriptor.supported_protocols, "Service does not publish WMS");
            return Ok(BranchOutcome::NoWmsSupport);
        }

        enter(stages, DiscoveryStage::FetchingWmsCapabilities);
        let address = self.context.wms_address(&self.entry.name, service_type);
        let caps = cancellable(&self.cancel, self.client.fetch_wms_capabilities(&address)).await?;
        let configs = LayerFactory::build_all_from_wms(&caps, self.context.default_layer.as_deref());

        if self.cancel.is_cancelled() {
            return Err(ViewerError::Cancelled);
        }

        enter(stages, DiscoveryStage::LayersAdded);
        let mut layers = Vec::with_capacity(configs.len());
        let mut framing = None;
        {
            let mut catalog = self.catalog.lock().await;
            for config in configs {
                let is_default = config
                    .display_name
                    .as_deref()
                    .map_or(false, |name| self.context.is_default_layer(name));
                let options = LayerConfig::default()
                    .with_category(Category::Overlay)
                    .with_enabled(is_default)
                    .with_opacity(self.context.overlay_opacity);
                let id = catalog.add(NewLayer::from(config), options);
                layers.push(id);
                if is_default {
                    framing = Some(catalog.frame_on(id));
                }
            }
        }

        info!(layers = layers.len(), default_framed = framing.is_some(), "Added WMS layers");
        Ok(BranchOutcome::LayersAdded { layers, framing })
    }
}

fn enter(stages: &mut Vec<DiscoveryStage>, stage: DiscoveryStage) {
    debug!(stage = ?stage, "Discovery stage");
    stages.push(stage);
}

/// Await `fut` unless `token` is cancelled first.
async fn cancellable<T, F>(token: &CancellationToken, fut: F) -> ViewerResult<T>
where
    F: Future<Output = ViewerResult<T>>,
{
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(ViewerError::Cancelled),
        result = fut => result,
    }
}
