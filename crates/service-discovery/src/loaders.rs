//! Adding single WMS and WMTS layers by address.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use layer_catalog::{LayerFactory, SharedCatalog};
use viewer_common::{LayerConfig, LayerId, LayerSource, NewLayer, ViewerError, ViewerResult};

use crate::client::CapabilitiesClient;

/// Fetch the capabilities at `address` and add the layer called `layer_name`.
///
/// `options` win over what the capabilities say, except for the bounding
/// box, which always comes from the advertised extent. Returns `Ok(None)`
/// when the server does not list the layer. Fetch and parse failures are
/// returned so a user-triggered load can report them.
#[instrument(skip(client, catalog, options))]
pub async fn add_layer_from_wms(
    client: &dyn CapabilitiesClient,
    catalog: &SharedCatalog,
    address: &str,
    layer_name: &str,
    options: LayerConfig,
) -> ViewerResult<Option<LayerId>> {
    let caps = client.fetch_wms_capabilities(address).await?;

    let Some(config) = LayerFactory::build_from_wms(&caps, layer_name) else {
        debug!("Named layer not advertised; nothing added");
        return Ok(None);
    };

    let config = config.merged_with(LayerConfig { bbox: None, ..options });
    let id = catalog
        .lock()
        .await
        .add(NewLayer::from(config), LayerConfig::default());
    info!(id = %id, "Added WMS layer");
    Ok(Some(id))
}

/// Place a WMTS layer now and complete it once its capabilities arrive.
///
/// The layer holds its slot in the catalog while pending. The returned task
/// resolves to `true` when the tile source was attached; on failure the
/// layer stays pending and draws nothing.
pub async fn add_layer_from_wmts(
    client: Arc<dyn CapabilitiesClient>,
    catalog: SharedCatalog,
    capabilities_url: &str,
    identifier: &str,
    display_name: &str,
    options: LayerConfig,
) -> (LayerId, JoinHandle<bool>) {
    let pending = NewLayer::new(
        display_name,
        LayerSource::PendingWmts {
            capabilities_url: capabilities_url.to_string(),
            layer_identifier: identifier.to_string(),
        },
    );
    let id = catalog.lock().await.add(pending, options);
    debug!(id = %id, layer = identifier, "Placed pending WMTS layer");

    let url = capabilities_url.to_string();
    let identifier = identifier.to_string();
    let handle = tokio::spawn(async move {
        match complete_wmts_layer(client.as_ref(), &catalog, id, &url, &identifier).await {
            Ok(attached) => attached,
            Err(ViewerError::NotFoundInCapabilities(layer)) => {
                debug!(id = %id, layer = %layer, "WMTS layer not advertised; left pending");
                false
            }
            Err(e) => {
                warn!(id = %id, url = %url, error = %e, "WMTS layer left pending");
                false
            }
        }
    });
    (id, handle)
}

#[instrument(skip(client, catalog))]
async fn complete_wmts_layer(
    client: &dyn CapabilitiesClient,
    catalog: &SharedCatalog,
    id: LayerId,
    url: &str,
    identifier: &str,
) -> ViewerResult<bool> {
    let caps = client.fetch_wmts_capabilities(url).await?;

    let config = LayerFactory::build_from_wmts(&caps, identifier)
        .ok_or_else(|| ViewerError::NotFoundInCapabilities(identifier.to_string()))?;
    let Some(source) = config.source else {
        return Ok(false);
    };

    Ok(catalog.lock().await.attach_source(id, source, config.bbox))
}
