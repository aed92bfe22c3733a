//! Configuration loading from the host element's `data-conf` attribute

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::error::BootError;
use crate::fetch::Fetcher;

use super::configuration::Configuration;
use super::host::HostElement;

/// Load the widget configuration referenced by the host element
///
/// - no host element: `ConfigurationMissing`, nothing is fetched
/// - no `data-conf` attribute: `Ok(None)`
/// - otherwise the URL is fetched and parsed as JSON; any failure is logged
///   and reported as `ConfigurationLoad`
pub async fn load_configuration(
    fetcher: &dyn Fetcher,
    host: Option<&HostElement>,
) -> Result<Option<Arc<Configuration>>, BootError> {
    debug!("load_configuration: called");
    let Some(host) = host else {
        error!("load_configuration: no host element");
        return Err(BootError::ConfigurationMissing);
    };

    let Some(url) = host.config_url() else {
        info!("No data-conf attribute, continuing without configuration");
        return Ok(None);
    };

    debug!(%url, "load_configuration: fetching configuration");
    let body = fetcher.fetch_text(url).await.map_err(|e| {
        error!(%url, error = %e, "Error while loading configuration");
        BootError::ConfigurationLoad
    })?;

    let configuration = Configuration::from_json(&body).map_err(|e| {
        error!(%url, error = %e, "Error while parsing configuration");
        BootError::ConfigurationLoad
    })?;

    info!(
        %url,
        templates = configuration.templates.len(),
        "Loaded configuration"
    );
    Ok(Some(Arc::new(configuration)))
}
