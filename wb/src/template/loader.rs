//! TemplateLoader - fetch, compile and invoke template bootstrap modules

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::error::BootError;
use crate::fetch::Fetcher;
use crate::runner::{Task, sequential};
use crate::widget::{Configuration, Template};

use super::api::{Capabilities, PluginApi, Settlement};
use super::bootstrap::{CompiledBootstrap, TemplateBootstrap};

/// Loads the templates of one bootstrap run
///
/// Every template gets a fresh [`PluginApi`] built from the same shared
/// capabilities, so all templates of a run see the same globals.
#[derive(Clone)]
pub struct TemplateLoader {
    fetcher: Arc<dyn Fetcher>,
    capabilities: Capabilities,
}

impl TemplateLoader {
    pub fn new(fetcher: Arc<dyn Fetcher>, capabilities: Capabilities) -> Self {
        debug!("TemplateLoader::new: called");
        Self { fetcher, capabilities }
    }

    /// Load every template of the configuration, strictly in declared order
    ///
    /// Template `i + 1` is not fetched before template `i` settled; the first
    /// failure stops the run. Without configuration there is nothing to load.
    pub async fn load_templates(
        &self,
        configuration: Option<&Arc<Configuration>>,
    ) -> Result<Option<Arc<Configuration>>, BootError> {
        debug!("TemplateLoader::load_templates: called");
        let Some(configuration) = configuration else {
            info!("No configuration, skipping templates");
            return Ok(None);
        };

        let tasks = configuration
            .templates
            .iter()
            .map(|template| {
                let loader = self.clone();
                let template = Arc::new(template.clone());
                let configuration = configuration.clone();
                Task::deferred(move || async move { loader.load_template(template, configuration).await })
            })
            .collect();

        sequential(tasks).await?;
        debug!(count = configuration.templates.len(), "TemplateLoader::load_templates: all templates loaded");
        Ok(Some(configuration.clone()))
    }

    /// Fetch, compile and run one template bootstrap
    pub async fn load_template(
        &self,
        template: Arc<Template>,
        configuration: Arc<Configuration>,
    ) -> Result<Arc<Configuration>, BootError> {
        let url = configuration.bootstrap_url(&template);
        debug!(template = %template.name, %url, "TemplateLoader::load_template: called");

        let source = self.fetcher.fetch_text(&url).await.map_err(|e| {
            error!(template = %template.name, %url, error = %e, "Unable to load template");
            BootError::TemplateLoad {
                template: template.name.clone(),
            }
        })?;

        let bootstrap = CompiledBootstrap::compile(&source).map_err(|e| {
            error!(template = %template.name, %url, error = %e, "Unable to compile template bootstrap");
            BootError::TemplateLoad {
                template: template.name.clone(),
            }
        })?;

        self.run_bootstrap(&bootstrap, template, configuration).await
    }

    /// Invoke a bootstrap unit once and wait for it to settle
    pub async fn run_bootstrap(
        &self,
        bootstrap: &dyn TemplateBootstrap,
        template: Arc<Template>,
        configuration: Arc<Configuration>,
    ) -> Result<Arc<Configuration>, BootError> {
        debug!(template = %template.name, "TemplateLoader::run_bootstrap: called");
        let name = template.name.clone();
        let (api, settled) = PluginApi::new(template, configuration.clone(), &self.capabilities);

        bootstrap.invoke(api).map_err(|e| {
            error!(template = %name, error = %e, "Unable to load template");
            BootError::TemplateLoad { template: name.clone() }
        })?;

        match settled.await {
            Ok(Settlement::Resolved) => {
                info!(template = %name, "Template loaded");
                Ok(configuration)
            }
            Ok(Settlement::Rejected(message)) => {
                error!(template = %name, %message, "Template rejected");
                Err(BootError::TemplateRejected { template: name, message })
            }
            Err(_) => {
                error!(template = %name, "Template bootstrap finished without settling");
                Err(BootError::TemplateRejected {
                    template: name,
                    message: "bootstrap finished without settling".to_string(),
                })
            }
        }
    }
}

impl std::fmt::Debug for TemplateLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateLoader").finish_non_exhaustive()
    }
}
