//! PluginApi - the capability object handed to a template bootstrap
//!
//! A bootstrap module can only reach what this object exposes: its own
//! template reference, the shared configuration, the resource loader, the
//! sequential runner, the host element, the shared globals, a mount point
//! restricted to its own wrapper, the renderer, and the two settlement
//! callbacks. The fetcher, the orchestrator and other templates are not
//! reachable from here.

use std::fmt;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::sync::oneshot;
use tracing::debug;

use crate::error::BootError;
use crate::render::{RenderError, Renderer};
use crate::resource::{Document, DocumentError, Element, Parent, ResourceLoader};
use crate::runner::{self, Task};
use crate::widget::{Configuration, Globals, HostElement, Template};

/// Final outcome a bootstrap reports through `final_resolve` / `final_reject`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    Resolved,
    Rejected(String),
}

/// Everything a template bootstrap gets from the host
///
/// Cloning shares the same settlement slot: whichever clone settles first
/// wins, later calls are ignored. When every clone is dropped without
/// settling, the waiting loader observes the closed channel.
#[derive(Clone)]
pub struct PluginApi {
    template: Arc<Template>,
    configuration: Arc<Configuration>,
    resources: ResourceLoader,
    document: Arc<dyn Document>,
    renderer: Arc<dyn Renderer>,
    host: Arc<HostElement>,
    globals: Globals,
    settle: Arc<Mutex<Option<oneshot::Sender<Settlement>>>>,
}

/// Collaborators shared by every [`PluginApi`] of one run
#[derive(Clone)]
pub struct Capabilities {
    pub document: Arc<dyn Document>,
    pub renderer: Arc<dyn Renderer>,
    pub host: Arc<HostElement>,
    pub globals: Globals,
}

impl PluginApi {
    /// Build a fresh capability object and the receiver its settlement goes to
    pub fn new(
        template: Arc<Template>,
        configuration: Arc<Configuration>,
        capabilities: &Capabilities,
    ) -> (Self, oneshot::Receiver<Settlement>) {
        debug!(template = %template.name, "PluginApi::new: called");
        let (tx, rx) = oneshot::channel();
        let api = Self {
            template,
            configuration,
            resources: ResourceLoader::new(capabilities.document.clone()),
            document: capabilities.document.clone(),
            renderer: capabilities.renderer.clone(),
            host: capabilities.host.clone(),
            globals: capabilities.globals.clone(),
            settle: Arc::new(Mutex::new(Some(tx))),
        };
        (api, rx)
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn host(&self) -> &HostElement {
        &self.host
    }

    pub fn globals(&self) -> &Globals {
        &self.globals
    }

    pub async fn load_script(&self, path: impl Into<String>) -> Result<(), BootError> {
        self.resources.load_script(path).await
    }

    pub async fn load_stylesheet(&self, path: impl Into<String>, media: Option<&str>) -> Result<(), BootError> {
        self.resources.load_stylesheet(path, media).await
    }

    /// The sequential task runner
    pub async fn sequential<T, E>(&self, tasks: Vec<Task<T, E>>) -> Result<Vec<T>, E> {
        runner::sequential(tasks).await
    }

    /// Append an element into this template's wrapper
    pub async fn mount(&self, element: Element) -> Result<(), DocumentError> {
        let wrapper = Parent::Selector(self.template.settings.wrapper.clone());
        debug!(%wrapper, %element, "PluginApi::mount: called");
        self.document.append(&wrapper, element).await
    }

    /// Instantiate the rendering framework on this template's wrapper
    pub async fn render(&self, data: Value) -> Result<(), RenderError> {
        debug!(wrapper = %self.template.settings.wrapper, "PluginApi::render: called");
        self.renderer.render(&self.template.settings.wrapper, data).await
    }

    /// Report success; returns false when the bootstrap had already settled
    pub fn final_resolve(&self) -> bool {
        debug!(template = %self.template.name, "PluginApi::final_resolve: called");
        self.settle_with(Settlement::Resolved)
    }

    /// Report failure; returns false when the bootstrap had already settled
    pub fn final_reject(&self, error: impl fmt::Display) -> bool {
        debug!(template = %self.template.name, %error, "PluginApi::final_reject: called");
        self.settle_with(Settlement::Rejected(error.to_string()))
    }

    fn settle_with(&self, settlement: Settlement) -> bool {
        let sender = match self.settle.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };
        match sender {
            Some(tx) => {
                // A dropped receiver means the loader is gone; nothing to report to
                let _ = tx.send(settlement);
                true
            }
            None => {
                debug!(template = %self.template.name, "PluginApi::settle_with: already settled");
                false
            }
        }
    }
}

impl fmt::Debug for PluginApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginApi")
            .field("template", &self.template.name)
            .field("resources", &self.configuration.resources)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::LogRenderer;
    use crate::resource::mock::MockDocument;
    use crate::widget::TemplateSettings;

    fn api() -> (PluginApi, oneshot::Receiver<Settlement>, Arc<MockDocument>) {
        let document = Arc::new(MockDocument::new());
        let capabilities = Capabilities {
            document: document.clone(),
            renderer: Arc::new(LogRenderer::new()),
            host: Arc::new(HostElement::new()),
            globals: Globals::new(),
        };
        let template = Template {
            name: "vue".to_string(),
            settings: TemplateSettings {
                wrapper: "#widget".to_string(),
                ..Default::default()
            },
        };
        let (api, rx) = PluginApi::new(Arc::new(template), Arc::new(Configuration::default()), &capabilities);
        (api, rx, document)
    }

    #[tokio::test]
    async fn test_resolve_settles_once() {
        let (api, rx, _) = api();
        let clone = api.clone();

        assert!(api.final_resolve());
        assert!(!clone.final_reject("too late"));
        assert_eq!(rx.await.unwrap(), Settlement::Resolved);
    }

    #[tokio::test]
    async fn test_reject_carries_message() {
        let (api, rx, _) = api();
        assert!(api.final_reject("framework missing"));
        assert_eq!(rx.await.unwrap(), Settlement::Rejected("framework missing".to_string()));
    }

    #[tokio::test]
    async fn test_dropping_every_clone_closes_channel() {
        let (api, rx, _) = api();
        let clone = api.clone();
        drop(api);
        drop(clone);
        assert!(rx.await.is_err());
    }

    #[tokio::test]
    async fn test_mount_targets_wrapper() {
        let (api, _rx, document) = api();
        api.mount(Element::new("app")).await.unwrap();

        let nodes = document.nodes();
        assert_eq!(nodes[0].0, Parent::Selector("#widget".to_string()));
        assert_eq!(nodes[0].1.tag, "app");
    }
}
