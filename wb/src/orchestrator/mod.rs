//! Widget orchestrator - the fixed bootstrap pipeline
//!
//! configuration → "pre" resources → templates (in order) → "post" resources
//! → done. Each stage starts only after the previous one succeeded; the first
//! failure aborts the run. There are no retries and no partial completion.

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use tracing::{debug, error, info};

use crate::error::BootError;
use crate::fetch::Fetcher;
use crate::render::Renderer;
use crate::resource::{Document, ResourceLoader, load_stage};
use crate::template::{Capabilities, TemplateLoader};
use crate::widget::{Configuration, Globals, HostElement, StageName, load_configuration};

/// Capacity of the state-transition channel
const STATE_CHANNEL_CAPACITY: usize = 16;

/// Pipeline state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootState {
    Idle,
    ConfigLoaded,
    PreLoaded,
    TemplatesLoaded,
    PostLoaded,
    Done,
    /// A stage failed; the run is over
    Failed,
}

impl fmt::Display for BootState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::ConfigLoaded => "config-loaded",
            Self::PreLoaded => "pre-loaded",
            Self::TemplatesLoaded => "templates-loaded",
            Self::PostLoaded => "post-loaded",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Result of a successful run: the configuration, if the host declared one
pub type BootOutcome = Option<Arc<Configuration>>;

/// Drives one widget bootstrap
pub struct WidgetBootstrap {
    fetcher: Arc<dyn Fetcher>,
    document: Arc<dyn Document>,
    renderer: Arc<dyn Renderer>,
    host: Option<Arc<HostElement>>,
    state: Mutex<BootState>,
    transitions: broadcast::Sender<BootState>,
}

impl WidgetBootstrap {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        document: Arc<dyn Document>,
        renderer: Arc<dyn Renderer>,
        host: Option<HostElement>,
    ) -> Self {
        debug!(has_host = host.is_some(), "WidgetBootstrap::new: called");
        let (transitions, _) = broadcast::channel(STATE_CHANNEL_CAPACITY);
        Self {
            fetcher,
            document,
            renderer,
            host: host.map(Arc::new),
            state: Mutex::new(BootState::Idle),
            transitions,
        }
    }

    /// Current state
    pub fn state(&self) -> BootState {
        self.state.lock().map(|s| *s).unwrap_or(BootState::Failed)
    }

    /// Receive every state transition made after this call
    pub fn subscribe(&self) -> broadcast::Receiver<BootState> {
        debug!("WidgetBootstrap::subscribe: called");
        self.transitions.subscribe()
    }

    /// Wait for the host's ready signal, then run the pipeline
    pub async fn run_when_ready<F>(&self, ready: F) -> Result<BootOutcome, BootError>
    where
        F: Future<Output = ()>,
    {
        debug!("WidgetBootstrap::run_when_ready: waiting for ready signal");
        ready.await;
        self.run().await
    }

    /// Run the whole pipeline once
    ///
    /// Every call is a fresh run starting from `Idle` with new globals.
    pub async fn run(&self) -> Result<BootOutcome, BootError> {
        debug!("WidgetBootstrap::run: called");
        self.transition(BootState::Idle);

        match self.pipeline().await {
            Ok(configuration) => {
                self.transition(BootState::Done);
                info!("Widget loaded!");
                Ok(configuration)
            }
            Err(e) => {
                error!(error = %e, state = %self.state(), "Widget bootstrap failed");
                self.transition(BootState::Failed);
                Err(e)
            }
        }
    }

    async fn pipeline(&self) -> Result<BootOutcome, BootError> {
        let configuration = load_configuration(self.fetcher.as_ref(), self.host.as_deref()).await?;
        self.transition(BootState::ConfigLoaded);

        let resources = ResourceLoader::new(self.document.clone());
        load_stage(&resources, configuration.as_ref(), StageName::Pre).await?;
        self.transition(BootState::PreLoaded);

        let Some(host) = self.host.clone() else {
            return Err(BootError::ConfigurationMissing);
        };
        let capabilities = Capabilities {
            document: self.document.clone(),
            renderer: self.renderer.clone(),
            host,
            globals: Globals::new(),
        };
        let templates = TemplateLoader::new(self.fetcher.clone(), capabilities);
        let configuration = templates.load_templates(configuration.as_ref()).await?;
        self.transition(BootState::TemplatesLoaded);

        load_stage(&resources, configuration.as_ref(), StageName::Post).await?;
        self.transition(BootState::PostLoaded);

        Ok(configuration)
    }

    fn transition(&self, next: BootState) {
        debug!(%next, "WidgetBootstrap::transition: called");
        if let Ok(mut state) = self.state.lock() {
            *state = next;
        }
        // No subscribers is fine
        let _ = self.transitions.send(next);
    }
}

impl fmt::Debug for WidgetBootstrap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetBootstrap")
            .field("host", &self.host)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
