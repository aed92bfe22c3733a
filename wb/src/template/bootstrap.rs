//! Template bootstrap units and the execution of compiled modules

use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

use crate::resource::Element;
use crate::runner::Task;

use super::api::PluginApi;
use super::compiler::{self, CompileError, Instruction, Program, Scope};

/// Synchronous failure while invoking a bootstrap
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BootstrapError {
    #[error("No async runtime to run the bootstrap on: {0}")]
    NoRuntime(String),

    #[error("Bootstrap invocation failed: {0}")]
    Invocation(String),
}

/// A callable bootstrap unit
///
/// `invoke` is called exactly once with a fresh capability object. It must
/// return promptly; the actual loading continues in the background and ends
/// with `api.final_resolve()` or `api.final_reject(..)`.
pub trait TemplateBootstrap: Send + Sync {
    fn invoke(&self, api: PluginApi) -> Result<(), BootstrapError>;
}

/// A bootstrap module compiled from fetched source
#[derive(Debug, Clone)]
pub struct CompiledBootstrap {
    program: Program,
}

impl CompiledBootstrap {
    pub fn compile(source: &str) -> Result<Self, CompileError> {
        debug!("CompiledBootstrap::compile: called");
        Ok(Self {
            program: compiler::compile(source)?,
        })
    }

    pub fn program(&self) -> &Program {
        &self.program
    }
}

impl TemplateBootstrap for CompiledBootstrap {
    fn invoke(&self, api: PluginApi) -> Result<(), BootstrapError> {
        debug!(template = %api.template().name, steps = self.program.len(), "CompiledBootstrap::invoke: called");
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| BootstrapError::NoRuntime(e.to_string()))?;

        if !self.program.settles() {
            warn!(
                template = %api.template().name,
                "Bootstrap does not end with resolve or reject and will fail once its steps complete"
            );
        }

        let instructions: Vec<Instruction> = self.program.instructions.iter().map(|(_, i)| i.clone()).collect();
        runtime.spawn(execute(instructions, api));
        Ok(())
    }
}

/// Run instructions in order; the first failure rejects the bootstrap
async fn execute(instructions: Vec<Instruction>, api: PluginApi) {
    debug!(template = %api.template().name, "execute: called");
    let tasks = instructions
        .into_iter()
        .map(|instruction| {
            let api = api.clone();
            Task::deferred(move || async move { run_instruction(&instruction, &api).await })
        })
        .collect();

    if let Err(message) = api.sequential(tasks).await {
        debug!(template = %api.template().name, %message, "execute: step failed");
        api.final_reject(message);
    }
}

async fn run_instruction(instruction: &Instruction, api: &PluginApi) -> Result<(), String> {
    let template = api.template();
    let scope = Scope {
        resources: &api.configuration().resources,
        template: &template.name,
        wrapper: &template.settings.wrapper,
        component: None,
    };
    debug!(template = %template.name, %instruction, "run_instruction: called");

    match instruction {
        Instruction::Stylesheet { url, media } => api
            .load_stylesheet(url.render(&scope), media.as_deref())
            .await
            .map_err(|e| e.to_string()),
        Instruction::Script { url } => api.load_script(url.render(&scope)).await.map_err(|e| e.to_string()),
        Instruction::Components { pattern } => {
            let urls: Vec<String> = template
                .settings
                .components
                .iter()
                .map(|component| {
                    pattern.render(&Scope {
                        component: Some(component.as_str()),
                        ..scope
                    })
                })
                .collect();
            let tasks = urls
                .into_iter()
                .map(|url| {
                    let api = api.clone();
                    Task::deferred(move || async move { api.load_script(url).await.map_err(|e| e.to_string()) })
                })
                .collect();
            api.sequential(tasks).await.map(|_| ())
        }
        Instruction::Mount { tag, attributes } => {
            let element = attributes
                .iter()
                .fold(Element::new(tag.clone()), |el, (name, value)| {
                    el.with_attr(name.clone(), value.render(&scope))
                });
            api.mount(element).await.map_err(|e| e.to_string())
        }
        Instruction::CaptureAttributes { key } => {
            api.globals().insert(key.clone(), api.host().attributes_json()).await;
            Ok(())
        }
        Instruction::Set { key, value } => {
            api.globals().insert(key.clone(), value.clone()).await;
            Ok(())
        }
        Instruction::Render => {
            let configuration = serde_json::to_value(api.configuration()).map_err(|e| e.to_string())?;
            let globals = api.globals().snapshot().await;
            let data = json!({
                "configuration": configuration,
                "globals": globals,
            });
            api.render(data).await.map_err(|e| e.to_string())
        }
        Instruction::Resolve => {
            api.final_resolve();
            Ok(())
        }
        Instruction::Reject { message } => {
            api.final_reject(message.render(&scope));
            Ok(())
        }
    }
}
