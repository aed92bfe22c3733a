//! Renderer boundary - the UI framework a template instantiates
//!
//! The framework itself is opaque: it receives the template's wrapper
//! selector and a JSON data object (configuration and globals) and mounts
//! whatever it renders there.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

/// Errors reported by a renderer
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("No mount point matches '{0}'")]
    MountNotFound(String),

    #[error("Render failed: {0}")]
    Failed(String),
}

/// Mounts a rendering-framework instance
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, mount: &str, data: Value) -> Result<(), RenderError>;
}

/// One recorded render call
#[derive(Debug, Clone, PartialEq)]
pub struct RenderCall {
    pub mount: String,
    pub data: Value,
}

/// Renderer that logs and records every call instead of drawing anything
#[derive(Debug, Default)]
pub struct LogRenderer {
    calls: Mutex<Vec<RenderCall>>,
}

impl LogRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls received so far, in order
    pub fn calls(&self) -> Vec<RenderCall> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Renderer for LogRenderer {
    async fn render(&self, mount: &str, data: Value) -> Result<(), RenderError> {
        debug!(%mount, "LogRenderer::render: called");
        if mount.is_empty() {
            debug!("LogRenderer::render: empty mount selector");
            return Err(RenderError::MountNotFound(mount.to_string()));
        }
        info!(%mount, "Rendered template into {}", mount);
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RenderCall {
                mount: mount.to_string(),
                data,
            });
        }
        Ok(())
    }
}
