//! Shared helpers for widgetboot integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use widgetboot::fetch::{FetchError, Fetcher};
use widgetboot::headless::HeadlessDocument;
use widgetboot::orchestrator::WidgetBootstrap;
use widgetboot::render::LogRenderer;
use widgetboot::widget::HostElement;

pub const RESOURCES: &str = "https://cdn.example.com/widget";

/// In-memory fetcher; unknown URLs answer 404
#[derive(Default)]
pub struct MemoryFetcher {
    bodies: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, body: &str) -> Self {
        self.bodies.insert(url.to_string(), body.to_string());
        self
    }

    /// Serve `url` with a short placeholder body
    pub fn serve(self, url: &str) -> Self {
        self.with(url, "/* asset */")
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for MemoryFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        self.bodies.get(url).cloned().ok_or_else(|| FetchError::Status {
            url: url.to_string(),
            status: 404,
        })
    }
}

/// Everything one pipeline run touches
pub struct Harness {
    pub fetcher: Arc<MemoryFetcher>,
    pub document: Arc<HeadlessDocument>,
    pub renderer: Arc<LogRenderer>,
    pub widget: WidgetBootstrap,
}

pub fn harness(fetcher: MemoryFetcher, host: Option<HostElement>) -> Harness {
    let fetcher = Arc::new(fetcher);
    let document = Arc::new(HeadlessDocument::new(fetcher.clone()));
    let renderer = Arc::new(LogRenderer::new());
    let widget = WidgetBootstrap::new(fetcher.clone(), document.clone(), renderer.clone(), host);
    Harness {
        fetcher,
        document,
        renderer,
        widget,
    }
}

pub fn host(conf: &str) -> HostElement {
    HostElement::new().with_attribute("data-conf", conf)
}

pub fn url(path: &str) -> String {
    format!("{}/{}", RESOURCES, path)
}

pub fn bootstrap_url(template: &str) -> String {
    url(&format!("template-bootstraps/{}-bootstrap.js", template))
}
