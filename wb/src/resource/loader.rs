//! ResourceLoader - injects scripts and stylesheets into the document

use std::sync::Arc;

use tracing::{debug, error};

use crate::error::{BootError, ResourceKind};

use super::document::{Document, Element, Parent};

/// Media attribute used when a stylesheet does not declare one
pub const DEFAULT_MEDIA: &str = "all";

/// Loads single scripts and stylesheets
///
/// Every call appends exactly one node to the document; the same path loaded
/// twice is appended twice. Ordering between calls is up to the caller.
#[derive(Clone)]
pub struct ResourceLoader {
    document: Arc<dyn Document>,
}

impl ResourceLoader {
    pub fn new(document: Arc<dyn Document>) -> Self {
        debug!("ResourceLoader::new: called");
        Self { document }
    }

    /// Append a `<script>` to the body and wait for its load event
    pub async fn load_script(&self, path: impl Into<String>) -> Result<(), BootError> {
        let path = path.into();
        debug!(%path, "ResourceLoader::load_script: called");
        let element = Element::new("script")
            .with_attr("crossorigin", "anonymous")
            .with_attr("src", path.clone());

        self.document.append(&Parent::Body, element).await.map_err(|e| {
            error!(%path, error = %e, "ResourceLoader::load_script: load failed");
            BootError::ResourceLoad {
                kind: ResourceKind::Script,
                url: path.clone(),
            }
        })
    }

    /// Append a stylesheet `<link>` to the head and wait for its load event
    pub async fn load_stylesheet(&self, path: impl Into<String>, media: Option<&str>) -> Result<(), BootError> {
        let path = path.into();
        let media = media.unwrap_or(DEFAULT_MEDIA);
        debug!(%path, %media, "ResourceLoader::load_stylesheet: called");
        let element = Element::new("link")
            .with_attr("crossorigin", "anonymous")
            .with_attr("rel", "stylesheet")
            .with_attr("href", path.clone())
            .with_attr("media", media);

        self.document.append(&Parent::Head, element).await.map_err(|e| {
            error!(%path, error = %e, "ResourceLoader::load_stylesheet: load failed");
            BootError::ResourceLoad {
                kind: ResourceKind::Stylesheet,
                url: path.clone(),
            }
        })
    }
}

impl std::fmt::Debug for ResourceLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceLoader").finish_non_exhaustive()
    }
}
