//! HeadlessDocument - an in-memory document for running widgets outside a browser
//!
//! Nodes are recorded in append order. A `script` or `link` node "loads" by
//! fetching its URL; a failed fetch fires the node's error event.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::fetch::Fetcher;
use crate::resource::{Document, DocumentError, Element, Parent};

/// Load state of an appended node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeStatus {
    /// Nothing to load
    Attached,
    /// Load event fired
    Loaded { bytes: usize },
    /// Error event fired
    Failed(String),
}

/// A node appended to the headless document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendedNode {
    pub parent: Parent,
    pub element: Element,
    pub status: NodeStatus,
}

impl fmt::Display for AppendedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} > {}", self.parent, self.element)?;
        match &self.status {
            NodeStatus::Attached => Ok(()),
            NodeStatus::Loaded { bytes } => write!(f, " (loaded, {} bytes)", bytes),
            NodeStatus::Failed(reason) => write!(f, " (error: {})", reason),
        }
    }
}

pub struct HeadlessDocument {
    fetcher: Arc<dyn Fetcher>,
    nodes: Mutex<Vec<AppendedNode>>,
}

impl HeadlessDocument {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        debug!("HeadlessDocument::new: called");
        Self {
            fetcher,
            nodes: Mutex::new(Vec::new()),
        }
    }

    /// Every appended node, in append order
    pub async fn nodes(&self) -> Vec<AppendedNode> {
        self.nodes.lock().await.clone()
    }

    /// URLs of nodes that loaded something (or tried to), in append order
    pub async fn load_urls(&self) -> Vec<String> {
        self.nodes
            .lock()
            .await
            .iter()
            .filter_map(|node| node.element.load_url().map(str::to_string))
            .collect()
    }

    async fn set_status(&self, index: usize, status: NodeStatus) {
        if let Some(node) = self.nodes.lock().await.get_mut(index) {
            node.status = status;
        }
    }
}

#[async_trait]
impl Document for HeadlessDocument {
    async fn append(&self, parent: &Parent, element: Element) -> Result<(), DocumentError> {
        debug!(%parent, %element, "HeadlessDocument::append: called");
        let url = element.load_url().map(str::to_string);

        let index = {
            let mut nodes = self.nodes.lock().await;
            nodes.push(AppendedNode {
                parent: parent.clone(),
                element,
                status: NodeStatus::Attached,
            });
            nodes.len() - 1
        };

        let Some(url) = url else {
            return Ok(());
        };

        match self.fetcher.fetch_text(&url).await {
            Ok(body) => {
                debug!(%url, bytes = body.len(), "HeadlessDocument::append: load event");
                self.set_status(index, NodeStatus::Loaded { bytes: body.len() }).await;
                Ok(())
            }
            Err(e) => {
                warn!(%url, error = %e, "Error event on appended node");
                let reason = e.to_string();
                self.set_status(index, NodeStatus::Failed(reason.clone())).await;
                Err(DocumentError::LoadFailed { url, reason })
            }
        }
    }
}

impl fmt::Debug for HeadlessDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessDocument").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::mock::MockFetcher;

    fn document(fetcher: MockFetcher) -> HeadlessDocument {
        HeadlessDocument::new(Arc::new(fetcher))
    }

    #[tokio::test]
    async fn test_script_loads_through_fetcher() {
        let doc = document(MockFetcher::new().with("https://r/a.js", "var a;"));
        let script = Element::new("script").with_attr("src", "https://r/a.js");

        doc.append(&Parent::Body, script).await.unwrap();

        let nodes = doc.nodes().await;
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].status, NodeStatus::Loaded { bytes: 6 });
    }

    #[tokio::test]
    async fn test_fetch_failure_is_error_event() {
        let doc = document(MockFetcher::new());
        let link = Element::new("link").with_attr("href", "missing.css");

        let err = doc.append(&Parent::Head, link).await.unwrap_err();

        assert!(matches!(err, DocumentError::LoadFailed { ref url, .. } if url == "missing.css"));
        let nodes = doc.nodes().await;
        assert!(matches!(nodes[0].status, NodeStatus::Failed(_)));
    }

    #[tokio::test]
    async fn test_plain_element_attaches_without_fetch() {
        let fetcher = Arc::new(MockFetcher::new());
        let doc = HeadlessDocument::new(fetcher.clone());

        doc.append(&Parent::Selector("#w".to_string()), Element::new("app"))
            .await
            .unwrap();

        assert!(fetcher.requests().is_empty());
        assert_eq!(doc.nodes().await[0].status, NodeStatus::Attached);
        assert!(doc.load_urls().await.is_empty());
    }

    #[test]
    fn test_node_display() {
        let node = AppendedNode {
            parent: Parent::Head,
            element: Element::new("link").with_attr("href", "a.css"),
            status: NodeStatus::Failed("HTTP 404 for a.css".to_string()),
        };
        assert_eq!(node.to_string(), "head > <link href=\"a.css\"> (error: HTTP 404 for a.css)");
    }
}
