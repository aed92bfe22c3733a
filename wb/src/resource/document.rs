//! Document boundary - the sink for script, stylesheet and mount nodes

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

/// Where an element gets attached
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Parent {
    Head,
    Body,
    /// First element matching a CSS selector (a template wrapper)
    Selector(String),
}

impl fmt::Display for Parent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Head => write!(f, "head"),
            Self::Body => write!(f, "body"),
            Self::Selector(selector) => write!(f, "{}", selector),
        }
    }
}

/// A detached element with ordered attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
        }
    }

    /// Set an attribute, replacing an existing one with the same name
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(existing) => existing.1 = value,
            None => self.attributes.push((name, value)),
        }
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// URL that must load before the element fires its load event
    ///
    /// Only `script` (via `src`) and `link` (via `href`) elements load
    /// anything; other elements are ready as soon as they are attached.
    pub fn load_url(&self) -> Option<&str> {
        match self.tag.as_str() {
            "script" => self.attr("src"),
            "link" => self.attr("href"),
            _ => None,
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.tag)?;
        for (name, value) in &self.attributes {
            write!(f, " {}=\"{}\"", name, value)?;
        }
        write!(f, ">")
    }
}

/// Failure reported by a document when an element cannot be attached or loaded
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("Error event while loading {url}: {reason}")]
    LoadFailed { url: String, reason: String },

    #[error("No element matches selector '{0}'")]
    SelectorNotFound(String),
}

/// A live document that accepts new nodes
///
/// `append` attaches exactly one node and resolves when the node's load
/// event fires (for elements that load something) or right away otherwise.
/// It resolves with an error when the node's error event fires.
#[async_trait]
pub trait Document: Send + Sync {
    async fn append(&self, parent: &Parent, element: Element) -> Result<(), DocumentError>;
}
