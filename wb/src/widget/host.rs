//! Host element - the element that carries the bootstrap

use serde_json::{Map, Value};
use tracing::debug;

/// Attribute holding the configuration URL
pub const CONFIG_ATTRIBUTE: &str = "data-conf";

/// Read-only view of the element hosting the bootstrap
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostElement {
    attributes: Vec<(String, String)>,
}

impl HostElement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(name, value)` pairs; later duplicates replace earlier ones
    pub fn from_attributes<I, K, V>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        attributes
            .into_iter()
            .fold(Self::new(), |host, (name, value)| host.with_attribute(name, value))
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(existing) => existing.1 = value,
            None => self.attributes.push((name, value)),
        }
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// The `data-conf` attribute, if set and non-empty
    pub fn config_url(&self) -> Option<&str> {
        debug!("HostElement::config_url: called");
        self.attribute(CONFIG_ATTRIBUTE).filter(|url| !url.is_empty())
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Attributes as a JSON object, in document order
    pub fn attributes_json(&self) -> Value {
        let map: Map<String, Value> = self
            .attributes
            .iter()
            .map(|(n, v)| (n.clone(), Value::String(v.clone())))
            .collect();
        Value::Object(map)
    }
}
