//! Widget configuration document

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::resource::DEFAULT_MEDIA;

/// Parsed widget configuration
///
/// Loaded once per run and shared read-only by every loader and template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Base URL for relative resources and template bootstraps
    pub resources: String,

    /// Templates to load, in order
    #[serde(default)]
    pub templates: Vec<Template>,

    /// Resources loaded before any template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre: Option<Stage>,

    /// Resources loaded after every template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Stage>,

    /// Fields the loader does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Configuration {
    /// Parse a configuration from its JSON text
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn stage(&self, name: StageName) -> Option<&Stage> {
        match name {
            StageName::Pre => self.pre.as_ref(),
            StageName::Post => self.post.as_ref(),
        }
    }

    /// Resolve a path against `resources`
    pub fn resource_url(&self, path: &str) -> String {
        format!("{}/{}", self.resources, path)
    }

    /// Location of a template's bootstrap module
    pub fn bootstrap_url(&self, template: &Template) -> String {
        format!("{}/template-bootstraps/{}-bootstrap.js", self.resources, template.name)
    }
}

/// A template reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub name: String,
    pub settings: TemplateSettings,
}

/// Template settings, with arbitrary template-specific fields kept in `extra`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateSettings {
    /// Mount-point selector
    #[serde(default)]
    pub wrapper: String,

    #[serde(default)]
    pub components: Vec<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Declared resources of one stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    #[serde(default)]
    pub css: Vec<StylesheetSpec>,

    #[serde(default)]
    pub js: Vec<String>,
}

impl Stage {
    pub fn is_empty(&self) -> bool {
        self.css.is_empty() && self.js.is_empty()
    }
}

/// A stylesheet entry: bare URL or `{ href, media }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StylesheetSpec {
    Url(String),
    Link {
        href: String,
        #[serde(default = "default_media")]
        media: String,
    },
}

fn default_media() -> String {
    DEFAULT_MEDIA.to_string()
}

impl StylesheetSpec {
    pub fn href(&self) -> &str {
        match self {
            Self::Url(url) => url,
            Self::Link { href, .. } => href,
        }
    }

    pub fn media(&self) -> &str {
        match self {
            Self::Url(_) => DEFAULT_MEDIA,
            Self::Link { media, .. } => media,
        }
    }
}

/// Named resource stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageName {
    Pre,
    Post,
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pre => write!(f, "pre"),
            Self::Post => write!(f, "post"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"{
        "resources": "https://cdn.example.com/widget",
        "templates": [
            { "name": "attributes-reader", "settings": { "wrapper": "#widget" } },
            { "name": "vue", "settings": { "wrapper": "#widget", "components": ["Header", "Footer"], "theme": "dark" } }
        ],
        "pre": { "css": ["a.css", { "href": "b.css", "media": "print" }], "js": ["lib.js"] },
        "analytics": true
    }"##;

    #[test]
    fn test_parse_full_configuration() {
        let conf = Configuration::from_json(SAMPLE).unwrap();

        assert_eq!(conf.resources, "https://cdn.example.com/widget");
        assert_eq!(conf.templates.len(), 2);
        assert_eq!(conf.templates[1].settings.components, vec!["Header", "Footer"]);
        assert_eq!(conf.templates[1].settings.extra["theme"], "dark");
        assert!(conf.templates[0].settings.components.is_empty());
        assert!(conf.post.is_none());
        assert_eq!(conf.extra["analytics"], true);
    }

    #[test]
    fn test_stylesheet_specs() {
        let conf = Configuration::from_json(SAMPLE).unwrap();
        let pre = conf.stage(StageName::Pre).unwrap();

        assert_eq!(pre.css[0], StylesheetSpec::Url("a.css".to_string()));
        assert_eq!(pre.css[0].media(), "all");
        assert_eq!(pre.css[1].href(), "b.css");
        assert_eq!(pre.css[1].media(), "print");
    }

    #[test]
    fn test_link_without_media_defaults_to_all() {
        let spec: StylesheetSpec = serde_json::from_str(r#"{ "href": "c.css" }"#).unwrap();
        assert_eq!(spec.media(), "all");
    }

    #[test]
    fn test_invalid_stylesheet_entry_rejected() {
        let result = Configuration::from_json(r#"{ "resources": "r", "pre": { "css": [42] } }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_bootstrap_url() {
        let conf = Configuration::from_json(SAMPLE).unwrap();
        assert_eq!(
            conf.bootstrap_url(&conf.templates[1]),
            "https://cdn.example.com/widget/template-bootstraps/vue-bootstrap.js"
        );
    }

    #[test]
    fn test_empty_stage() {
        assert!(Stage::default().is_empty());
        let stage = Stage {
            css: vec![],
            js: vec!["a.js".to_string()],
        };
        assert!(!stage.is_empty());
    }
}
