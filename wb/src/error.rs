//! Bootstrap error types

use std::fmt;

use thiserror::Error;

use crate::widget::StageName;

/// Kind of resource a load failure refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Script,
    Stylesheet,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Script => write!(f, "script"),
            Self::Stylesheet => write!(f, "stylesheet"),
        }
    }
}

/// Errors that abort a bootstrap run
///
/// Intermediate components log the underlying cause and surface one of these
/// stage-scoped variants. Every variant is fatal to the current run.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BootError {
    #[error("Configuration not found")]
    ConfigurationMissing,

    #[error("Error while loading configuration")]
    ConfigurationLoad,

    #[error("Cannot load {kind} \"{url}\"")]
    ResourceLoad { kind: ResourceKind, url: String },

    #[error("Cannot load resources for stage '{stage}'")]
    StageLoad { stage: StageName },

    #[error("Unable to load template '{template}'")]
    TemplateLoad { template: String },

    #[error("Template '{template}' rejected: {message}")]
    TemplateRejected { template: String, message: String },
}

impl BootError {
    /// Name of the template this error belongs to, if any
    pub fn template(&self) -> Option<&str> {
        match self {
            Self::TemplateLoad { template } | Self::TemplateRejected { template, .. } => Some(template),
            _ => None,
        }
    }
}
