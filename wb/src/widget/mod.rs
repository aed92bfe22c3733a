//! Widget data model and configuration loading

mod configuration;
mod globals;
mod host;
mod loader;

pub use configuration::{Configuration, Stage, StageName, StylesheetSpec, Template, TemplateSettings};
pub use globals::Globals;
pub use host::{CONFIG_ATTRIBUTE, HostElement};
pub use loader::load_configuration;
