//! Template bootstrap system
//!
//! Each template's bootstrap module is fetched as text, compiled into a
//! [`CompiledBootstrap`] and invoked once with a [`PluginApi`] - the only
//! interface a bootstrap has to the rest of the widget.

mod api;
mod bootstrap;
mod compiler;
mod loader;

pub use api::{Capabilities, PluginApi, Settlement};
pub use bootstrap::{BootstrapError, CompiledBootstrap, TemplateBootstrap};
pub use compiler::{CompileError, DEFAULT_ATTRIBUTES_KEY, Instruction, Program, Scope, Text, compile};
pub use loader::TemplateLoader;
