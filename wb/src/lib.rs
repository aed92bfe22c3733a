//! widgetboot - Widget Bootstrap Orchestrator
//!
//! Boots an embeddable widget from the attributes of its host element: the
//! widget configuration is fetched from `data-conf`, "pre" resources are
//! loaded, every declared template's bootstrap module is fetched and run in
//! order, and finally the "post" resources are loaded.
//!
//! # Core Concepts
//!
//! - **Strictly sequential**: every load waits for the previous one to settle
//! - **Fail fast**: the first failure aborts the whole pipeline
//! - **Capability sandbox**: template bootstraps only see a [`PluginApi`]
//!
//! # Modules
//!
//! - [`runner`] - Sequential task runner
//! - [`resource`] - Document boundary, resource loader and stage loading
//! - [`widget`] - Widget configuration, host element, globals
//! - [`template`] - Template bootstrap modules and their plugin API
//! - [`orchestrator`] - The bootstrap pipeline state machine
//! - [`fetch`] - HTTP fetcher
//! - [`headless`] - In-memory document for running outside a browser
//! - [`config`] - Tool configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod headless;
pub mod orchestrator;
pub mod render;
pub mod resource;
pub mod runner;
pub mod template;
pub mod widget;

// Re-export commonly used types
pub use config::{Config, FetchConfig};
pub use error::{BootError, ResourceKind};
pub use fetch::{FetchError, Fetcher, HttpFetcher};
pub use headless::{AppendedNode, HeadlessDocument, NodeStatus};
pub use orchestrator::{BootOutcome, BootState, WidgetBootstrap};
pub use render::{LogRenderer, RenderCall, RenderError, Renderer};
pub use resource::{Document, DocumentError, Element, Parent, ResourceLoader, load_stage};
pub use runner::{Task, sequential, sequential_fn};
pub use template::{
    Capabilities, CompileError, CompiledBootstrap, PluginApi, Program, Settlement, TemplateBootstrap, TemplateLoader,
    compile,
};
pub use widget::{Configuration, Globals, HostElement, Stage, StageName, Template, load_configuration};
