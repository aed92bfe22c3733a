//! Resource loading
//!
//! Scripts and stylesheets are injected into a [`Document`] one node at a
//! time by the [`ResourceLoader`]; [`load_stage`] loads the resources a
//! configuration declares for its "pre" and "post" stages.

mod document;
mod loader;
mod stage;

pub use document::{Document, DocumentError, Element, Parent};
pub use loader::{DEFAULT_MEDIA, ResourceLoader};
pub use stage::{is_absolute_url, load_stage, script_url};

#[cfg(test)]
pub use document::mock;
