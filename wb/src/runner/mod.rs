//! Sequential task runner
//!
//! Runs a list of deferred asynchronous operations one at a time, in list
//! order, stopping at the first failure. Every loader in the crate (stage
//! resources, template bootstraps, bootstrap instructions) serializes its
//! side effects through this runner.

mod sequential;

pub use sequential::{BoxFuture, Task, sequential, sequential_fn};
