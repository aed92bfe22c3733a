//! Globals - mutable context shared by the templates of one run

use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::debug;

/// Shared key/value context
///
/// Created once per bootstrap run, before the first template loads. Cloning
/// the handle shares the same map. Templates run one after another, so values
/// written by an earlier template are visible to every later one.
#[derive(Clone, Default)]
pub struct Globals {
    values: Arc<Mutex<Map<String, Value>>>,
}

impl Globals {
    pub fn new() -> Self {
        debug!("Globals::new: called");
        Self::default()
    }

    pub async fn insert(&self, key: impl Into<String>, value: Value) -> Option<Value> {
        let key = key.into();
        debug!(%key, "Globals::insert: called");
        self.values.lock().await.insert(key, value)
    }

    pub async fn get(&self, key: &str) -> Option<Value> {
        debug!(%key, "Globals::get: called");
        self.values.lock().await.get(key).cloned()
    }

    /// Copy of the whole map as a JSON object
    pub async fn snapshot(&self) -> Value {
        Value::Object(self.values.lock().await.clone())
    }

    pub async fn len(&self) -> usize {
        self.values.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.values.lock().await.is_empty()
    }
}

impl std::fmt::Debug for Globals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Globals").finish_non_exhaustive()
    }
}
