//! Declared-resource stage loading ("pre" / "post")

use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{debug, error, info};

use crate::error::BootError;
use crate::runner::sequential_fn;
use crate::widget::{Configuration, StageName};

use super::loader::ResourceLoader;

static ABSOLUTE_URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(https?:)?//").expect("valid regex"));

/// Whether a script path is used verbatim instead of resolved against `resources`
pub fn is_absolute_url(path: &str) -> bool {
    ABSOLUTE_URL.is_match(path)
}

/// Resolve a declared script path
pub fn script_url(configuration: &Configuration, path: &str) -> String {
    if is_absolute_url(path) {
        path.to_string()
    } else {
        configuration.resource_url(path)
    }
}

/// Load every stylesheet, then every script declared for `stage`
///
/// Each list is loaded strictly in declared order through the sequential
/// runner. Stylesheets complete before the first script starts. A missing
/// configuration or an absent/empty stage succeeds without touching the
/// document. Any load failure is logged and reported as a stage failure.
pub async fn load_stage(
    loader: &ResourceLoader,
    configuration: Option<&Arc<Configuration>>,
    stage: StageName,
) -> Result<(), BootError> {
    debug!(%stage, "load_stage: called");
    let Some(configuration) = configuration else {
        debug!(%stage, "load_stage: no configuration, nothing to load");
        return Ok(());
    };
    let Some(declared) = configuration.stage(stage).filter(|s| !s.is_empty()) else {
        debug!(%stage, "load_stage: stage absent or empty");
        return Ok(());
    };

    let stylesheets = declared.css.clone();
    let scripts: Vec<String> = declared.js.iter().map(|path| script_url(configuration, path)).collect();
    info!(%stage, stylesheets = stylesheets.len(), scripts = scripts.len(), "Loading stage resources");

    let css_loader = loader.clone();
    let result = async {
        sequential_fn(stylesheets, move |sheet| {
            let loader = css_loader.clone();
            async move { loader.load_stylesheet(sheet.href(), Some(sheet.media())).await }
        })
        .await?;

        let js_loader = loader.clone();
        sequential_fn(scripts, move |url| {
            let loader = js_loader.clone();
            async move { loader.load_script(url).await }
        })
        .await
    }
    .await;

    match result {
        Ok(_) => {
            debug!(%stage, "load_stage: stage loaded");
            Ok(())
        }
        Err(e) => {
            error!(%stage, error = %e, "Cannot load resources");
            Err(BootError::StageLoad { stage })
        }
    }
}
