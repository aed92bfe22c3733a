//! widgetboot - Widget Bootstrap Orchestrator
//!
//! CLI entry point for running a widget bootstrap headlessly.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tracing::{debug, info};

use widgetboot::cli::{Cli, Command};
use widgetboot::config::Config;
use widgetboot::fetch::{Fetcher, HttpFetcher};
use widgetboot::headless::{HeadlessDocument, NodeStatus};
use widgetboot::orchestrator::WidgetBootstrap;
use widgetboot::render::LogRenderer;
use widgetboot::resource::Parent;
use widgetboot::template::compile;
use widgetboot::widget::{CONFIG_ATTRIBUTE, HostElement};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>, log_file: Option<&Path>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

    match log_file {
        Some(path) => {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir).context("Failed to create log directory")?;
            }
            let file = fs::File::create(path).context("Failed to create log file")?;
            tracing_subscriber::fmt()
                .with_writer(file)
                .with_ansi(false)
                .with_env_filter(filter)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(filter)
                .init();
        }
    }

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());

    // Setup logging with priority: CLI > config > INFO default
    setup_logging(
        cli.log_level.as_deref(),
        config_log_level.as_deref(),
        cli.log_file.as_deref(),
    )
    .context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Run {
            conf,
            attributes,
            base_url,
            no_host,
        } => {
            debug!(?conf, ?base_url, no_host, "main: matched Run command");
            let host = (!no_host).then(|| build_host(conf.as_deref(), &attributes));
            cmd_run(config, host, base_url).await
        }
        Command::CheckBootstrap { file } => {
            debug!(file = %file.display(), "main: matched CheckBootstrap command");
            cmd_check_bootstrap(&file)
        }
    }
}

fn build_host(conf: Option<&str>, attributes: &[(String, String)]) -> HostElement {
    let host = HostElement::from_attributes(attributes.iter().cloned());
    match conf {
        Some(url) => host.with_attribute(CONFIG_ATTRIBUTE, url),
        None => host,
    }
}

/// Run the bootstrap pipeline against a headless document
async fn cmd_run(mut config: Config, host: Option<HostElement>, base_url: Option<String>) -> Result<()> {
    debug!(?host, "cmd_run: called");
    if base_url.is_some() {
        config.fetch.base_url = base_url;
        config.validate().context("Invalid --base-url")?;
    }

    let fetcher: Arc<dyn Fetcher> =
        Arc::new(HttpFetcher::from_config(&config.fetch).context("Failed to create HTTP fetcher")?);
    let document = Arc::new(HeadlessDocument::new(fetcher.clone()));
    let renderer = Arc::new(LogRenderer::new());
    let widget = WidgetBootstrap::new(fetcher, document.clone(), renderer.clone(), host);

    let result = widget.run_when_ready(std::future::ready(())).await;

    print_document(&document).await;
    for call in renderer.calls() {
        println!("{} {}", "render".magenta().bold(), call.mount);
    }

    match result {
        Ok(configuration) => {
            let templates = configuration.as_ref().map(|c| c.templates.len()).unwrap_or(0);
            println!(
                "{} {} ({} template(s))",
                "state:".bold(),
                widget.state().to_string().green(),
                templates
            );
            Ok(())
        }
        Err(e) => {
            println!("{} {}", "state:".bold(), widget.state().to_string().red());
            Err(e).context("Widget bootstrap failed")
        }
    }
}

async fn print_document(document: &HeadlessDocument) {
    let nodes = document.nodes().await;
    let mut sections: Vec<&Parent> = Vec::new();
    for node in &nodes {
        if !sections.contains(&&node.parent) {
            sections.push(&node.parent);
        }
    }

    for parent in sections {
        println!("{}", parent.to_string().cyan().bold());
        for node in nodes.iter().filter(|n| &n.parent == parent) {
            let status = match &node.status {
                NodeStatus::Attached => String::new(),
                NodeStatus::Loaded { bytes } => format!(" {}", format!("loaded {} bytes", bytes).green()),
                NodeStatus::Failed(reason) => format!(" {}", reason.red()),
            };
            println!("  {}{}", node.element, status);
        }
    }
}

/// Compile a bootstrap module and print its instruction listing
fn cmd_check_bootstrap(file: &Path) -> Result<()> {
    debug!(file = %file.display(), "cmd_check_bootstrap: called");
    let source = fs::read_to_string(file).context(format!("Failed to read {}", file.display()))?;
    let program = compile(&source).context(format!("Failed to compile {}", file.display()))?;

    print!("{}", program);
    let verdict = if program.settles() {
        "settles".green()
    } else {
        "never settles".yellow()
    };
    println!("{} step(s), {}", program.len(), verdict);
    Ok(())
}
