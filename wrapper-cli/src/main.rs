use std::{
    path::{Path, PathBuf},
    process::ExitCode,
    sync::{Arc, Mutex},
};

use clap::{Parser, Subcommand};
use config::Config;
use one_shot::QueryArgs;
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};
use tui::AppContext;
use url::Url;
use wrapper_core::{controller::RequestController, endpoint::HttpEndpoint};

mod config;
mod error;
mod fs_ext;
mod one_shot;
mod tui;

#[derive(Parser)]
#[command(version, about = "Send text to an LLM through a privacy wrapper")]
pub struct Cli {
    /// Config file; overrides $PRIVACY_WRAPPER_CONFIG_PATH and the XDG location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Base URL of the wrapper service
    #[arg(long, global = true)]
    endpoint: Option<Url>,
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand)]
enum Mode {
    /// Interactive client (default)
    Tui,
    /// Submit one piece of text and print the response
    Query(QueryArgs),
    /// Check the service's health URL
    Health,
    /// List the configured models
    Models,
}

fn setup_tracing(log_file: impl AsRef<Path>) -> anyhow::Result<()> {
    let file = fs_ext::open_append(log_file)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
        .with_writer(Mutex::new(file))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    tracing_log::LogTracer::init()?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Cli::parse();
    let config = Config::load(args.config.as_deref())?.with_base_url(args.endpoint);
    setup_tracing(config.log_file.path()?)?;
    tracing::info!(endpoint = %config.endpoint.base_url, "config loaded");

    match args.mode.unwrap_or(Mode::Tui) {
        Mode::Tui => {
            color_eyre::install().map_err(|error| anyhow::anyhow!("{error}"))?;
            let endpoint = HttpEndpoint::new(&config.endpoint)?;
            tracing::info!(url = %endpoint.query_url(), "starting TUI");
            let controller = RequestController::new(config.models, Arc::new(endpoint));
            let terminal = ratatui::init();
            let result = AppContext::new(controller, config.keymap).run(terminal).await;
            ratatui::restore();
            result?;
            Ok(ExitCode::SUCCESS)
        }
        Mode::Query(query) => Ok(one_shot::query(config, query).await?.into()),
        Mode::Health => Ok(one_shot::health(config).await?.into()),
        Mode::Models => {
            println!("{}", one_shot::models(&config.models));
            Ok(ExitCode::SUCCESS)
        }
    }
}
