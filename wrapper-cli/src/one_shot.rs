use std::{process::ExitCode, sync::Arc};

use itertools::Itertools as _;
use tokio::io::AsyncReadExt as _;
use wrapper_core::{
    controller::{RequestController, Submission},
    endpoint::HttpEndpoint,
    model::ModelCatalog,
    state::SubmissionState,
};

use crate::config::Config;

/// How a one-shot command ended; failures exit non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Failure,
}

impl From<Status> for ExitCode {
    fn from(status: Status) -> Self {
        match status {
            Status::Success => ExitCode::SUCCESS,
            Status::Failure => ExitCode::FAILURE,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct QueryArgs {
    /// Model id from the catalog; the first entry when omitted
    #[arg(long, short)]
    model: Option<String>,
    /// Text to submit; read from stdin when omitted
    text: Option<String>,
}

pub async fn query(config: Config, args: QueryArgs) -> anyhow::Result<Status> {
    let text = match args.text {
        Some(text) => text,
        None => {
            let mut text = String::new();
            tokio::io::stdin().read_to_string(&mut text).await?;
            text
        }
    };

    let endpoint = HttpEndpoint::new(&config.endpoint)?;
    let mut controller = RequestController::new(config.models, Arc::new(endpoint));
    if let Some(model) = args.model {
        controller.select_model(&model)?;
    }
    controller.set_text(text);

    if let Submission::Ignored(guard) = controller.submit() {
        eprintln!("nothing to submit ({guard})");
        return Ok(Status::Failure);
    }

    match controller.settle().await {
        SubmissionState::Succeeded(response) => {
            println!("{response}");
            Ok(Status::Success)
        }
        SubmissionState::Failed(message) => {
            eprintln!("{message}");
            Ok(Status::Failure)
        }
        state => anyhow::bail!("submission did not settle: {}", state.name()),
    }
}

pub async fn health(config: Config) -> anyhow::Result<Status> {
    let endpoint = HttpEndpoint::new(&config.endpoint)?;
    match endpoint.health().await {
        Ok(health) => {
            println!("{}", health.status);
            Ok(Status::Success)
        }
        Err(error) => {
            tracing::error!(%error, kind = %error.failure_kind(), "health check failed");
            eprintln!("{}", error.user_message());
            Ok(Status::Failure)
        }
    }
}

pub fn models(catalog: &ModelCatalog) -> String {
    catalog
        .options()
        .iter()
        .map(|option| format!("{}\t{}", option.id, option.label()))
        .join("\n")
}
