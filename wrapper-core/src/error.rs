use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("query endpoint returned status {status}")]
    Endpoint { status: StatusCode },

    #[error("query endpoint did not answer within {0:?}")]
    Timeout(Duration),

    #[error("unable to reach query endpoint: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("unable to parse query endpoint response: {0}")]
    MalformedBody(#[source] reqwest::Error),

    #[error("model is not in the configured catalog: {0}")]
    UnknownModel(String),

    #[error("model catalog has no entries")]
    EmptyCatalog,

    #[error("model appears more than once in the catalog: {0}")]
    DuplicateModel(String),

    #[error("unable to join {path} onto {base}: {source}")]
    EndpointUrl {
        base: Url,
        path: String,
        source: url::ParseError,
    },

    #[error("unable to build http client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("query worker is no longer running")]
    WorkerClosed,
}

/// Coarse classification of a failed submission, used for diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum FailureKind {
    EndpointError,
    TransportFault,
    Timeout,
    Internal,
}

impl Error {
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Error::Endpoint { .. } => FailureKind::EndpointError,
            Error::Transport(_) | Error::MalformedBody(_) => FailureKind::TransportFault,
            Error::Timeout(_) => FailureKind::Timeout,
            Error::UnknownModel(_)
            | Error::EmptyCatalog
            | Error::DuplicateModel(_)
            | Error::EndpointUrl { .. }
            | Error::HttpClient(_)
            | Error::WorkerClosed => FailureKind::Internal,
        }
    }

    /// The message shown to the user when a submission fails.
    /// Stable across runs and free of transport details.
    pub fn user_message(&self) -> &'static str {
        match self {
            Error::Endpoint { .. } => "Failed to get response",
            Error::Timeout(_) => "The request timed out",
            Error::Transport(_) => "Unable to reach the query service",
            Error::MalformedBody(_) => "Received an unreadable response",
            _ => "Something went wrong",
        }
    }
}
