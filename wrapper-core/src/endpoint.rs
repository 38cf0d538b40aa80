use std::{fmt::Debug, sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSeconds};
use tracing::instrument;
use url::Url;

use crate::{
    error::{Error, Result},
    model::ModelId,
};

pub use reqwest::StatusCode;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_QUERY_PATH: &str = "/api/query";
pub const DEFAULT_HEALTH_PATH: &str = "/api/health";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Body of a query; serialized as `{"text": ..., "model": ...}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QueryRequest {
    pub text: Arc<str>,
    pub model: ModelId,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct QueryResponse {
    pub response: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// The remote service that turns text into a model answer.
#[async_trait]
pub trait QueryEndpoint: Debug + Send + Sync {
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse>;
}

#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub base_url: Url,
    /// Joined onto `base_url` with [`Url::join`].
    /// A leading `/` replaces any path on `base_url`; a relative path such as
    /// `api/query` keeps it, as long as `base_url` ends with `/`.
    pub query_path: String,
    /// Joined the same way as `query_path`.
    pub health_path: String,
    #[serde(rename = "timeout_secs")]
    #[serde_as(as = "DurationSeconds<u64>")]
    pub timeout: Duration,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        EndpointConfig {
            base_url: DEFAULT_BASE_URL
                .parse()
                .expect("should be able to parse default URL"),
            query_path: DEFAULT_QUERY_PATH.into(),
            health_path: DEFAULT_HEALTH_PATH.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl EndpointConfig {
    pub fn query_url(&self) -> Result<Url> {
        self.join(&self.query_path)
    }

    pub fn health_url(&self) -> Result<Url> {
        self.join(&self.health_path)
    }

    fn join(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|source| Error::EndpointUrl {
                base: self.base_url.clone(),
                path: path.to_string(),
                source,
            })
    }
}

/// [`QueryEndpoint`] over HTTP with a per-request timeout.
#[derive(Clone, Debug)]
pub struct HttpEndpoint {
    client: reqwest::Client,
    query_url: Url,
    health_url: Url,
    timeout: Duration,
}

impl HttpEndpoint {
    pub fn new(config: &EndpointConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(Error::HttpClient)?;

        Ok(HttpEndpoint {
            client,
            query_url: config.query_url()?,
            health_url: config.health_url()?,
            timeout: config.timeout,
        })
    }

    pub fn query_url(&self) -> &Url {
        &self.query_url
    }

    #[instrument(skip(self), fields(url = %self.health_url))]
    pub async fn health(&self) -> Result<HealthResponse> {
        let response = self
            .client
            .get(self.health_url.clone())
            .send()
            .await
            .map_err(|error| self.classify(error))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Endpoint { status });
        }

        response.json().await.map_err(|error| self.classify(error))
    }

    fn classify(&self, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::Timeout(self.timeout)
        } else if error.is_decode() {
            Error::MalformedBody(error)
        } else {
            Error::Transport(error)
        }
    }
}

#[async_trait]
impl QueryEndpoint for HttpEndpoint {
    #[instrument(skip_all, fields(url = %self.query_url, model = %request.model))]
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse> {
        let response = self
            .client
            .post(self.query_url.clone())
            .json(request)
            .send()
            .await
            .map_err(|error| self.classify(error))?;

        let status = response.status();
        tracing::debug!(%status, "query endpoint answered");
        if !status.is_success() {
            return Err(Error::Endpoint { status });
        }

        response.json().await.map_err(|error| self.classify(error))
    }
}
