//! Outbound services: the flight-data provider and the language model.
//!
//! Both sit behind traits so the pipeline can be exercised with fakes.
//! Every failure surfaces as an [`UpstreamError`], which the pipeline
//! always recovers from.

pub mod aviationstack;
pub mod openai;

pub use aviationstack::AviationStackClient;
pub use openai::OpenAiClient;

use async_trait::async_trait;
use farescope_core::{FlightsResponse, RouteQuery};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{0}: no credential configured")]
    MissingCredential(&'static str),

    #[error("{service}: no answer within {}s", .after.as_secs())]
    Timeout {
        service: &'static str,
        after: Duration,
    },

    #[error("{service}: HTTP {status}")]
    Status {
        service: &'static str,
        status: reqwest::StatusCode,
    },

    #[error("{service}: request failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service}: unusable payload: {reason}")]
    Malformed {
        service: &'static str,
        reason: String,
    },
}

impl UpstreamError {
    /// Classify a reqwest failure, keeping client-side timeouts distinct.
    pub(crate) fn from_reqwest(service: &'static str, after: Duration, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout { service, after }
        } else if err.is_decode() {
            UpstreamError::Malformed {
                service,
                reason: err.to_string(),
            }
        } else {
            UpstreamError::Transport { service, source: err }
        }
    }
}

/// Live flight schedules for a route.
#[async_trait]
pub trait FlightSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch(&self, query: &RouteQuery) -> Result<FlightsResponse, UpstreamError>;
}

/// Chat-completion style text model.
#[async_trait]
pub trait InsightModel: Send + Sync {
    fn name(&self) -> &'static str;

    /// Raw text of the first completion choice.
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, UpstreamError>;
}

pub(crate) fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("farescope/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Serve `router` on an ephemeral local port and return its base URL.
#[cfg(test)]
pub(crate) async fn serve_local(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    format!("http://{}", addr)
}
