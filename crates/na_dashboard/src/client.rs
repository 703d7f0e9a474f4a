use std::time::Duration;

use na_core::{AnalysisResult, Article, HealthStatus, Query};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;
use url::Url;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid API url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid JSON from API: {error}")]
    InvalidJson {
        error: serde_json::Error,
        body: String,
    },
}

impl ClientError {
    /// Response body worth showing next to the error, if any.
    pub fn raw_body(&self) -> Option<&str> {
        match self {
            ClientError::InvalidJson { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// Blocking-style access to the analysis API: one call at a time, no retries.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    analyze_timeout: Duration,
    fetch_timeout: Duration,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Url::parse(base_url)?;
        Ok(Self {
            client: Client::builder().build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            analyze_timeout: Duration::from_secs(60),
            fetch_timeout: Duration::from_secs(20),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        let response = self
            .client
            .get(format!("{}/", self.base_url))
            .timeout(self.fetch_timeout)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn analyze(&self, text: &str) -> Result<AnalysisResult, ClientError> {
        debug!("POST {}/analyze ({} chars)", self.base_url, text.len());
        let response = self
            .client
            .post(format!("{}/analyze", self.base_url))
            .timeout(self.analyze_timeout)
            .json(&Query {
                text: text.to_string(),
            })
            .send()
            .await?;
        decode(response).await
    }

    pub async fn fetch_sample(&self) -> Result<Vec<Article>, ClientError> {
        debug!("GET {}/fetch_sample", self.base_url);
        let response = self
            .client
            .get(format!("{}/fetch_sample", self.base_url))
            .timeout(self.fetch_timeout)
            .send()
            .await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ClientError::Status {
            status: status.as_u16(),
            body,
        });
    }
    serde_json::from_str(&body).map_err(|error| ClientError::InvalidJson { error, body })
}
