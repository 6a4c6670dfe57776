use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use swimfit_core::analytics::{AnalyticsError, AnalyticsRecord, AnalyticsSink};
use swimfit_core::config::AnalyticsConfig;
use thiserror::Error;

const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum RestSinkError {
    #[error("analytics.rest_url is required for the rest backend")]
    MissingUrl,
    #[error("analytics.api_key is required for the rest backend")]
    MissingApiKey,
    #[error("could not build analytics http client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Writes analytics rows to a PostgREST-style endpoint (`{rest_url}/rest/v1/{table}`).
#[derive(Clone)]
pub struct RestAnalyticsSink {
    client: Client,
    endpoint: String,
    api_key: SecretString,
}

impl RestAnalyticsSink {
    pub fn from_config(config: &AnalyticsConfig) -> Result<Self, RestSinkError> {
        let rest_url = config.rest_url.as_deref().ok_or(RestSinkError::MissingUrl)?;
        let api_key = config.api_key.clone().ok_or(RestSinkError::MissingApiKey)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(RestSinkError::Client)?;

        Ok(Self { client, endpoint: table_endpoint(rest_url, &config.table), api_key })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Cheap read against the table; succeeds when the store answers with 2xx.
    pub async fn probe(&self) -> Result<(), AnalyticsError> {
        let response = self
            .authorized(self.client.get(&self.endpoint))
            .query(&[("select", "id"), ("limit", "1")])
            .send()
            .await
            .map_err(|error| AnalyticsError::Unavailable(error.to_string()))?;

        ensure_success(response).await
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let key = self.api_key.expose_secret();
        builder.header("apikey", key).header(header::AUTHORIZATION, format!("Bearer {key}"))
    }
}

fn table_endpoint(rest_url: &str, table: &str) -> String {
    format!("{}/rest/v1/{}", rest_url.trim().trim_end_matches('/'), table.trim())
}

async fn ensure_success(response: reqwest::Response) -> Result<(), AnalyticsError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let body = response.text().await.unwrap_or_default();
    Err(AnalyticsError::Rejected {
        status: status.as_u16(),
        message: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
    })
}

#[async_trait]
impl AnalyticsSink for RestAnalyticsSink {
    fn backend(&self) -> &'static str {
        "rest"
    }

    async fn record(&self, record: &AnalyticsRecord) -> Result<(), AnalyticsError> {
        let response = self
            .authorized(self.client.post(&self.endpoint))
            .header("Prefer", "return=minimal")
            .json(record)
            .send()
            .await
            .map_err(|error| {
                if error.is_builder() {
                    AnalyticsError::Encode(error.to_string())
                } else {
                    AnalyticsError::Unavailable(error.to_string())
                }
            })?;

        if response.status() == StatusCode::CONFLICT {
            // duplicate id; the row is already stored
            return Ok(());
        }
        ensure_success(response).await
    }
}
