use crate::error::ApiError;
use async_trait::async_trait;
use configuration::ClientSettings;
use core_types::{AboutInfo, NewRun, NewWeighIn, Run, WeighIn};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::Duration;

pub mod error;

/// The abstract interface the CLI talks to, allowing the underlying
/// implementation (HTTP or a test double) to be swapped out.
///
/// Every call is exactly one request; nothing here retries. A create that
/// fails mid-flight may or may not have been stored, so callers should
/// re-query rather than resend.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Fetches the API's summary. `None` means the API was unreachable (or
    /// answered with something unusable); it is never an error.
    async fn get_about_info(&self) -> Option<AboutInfo>;

    async fn log_weigh_in(&self, weigh_in: &NewWeighIn) -> Result<WeighIn, ApiError>;

    async fn log_run(&self, run: &NewRun) -> Result<Run, ApiError>;

    /// Up to `count` weigh-ins, newest first.
    async fn recent_weigh_ins(&self, count: u32) -> Result<Vec<WeighIn>, ApiError>;

    /// Up to `count` runs, newest first.
    async fn recent_runs(&self, count: u32) -> Result<Vec<Run>, ApiError>;
}

/// The error body the API sends with 4xx/5xx responses.
#[derive(Debug, Clone, Deserialize)]
struct ApiErrorResponse {
    error: String,
}

/// A concrete implementation of the `ApiClient` over HTTP.
#[derive(Debug, Clone)]
pub struct HealthTrackerClient {
    client: reqwest::Client,
    base_url: String,
}

impl HealthTrackerClient {
    pub fn new(settings: &ClientSettings) -> Result<Self, ApiError> {
        Self::with_base_url(&settings.base_url, settings.timeout())
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ApiError::Configuration(format!(
                "base URL must start with http:// or https://, got '{base_url}'"
            )));
        }

        // Each call is a single round trip, so redirects are reported, not followed.
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| ApiError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Same request as [`ApiClient::get_about_info`], but keeps the reason for a failure.
    pub async fn fetch_about(&self) -> Result<AboutInfo, ApiError> {
        self.get_json("/about").await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url).send().await?;
        Self::decode(response).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.post(&url).json(body).send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            serde_json::from_str::<T>(&text).map_err(|e| ApiError::Deserialization(e.to_string()))
        } else {
            let message = serde_json::from_str::<ApiErrorResponse>(&text)
                .map(|body| body.error)
                .unwrap_or(text);
            Err(ApiError::Rejected {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl ApiClient for HealthTrackerClient {
    async fn get_about_info(&self) -> Option<AboutInfo> {
        match self.fetch_about().await {
            Ok(info) => Some(info),
            Err(e) => {
                tracing::warn!(error = %e, base_url = %self.base_url, "About request failed");
                None
            }
        }
    }

    async fn log_weigh_in(&self, weigh_in: &NewWeighIn) -> Result<WeighIn, ApiError> {
        self.post_json("/weight", weigh_in).await
    }

    async fn log_run(&self, run: &NewRun) -> Result<Run, ApiError> {
        self.post_json("/run", run).await
    }

    async fn recent_weigh_ins(&self, count: u32) -> Result<Vec<WeighIn>, ApiError> {
        self.get_json(&format!("/weight/last/{count}")).await
    }

    async fn recent_runs(&self, count: u32) -> Result<Vec<Run>, ApiError> {
        self.get_json(&format!("/run/last/{count}")).await
    }
}
