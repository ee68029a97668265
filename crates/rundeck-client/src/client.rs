//! Rundeck REST client.

use std::fmt::Display;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{RequestBuilder, Response};
use tracing::{debug, info};
use url::Url;

use crate::api::{ImportFailure, ImportMode, ImportResult};
use crate::error::ClientError;
use crate::job::{JobDefinition, JobSummary};

/// API version used unless the caller picks another one.
pub const DEFAULT_API_VERSION: u32 = 24;

const AUTH_HEADER: &str = "X-Rundeck-Auth-Token";

/// The job endpoints the resource lifecycle depends on.
///
/// Every call is a single attempt; retries and timeouts are left to the
/// underlying transport.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait JobClient: Send + Sync {
    /// Import one job definition and return the identity the server assigned.
    async fn import_job(
        &self,
        job: &JobDefinition,
        mode: ImportMode,
    ) -> Result<JobSummary, ClientError>;

    /// Fetch a job definition by ID.
    async fn get_job(&self, id: &str) -> Result<JobDefinition, ClientError>;

    /// Delete a job by ID.
    async fn delete_job(&self, id: &str) -> Result<(), ClientError>;
}

/// `JobClient` over the Rundeck HTTP API.
pub struct RundeckClient {
    base_url: Url,
    api_version: u32,
    auth_token: Option<String>,
    client: reqwest::Client,
}

impl RundeckClient {
    pub fn new(base_url: &str, auth_token: Option<String>) -> Result<Self, ClientError> {
        Self::with_http_client(base_url, auth_token, reqwest::Client::new())
    }

    /// Create a client on top of a preconfigured transport (timeouts, TLS, proxies).
    pub fn with_http_client(
        base_url: &str,
        auth_token: Option<String>,
        client: reqwest::Client,
    ) -> Result<Self, ClientError> {
        let parsed = Url::parse(base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if parsed.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(format!(
                "{}: not usable as a base URL",
                base_url
            )));
        }

        Ok(Self {
            base_url: parsed,
            api_version: DEFAULT_API_VERSION,
            auth_token,
            client,
        })
    }

    pub fn with_api_version(mut self, api_version: u32) -> Self {
        self.api_version = api_version;
        self
    }

    pub fn api_version(&self) -> u32 {
        self.api_version
    }

    /// Build `{base}/api/{version}/{segments...}` with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        let version = self.api_version.to_string();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push("api")
            .push(&version)
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let mut request = request.header(ACCEPT, "application/json");
        if let Some(ref token) = self.auth_token {
            request = request.header(AUTH_HEADER, token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = error_message(response.text().await);
            return Err(ClientError::from_status(status, message));
        }

        Ok(response)
    }
}

/// Message of a failed response. Error bodies look like
/// `{"error": true, "message": "..."}`; anything else is used verbatim.
fn error_message<E: Display>(body: Result<String, E>) -> String {
    match body {
        Ok(body) => serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v["message"].as_str().map(String::from))
            .unwrap_or(body),
        Err(e) => format!("failed to read response body: {}", e),
    }
}

#[async_trait]
impl JobClient for RundeckClient {
    async fn import_job(
        &self,
        job: &JobDefinition,
        mode: ImportMode,
    ) -> Result<JobSummary, ClientError> {
        if job.project_name.is_empty() {
            return Err(ClientError::ImportFailed(format!(
                "job '{}' has no project",
                job.name
            )));
        }

        let mut url = self.endpoint(&["project", &job.project_name, "jobs", "import"])?;
        url.query_pairs_mut()
            .append_pair("fileformat", "json")
            .append_pair("dupeOption", mode.dupe_option())
            .append_pair("uuidOption", "preserve");

        let body = serde_json::to_vec(&[job])
            .map_err(|e| ClientError::ImportFailed(format!("job '{}': {}", job.name, e)))?;

        debug!("Importing job '{}' into project '{}' ({:?})", job.name, job.project_name, mode);
        let request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        let response = self.send(request).await?;
        let result: ImportResult = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

        if !result.failed.is_empty() {
            let messages: Vec<String> = result.failed.iter().map(ImportFailure::describe).collect();
            return Err(ClientError::ImportFailed(messages.join("; ")));
        }

        let skipped = result.skipped.len();
        let summary = result.succeeded.into_iter().next().ok_or_else(|| {
            ClientError::ImportFailed(format!(
                "job '{}' was not imported ({} skipped)",
                job.name, skipped
            ))
        })?;

        info!("Imported job '{}' as {}", summary.name, summary.id);
        Ok(summary)
    }

    async fn get_job(&self, id: &str) -> Result<JobDefinition, ClientError> {
        let mut url = self.endpoint(&["job", id])?;
        url.query_pairs_mut().append_pair("format", "json");

        debug!("Fetching job {}", id);
        let response = self.send(self.client.get(url)).await?;
        let jobs: Vec<JobDefinition> = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

        jobs.into_iter()
            .next()
            .ok_or_else(|| ClientError::NotFound(id.to_string()))
    }

    async fn delete_job(&self, id: &str) -> Result<(), ClientError> {
        let url = self.endpoint(&["job", id])?;

        debug!("Deleting job {}", id);
        self.send(self.client.delete(url)).await?;
        info!("Deleted job {}", id);
        Ok(())
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
