//! HTTP Client - Retrying REST Client for the Data API and Relay
//!
//! Wraps reqwest with builder authentication and retries. Only GETs
//! are retried; a POST goes out exactly once so a relay submission can
//! never be duplicated.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::auth::BuilderAuth;

/// Configuration for the HTTP client.
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
  /// Base URL, without trailing slash.
  pub base_url: String,
  /// Request timeout.
  pub timeout: Duration,
  /// Maximum retries of a GET on transient errors.
  pub max_retries: u32,
  /// Base delay between retries (exponential backoff).
  pub retry_base_delay: Duration,
}

impl ApiClientConfig {
  /// Defaults for `base_url`.
  pub fn with_base_url(base_url: impl Into<String>) -> Self {
    Self {
      base_url: base_url.into().trim_end_matches('/').to_string(),
      ..Self::default()
    }
  }
}

impl Default for ApiClientConfig {
  fn default() -> Self {
    Self {
      base_url: "https://relayer-v2.polymarket.com".to_string(),
      timeout: Duration::from_secs(30),
      max_retries: 3,
      retry_base_delay: Duration::from_millis(200),
    }
  }
}

/// HTTP client for one Polymarket service.
pub struct ApiClient {
  /// Underlying HTTP client.
  http: Client,
  /// Builder credentials, when the service needs them.
  auth: Option<Arc<BuilderAuth>>,
  /// Client configuration.
  config: ApiClientConfig,
}

impl ApiClient {
  /// Create a new client.
  pub fn new(config: ApiClientConfig, auth: Option<Arc<BuilderAuth>>) -> Result<Self> {
    let http = Client::builder()
      .timeout(config.timeout)
      .pool_max_idle_per_host(5)
      .build()
      .context("Failed to build HTTP client")?;

    Ok(Self { http, auth, config })
  }

  /// Base URL of the service.
  pub fn base_url(&self) -> &str {
    &self.config.base_url
  }

  /// Whether builder credentials are attached.
  pub fn is_authenticated(&self) -> bool {
    self.auth.is_some()
  }

  /// Execute a GET with query parameters, retrying transient failures.
  pub async fn get<Q: Serialize + ?Sized>(&self, path: &str, query: &Q) -> Result<Response> {
    let url = format!("{}{}", self.config.base_url, path);
    let request = self.http.get(&url).query(query);
    self.execute_with_retry(request, path).await
  }

  /// Execute a signed POST with a JSON body. Never retried.
  pub async fn post(&self, path: &str, body: String) -> Result<Response> {
    let url = format!("{}{}", self.config.base_url, path);
    let request = self
      .sign(self.http.post(&url), "POST", path, &body)
      .header("Content-Type", "application/json")
      .body(body);

    let response = request
      .send()
      .await
      .with_context(|| format!("POST {path} failed"))?;
    check_status(response).await
  }

  /// Attach builder headers when credentials are configured.
  fn sign(&self, request: RequestBuilder, method: &str, path: &str, body: &str) -> RequestBuilder {
    match &self.auth {
      Some(auth) => auth
        .headers(method, path, body)
        .pairs()
        .into_iter()
        .fold(request, |req, (name, value)| req.header(name, value)),
      None => request,
    }
  }

  /// Execute a GET with authentication and retries.
  async fn execute_with_retry(&self, request: RequestBuilder, path: &str) -> Result<Response> {
    let mut last_error = None;

    for attempt in 0..=self.config.max_retries {
      if attempt > 0 {
        let delay = self.config.retry_base_delay * 2u32.pow(attempt - 1);
        debug!(attempt, delay_ms = delay.as_millis(), "Retrying request");
        sleep(delay).await;
      }

      let req = request.try_clone().context("Failed to clone request")?;
      let req = self.sign(req, "GET", path, "");

      match req.send().await {
        Ok(response) => match response.status() {
          StatusCode::TOO_MANY_REQUESTS => {
            warn!(path, "Rate limited, backing off");
            sleep(Duration::from_secs(2)).await;
            last_error = Some(anyhow::anyhow!("Rate limited"));
          }
          status if status.is_server_error() => {
            warn!(status = %status, path, "Server error, retrying");
            last_error = Some(anyhow::anyhow!("Server error: {status}"));
          }
          _ => return check_status(response).await,
        },
        Err(e) => {
          warn!(error = %e, attempt, path, "Request failed");
          last_error = Some(e.into());
        }
      }
    }

    Err(last_error.unwrap_or_else(|| anyhow::anyhow!("Max retries exceeded")))
  }
}

/// Turn a non-success status into an error carrying the body.
async fn check_status(response: Response) -> Result<Response> {
  let status = response.status();
  if status.is_success() {
    return Ok(response);
  }
  let body = response.text().await.unwrap_or_default();
  Err(anyhow::anyhow!("API error {status}: {body}"))
}
