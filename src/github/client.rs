//! GitHub API client.

use std::time::{Duration, SystemTime};

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, Method, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::Token;
use crate::error::{ArchiveError, Result};
use crate::github::retry::{self, RateLimited, ThrottleConfig};

/// Public GitHub API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Settings shared by every request a client makes.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root, without a trailing slash.
    pub base_url: String,
    /// Retries after the initial attempt for transient failures.
    pub max_retries: u32,
    /// Unit of the quadratic backoff between generic retries.
    pub retry_base_delay: Duration,
    pub throttle: ThrottleConfig,
    pub user_agent: String,
}

impl ClientConfig {
    /// Creates a configuration for the given API root with default retry settings.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut url = base_url.into();
        while url.ends_with('/') {
            url.pop();
        }
        Self {
            base_url: url,
            max_retries: 10,
            retry_base_delay: Duration::from_secs(1),
            throttle: ThrottleConfig::default(),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).into(),
        }
    }

    /// Sets the number of generic retries.
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Sets the backoff unit between generic retries.
    pub fn retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    /// Sets the rate-limit handlers.
    pub fn throttle(mut self, throttle: ThrottleConfig) -> Self {
        self.throttle = throttle;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

/// Client for interacting with the GitHub API, bound to one credential.
#[derive(Clone)]
pub struct GitHubClient {
    pub(crate) token: Token,
    pub(crate) config: ClientConfig,
    pub(crate) client: Client,
}

/// Error payload returned by the API.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// A response that did not succeed.
struct Failure {
    status: StatusCode,
    headers: HeaderMap,
    message: String,
}

impl Failure {
    async fn read(response: Response) -> Self {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ApiErrorBody>(&body) {
            Ok(parsed) => parsed.message,
            Err(_) if !body.trim().is_empty() => body.trim().to_string(),
            Err(_) => status.canonical_reason().unwrap_or("request failed").to_string(),
        };
        Self {
            status,
            headers,
            message,
        }
    }

    fn into_error(self) -> ArchiveError {
        ArchiveError::GitHub {
            status: self.status.as_u16(),
            message: self.message,
        }
    }
}

impl GitHubClient {
    /// Create a client for the given token. Performs no I/O.
    pub fn new(token: Token, config: ClientConfig) -> Self {
        Self {
            token,
            config,
            client: Client::new(),
        }
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Get the default headers for API requests.
    pub(crate) fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", self.token.expose()))
            .map_err(|_| ArchiveError::InvalidConfig("token is not a valid header value".into()))?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&self.config.user_agent)
                .map_err(|_| ArchiveError::InvalidConfig("invalid user agent".into()))?,
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        Ok(headers)
    }

    /// Make a PATCH request to the GitHub API.
    pub(crate) async fn patch<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T> {
        self.send(Method::PATCH, endpoint, body).await
    }

    /// Make a POST request to the GitHub API.
    pub(crate) async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T> {
        self.send(Method::POST, endpoint, body).await
    }

    /// Send a request, retrying transient failures and rate limits.
    async fn send<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        method: Method,
        endpoint: &str,
        body: &B,
    ) -> Result<T> {
        let url = format!("{}{}", self.config.base_url, endpoint);
        let headers = self.headers()?;
        let mut retry_count = 0u32;

        loop {
            debug!("{} {} (retry {})", method, url, retry_count);
            let sent = self
                .client
                .request(method.clone(), &url)
                .headers(headers.clone())
                .json(body)
                .send()
                .await;

            let (error, retryable) = match sent {
                Ok(response) if response.status().is_success() => {
                    return Ok(response.json().await?);
                }
                Ok(response) => {
                    let failure = Failure::read(response).await;
                    if let Some((kind, retry_after)) = retry::detect_rate_limit(
                        failure.status,
                        &failure.headers,
                        &failure.message,
                        SystemTime::now(),
                    ) {
                        let event = RateLimited {
                            kind,
                            retry_after,
                            method: method.as_str(),
                            url: &url,
                            retry_count,
                        };
                        if retry_count < self.config.max_retries
                            && (self.config.throttle.handler(kind))(&event)
                        {
                            tokio::time::sleep(retry_after).await;
                            retry_count += 1;
                            continue;
                        }
                        return Err(ArchiveError::RateLimited {
                            kind,
                            method: method.to_string(),
                            url,
                            retry_after,
                        });
                    }
                    let retryable = retry::is_retryable_status(failure.status);
                    (failure.into_error(), retryable)
                }
                Err(e) => {
                    let retryable = retry::is_retryable_error(&e);
                    (ArchiveError::Http(e), retryable)
                }
            };

            if !retryable || retry_count >= self.config.max_retries {
                return Err(error);
            }

            let delay = retry::backoff_delay(self.config.retry_base_delay, retry_count);
            warn!(
                "{} {} failed: {}; retrying in {}s ({}/{})",
                method,
                url,
                error,
                delay.as_secs(),
                retry_count + 1,
                self.config.max_retries
            );
            tokio::time::sleep(delay).await;
            retry_count += 1;
        }
    }
}
