//! HTTP transport for the Kayako REST API.
//!
//! This module provides `KayakoClient`, the [`Transport`] used against a
//! live helpdesk. Every request carries the public API key, a fresh random
//! salt and the salt's HMAC-SHA256 signature under the secret key.
//!
//! # Retry Logic
//!
//! The client automatically retries transient failures:
//! - HTTP 429 (rate limit): Exponential backoff starting at 100ms
//! - HTTP 502/503/504: Retry after 500ms
//! - Timeouts: Retry after 100ms, except for creates (POST), which may
//!   already have taken effect
//!
//! Client errors (4xx except 429) are not retried.
//!
//! # Security
//!
//! Neither key is ever logged. Error bodies are sanitized before they are
//! stored in an error.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use rand::distributions::Alphanumeric;
use rand::Rng;
use reqwest::{Client, Method, StatusCode};
use sha2::Sha256;

use crate::config::Config;
use crate::error::KayakoError;
use crate::lifecycle::{Lifecycle, Scope};
use crate::models::Department;
use crate::transport::{Parameters, Transport};
use crate::xml::{self, Element};

/// Maximum number of attempts for transient failures.
const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Initial delay for exponential backoff (milliseconds).
const INITIAL_BACKOFF_MS: u64 = 100;

/// Delay before retrying after server error (milliseconds).
const SERVER_ERROR_DELAY_MS: u64 = 500;

/// Maximum length for HTTP error response bodies.
const MAX_ERROR_BODY_LEN: usize = 500;

/// Length of the per-request signing salt.
const SALT_LEN: usize = 10;

type HmacSha256 = Hmac<Sha256>;

/// HTTP client for the Kayako REST API.
///
/// # Example
///
/// ```ignore
/// let config = Config::from_env()?;
/// let client = KayakoClient::new(&config)?;
///
/// let departments = Department::get_all(&client, Scope::new()).await?;
/// ```
#[derive(Clone)]
pub struct KayakoClient {
    /// The underlying HTTP client (cloning is cheap).
    http: Client,

    /// REST endpoint, e.g. `https://support.example.com/api/index.php`.
    api_url: String,

    /// Public API key.
    /// SECURITY: Never log this value!
    api_key: String,

    /// Secret used to sign salts.
    /// SECURITY: Never log or send this value!
    secret_key: String,

    /// Per-request timeout, reported in `Timeout` errors.
    timeout: Duration,
}

impl KayakoClient {
    /// Creates a new client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `KayakoError::HttpClient` if the HTTP client fails to initialize.
    pub fn new(config: &Config) -> Result<Self, KayakoError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(KayakoError::HttpClient)?;

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            secret_key: config.secret_key.clone(),
            timeout: config.timeout,
        })
    }

    /// The REST endpoint this client talks to.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Tests connectivity by listing departments.
    ///
    /// # Errors
    ///
    /// Returns `KayakoError::ConnectionTest` if the connection fails,
    /// with details about the failure reason.
    pub async fn test_connection(&self) -> Result<(), KayakoError> {
        tracing::debug!("Testing connection to Kayako");

        match Department::get_all(self, Scope::new()).await {
            Ok(departments) => {
                tracing::info!(departments = departments.len(), "Connection test successful");
                Ok(())
            }
            Err(KayakoError::Authentication) => Err(KayakoError::connection_test(
                "Authentication failed - verify KAYAKO_API_KEY and KAYAKO_SECRET_KEY",
            )),
            Err(KayakoError::Timeout { duration, .. }) => Err(KayakoError::connection_test(format!(
                "Connection timed out after {:?} - verify KAYAKO_API_URL is correct and the server is reachable",
                duration
            ))),
            Err(KayakoError::Http(e)) => Err(KayakoError::connection_test(format!(
                "HTTP error: {} - verify KAYAKO_API_URL is correct",
                self.sanitize(&e.to_string())
            ))),
            Err(e) => Err(KayakoError::connection_test(self.sanitize(&e.to_string()))),
        }
    }

    fn sanitize(&self, message: &str) -> String {
        KayakoError::sanitize_message(message, &[self.api_key.as_str(), self.secret_key.as_str()])
    }

    /// Computes the request signature for `salt`.
    fn sign(secret_key: &str, salt: &str) -> Result<String, KayakoError> {
        let mut mac = HmacSha256::new_from_slice(secret_key.as_bytes())
            .map_err(|e| KayakoError::configuration(format!("invalid secret key: {}", e)))?;
        mac.update(salt.as_bytes());
        Ok(BASE64.encode(mac.finalize().into_bytes()))
    }

    fn generate_salt() -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SALT_LEN)
            .map(char::from)
            .collect()
    }

    /// Authentication parameters for one request.
    fn auth_parameters(&self) -> Result<Vec<(&'static str, String)>, KayakoError> {
        let salt = Self::generate_salt();
        let signature = Self::sign(&self.secret_key, &salt)?;
        Ok(vec![
            ("apikey", self.api_key.clone()),
            ("salt", salt),
            ("signature", signature),
        ])
    }

    /// Executes an operation with retry logic for transient failures.
    /// Timeouts are retried only when `retry_timeouts` is set.
    async fn with_retry<T, F, Fut>(
        &self,
        operation: &str,
        retry_timeouts: bool,
        f: F,
    ) -> Result<T, KayakoError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, KayakoError>>,
    {
        let mut delay = Duration::from_millis(INITIAL_BACKOFF_MS);
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            match f().await {
                Ok(result) => return Ok(result),
                Err(e)
                    if e.is_retryable()
                        && (retry_timeouts || !e.is_timeout())
                        && attempts < MAX_RETRY_ATTEMPTS =>
                {
                    let actual_delay = if e.is_rate_limit() {
                        e.retry_after().unwrap_or(delay)
                    } else if matches!(e, KayakoError::ServiceUnavailable { .. }) {
                        Duration::from_millis(SERVER_ERROR_DELAY_MS)
                    } else {
                        delay
                    };

                    tracing::debug!(
                        operation = operation,
                        attempt = attempts,
                        max_attempts = MAX_RETRY_ATTEMPTS,
                        delay_ms = actual_delay.as_millis() as u64,
                        error = %self.sanitize(&e.to_string()),
                        "Retrying after transient error"
                    );

                    tokio::time::sleep(actual_delay).await;

                    if e.is_rate_limit() {
                        delay *= 2;
                    }
                }
                Err(e) => {
                    if attempts > 1 {
                        tracing::debug!(
                            operation = operation,
                            attempts = attempts,
                            "All retry attempts exhausted"
                        );
                    }
                    return Err(e);
                }
            }
        }
    }

    /// Sends one request without retry.
    ///
    /// GET and DELETE carry every parameter in the query string; POST and PUT
    /// send them as a form body. List parameters are comma joined.
    async fn request_inner(
        &self,
        method: Method,
        path: &str,
        parameters: &Parameters,
    ) -> Result<Element, KayakoError> {
        tracing::debug!(method = %method, path = %path, "Making Kayako API request");

        let mut fields: Vec<(&str, String)> = self.auth_parameters()?;
        fields.extend(
            parameters
                .iter()
                .map(|(name, value)| (name.as_str(), value.joined())),
        );

        let mut req = self
            .http
            .request(method.clone(), &self.api_url)
            .query(&[("e", path)]);

        req = match method {
            Method::GET | Method::DELETE => req.query(&fields),
            _ => {
                let body = fields
                    .iter()
                    .map(|(name, value)| {
                        format!("{}={}", urlencoding::encode(name), urlencoding::encode(value))
                    })
                    .collect::<Vec<_>>()
                    .join("&");
                req.header("Content-Type", "application/x-www-form-urlencoded")
                    .body(body)
            }
        };

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                return KayakoError::timeout(self.timeout, format!("{} {}", method, path));
            }
            KayakoError::Http(e)
        })?;
        let status = response.status();

        if !status.is_success() {
            return Err(self.handle_http_error(status, path, response).await);
        }

        let body = response.text().await.map_err(KayakoError::Http)?;

        tracing::trace!(body = %body, "Kayako API response");

        xml::parse(&body)
    }

    /// Converts a non-success response into the matching error.
    async fn handle_http_error(
        &self,
        status: StatusCode,
        path: &str,
        response: reqwest::Response,
    ) -> KayakoError {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs);

        let body = response.text().await.unwrap_or_default();
        let body = self.sanitize(&body);
        let body = if body.chars().count() > MAX_ERROR_BODY_LEN {
            format!(
                "{}...[truncated]",
                body.chars().take(MAX_ERROR_BODY_LEN).collect::<String>()
            )
        } else {
            body
        };

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => KayakoError::Authentication,
            StatusCode::NOT_FOUND => KayakoError::not_found(path),
            StatusCode::TOO_MANY_REQUESTS => {
                tracing::warn!("Rate limited by Kayako server");
                KayakoError::RateLimited { retry_after }
            }
            StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT => {
                tracing::warn!(status = %status, "Kayako server temporarily unavailable");
                KayakoError::ServiceUnavailable { status }
            }
            _ => KayakoError::HttpStatus { status, body },
        }
    }
}

#[async_trait]
impl Transport for KayakoClient {
    async fn exchange(
        &self,
        path: &str,
        method: Method,
        parameters: &Parameters,
    ) -> Result<Element, KayakoError> {
        let operation = format!("{} {}", method, path);
        let retry_timeouts = method != Method::POST;
        self.with_retry(&operation, retry_timeouts, || {
            self.request_inner(method.clone(), path, parameters)
        })
        .await
    }
}
