//! HTTP transport for a Jenkins server.

use std::rc::Rc;
use std::thread;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::Method;
use url::Url;

use crate::config::{join_url, HTTP_TIMEOUT_SECS, MAX_RETRIES, RETRY_BASE_DELAY_MS};
use crate::error::{ConfError, Result};
use crate::transport::{Payload, Transport, TransportResponse};

/// User agent string identifying this client.
const USER_AGENT: &str = concat!("jenkinsconf/", env!("CARGO_PKG_VERSION"));

/// User name and API token, sent as basic authentication.
#[derive(Clone)]
pub struct Credentials {
    pub user: String,
    pub token: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("token", &"***")
            .finish()
    }
}

/// Connection settings for [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct HttpOptions {
    pub timeout: Duration,
    /// Attempts per request, including the first.
    pub max_retries: u32,
    pub retry_base_delay: Duration,
    pub credentials: Option<Credentials>,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(HTTP_TIMEOUT_SECS),
            max_retries: MAX_RETRIES,
            retry_base_delay: Duration::from_millis(RETRY_BASE_DELAY_MS),
            credentials: None,
        }
    }
}

impl HttpOptions {
    #[must_use]
    pub fn with_credentials(mut self, user: impl Into<String>, token: impl Into<String>) -> Self {
        self.credentials = Some(Credentials {
            user: user.into(),
            token: token.into(),
        });
        self
    }
}

/// Blocking transport over `reqwest`.
///
/// Connection failures, timeouts and 5xx answers are retried with
/// exponential backoff; other failures are returned at once.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    url: String,
    options: HttpOptions,
}

impl HttpTransport {
    /// Create a transport bound to `url`.
    ///
    /// # Errors
    /// Returns `InvalidUrl` if `url` is not an absolute URL.
    pub fn new(url: &str, options: HttpOptions) -> Result<Self> {
        Url::parse(url).map_err(|e| ConfError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        let client = Client::builder()
            .timeout(options.timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            url: url.to_string(),
            options,
        })
    }

    /// Send a request with retry logic.
    ///
    /// Uses exponential backoff for transient failures (network errors, 5xx
    /// responses). The returned response has a success status.
    fn send(&self, method: Method, path: &str, payload: Option<&Payload>) -> Result<Response> {
        let url = join_url(&self.url, path);
        let attempts = self.options.max_retries.max(1);
        let mut last_error: Option<String> = None;

        for attempt in 0..attempts {
            if attempt > 0 {
                let delay = backoff_delay(self.options.retry_base_delay, attempt);
                tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, "Retrying after delay");
                thread::sleep(delay);
            }

            let mut request = self.client.request(method.clone(), &url);
            if let Some(credentials) = &self.options.credentials {
                request = request.basic_auth(&credentials.user, Some(&credentials.token));
            }
            if let Some(payload) = payload {
                for (name, value) in &payload.headers {
                    request = request.header(name.as_str(), value.as_str());
                }
                request = request.body(payload.data.clone());
            }

            tracing::debug!(%method, url = %url, attempt = attempt + 1, "Sending request");
            match request.send() {
                Ok(response) => {
                    let status = response.status();

                    if status.is_server_error() {
                        tracing::warn!(
                            status = %status,
                            attempt = attempt + 1,
                            max_retries = attempts,
                            "Server error, will retry"
                        );
                        last_error = Some(format!("Server error: {status}"));
                        continue;
                    }

                    if !status.is_success() {
                        return Err(ConfError::HttpStatus {
                            status: status.as_u16(),
                            url,
                        });
                    }
                    return Ok(response);
                }
                Err(e) => {
                    if e.is_connect() || e.is_timeout() {
                        tracing::warn!(
                            error = %e,
                            attempt = attempt + 1,
                            max_retries = attempts,
                            "Connection error, will retry"
                        );
                        last_error = Some(e.to_string());
                        continue;
                    }
                    return Err(ConfError::Http(e));
                }
            }
        }

        Err(ConfError::RetriesExhausted {
            attempts,
            message: last_error.unwrap_or_else(|| "Unknown error".to_string()),
        })
    }
}

impl Transport for HttpTransport {
    fn url(&self) -> &str {
        &self.url
    }

    fn get_text(&self, path: &str) -> Result<String> {
        let response = self.send(Method::GET, path, None)?;
        Ok(response.text()?)
    }

    fn post(&self, path: &str, payload: &Payload) -> Result<TransportResponse> {
        let response = self.send(Method::POST, path, Some(payload))?;
        let status = response.status().as_u16();
        let body = response.text()?;
        Ok(TransportResponse { status, body })
    }

    fn scoped(&self, url: &str) -> Rc<dyn Transport> {
        Rc::new(Self {
            client: self.client.clone(),
            url: url.to_string(),
            options: self.options.clone(),
        })
    }
}

/// Delay before retry number `attempt`, doubling from `base` and saturating
/// instead of overflowing.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
    base.saturating_mul(factor)
}
