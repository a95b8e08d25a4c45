//! HTTP transport
//!
//! The crawler talks to the network through the `Transport` trait. Status
//! codes are returned as data: redirects are never followed, because the site
//! signals blocking with a redirect and the backoff controller must see it.

use async_trait::async_trait;
use reqwest::header::{LOCATION, USER_AGENT};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// Result of a fetch operation
#[derive(Debug, Clone)]
pub enum FetchResult {
    /// 2xx response with its body
    Success {
        /// URL the response was served from
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
    },

    /// 3xx response, not followed
    Redirect {
        /// The HTTP status code
        status_code: u16,
        /// Location header, if any
        location: Option<String>,
    },

    /// Any other non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// No response at all (connection refused, timeout, body read failure)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    /// HTTP status of the response; `None` when no response arrived
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Success { status_code, .. }
            | Self::Redirect { status_code, .. }
            | Self::HttpError { status_code } => Some(*status_code),
            Self::NetworkError { .. } => None,
        }
    }
}

/// Fetches pages on behalf of the crawler
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetches `url`, presenting `user_agent` as the client identity
    async fn fetch(&self, url: &Url, user_agent: &str) -> FetchResult;
}

/// Builds an HTTP client with proper configuration
///
/// The user agent is set per request, so the client carries none.
pub fn build_http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::none())
        .gzip(true)
        .brotli(true)
        .build()
}

/// `Transport` backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(timeout)?,
        })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, url: &Url, user_agent: &str) -> FetchResult {
        fetch_url(&self.client, url, user_agent).await
    }
}

/// Fetches a URL and classifies the outcome
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx | `Success` with body |
/// | 3xx | `Redirect` (not followed) |
/// | 4xx / 5xx | `HttpError` |
/// | Timeout, connect failure, body read failure | `NetworkError` |
pub async fn fetch_url(client: &Client, url: &Url, user_agent: &str) -> FetchResult {
    let response = match client
        .get(url.clone())
        .header(USER_AGENT, user_agent)
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => {
            let error = if e.is_timeout() {
                "Request timeout".to_string()
            } else if e.is_connect() {
                format!("Connection failed: {}", e)
            } else {
                e.to_string()
            };
            return FetchResult::NetworkError { error };
        }
    };

    let status = response.status();
    let final_url = response.url().to_string();

    if status.is_redirection() {
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        return FetchResult::Redirect {
            status_code: status.as_u16(),
            location,
        };
    }

    if !status.is_success() {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    match response.text().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status_code: status.as_u16(),
            body,
        },
        Err(e) => FetchResult::NetworkError {
            error: e.to_string(),
        },
    }
}
