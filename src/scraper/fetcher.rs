//! HTTP fetching for product pages
//!
//! Builds a browser-like client and classifies fetch results so the
//! orchestrator can decide what is retryable. The fetcher itself never
//! retries.

use crate::config::UserAgentConfig;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{redirect::Policy, Client};
use std::collections::HashMap;
use std::time::Duration;

/// Result of one fetch attempt
#[derive(Debug)]
pub enum FetchOutcome {
    /// 2xx response with a body
    Success { status_code: u16, body: String },

    /// Non-success HTTP status
    ///
    /// All error statuses are retryable within the same budget; 4xx is
    /// likely permanent but retried anyway, 5xx is transient.
    HttpStatus { status_code: u16 },

    /// Transport-level failure (timeout, connection reset, TLS)
    Network { error: String, timeout: bool },
}

impl FetchOutcome {
    /// Short description for failure records
    pub fn describe(&self) -> String {
        match self {
            FetchOutcome::Success { status_code, .. } => format!("HTTP {}", status_code),
            FetchOutcome::HttpStatus { status_code } => format!("HTTP {}", status_code),
            FetchOutcome::Network { error, timeout } => {
                if *timeout {
                    "request timeout".to_string()
                } else {
                    error.clone()
                }
            }
        }
    }
}

/// Builds the HTTP client used for product page fetches
///
/// The client carries a realistic browser header set: sites that
/// fingerprint bot user agents serve degraded markup to anything less.
/// Redirects are followed up to a bounded count.
///
/// # Arguments
///
/// * `config` - Request identity configuration
/// * `timeout_secs` - Per-request timeout in seconds
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout_secs: u64,
) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    if let Ok(value) = HeaderValue::from_str(&config.accept_language) {
        headers.insert(ACCEPT_LANGUAGE, value);
    }

    Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(5))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a product page
///
/// Issues a GET with the site profile's extra headers layered on top of the
/// client defaults. Classification only; retry policy lives in the
/// orchestrator.
///
/// # Arguments
///
/// * `client` - The shared HTTP client
/// * `url` - The URL to fetch
/// * `extra_headers` - Site-specific headers from the profile
pub async fn fetch_page(
    client: &Client,
    url: &str,
    extra_headers: &HashMap<String, String>,
) -> FetchOutcome {
    let mut request = client.get(url);

    for (name, value) in extra_headers {
        let parsed = (
            name.parse::<HeaderName>(),
            HeaderValue::from_str(value),
        );
        if let (Ok(name), Ok(value)) = parsed {
            request = request.header(name, value);
        } else {
            tracing::warn!("Skipping invalid profile header {:?}", name);
        }
    }

    match request.send().await {
        Ok(response) => {
            let status = response.status();

            if !status.is_success() {
                return FetchOutcome::HttpStatus {
                    status_code: status.as_u16(),
                };
            }

            match response.text().await {
                Ok(body) => FetchOutcome::Success {
                    status_code: status.as_u16(),
                    body,
                },
                Err(e) => FetchOutcome::Network {
                    error: format!("failed to read body: {}", e),
                    timeout: e.is_timeout(),
                },
            }
        }
        Err(e) => FetchOutcome::Network {
            error: e.to_string(),
            timeout: e.is_timeout(),
        },
    }
}
