//! HTTP transport implementation
//!
//! A transport performs exactly one GET per call:
//! - Redirects follow the client's default policy
//! - Certificates are checked against the bundled webpki roots
//! - Connect and whole-request timeouts bound every call
//! - No retries, and no status-code interpretation (a 404 with a body is a body)

use crate::config::{FetchConfig, UserAgentConfig};
use crate::fetch::FetchError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// A fetched body and the URL it was finally served from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub body: String,
    pub final_url: String,
}

/// Performs a single fetch of one URL
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetches `url` and returns the body decoded as UTF-8 text
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;

    /// Fetches `url`, also reporting where redirects ended up
    ///
    /// The default assumes the page was served from `url` itself.
    async fn fetch_page(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let body = self.fetch(url).await?;
        Ok(FetchedPage {
            body,
            final_url: url.to_string(),
        })
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `fetch` - Timeout settings
///
/// # Example
///
/// ```no_run
/// use sitemap_harvest::config::{FetchConfig, UserAgentConfig};
/// use sitemap_harvest::fetch::build_http_client;
///
/// let user_agent = UserAgentConfig {
///     crawler_name: "Harvester".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&user_agent, &FetchConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    fetch: &FetchConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(fetch.timeout_secs))
        .connect_timeout(Duration::from_secs(fetch.connect_timeout_secs))
        .use_rustls_tls()
        .gzip(true)
        .brotli(true)
        .build()
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(user_agent: &UserAgentConfig, fetch: &FetchConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(user_agent, fetch)?,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        Ok(self.fetch_page(url).await?.body)
    }

    async fn fetch_page(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::new(url, classify_error(&e)))?;
        let final_url = response.url().to_string();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::new(url, classify_error(&e)))?;

        let body = String::from_utf8(bytes.to_vec())
            .map_err(|e| FetchError::new(url, format!("undecodable body: {}", e)))?;

        Ok(FetchedPage { body, final_url })
    }
}

/// Describes a transport error, keeping the underlying message
fn classify_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("request timeout: {}", e)
    } else if e.is_connect() {
        format!("connection failed: {}", e)
    } else {
        e.to_string()
    }
}
