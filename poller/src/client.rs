use async_trait::async_trait;
use reqwest::{header, Client, Url};
use shared::core::config::ServiceConfig;
use shared::core::constants::{CONVERTER_URL, POLL_REQUEST_TIMEOUT_SECS, POLL_USER_AGENT};
use shared::types::PollResult;
use shared::ScrapeError;
use std::time::Duration;

/// Source of status-check answers
#[async_trait]
pub trait StatusSource: Send + Sync + 'static {
    /// One status check. Transport failures and non-2xx statuses are errors;
    /// any 2xx body is interpreted, unknown shapes counting as pending.
    async fn fetch_status(&self, url: &str) -> Result<PollResult, ScrapeError>;
}

/// Status client configuration
#[derive(Clone, Debug)]
pub struct PollerConfig {
    pub user_agent: String,
    pub referer: String,
    pub timeout: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            user_agent: POLL_USER_AGENT.to_string(),
            referer: CONVERTER_URL.to_string(),
            timeout: Duration::from_secs(POLL_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl From<&ServiceConfig> for PollerConfig {
    fn from(config: &ServiceConfig) -> Self {
        Self {
            user_agent: config.poll_user_agent.clone(),
            referer: config.converter_url.clone(),
            timeout: config.poll_request_timeout,
        }
    }
}

/// reqwest-backed status client that presents itself as a desktop browser.
#[derive(Clone)]
pub struct HttpStatusClient {
    config: PollerConfig,
    client: Client,
}

impl HttpStatusClient {
    pub fn new(config: PollerConfig) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| ScrapeError::Upstream(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl StatusSource for HttpStatusClient {
    async fn fetch_status(&self, url: &str) -> Result<PollResult, ScrapeError> {
        let url = Url::parse(url)
            .map_err(|e| ScrapeError::Upstream(format!("Invalid status URL {}: {}", url, e)))?;

        let resp = self
            .client
            .get(url)
            .header(header::REFERER, &self.config.referer)
            .send()
            .await
            .map_err(|e| match e.is_timeout() {
                true => ScrapeError::Upstream(format!("Request timed out: {}", e)),
                false => ScrapeError::Upstream(format!("Network error: {}", e)),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ScrapeError::Upstream(format!(
                "Request failed with status code {}",
                status.as_u16()
            )));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| ScrapeError::Upstream(format!("Failed to read response: {}", e)))?;

        Ok(PollResult::from_body(&body))
    }
}
