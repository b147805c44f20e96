use std::time::Duration;

use nf_core::{Error, FetcherConfig, Result};
use reqwest::{Response, StatusCode};
use url::Url;

use crate::logging::Logger;

/// Outbound HTTP client shared by the feed fetcher and the content extractor.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            timeout: config.timeout(),
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// GETs `url` and fails on transport errors and non-success statuses.
    pub async fn get(&self, url: &str) -> Result<Response> {
        let url = parse_url(url)?;
        let response = self.client.get(url).send().await?;
        Ok(response.error_for_status()?)
    }

    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.get(url).await?;
        Ok(response.bytes().await?.to_vec())
    }

    pub async fn get_text(&self, url: &str) -> Result<String> {
        let response = self.get(url).await?;
        let status = response.status();
        let text = response.text().await?;
        Logger::new()
            .with_prefix("[http]")
            .debug(&format!("{} from {} ({} bytes)", status, url, text.len()));
        Ok(text)
    }

    /// GETs `url` and reports the status without treating 4xx/5xx as errors.
    pub async fn status(&self, url: &str) -> Result<StatusCode> {
        let url = parse_url(url)?;
        Ok(self.client.get(url).send().await?.status())
    }
}

pub fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))
}
