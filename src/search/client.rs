//! Blocking `ureq` client for the Gallica SRU endpoint.

use super::{SearchPage, SearchService, sru};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use futures::future::BoxFuture;
use std::sync::Arc;
use std::thread;
use tracing::{debug, warn};

/// Gallica SRU search client.
///
/// Requests are blocking and run on tokio's blocking pool. Transport errors,
/// `429` and `5xx` responses are retried with exponential backoff.
#[derive(Clone)]
pub struct GallicaClient {
    inner: Arc<Inner>,
}

struct Inner {
    agent: ureq::Agent,
    config: ClientConfig,
}

/// Outcome of a single attempt.
enum Attempt {
    Done(String),
    Retry(Error),
    Fail(Error),
}

impl GallicaClient {
    /// Create a client with the given configuration.
    pub fn new(config: ClientConfig) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(config.timeout))
            .build()
            .into();
        Self {
            inner: Arc::new(Inner { agent, config }),
        }
    }

    /// Client against the public endpoint with default settings.
    pub fn with_defaults() -> Self {
        Self::new(ClientConfig::default())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Run a search synchronously.
    pub fn search_blocking(&self, query: &str, start: u32, limit: u32) -> Result<SearchPage> {
        let body = self.inner.fetch_with_retry(query, start, limit)?;
        sru::parse_response(&body)
    }
}

impl Inner {
    fn attempt(&self, query: &str, start: u32, limit: u32) -> Attempt {
        let response = self
            .agent
            .get(&self.config.base_url)
            .query("operation", "searchRetrieve")
            .query("version", &self.config.version)
            .query("query", query)
            .query("startRecord", start.to_string())
            .query("maximumRecords", limit.to_string())
            .header("User-Agent", &self.config.user_agent)
            .call();

        match response {
            Ok(mut resp) => match resp.body_mut().read_to_string() {
                Ok(body) => Attempt::Done(body),
                Err(e) => Attempt::Retry(Error::Http(format!("failed to read body: {}", e))),
            },
            Err(ureq::Error::StatusCode(code)) if code == 429 || code >= 500 => {
                Attempt::Retry(Error::Http(format!("status {}", code)))
            }
            Err(ureq::Error::StatusCode(code)) => Attempt::Fail(Error::Http(format!("status {}", code))),
            Err(e) => Attempt::Retry(Error::Http(e.to_string())),
        }
    }

    fn fetch_with_retry(&self, query: &str, start: u32, limit: u32) -> Result<String> {
        let mut delay = self.config.retry_delay;
        let mut attempt = 0;

        loop {
            debug!(query, start, limit, attempt, "SRU searchRetrieve");
            match self.attempt(query, start, limit) {
                Attempt::Done(body) => return Ok(body),
                Attempt::Fail(e) => return Err(e),
                Attempt::Retry(e) => {
                    if attempt >= self.config.max_retries {
                        return Err(e);
                    }
                    warn!(error = %e, attempt, "SRU request failed, retrying in {:?}", delay);
                    thread::sleep(delay);
                    delay *= 2;
                    attempt += 1;
                }
            }
        }
    }
}

impl SearchService for GallicaClient {
    fn search<'a>(
        &'a self,
        query: &'a str,
        start: u32,
        limit: u32,
    ) -> BoxFuture<'a, Result<SearchPage>> {
        let client = self.clone();
        let query = query.to_string();
        Box::pin(async move {
            tokio::task::spawn_blocking(move || client.search_blocking(&query, start, limit))
                .await
                .map_err(|e| Error::Internal(format!("search task failed: {}", e)))?
        })
    }
}
