//! Client, report and server configuration.

use crate::discovery::DEFAULT_GRAPHICS_COUNT;
use std::time::Duration;

/// Default SRU endpoint of the Gallica digital library.
pub const DEFAULT_BASE_URL: &str = "https://gallica.bnf.fr/SRU";

/// Configuration for the SRU search client.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// SRU endpoint
    pub base_url: String,
    /// SRU protocol version sent with each request
    pub version: String,
    /// Global timeout for one HTTP request
    pub timeout: Duration,
    /// How many times a failed request is retried
    pub max_retries: u32,
    /// Delay before the first retry; doubled on every further attempt
    pub retry_delay: Duration,
    /// User-Agent header
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            version: "1.2".to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_delay: Duration::from_millis(500),
            user_agent: concat!("gallica-mcp/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    /// Create a config pointing at a specific endpoint.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum number of retries.
    pub fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }

    /// Set the base retry delay.
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }
}

/// Defaults applied by the report state machine.
#[derive(Clone, Debug)]
pub struct ReportConfig {
    /// Page count used when the caller omits `pageCount`
    pub default_page_count: u32,
    /// Source count used when the caller omits `sourceCount`
    pub default_source_count: u32,
    /// Number of graphics requested when graphics are enabled
    pub graphics_count: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            default_page_count: 4,
            default_source_count: 10,
            graphics_count: DEFAULT_GRAPHICS_COUNT,
        }
    }
}

impl ReportConfig {
    /// Set the default page count.
    pub fn default_page_count(mut self, n: u32) -> Self {
        self.default_page_count = n.max(1);
        self
    }

    /// Set the default source count.
    pub fn default_source_count(mut self, n: u32) -> Self {
        self.default_source_count = n.max(1);
        self
    }

    /// Set the number of graphics to discover.
    pub fn graphics_count(mut self, n: usize) -> Self {
        self.graphics_count = n;
        self
    }
}

/// Configuration for the tool server.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub client: ClientConfig,
    pub report: ReportConfig,
    /// `maximumRecords` used when a search tool call omits `max_results`
    pub default_max_records: u32,
    /// Upper bound on `maximumRecords` for a single search
    pub max_records_cap: u32,
    /// `startRecord` used when a search tool call omits `start_record`
    pub default_start_record: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            report: ReportConfig::default(),
            default_max_records: 10,
            max_records_cap: 50,
            default_start_record: 1,
        }
    }
}

impl ServerConfig {
    /// Set the client configuration.
    pub fn client(mut self, client: ClientConfig) -> Self {
        self.client = client;
        self
    }

    /// Set the report configuration.
    pub fn report(mut self, report: ReportConfig) -> Self {
        self.report = report;
        self
    }

    /// Set the default number of records per search.
    pub fn default_max_records(mut self, n: u32) -> Self {
        self.default_max_records = n;
        self
    }

    /// Clamp a requested record count into `1..=max_records_cap`.
    pub fn clamp_records(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_max_records)
            .clamp(1, self.max_records_cap.max(1))
    }
}
