use serde::Deserialize;

/// Main configuration structure for Sumula
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub listing: ListingConfig,
    #[serde(default)]
    pub backoff: BackoffConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    pub storage: StorageConfig,
    #[serde(rename = "derby-group", default)]
    pub derby_groups: Vec<DerbyGroupEntry>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Team slugs to harvest (e.g. "sao-paulo")
    pub teams: Vec<String>,

    /// First season to request (inclusive)
    #[serde(rename = "start-year", default = "default_start_year")]
    pub start_year: i32,

    /// Last season to request (inclusive)
    #[serde(rename = "end-year", default = "default_end_year")]
    pub end_year: i32,

    /// Listing pages requested per team and year
    #[serde(default = "default_pages")]
    pub pages: Vec<u32>,

    /// Keep only intra-state rivalry matches
    #[serde(rename = "rivalry-only", default)]
    pub rivalry_only: bool,

    /// Maximum number of requests in flight
    #[serde(rename = "max-concurrent-requests", default = "default_concurrency")]
    pub max_concurrent_requests: u32,

    /// Minimum spacing between request issuances (milliseconds)
    #[serde(
        rename = "minimum-time-between-requests",
        default = "default_request_spacing"
    )]
    pub minimum_time_between_requests: u64,

    /// Site root used to build listing URLs
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout", default = "default_request_timeout")]
    pub request_timeout: u64,
}

/// Which historical listing markup the column positions follow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListingLayout {
    #[default]
    Current,
    Legacy,
}

/// Listing table interpretation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingConfig {
    #[serde(default)]
    pub layout: ListingLayout,

    /// Explicit 1-based column positions; unset fields fall back to the layout
    #[serde(default)]
    pub columns: ColumnOverrides,
}

/// Optional per-field column overrides
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ColumnOverrides {
    pub competition: Option<usize>,
    pub date: Option<usize>,
    pub venue: Option<usize>,
    pub opponent: Option<usize>,
    pub result: Option<usize>,
    pub score: Option<usize>,
}

/// Progressive pause applied when the site signals blocking
#[derive(Debug, Clone, Deserialize)]
pub struct BackoffConfig {
    /// Pause per consecutive block signal (seconds)
    #[serde(rename = "base-interval", default = "default_base_interval")]
    pub base_interval: u64,

    /// Upper bound on a single pause (seconds)
    #[serde(default = "default_cap")]
    pub cap: u64,

    /// HTTP statuses treated as a block signal
    #[serde(rename = "block-statuses", default = "default_block_statuses")]
    pub block_statuses: Vec<u16>,

    /// How many times a blocked request is re-issued after the pause; 0 skips it
    #[serde(rename = "max-block-retries", default = "default_max_block_retries")]
    pub max_block_retries: u32,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base_interval: default_base_interval(),
            cap: default_cap(),
            block_statuses: default_block_statuses(),
            max_block_retries: default_max_block_retries(),
        }
    }
}

/// Pool of client identities rotated across requests
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    #[serde(default = "default_user_agents")]
    pub pool: Vec<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            pool: default_user_agents(),
        }
    }
}

/// Persistence backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SinkBackend {
    /// Single table with the listing fields
    Flat,
    /// Match table with JSON lineup and statistics columns
    Document,
    /// Teams, players, lineups and card events in separate tables
    #[default]
    Normalized,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: SinkBackend,

    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Records ingested between commits
    #[serde(rename = "batch-size", default = "default_batch_size")]
    pub batch_size: usize,
}

/// A configured rivalry region
#[derive(Debug, Clone, Deserialize)]
pub struct DerbyGroupEntry {
    pub region: String,
    pub teams: Vec<String>,
}

fn default_start_year() -> i32 {
    2000
}

fn default_end_year() -> i32 {
    2025
}

fn default_pages() -> Vec<u32> {
    vec![1, 2]
}

fn default_concurrency() -> u32 {
    8
}

fn default_request_spacing() -> u64 {
    250
}

fn default_base_url() -> String {
    "https://www.ogol.com.br".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_base_interval() -> u64 {
    360
}

fn default_cap() -> u64 {
    420
}

fn default_block_statuses() -> Vec<u16> {
    vec![302]
}

fn default_max_block_retries() -> u32 {
    0
}

fn default_batch_size() -> usize {
    10
}

fn default_user_agents() -> Vec<String> {
    [
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.6261.57 Safari/537.36",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_4) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
        "Mozilla/5.0 (Linux; Android 14; Pixel 8 Pro) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.6312.58 Mobile Safari/537.36",
        "Mozilla/5.0 (iPhone; CPU iPhone OS 17_4 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Mobile/15E148 Safari/604.1",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_3) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.6312.58 Safari/537.36 Edg/123.0.2420.81",
        "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:123.0) Gecko/20100101 Firefox/123.0",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
