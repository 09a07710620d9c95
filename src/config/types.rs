use serde::Deserialize;

/// Main configuration structure for Sitemap-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub site: SiteConfig,
}

/// Crawl session configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Root of the site map to traverse
    #[serde(rename = "site-map-url")]
    pub site_map_url: String,

    /// Key the URL structure document is cached under
    #[serde(rename = "cache-key")]
    pub cache_key: String,

    /// Key the raw responses are cached under
    #[serde(rename = "url-cache-key")]
    pub url_cache_key: String,

    /// Load the URL structure from the cache instead of traversing
    #[serde(rename = "read-structure-cache", default)]
    pub read_structure_cache: bool,

    /// Load raw responses from the cache instead of fetching
    #[serde(rename = "read-response-cache", default)]
    pub read_response_cache: bool,

    /// Dump every fetched page into the html directory
    #[serde(rename = "debug-mode", default)]
    pub debug_mode: bool,

    /// Cap on the number of content pages fetched per run
    #[serde(rename = "fetch-limit", default)]
    pub fetch_limit: Option<usize>,
}

/// Fetch pool and transport configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Maximum number of simultaneously in-flight requests
    #[serde(rename = "max-concurrent-requests", default = "default_max_concurrent")]
    pub max_concurrent_requests: usize,

    /// Whole-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout")]
    pub timeout_secs: u64,

    /// Connect timeout (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: default_max_concurrent(),
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

fn default_max_concurrent() -> usize {
    200
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the user agent header: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite cache file
    #[serde(rename = "cache-path")]
    pub cache_path: String,

    /// Directory that receives raw pages in debug mode
    #[serde(rename = "html-dir", default = "default_html_dir")]
    pub html_dir: String,
}

fn default_html_dir() -> String {
    "./html_pages".to_string()
}

/// Settings for the bundled link-index site adapter
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Regex matching links that are sub-index pages to recurse into
    #[serde(rename = "index-pattern", default = "default_index_pattern")]
    pub index_pattern: String,

    /// Regex matching leaf links that are content pages
    #[serde(rename = "content-pattern", default = "default_content_pattern")]
    pub content_pattern: String,

    /// Maximum recursion depth below the site map root
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            index_pattern: default_index_pattern(),
            content_pattern: default_content_pattern(),
            max_depth: default_max_depth(),
        }
    }
}

fn default_index_pattern() -> String {
    r"sitemap".to_string()
}

fn default_content_pattern() -> String {
    r".".to_string()
}

fn default_max_depth() -> u32 {
    5
}
