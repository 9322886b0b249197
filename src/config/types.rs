use serde::Deserialize;

/// Main configuration structure for Vitae
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub credentials: CredentialsConfig,
    /// Absent means the API path is unavailable and every request scrapes
    #[serde(default)]
    pub api: Option<ApiConfig>,
    pub browser: BrowserConfig,
    #[serde(default)]
    pub navigation: NavigationConfig,
    pub pacing: PacingConfig,
    pub storage: StorageConfig,
}

/// Login credentials for the target site
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialsConfig {
    pub email: String,
    pub password: String,
}

/// Profile API access configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the profile API
    pub endpoint: String,
    pub key: String,
    pub secret: String,
}

/// Headless browser configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    /// Path to the persisted cookie file (JSON array of cookie objects)
    #[serde(rename = "cookies-path")]
    pub cookies_path: String,

    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_headless")]
    pub headless: bool,
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:124.0) Gecko/20100101 Firefox/124.0".to_string()
}

fn default_headless() -> bool {
    true
}

/// Bounds for navigation retry behavior
#[derive(Debug, Clone, Deserialize)]
pub struct NavigationConfig {
    /// Per-navigation timeout (milliseconds)
    #[serde(rename = "page-timeout-ms", default = "default_page_timeout")]
    pub page_timeout_ms: u64,

    /// Attempts before a timing-out navigation becomes fatal
    #[serde(rename = "max-nav-attempts", default = "default_nav_attempts")]
    pub max_nav_attempts: u32,

    /// Attempts before a failing reload means connectivity is lost
    #[serde(rename = "max-reload-attempts", default = "default_reload_attempts")]
    pub max_reload_attempts: u32,

    /// Scroll positions tried before giving up on a lazy-loaded section
    #[serde(rename = "max-scroll-steps", default = "default_scroll_steps")]
    pub max_scroll_steps: u32,
}

fn default_page_timeout() -> u64 {
    30_000
}

fn default_nav_attempts() -> u32 {
    5
}

fn default_reload_attempts() -> u32 {
    5
}

fn default_scroll_steps() -> u32 {
    30
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            page_timeout_ms: default_page_timeout(),
            max_nav_attempts: default_nav_attempts(),
            max_reload_attempts: default_reload_attempts(),
            max_scroll_steps: default_scroll_steps(),
        }
    }
}

/// Anti-detection pacing between crawl iterations
#[derive(Debug, Clone, Deserialize)]
pub struct PacingConfig {
    /// Lower bound of the randomized inter-entry delay (milliseconds)
    #[serde(rename = "min-delay-ms")]
    pub min_delay_ms: u64,

    /// Upper bound of the randomized inter-entry delay (milliseconds)
    #[serde(rename = "max-delay-ms")]
    pub max_delay_ms: u64,

    /// Consecutive page crashes tolerated on one frontier entry
    #[serde(rename = "max-crash-retries", default = "default_crash_retries")]
    pub max_crash_retries: u32,
}

fn default_crash_retries() -> u32 {
    3
}

/// Persistent store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database holding the frontier and records
    #[serde(rename = "database-path")]
    pub database_path: String,
}
