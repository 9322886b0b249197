//! Vitae: a resilient profile/organization crawler
//!
//! This crate retrieves structured person-profile and organization records
//! from a social-network site, preferring an authenticated API call and
//! falling back to headless-browser scraping, and can walk the related-profile
//! graph breadth-first with a persistent frontier that survives restarts.

pub mod browser;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod record;
pub mod storage;
pub mod url;

use browser::PageError;
use storage::StorageError;
use thiserror::Error;

/// Main error type for Vitae operations
#[derive(Debug, Error)]
pub enum VitaeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Browser page error: {0}")]
    Page(#[from] PageError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid target URL: {0}")]
    InvalidTarget(String),

    #[error("Navigation to {url} failed after {attempts} attempts")]
    NavigationExhausted { url: String, attempts: u32 },

    #[error("Clicking {selector} never completed navigation after {attempts} attempts")]
    ClickExhausted { selector: String, attempts: u32 },

    #[error("The internet connection seems lost; the page cannot be reloaded")]
    ConnectivityLost,

    #[error("Selector {selector} never became visible while scrolling")]
    ScrollTargetMissing { selector: String },

    #[error("Unknown login page: no recognized credential form found")]
    UnknownLoginForm,

    #[error("Login blocked by a verification challenge at {url}")]
    ChallengeBlocked { url: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl VitaeError {
    /// True for the page-crash class of error, which the crawl loop retries
    /// on the same frontier entry instead of aborting.
    pub fn is_page_crash(&self) -> bool {
        matches!(self, VitaeError::Page(PageError::Crashed(_)))
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Vitae operations
pub type Result<T> = std::result::Result<T, VitaeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use record::{OrganizationRecord, ProfileRecord, Record};
pub use url::{canonicalize, classify, EntityKind};
