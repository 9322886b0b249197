//! Browser page abstraction
//!
//! The scraping side of the pipeline talks to a [`BrowserPage`] rather than
//! to the headless browser directly. This is the seam that lets navigation,
//! session and extraction logic run against fixture pages in tests; the real
//! implementation in [`chrome`] drives a Chrome tab over CDP.

pub mod chrome;
pub mod navigate;
pub mod session;

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub use chrome::{ChromeBrowser, ChromePage};
pub use navigate::Navigator;
pub use session::{Session, SessionManager};

/// Errors raised by a browser page
///
/// Classification is central: only `Timeout` is transient and retryable.
/// `Crashed` is retried at the crawl-loop level on the same frontier entry;
/// everything else is fatal for the current unit of work.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("Navigation timeout: {0}")]
    Timeout(String),

    #[error("Page crashed: {0}")]
    Crashed(String),

    #[error("Browser error: {0}")]
    Other(String),
}

/// Result type for page operations
pub type PageResult<T> = std::result::Result<T, PageError>;

/// A cookie as persisted in the session file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    #[serde(default = "default_cookie_path")]
    pub path: String,
    /// Seconds since the epoch; session cookies carry no expiry
    #[serde(default)]
    pub expires: Option<f64>,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub http_only: bool,
}

fn default_cookie_path() -> String {
    "/".to_string()
}

/// One loaded browser page
///
/// Methods are synchronous because the underlying CDP client is; async retry
/// and pacing live in [`Navigator`] and the orchestrator on top of this.
pub trait BrowserPage {
    /// Navigates to a URL and waits for the load to settle
    fn navigate(&self, url: &str, timeout: Duration) -> PageResult<()>;

    /// The page's current URL (after any redirects)
    fn current_url(&self) -> String;

    /// Full HTML of the current document
    fn content(&self) -> PageResult<String>;

    /// Waits until a selector matches, or times out
    fn wait_for(&self, selector: &str, timeout: Duration) -> PageResult<()>;

    /// Whether a selector currently matches, without waiting
    fn exists(&self, selector: &str) -> bool;

    /// Clicks the first element matching the selector (no navigation wait)
    fn click(&self, selector: &str) -> PageResult<()>;

    /// Waits for a navigation triggered elsewhere (click, form submit)
    fn wait_for_navigation(&self, timeout: Duration) -> PageResult<()>;

    /// Reloads the current page
    fn reload(&self, timeout: Duration) -> PageResult<()>;

    /// Scrolls to a fraction of the page height (0.0 = top, 1.0 = bottom)
    fn scroll_to(&self, fraction: f64) -> PageResult<()>;

    /// Focuses the first element matching the selector and types into it
    fn type_into(&self, selector: &str, text: &str) -> PageResult<()>;

    /// Current cookie set of the browsing context
    fn cookies(&self) -> PageResult<Vec<Cookie>>;

    /// Installs cookies into the browsing context
    fn set_cookies(&self, cookies: &[Cookie]) -> PageResult<()>;
}

/// Classifies an error message from the browser backend
///
/// CDP client errors arrive as strings; the recognized navigation-timeout
/// and target-crash shapes become their transient classes, everything else
/// is fatal.
pub(crate) fn classify_message(message: String) -> PageError {
    let lower = message.to_lowercase();
    if lower.contains("timed out") || lower.contains("timeout") {
        PageError::Timeout(message)
    } else if lower.contains("crashed") {
        PageError::Crashed(message)
    } else {
        PageError::Other(message)
    }
}
