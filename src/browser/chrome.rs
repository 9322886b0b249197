//! Headless Chrome implementation of [`BrowserPage`]
//!
//! One browser process, one tab: the crawl owns a single authenticated page
//! for its whole lifetime, so session cookies stay attached to one browsing
//! context.

use crate::browser::{classify_message, BrowserPage, Cookie, PageError, PageResult};
use crate::config::BrowserConfig;
use headless_chrome::protocol::cdp::Network;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;

fn into_page_error(e: anyhow::Error) -> PageError {
    classify_message(format!("{e:#}"))
}

/// The browser process; dropped, it terminates Chrome
pub struct ChromeBrowser {
    browser: Browser,
    user_agent: String,
}

impl ChromeBrowser {
    /// Launches a headless Chrome process
    pub fn launch(config: &BrowserConfig) -> PageResult<Self> {
        let args: Vec<&OsStr> = vec![
            OsStr::new("--no-sandbox"),
            OsStr::new("--disable-setuid-sandbox"),
            OsStr::new("--disable-notifications"),
            OsStr::new("--disable-dev-shm-usage"),
            OsStr::new("--lang=en_US"),
        ];

        let browser = Browser::new(LaunchOptions {
            headless: config.headless,
            window_size: Some((1600, 900)),
            args,
            ..Default::default()
        })
        .map_err(into_page_error)?;

        Ok(Self {
            browser,
            user_agent: config.user_agent.clone(),
        })
    }

    /// Opens a new tab with the configured user agent
    pub fn new_page(&self) -> PageResult<ChromePage> {
        let tab = self.browser.new_tab().map_err(into_page_error)?;
        tab.set_user_agent(&self.user_agent, Some("en-GB,en-US;q=0.9,en;q=0.8"), None)
            .map_err(into_page_error)?;
        Ok(ChromePage { tab })
    }
}

/// One Chrome tab behind the [`BrowserPage`] trait
pub struct ChromePage {
    tab: Arc<Tab>,
}

impl BrowserPage for ChromePage {
    fn navigate(&self, url: &str, timeout: Duration) -> PageResult<()> {
        self.tab.set_default_timeout(timeout);
        self.tab.navigate_to(url).map_err(into_page_error)?;
        self.tab.wait_until_navigated().map_err(into_page_error)?;
        Ok(())
    }

    fn current_url(&self) -> String {
        self.tab.get_url()
    }

    fn content(&self) -> PageResult<String> {
        self.tab.get_content().map_err(into_page_error)
    }

    fn wait_for(&self, selector: &str, timeout: Duration) -> PageResult<()> {
        self.tab
            .wait_for_element_with_custom_timeout(selector, timeout)
            .map(|_| ())
            .map_err(into_page_error)
    }

    fn exists(&self, selector: &str) -> bool {
        self.tab.find_element(selector).is_ok()
    }

    fn click(&self, selector: &str) -> PageResult<()> {
        self.tab
            .find_element(selector)
            .and_then(|element| element.click().map(|_| ()))
            .map_err(into_page_error)
    }

    fn wait_for_navigation(&self, timeout: Duration) -> PageResult<()> {
        self.tab.set_default_timeout(timeout);
        self.tab
            .wait_until_navigated()
            .map(|_| ())
            .map_err(into_page_error)
    }

    fn reload(&self, timeout: Duration) -> PageResult<()> {
        self.tab.set_default_timeout(timeout);
        self.tab.reload(false, None).map_err(into_page_error)?;
        self.tab
            .wait_until_navigated()
            .map(|_| ())
            .map_err(into_page_error)
    }

    fn scroll_to(&self, fraction: f64) -> PageResult<()> {
        self.tab
            .evaluate(
                &format!(
                    "window.scrollTo(0, document.body.scrollHeight * {:.2})",
                    fraction
                ),
                false,
            )
            .map(|_| ())
            .map_err(into_page_error)
    }

    fn type_into(&self, selector: &str, text: &str) -> PageResult<()> {
        self.tab
            .find_element(selector)
            .and_then(|element| element.click().map(|_| ()))
            .map_err(into_page_error)?;
        self.tab
            .type_str(text)
            .map(|_| ())
            .map_err(into_page_error)
    }

    fn cookies(&self) -> PageResult<Vec<Cookie>> {
        let cookies = self.tab.get_cookies().map_err(into_page_error)?;
        Ok(cookies.into_iter().map(from_cdp_cookie).collect())
    }

    fn set_cookies(&self, cookies: &[Cookie]) -> PageResult<()> {
        let params = cookies.iter().map(to_cdp_cookie).collect();
        self.tab.set_cookies(params).map_err(into_page_error)
    }
}

fn from_cdp_cookie(cookie: Network::Cookie) -> Cookie {
    Cookie {
        name: cookie.name,
        value: cookie.value,
        domain: cookie.domain,
        path: cookie.path,
        // CDP reports -1 for session cookies
        expires: (cookie.expires > 0.0).then_some(cookie.expires),
        secure: cookie.secure,
        http_only: cookie.http_only,
    }
}

fn to_cdp_cookie(cookie: &Cookie) -> Network::CookieParam {
    Network::CookieParam {
        name: cookie.name.clone(),
        value: cookie.value.clone(),
        url: None,
        domain: Some(cookie.domain.clone()),
        path: Some(cookie.path.clone()),
        secure: Some(cookie.secure),
        http_only: Some(cookie.http_only),
        same_site: None,
        expires: cookie.expires,
        priority: None,
        same_party: None,
        source_scheme: None,
        source_port: None,
        partition_key: None,
    }
}
