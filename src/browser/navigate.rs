//! Navigation with bounded retry
//!
//! Every page transition goes through [`Navigator`]: direct navigation,
//! click-triggered navigation, reloads, and the scroll dance that forces
//! lazy-loaded sections to render. Only the recognized navigation-timeout
//! class is retried; any other failure surfaces unchanged.

use crate::browser::{BrowserPage, PageError};
use crate::config::NavigationConfig;
use crate::{Result, VitaeError};
use rand::Rng;
use std::time::Duration;

const BACKOFF_BASE_MS: u64 = 1_000;
const BACKOFF_CAP_MS: u64 = 15_000;
const SELECTOR_POLL_TIMEOUT: Duration = Duration::from_secs(1);

/// Wraps a page with retrying navigation primitives
pub struct Navigator<'a> {
    page: &'a dyn BrowserPage,
    config: NavigationConfig,
}

impl<'a> Navigator<'a> {
    pub fn new(page: &'a dyn BrowserPage, config: NavigationConfig) -> Self {
        Self { page, config }
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(self.config.page_timeout_ms)
    }

    /// Navigates to a URL, retrying transient timeouts with randomized
    /// exponential backoff; exhausting the attempt budget is fatal
    pub async fn go_to(&self, url: &str) -> Result<()> {
        let mut backoff = BACKOFF_BASE_MS;
        for attempt in 1..=self.config.max_nav_attempts {
            match self.page.navigate(url, self.timeout()) {
                Ok(()) => {
                    tracing::debug!("Arrived at {}", self.page.current_url());
                    return Ok(());
                }
                Err(PageError::Timeout(msg)) => {
                    tracing::warn!(
                        "Navigation timeout on attempt {}/{} for {}: {}",
                        attempt,
                        self.config.max_nav_attempts,
                        url,
                        msg
                    );
                    self.sleep_backoff(&mut backoff).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(VitaeError::NavigationExhausted {
            url: url.to_string(),
            attempts: self.config.max_nav_attempts,
        })
    }

    /// Clicks an element and races the click against navigation completion
    ///
    /// A timeout triggers one reload before the next attempt; non-timeout
    /// errors propagate immediately.
    pub async fn click_through(&self, selector: &str) -> Result<()> {
        for attempt in 1..=self.config.max_nav_attempts {
            self.page.click(selector)?;
            match self.page.wait_for_navigation(self.timeout()) {
                Ok(()) => return Ok(()),
                Err(PageError::Timeout(msg)) => {
                    tracing::warn!(
                        "Click navigation timeout on attempt {}/{} for {}: {}",
                        attempt,
                        self.config.max_nav_attempts,
                        selector,
                        msg
                    );
                    self.reload().await?;
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(VitaeError::ClickExhausted {
            selector: selector.to_string(),
            attempts: self.config.max_nav_attempts,
        })
    }

    /// Waits for a selector using the configured page timeout
    pub fn wait_for(&self, selector: &str) -> Result<()> {
        self.page.wait_for(selector, self.timeout())?;
        Ok(())
    }

    /// Reloads the current page, bounded by the configured attempt count
    ///
    /// Exhausting the attempts means connectivity is gone and the crawl
    /// cannot make progress.
    pub async fn reload(&self) -> Result<()> {
        for attempt in 1..=self.config.max_reload_attempts {
            match self.page.reload(self.timeout()) {
                Ok(()) => return Ok(()),
                Err(PageError::Timeout(msg)) => {
                    tracing::warn!(
                        "Reload timeout on attempt {}/{}: {}",
                        attempt,
                        self.config.max_reload_attempts,
                        msg
                    );
                    tokio::time::sleep(Duration::from_millis(BACKOFF_BASE_MS)).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(VitaeError::ConnectivityLost)
    }

    /// Scrolls to increasing fractional page positions until the selector
    /// becomes visible, cycling back to the top when the bottom is reached
    ///
    /// Bounded by the configured step budget so a structurally broken page
    /// cannot spin forever.
    pub async fn scroll_until_visible(&self, selector: &str, start: f64) -> Result<()> {
        let mut position = start;
        for _ in 0..self.config.max_scroll_steps {
            self.page.scroll_to(position)?;
            match self.page.wait_for(selector, SELECTOR_POLL_TIMEOUT) {
                Ok(()) => return Ok(()),
                Err(PageError::Timeout(_)) => {
                    position = if position >= 1.0 { 0.0 } else { position + 0.1 };
                    tracing::debug!("Scrolling again to {:.1}...", position);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(VitaeError::ScrollTargetMissing {
            selector: selector.to_string(),
        })
    }

    async fn sleep_backoff(&self, backoff: &mut u64) {
        let jitter = rand::thread_rng().gen_range(0..500);
        tokio::time::sleep(Duration::from_millis(*backoff + jitter)).await;
        *backoff = (*backoff * 2).min(BACKOFF_CAP_MS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::{Cookie, PageResult};
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;

    /// A page whose operations fail according to a script, for exercising
    /// the retry paths without a browser.
    #[derive(Default)]
    struct ScriptedPage {
        nav_failures: RefCell<VecDeque<PageError>>,
        wait_nav_failures: RefCell<VecDeque<PageError>>,
        reload_failures: RefCell<VecDeque<PageError>>,
        nav_calls: Cell<u32>,
        reload_calls: Cell<u32>,
        click_calls: Cell<u32>,
        scroll_calls: Cell<u32>,
        /// Selector becomes visible after this many scroll positions
        visible_after: Cell<u32>,
    }

    fn pop(queue: &RefCell<VecDeque<PageError>>) -> PageResult<()> {
        match queue.borrow_mut().pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    impl BrowserPage for ScriptedPage {
        fn navigate(&self, _url: &str, _timeout: Duration) -> PageResult<()> {
            self.nav_calls.set(self.nav_calls.get() + 1);
            pop(&self.nav_failures)
        }

        fn current_url(&self) -> String {
            "https://example.com/in/joana".to_string()
        }

        fn content(&self) -> PageResult<String> {
            Ok("<html></html>".to_string())
        }

        fn wait_for(&self, _selector: &str, _timeout: Duration) -> PageResult<()> {
            if self.scroll_calls.get() >= self.visible_after.get() {
                Ok(())
            } else {
                Err(PageError::Timeout("selector not visible".to_string()))
            }
        }

        fn exists(&self, _selector: &str) -> bool {
            false
        }

        fn click(&self, _selector: &str) -> PageResult<()> {
            self.click_calls.set(self.click_calls.get() + 1);
            Ok(())
        }

        fn wait_for_navigation(&self, _timeout: Duration) -> PageResult<()> {
            pop(&self.wait_nav_failures)
        }

        fn reload(&self, _timeout: Duration) -> PageResult<()> {
            self.reload_calls.set(self.reload_calls.get() + 1);
            pop(&self.reload_failures)
        }

        fn scroll_to(&self, _fraction: f64) -> PageResult<()> {
            self.scroll_calls.set(self.scroll_calls.get() + 1);
            Ok(())
        }

        fn type_into(&self, _selector: &str, _text: &str) -> PageResult<()> {
            Ok(())
        }

        fn cookies(&self) -> PageResult<Vec<Cookie>> {
            Ok(vec![])
        }

        fn set_cookies(&self, _cookies: &[Cookie]) -> PageResult<()> {
            Ok(())
        }
    }

    fn test_config() -> NavigationConfig {
        NavigationConfig {
            page_timeout_ms: 1000,
            max_nav_attempts: 3,
            max_reload_attempts: 3,
            max_scroll_steps: 12,
        }
    }

    fn timeout() -> PageError {
        PageError::Timeout("Navigation timed out".to_string())
    }

    #[tokio::test(start_paused = true)]
    async fn test_go_to_retries_timeouts_then_succeeds() {
        let page = ScriptedPage::default();
        page.nav_failures
            .borrow_mut()
            .extend([timeout(), timeout()]);
        let nav = Navigator::new(&page, test_config());

        nav.go_to("https://example.com/in/joana").await.unwrap();
        assert_eq!(page.nav_calls.get(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_go_to_exhausts_attempt_budget() {
        let page = ScriptedPage::default();
        page.nav_failures
            .borrow_mut()
            .extend([timeout(), timeout(), timeout()]);
        let nav = Navigator::new(&page, test_config());

        let err = nav.go_to("https://example.com/in/joana").await.unwrap_err();
        assert!(matches!(
            err,
            VitaeError::NavigationExhausted { attempts: 3, .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_go_to_non_timeout_is_fatal_immediately() {
        let page = ScriptedPage::default();
        page.nav_failures
            .borrow_mut()
            .push_back(PageError::Other("net::ERR_CONNECTION_REFUSED".to_string()));
        let nav = Navigator::new(&page, test_config());

        let err = nav.go_to("https://example.com/in/joana").await.unwrap_err();
        assert!(matches!(err, VitaeError::Page(PageError::Other(_))));
        assert_eq!(page.nav_calls.get(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_through_reloads_on_timeout() {
        let page = ScriptedPage::default();
        page.wait_nav_failures.borrow_mut().push_back(timeout());
        let nav = Navigator::new(&page, test_config());

        nav.click_through("a.experience-item__link").await.unwrap();
        assert_eq!(page.click_calls.get(), 2);
        assert_eq!(page.reload_calls.get(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_through_exhaustion_names_the_selector() {
        let page = ScriptedPage::default();
        page.wait_nav_failures
            .borrow_mut()
            .extend([timeout(), timeout(), timeout()]);
        let nav = Navigator::new(&page, test_config());

        let err = nav.click_through("a.experience-item__link").await.unwrap_err();
        match err {
            VitaeError::ClickExhausted { selector, attempts } => {
                assert_eq!(selector, "a.experience-item__link");
                assert_eq!(attempts, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(page.click_calls.get(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reload_exhaustion_means_connectivity_lost() {
        let page = ScriptedPage::default();
        page.reload_failures
            .borrow_mut()
            .extend([timeout(), timeout(), timeout()]);
        let nav = Navigator::new(&page, test_config());

        let err = nav.reload().await.unwrap_err();
        assert!(matches!(err, VitaeError::ConnectivityLost));
        assert_eq!(page.reload_calls.get(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scroll_until_visible_stops_when_found() {
        let page = ScriptedPage::default();
        page.visible_after.set(4);
        let nav = Navigator::new(&page, test_config());

        nav.scroll_until_visible("#experience-section", 0.5)
            .await
            .unwrap();
        assert_eq!(page.scroll_calls.get(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scroll_until_visible_is_bounded() {
        let page = ScriptedPage::default();
        page.visible_after.set(u32::MAX);
        let nav = Navigator::new(&page, test_config());

        let err = nav
            .scroll_until_visible("#experience-section", 0.5)
            .await
            .unwrap_err();
        assert!(matches!(err, VitaeError::ScrollTargetMissing { .. }));
        assert_eq!(page.scroll_calls.get(), 12);
    }
}
