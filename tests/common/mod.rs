//! Shared test fixtures: a browser page backed by canned HTML
//!
//! Selector queries run against the currently loaded document with the
//! same engine the extractors use, so `exists`/`wait_for` behave the way
//! a rendered page would.

use scraper::{Html, Selector};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::time::Duration;
use vitae::browser::{BrowserPage, Cookie, PageError, PageResult};

pub struct FakePage {
    pages: HashMap<String, String>,
    current: RefCell<String>,
    nav_timeouts: Cell<u32>,
}

impl FakePage {
    pub fn new(pages: &[(&str, &str)]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(url, html)| (url.to_string(), html.to_string()))
                .collect(),
            current: RefCell::new(String::new()),
            nav_timeouts: Cell::new(0),
        }
    }

    /// Makes the next `n` navigations time out before succeeding
    pub fn fail_next_navigations(&self, n: u32) {
        self.nav_timeouts.set(n);
    }

    fn html(&self) -> String {
        self.pages
            .get(self.current.borrow().as_str())
            .cloned()
            .unwrap_or_default()
    }

    fn has(&self, selector: &str) -> bool {
        let Ok(sel) = Selector::parse(selector) else {
            return false;
        };
        Html::parse_document(&self.html()).select(&sel).next().is_some()
    }
}

impl BrowserPage for FakePage {
    fn navigate(&self, url: &str, _timeout: Duration) -> PageResult<()> {
        if self.nav_timeouts.get() > 0 {
            self.nav_timeouts.set(self.nav_timeouts.get() - 1);
            return Err(PageError::Timeout("Navigation timed out".to_string()));
        }
        *self.current.borrow_mut() = url.to_string();
        Ok(())
    }

    fn current_url(&self) -> String {
        self.current.borrow().clone()
    }

    fn content(&self) -> PageResult<String> {
        Ok(self.html())
    }

    fn wait_for(&self, selector: &str, _timeout: Duration) -> PageResult<()> {
        if self.has(selector) {
            Ok(())
        } else {
            Err(PageError::Timeout(format!("waiting for {selector}")))
        }
    }

    fn exists(&self, selector: &str) -> bool {
        self.has(selector)
    }

    fn click(&self, _selector: &str) -> PageResult<()> {
        Ok(())
    }

    fn wait_for_navigation(&self, _timeout: Duration) -> PageResult<()> {
        Ok(())
    }

    fn reload(&self, _timeout: Duration) -> PageResult<()> {
        Ok(())
    }

    fn scroll_to(&self, _fraction: f64) -> PageResult<()> {
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
