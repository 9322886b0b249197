//! Session persistence and login
//!
//! Cookies live in a JSON file between runs so a crawl can resume without
//! re-authenticating. When the restored cookies no longer carry a valid
//! session, [`SessionManager`] walks the login flow: it recognizes both
//! form layouts the site serves, submits credentials, and refuses to
//! continue when the site answers with a verification challenge (solving
//! those needs a human).

use crate::browser::{BrowserPage, Cookie};
use crate::config::{BrowserConfig, CredentialsConfig};
use crate::{Result, VitaeError};
use std::path::{Path, PathBuf};

/// Anchor that only renders for anonymous visitors
const LOGIN_INDICATOR: &str = "p.login > a, a[title=\"Sign in\"]";

/// URL path fragments of the human-verification interstitial
const CHALLENGE_MARKERS: &[&str] = &["/checkpoint/", "/challenge"];

/// One login form layout: field selectors plus the submit control
struct LoginForm {
    email: &'static str,
    password: &'static str,
    submit: &'static str,
}

const LOGIN_FORMS: &[LoginForm] = &[
    LoginForm {
        email: "#login-email",
        password: "#login-password",
        submit: "#login-submit",
    },
    LoginForm {
        email: "#username",
        password: "#password",
        submit: "button[aria-label=\"Sign in\"]",
    },
];

/// Where the login flow currently stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginState {
    Anonymous,
    FormDetected,
    CredentialsSubmitted,
    Authenticated,
    ChallengeBlocked,
}

/// Cookie jar bound to a file on disk
pub struct Session {
    path: PathBuf,
    cookies: Vec<Cookie>,
}

impl Session {
    /// Loads cookies from the configured file, creating an empty jar on
    /// disk when the file does not exist yet
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            std::fs::write(&path, "[]")?;
            tracing::info!("Created empty cookie jar at {}", path.display());
        }
        let raw = std::fs::read_to_string(&path)?;
        let cookies: Vec<Cookie> = serde_json::from_str(&raw)?;
        tracing::debug!("Restored {} cookies from {}", cookies.len(), path.display());
        Ok(Self { path, cookies })
    }

    pub fn cookies(&self) -> &[Cookie] {
        &self.cookies
    }

    /// Applies the stored cookies to a page before first navigation
    pub fn apply(&self, page: &dyn BrowserPage) -> Result<()> {
        if !self.cookies.is_empty() {
            page.set_cookies(&self.cookies)?;
        }
        Ok(())
    }

    /// Captures the page's current cookies and writes them to disk
    pub fn persist_from(&mut self, page: &dyn BrowserPage) -> Result<()> {
        self.cookies = page.cookies()?;
        let raw = serde_json::to_string_pretty(&self.cookies)?;
        std::fs::write(&self.path, raw)?;
        tracing::debug!("Persisted {} cookies to {}", self.cookies.len(), self.path.display());
        Ok(())
    }
}

/// Drives the login state machine over a live page
pub struct SessionManager {
    session: Session,
    credentials: CredentialsConfig,
}

impl SessionManager {
    pub fn new(config: &BrowserConfig, credentials: CredentialsConfig) -> Result<Self> {
        Ok(Self {
            session: Session::load(&config.cookies_path)?,
            credentials,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Seeds the page with the persisted cookie jar
    pub fn apply_cookies(&self, page: &dyn BrowserPage) -> Result<()> {
        self.session.apply(page)
    }

    /// Ensures the page carries an authenticated session, logging in when
    /// the login indicator is present
    ///
    /// Returns `true` when a login was performed, `false` when the
    /// restored session was already valid.
    pub fn ensure_valid(&mut self, page: &dyn BrowserPage) -> Result<bool> {
        let mut state = if page.exists(LOGIN_INDICATOR) {
            LoginState::Anonymous
        } else {
            LoginState::Authenticated
        };
        let mut performed_login = false;

        loop {
            state = match state {
                LoginState::Anonymous => {
                    tracing::info!("Session invalid, logging in");
                    match Self::detect_form(page) {
                        Some(_) => LoginState::FormDetected,
                        None => return Err(VitaeError::UnknownLoginForm),
                    }
                }
                LoginState::FormDetected => {
                    // detect_form succeeded one step earlier
                    let form = Self::detect_form(page).ok_or(VitaeError::UnknownLoginForm)?;
                    page.type_into(form.email, &self.credentials.email)?;
                    page.type_into(form.password, &self.credentials.password)?;
                    page.click(form.submit)?;
                    page.wait_for_navigation(std::time::Duration::from_secs(30))?;
                    performed_login = true;
                    LoginState::CredentialsSubmitted
                }
                LoginState::CredentialsSubmitted => {
                    let url = page.current_url();
                    if CHALLENGE_MARKERS.iter().any(|m| url.contains(m)) {
                        LoginState::ChallengeBlocked
                    } else {
                        LoginState::Authenticated
                    }
                }
                LoginState::ChallengeBlocked => {
                    return Err(VitaeError::ChallengeBlocked {
                        url: page.current_url(),
                    });
                }
                LoginState::Authenticated => {
                    if performed_login {
                        self.session.persist_from(page)?;
                        tracing::info!("Logged in as {}", self.credentials.email);
                    }
                    return Ok(performed_login);
                }
            };
        }
    }

    fn detect_form(page: &dyn BrowserPage) -> Option<&'static LoginForm> {
        LOGIN_FORMS
            .iter()
            .find(|form| page.exists(form.email) && page.exists(form.password))
    }
}
