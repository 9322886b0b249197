//! Extraction pipeline
//!
//! Entry point for turning a target URL into a record. Person URLs go
//! through the partner API first and fall back to scraping when the API
//! signals an internal error or a private profile; organization URLs are
//! always scraped. A person record with a resolvable current employer
//! gets that organization's record nested under `company`.

pub mod api;
pub mod organization;
pub mod person;

pub use api::{ApiClient, ApiOutcome, FallbackReason};

use crate::browser::{BrowserPage, Navigator, SessionManager};
use crate::config::NavigationConfig;
use crate::record::{OrganizationRecord, ProfileRecord, Record};
use crate::url::EntityKind;
use crate::{Result, VitaeError};
use serde::Serialize;

/// Caller-facing switches for one extraction
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    /// Skip the API and scrape the profile directly
    pub force_scrape: bool,
    /// Leave the `company` field empty even when resolvable
    pub skip_organization: bool,
}

/// Boundary envelope: exactly one of `error` and `result` is set, except
/// for not-found targets where both stay null
#[derive(Debug, Serialize)]
pub struct RequestOutcome {
    pub error: Option<String>,
    pub result: Option<Record>,
}

/// Drives extraction over one browser page
pub struct Pipeline<'a> {
    page: &'a dyn BrowserPage,
    navigation: NavigationConfig,
    session: SessionManager,
    api: Option<ApiClient>,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        page: &'a dyn BrowserPage,
        navigation: NavigationConfig,
        session: SessionManager,
        api: Option<ApiClient>,
    ) -> Self {
        Self {
            page,
            navigation,
            session,
            api,
        }
    }

    /// Extracts the record behind a URL
    ///
    /// `Ok(None)` means the target does not exist (unavailable profile,
    /// empty page); malformed or unclassifiable URLs are errors.
    pub async fn fetch(&mut self, url: &str, options: &ExtractOptions) -> Result<Option<Record>> {
        let canonical = crate::url::canonicalize(url)?;
        let kind = crate::url::classify(&canonical)?.ok_or_else(|| {
            VitaeError::InvalidTarget(format!(
                "\"{canonical}\" is not a profile or organization URL"
            ))
        })?;
        tracing::info!("Getting data from \"{}\"", canonical);

        let nav = Navigator::new(self.page, self.navigation.clone());
        match kind {
            EntityKind::Organization => {
                let org = organization::scrape_organization(
                    self.page,
                    &nav,
                    &mut self.session,
                    &canonical,
                )
                .await?;
                Ok(org.map(Record::Organization))
            }
            EntityKind::Person => {
                let Some(mut profile) = self.fetch_person(&nav, &canonical, options).await? else {
                    return Ok(None);
                };
                if !options.skip_organization {
                    profile.company = self.resolve_company(&nav, &profile).await?;
                }
                Ok(Some(Record::Profile(profile)))
            }
        }
    }

    /// Runs one extraction and folds every outcome into the envelope;
    /// this boundary never returns `Err`
    pub async fn handle_request(&mut self, url: &str, options: &ExtractOptions) -> RequestOutcome {
        match self.fetch(url, options).await {
            Ok(result) => RequestOutcome {
                error: None,
                result,
            },
            Err(e) => {
                tracing::error!("Extraction failed for {}: {}", url, e);
                RequestOutcome {
                    error: Some(e.to_string()),
                    result: None,
                }
            }
        }
    }

    async fn fetch_person(
        &mut self,
        nav: &Navigator<'a>,
        canonical: &str,
        options: &ExtractOptions,
    ) -> Result<Option<ProfileRecord>> {
        if !options.force_scrape {
            if let Some(api) = &self.api {
                match api.fetch_profile(canonical).await? {
                    ApiOutcome::Profile(record) => return Ok(Some(record)),
                    ApiOutcome::Fallback(reason) => {
                        tracing::info!("Scraping {} instead of API: {:?}", canonical, reason);
                    }
                    ApiOutcome::Invalid(message) => {
                        return Err(VitaeError::InvalidTarget(message));
                    }
                }
            }
        }
        person::scrape_profile(self.page, nav, &mut self.session, canonical).await
    }

    /// Follows the profile's current employer link when it resolves to an
    /// organization URL; anything unresolvable means no nesting, not an
    /// error
    async fn resolve_company(
        &mut self,
        nav: &Navigator<'a>,
        profile: &ProfileRecord,
    ) -> Result<Option<OrganizationRecord>> {
        let Some(raw) = profile.current_company_url() else {
            return Ok(None);
        };
        let Ok(canonical) = crate::url::canonicalize(raw) else {
            return Ok(None);
        };
        match crate::url::classify(&canonical) {
            Ok(Some(EntityKind::Organization)) => {
                organization::scrape_organization(self.page, nav, &mut self.session, &canonical)
                    .await
            }
            _ => Ok(None),
        }
    }
}
