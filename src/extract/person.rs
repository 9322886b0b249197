//! Person profile scraping
//!
//! The scrape path drives a live page to the profile, nudges lazy
//! sections into rendering, then parses the resulting HTML offline. The
//! parsing half is a pure function over the document so it can be
//! exercised against fixture HTML without a browser.

use crate::browser::{BrowserPage, Navigator, SessionManager};
use crate::record::{non_empty, parse_count, Position, ProfileRecord, RelatedProfile};
use crate::Result;
use scraper::{ElementRef, Html, Selector};

/// Destination the site substitutes for profiles that no longer exist
const UNAVAILABLE_MARKER: &str = "/in/unavailable";

const PROFILE_CONTENT: &str = "section.profile-content";
const SUMMARY_TOGGLE: &str = "button.top-card__summary-toggle";
const COMPANY_MARKER: &str = "span.top-card__company-name";
const EXPERIENCE_SECTION: &str = "#experience-section";

/// One optional text field: where it lives and where it lands
struct FieldSpec {
    selector: &'static str,
    apply: fn(&mut ProfileRecord, String),
}

const PROFILE_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        selector: "h2.top-card__headline",
        apply: |r, v| r.headline = Some(v),
    },
    FieldSpec {
        selector: "h3.top-card__location",
        apply: |r, v| r.location = Some(v),
    },
    FieldSpec {
        selector: "p.top-card__summary",
        apply: |r, v| r.summary = Some(v),
    },
    FieldSpec {
        selector: "a.top-card__education span",
        apply: |r, v| r.school = Some(v),
    },
];

/// Loads a profile page and parses it, returning `None` for profiles the
/// site reports as unavailable
pub async fn scrape_profile(
    page: &dyn BrowserPage,
    nav: &Navigator<'_>,
    session: &mut SessionManager,
    canonical_url: &str,
) -> Result<Option<ProfileRecord>> {
    nav.go_to(canonical_url).await?;
    if session.ensure_valid(page)? {
        // logging in navigated away, come back
        nav.go_to(canonical_url).await?;
    }

    if page.current_url().contains(UNAVAILABLE_MARKER) {
        tracing::info!("Profile {} is unavailable", canonical_url);
        return Ok(None);
    }

    nav.wait_for(PROFILE_CONTENT)?;

    if page.exists(SUMMARY_TOGGLE) {
        page.click(SUMMARY_TOGGLE)?;
    }
    // the experience section only renders once scrolled into view, and
    // only profiles with a current employer have one worth waiting for
    if page.exists(COMPANY_MARKER) {
        nav.scroll_until_visible(EXPERIENCE_SECTION, 0.5).await?;
    }

    let html = page.content()?;
    Ok(parse_profile(&html, canonical_url))
}

/// Parses a rendered profile document into a record
///
/// Returns `None` when the name heading is missing, which is how an
/// empty or interstitial page manifests.
pub fn parse_profile(html: &str, canonical_url: &str) -> Option<ProfileRecord> {
    let doc = Html::parse_document(html);

    let name = select_text(&doc.root_element(), "h1.top-card__name")?;
    let (first_name, last_name) = split_name(&name);

    let mut record = ProfileRecord {
        canonical_url: canonical_url.to_string(),
        first_name,
        last_name,
        ..Default::default()
    };

    for field in PROFILE_FIELDS {
        if let Some(value) = select_text(&doc.root_element(), field.selector) {
            (field.apply)(&mut record, value);
        }
    }

    record.connections = select_text(&doc.root_element(), "span.top-card__connections")
        .as_deref()
        .and_then(parse_count)
        .map(|n| n as u32);

    record.positions = select_all(&doc, "#experience-section li")
        .iter()
        .filter_map(|item| parse_position(item, canonical_url))
        .collect();

    record.related_profiles = select_all(&doc, "section.browsemap li")
        .iter()
        .filter_map(|item| parse_related(item, canonical_url))
        .collect();

    Some(record)
}

fn parse_position(item: &ElementRef, base: &str) -> Option<Position> {
    let company_name = select_text(item, "span.experience-item__company")?;
    Some(Position {
        title: select_text(item, "span.experience-item__title"),
        company_name,
        company_url: select_href(item, "a.experience-item__link", base),
    })
}

fn parse_related(item: &ElementRef, base: &str) -> Option<RelatedProfile> {
    let name = select_text(item, "span.browsemap__name")?;
    let url = select_href(item, "a.browsemap__link", base)?;
    Some(RelatedProfile {
        name,
        headline: select_text(item, "p.browsemap__headline"),
        url,
    })
}

pub(crate) fn select_text(scope: &ElementRef, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    let element = scope.select(&sel).next()?;
    non_empty(&element.text().collect::<String>())
}

fn select_all<'a>(doc: &'a Html, selector: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(selector) {
        Ok(sel) => doc.select(&sel).collect(),
        Err(_) => Vec::new(),
    }
}

/// Resolves an anchor's href against the page URL; site-relative links
/// are the common case
fn select_href(scope: &ElementRef, selector: &str, base: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    let href = scope.select(&sel).next()?.value().attr("href")?;
    if href.starts_with("http") {
        return Some(href.to_string());
    }
    let base = url::Url::parse(base).ok()?;
    base.join(href).ok().map(|u| u.to_string())
}

/// Splits a display name at the first space; single-word names keep the
/// whole text as the first name
fn split_name(name: &str) -> (String, String) {
    match name.split_once(' ') {
        Some((first, rest)) => (first.to_string(), rest.trim().to_string()),
        None => (name.to_string(), String::new()),
    }
}
