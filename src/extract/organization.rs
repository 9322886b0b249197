//! Organization page scraping
//!
//! Organization details live on the canonical about page behind a
//! details panel that ships collapsed. The labelled fields arrive as
//! `dt`/`dd` pairs whose order shifts between page versions, so parsing
//! dispatches on the label text instead of positions. Parsing is
//! permissive throughout: a missing or malformed field becomes `None`,
//! only a missing name sinks the whole record.

use crate::browser::{BrowserPage, Navigator, SessionManager};
use crate::extract::person::select_text;
use crate::record::{parse_count, parse_year, OrganizationRecord};
use crate::url::about_url;
use crate::Result;
use scraper::{Html, Selector};

const ABOUT_TAB: &str = "a.org-nav__about-tab";
const ABOUT_TAB_ACTIVE: &str = "a.org-nav__about-tab.active";
const DETAILS_PANEL: &str = "dl.org-about__details";

/// Loads an organization's about page and parses it
pub async fn scrape_organization(
    page: &dyn BrowserPage,
    nav: &Navigator<'_>,
    session: &mut SessionManager,
    canonical_url: &str,
) -> Result<Option<OrganizationRecord>> {
    let about = about_url(canonical_url);
    nav.go_to(&about).await?;
    if session.ensure_valid(page)? {
        nav.go_to(&about).await?;
    }

    nav.wait_for(ABOUT_TAB)?;
    if !page.exists(ABOUT_TAB_ACTIVE) {
        // details panel ships collapsed behind the about tab
        nav.click_through(ABOUT_TAB).await?;
        nav.wait_for(DETAILS_PANEL)?;
    }

    let html = page.content()?;
    Ok(parse_organization(&html, canonical_url))
}

/// Parses a rendered about page into a record
///
/// Returns `None` when the name heading is missing.
pub fn parse_organization(html: &str, canonical_url: &str) -> Option<OrganizationRecord> {
    let doc = Html::parse_document(html);
    let root = doc.root_element();

    let name = select_text(&root, "h1.org-top-card__name")?;

    let mut record = OrganizationRecord {
        canonical_url: Some(canonical_url.to_string()),
        name,
        description: select_text(&root, "p.org-about__description"),
        followers: select_text(&root, "div.org-top-card__followers")
            .as_deref()
            .and_then(parse_count),
        members_on_platform: select_text(&root, "a.org-top-card__employees span")
            .as_deref()
            .and_then(parse_count),
        ..Default::default()
    };

    for (label, value) in labelled_details(&doc) {
        apply_detail(&mut record, &label, value);
    }

    Some(record)
}

/// Zips the details panel's `dt` labels with their `dd` values
fn labelled_details(doc: &Html) -> Vec<(String, String)> {
    let (Ok(dt), Ok(dd)) = (Selector::parse("dl > dt"), Selector::parse("dl > dd")) else {
        return Vec::new();
    };
    doc.select(&dt)
        .zip(doc.select(&dd))
        .filter_map(|(key, value)| {
            let key = key.text().collect::<String>().trim().to_string();
            let value = value.text().collect::<String>().trim().to_string();
            if key.is_empty() || value.is_empty() {
                None
            } else {
                Some((key, value))
            }
        })
        .collect()
}

/// Routes one labelled value into the record; unrecognized labels are
/// ignored so new page fields cannot break extraction
fn apply_detail(record: &mut OrganizationRecord, label: &str, value: String) {
    match label {
        "Website" => record.website = Some(value),
        "Industry" => record.industry = Some(value),
        "Company size" => record.company_size = Some(value),
        "Headquarters" => record.headquarters = Some(value),
        "Type" => record.company_type = Some(value),
        "Founded" => record.founded_year = parse_year(&value),
        "Specialties" => record.specialties = Some(value),
        _ => {}
    }
}
