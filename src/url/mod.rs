//! Canonical URL handling
//!
//! Profile and organization records are keyed by canonical URL, so every URL
//! entering the system (seed, frontier entry, discovered related profile,
//! company link) goes through [`canonicalize`] before comparison or storage.

use crate::UrlError;
use url::Url;

/// The two page shapes the extractor knows how to read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A person profile page (`/in/...`)
    Person,
    /// An organization page (`/company/...` or `/school/...`)
    Organization,
}

/// Canonicalizes a target URL for use as a unique key
///
/// Steps:
/// 1. Parse; reject malformed URLs and non-HTTP(S) schemes
/// 2. Drop fragment and query (tracking parameters carry no identity)
/// 3. Strip a trailing `/about` segment (organization detail sub-page)
/// 4. Strip the trailing slash, except for the bare root
///
/// # Examples
///
/// ```
/// use vitae::url::canonicalize;
///
/// let url = canonicalize("https://example.com/company/acme/about/").unwrap();
/// assert_eq!(url, "https://example.com/company/acme");
/// ```
pub fn canonicalize(url_str: &str) -> Result<String, UrlError> {
    let mut url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }
    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);
    url.set_query(None);

    let mut path = url.path().trim_end_matches('/').to_string();
    if let Some(stripped) = path.strip_suffix("/about") {
        path = stripped.to_string();
    }
    if path.is_empty() {
        path = "/".to_string();
    }
    url.set_path(&path);

    let mut canonical = url.to_string();
    // Url keeps a trailing slash on the root path; everything else was trimmed
    if canonical.ends_with('/') && url.path() != "/" {
        canonical.pop();
    }
    Ok(canonical)
}

/// Classifies a URL by its page shape
///
/// Returns `None` for URLs that are neither a person profile nor an
/// organization page; callers decide whether that is an error.
pub fn classify(url_str: &str) -> Result<Option<EntityKind>, UrlError> {
    let url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;
    let mut segments = url.path_segments().into_iter().flatten();

    Ok(match segments.next() {
        Some("in") => Some(EntityKind::Person),
        Some("company") | Some("school") => Some(EntityKind::Organization),
        _ => None,
    })
}

/// Builds the canonical "about" sub-page URL for an organization page
pub fn about_url(canonical: &str) -> String {
    format!("{}/about", canonical.trim_end_matches('/'))
}
