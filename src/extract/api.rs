//! Profile extraction through the partner API
//!
//! The API returns an `included` array of items, each tagged with a
//! `$type` field. A dispatch table keyed by the final segment of the tag
//! routes each item to a handler that folds it into the record under
//! construction. Industry and follower lookups are keyed by entity URN
//! and scoped to a single call.

use crate::config::ApiConfig;
use crate::record::{Education, Language, Position, ProfileRecord};
use crate::Result;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

const API_TIMEOUT: Duration = Duration::from_secs(30);
const INTERNAL_ERROR_MESSAGE: &str = "Internal API server error";

/// Why the API path gave up and handed the URL to the scraper
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// The API answered with its generic internal-error message
    InternalError,
    /// The profile is private and the API returns a stub for it
    PrivateProfile,
}

/// Result of one API extraction attempt
#[derive(Debug)]
pub enum ApiOutcome {
    Profile(ProfileRecord),
    Fallback(FallbackReason),
    /// The API rejected the URL itself; not retried, not scraped
    Invalid(String),
}

/// Thin client over the partner profile endpoint
pub struct ApiClient {
    http: reqwest::Client,
    endpoint: String,
    key: String,
    secret: String,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(API_TIMEOUT).build()?;
        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            key: config.key.clone(),
            secret: config.secret.clone(),
        })
    }

    /// Fetches one profile, classifying the three possible answers:
    /// a usable payload, a fallback signal, or an invalid-URL rejection
    pub async fn fetch_profile(&self, canonical_url: &str) -> Result<ApiOutcome> {
        let body: Value = self
            .http
            .get(&self.endpoint)
            .query(&[("url", canonical_url)])
            .header("x-api-key", &self.key)
            .header("x-api-secret", &self.secret)
            .send()
            .await?
            .json()
            .await?;

        if let Some(message) = body.get("message").and_then(Value::as_str) {
            if message == INTERNAL_ERROR_MESSAGE {
                tracing::debug!("API internal error for {}, falling back", canonical_url);
                return Ok(ApiOutcome::Fallback(FallbackReason::InternalError));
            }
            return Ok(ApiOutcome::Invalid(message.to_string()));
        }

        if body.get("id").and_then(Value::as_str) == Some("private") {
            tracing::debug!("Private profile {}, falling back", canonical_url);
            return Ok(ApiOutcome::Fallback(FallbackReason::PrivateProfile));
        }

        match parse_payload(&body, canonical_url) {
            Some(record) => Ok(ApiOutcome::Profile(record)),
            None => {
                tracing::warn!("API payload for {} carried no profile item", canonical_url);
                Ok(ApiOutcome::Fallback(FallbackReason::InternalError))
            }
        }
    }
}

/// Call-scoped lookup state threaded through the item handlers
#[derive(Default)]
struct ExtractionContext {
    industries: HashMap<String, String>,
    record: ProfileRecord,
    saw_profile_item: bool,
}

type Handler = fn(&mut ExtractionContext, &Value);

/// Recognized `$type` tags, keyed by the final dot-separated segment;
/// anything else is ignored
const HANDLERS: &[(&str, Handler)] = &[
    ("Profile", handle_profile),
    ("FollowingInfo", handle_following_info),
    ("Position", handle_position),
    ("Education", handle_education),
    ("Skill", handle_skill),
    ("Language", handle_language),
    ("Industry", handle_industry),
];

fn handler_for(tag: &str) -> Option<Handler> {
    let name = tag.rsplit('.').next()?;
    HANDLERS
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, handler)| *handler)
}

/// Folds the payload's `included` items into a record
///
/// Lookup items (industries, follower counts) are collected in a first
/// pass so references resolve regardless of item order.
fn parse_payload(body: &Value, canonical_url: &str) -> Option<ProfileRecord> {
    let items = body.get("included")?.as_array()?;
    let mut ctx = ExtractionContext::default();
    ctx.record.canonical_url = canonical_url.to_string();

    for item in items {
        let tag = item.get("$type").and_then(Value::as_str).unwrap_or("");
        match tag.rsplit('.').next() {
            Some("Industry") => handle_industry(&mut ctx, item),
            Some("FollowingInfo") => handle_following_info(&mut ctx, item),
            _ => {}
        }
    }

    for item in items {
        let tag = item.get("$type").and_then(Value::as_str).unwrap_or("");
        if let Some(handler) = handler_for(tag) {
            handler(&mut ctx, item);
        }
    }

    if ctx.saw_profile_item {
        Some(ctx.record)
    } else {
        None
    }
}

fn text(item: &Value, field: &str) -> Option<String> {
    item.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn handle_profile(ctx: &mut ExtractionContext, item: &Value) {
    let (Some(first), Some(last)) = (text(item, "firstName"), text(item, "lastName")) else {
        return;
    };
    ctx.saw_profile_item = true;
    ctx.record.first_name = first;
    ctx.record.last_name = last;
    ctx.record.headline = text(item, "headline");
    ctx.record.location = text(item, "locationName");
    ctx.record.summary = text(item, "summary");
    // industry arrives as a URN reference into the Industry lookup items
    ctx.record.industry = text(item, "*industry")
        .and_then(|urn| ctx.industries.get(&urn).cloned());
}

fn handle_following_info(ctx: &mut ExtractionContext, item: &Value) {
    // the profile's follower count doubles as its connection count
    if let Some(count) = item.get("followerCount").and_then(Value::as_u64) {
        ctx.record.connections = Some(count as u32);
    }
}

fn handle_position(ctx: &mut ExtractionContext, item: &Value) {
    let Some(company_name) = text(item, "companyName") else {
        return;
    };
    let company_url = text(item, "companyUrn")
        .and_then(|urn| urn.rsplit(':').next().map(str::to_string))
        .filter(|id| id.chars().all(|c| c.is_ascii_digit()) && !id.is_empty())
        .map(|id| format!("https://www.linkedin.com/company/{id}"));
    ctx.record.positions.push(Position {
        title: text(item, "title"),
        company_name,
        company_url,
    });
}

fn handle_education(ctx: &mut ExtractionContext, item: &Value) {
    let Some(school) = text(item, "schoolName") else {
        return;
    };
    if ctx.record.school.is_none() {
        ctx.record.school = Some(school.clone());
    }
    ctx.record.education.push(Education {
        school,
        degree: text(item, "degreeName"),
        field: text(item, "fieldOfStudy"),
    });
}

fn handle_skill(ctx: &mut ExtractionContext, item: &Value) {
    if let Some(name) = text(item, "name") {
        ctx.record.skills.push(name);
    }
}

fn handle_language(ctx: &mut ExtractionContext, item: &Value) {
    if let Some(name) = text(item, "name") {
        ctx.record.languages.push(Language {
            name,
            proficiency: text(item, "proficiency"),
        });
    }
}

fn handle_industry(ctx: &mut ExtractionContext, item: &Value) {
    if let (Some(urn), Some(name)) = (text(item, "entityUrn"), text(item, "localizedName")) {
        ctx.industries.insert(urn, name);
    }
}
