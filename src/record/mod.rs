//! Extracted record types
//!
//! Records are produced by the extraction pipeline and are immutable once
//! built: the orchestrator only persists them and expands the frontier from
//! the related-profile references. Serialization uses camelCase keys to match
//! the JSON shape consumers of the request envelope expect.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static FIRST_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9][0-9,]*").unwrap());

/// One entry of a person's position history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub company_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_url: Option<String>,
}

/// One entry of a person's education history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub school: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degree: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// A spoken language with optional proficiency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proficiency: Option<String>,
}

/// A related profile discovered on a person page; feeds the frontier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedProfile {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    pub url: String,
}

/// A person profile record, keyed by canonical URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    pub canonical_url: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connections: Option<u32>,
    #[serde(default)]
    pub positions: Vec<Position>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub languages: Vec<Language>,
    #[serde(default)]
    pub related_profiles: Vec<RelatedProfile>,
    /// Current employer's organization record, nested by the pipeline.
    /// Absent (not null) when no company URL could be resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<OrganizationRecord>,
}

impl ProfileRecord {
    /// The company URL the organization-nesting step should follow, taken
    /// from the first (current) position.
    pub fn current_company_url(&self) -> Option<&str> {
        self.positions
            .first()
            .and_then(|p| p.company_url.as_deref())
    }
}

/// An organization page record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationRecord {
    /// May be absent for very small entities that have no page of their own
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_url: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headquarters: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub founded_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialties: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub followers: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members_on_platform: Option<u64>,
}

/// Either kind of record, serialized flat so envelope consumers see the
/// record's own keys rather than an enum wrapper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Record {
    Profile(ProfileRecord),
    Organization(OrganizationRecord),
}

impl Record {
    pub fn canonical_url(&self) -> Option<&str> {
        match self {
            Record::Profile(p) => Some(&p.canonical_url),
            Record::Organization(o) => o.canonical_url.as_deref(),
        }
    }
}

/// Extracts the first integer from free text, tolerating thousands separators
///
/// Used for connection counts, follower counts and member counts, whose
/// surrounding copy shifts with the page layout. Missing or malformed text
/// yields `None`, never an error.
pub fn parse_count(text: &str) -> Option<u64> {
    let m = FIRST_NUMBER.find(text)?;
    m.as_str().replace(',', "").parse().ok()
}

/// Parses a founding year, permissively
pub fn parse_year(text: &str) -> Option<i32> {
    let m = FIRST_NUMBER.find(text)?;
    m.as_str().replace(',', "").parse().ok()
}

/// Trims text and maps empty results to `None`
///
/// Optional fields whose source element is missing or empty become null
/// instead of empty strings.
pub fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
