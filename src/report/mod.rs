//! Report data model: what callers ask for and what gets stored.

pub mod validate;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a stored report. Assigned once at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(Uuid);

impl ReportId {
    /// A fresh, time-ordered id.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ReportId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ReportId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// What the caller wants a report about.
///
/// Every field defaults when absent so that a missing company surfaces as a
/// validation error rather than a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportRequest {
    #[serde(alias = "company_name")]
    pub company: String,
    pub period: String,
    /// Section keys, in the order they should appear. Empty means the default set.
    pub sections: Vec<String>,
    #[serde(alias = "report_title", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executive_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub growth_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector_trends: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_metrics: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risks: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<String>,
}

impl ReportRequest {
    /// Profit as a percentage of revenue. None without both figures or
    /// when revenue is not positive.
    pub fn profit_margin(&self) -> Option<f64> {
        match (self.revenue, self.profit) {
            (Some(revenue), Some(profit)) if revenue > 0.0 => Some(profit / revenue * 100.0),
            _ => None,
        }
    }
}

/// The body of one section: prose, or a list of points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SectionBody {
    Text(String),
    List(Vec<String>),
}

impl SectionBody {
    pub fn is_empty(&self) -> bool {
        match self {
            SectionBody::Text(text) => text.trim().is_empty(),
            SectionBody::List(items) => items.iter().all(|item| item.trim().is_empty()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSection {
    pub key: String,
    pub title: String,
    pub body: SectionBody,
}

/// Generated report content, sections in request order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportContent {
    pub sections: Vec<ReportSection>,
}

impl ReportContent {
    pub fn section(&self, key: &str) -> Option<&ReportSection> {
        self.sections.iter().find(|s| s.key == key)
    }

    pub fn is_empty(&self) -> bool {
        self.sections.iter().all(|s| s.body.is_empty())
    }
}

/// A persisted report. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub id: ReportId,
    pub company: String,
    pub period: String,
    pub title: String,
    /// Model variant that wrote the content.
    pub model: String,
    /// The normalized request this report was generated from.
    pub request: ReportRequest,
    pub content: ReportContent,
    pub created_at: DateTime<Utc>,
}

/// Human-readable title for a section key: `top_risks` -> `Top Risks`.
pub fn section_title(key: &str) -> String {
    key.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Keys with this prefix are expected to come back as lists.
pub fn is_list_section(key: &str) -> bool {
    key.starts_with("top_")
}
