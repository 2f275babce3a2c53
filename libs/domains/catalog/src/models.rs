use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::{CatalogError, CatalogResult};

/// Geography scope used for "latest metrics" lookups
pub const WORLDWIDE: &str = "WW";

/// Company entity - a business tracked in the catalog, keyed by normalized domain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    /// Unique identifier
    pub id: Uuid,
    /// Normalized domain, the case-insensitive dedup key
    pub domain: String,
    pub name: Option<String>,
    pub website_url: Option<String>,
    pub country: Option<String>,
    pub industry: Option<String>,
    pub employee_range: Option<String>,
    /// Free-form capability/technology tags
    pub tech_tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Company {
    /// Deterministic source text for the company's embedding.
    ///
    /// Absent attributes are skipped so re-generation only happens when the
    /// underlying facts change.
    pub fn embedding_source_text(&self) -> String {
        let mut parts = Vec::new();

        if let Some(name) = &self.name {
            parts.push(name.clone());
        }
        if let Some(industry) = &self.industry {
            parts.push(format!("Industry: {}", industry));
        }
        if let Some(country) = &self.country {
            parts.push(format!("Country: {}", country));
        }
        if let Some(range) = &self.employee_range {
            parts.push(format!("Employees: {}", range));
        }
        if !self.tech_tags.is_empty() {
            parts.push(format!("Tech: {}", self.tech_tags.join(", ")));
        }

        parts.join(" | ")
    }
}

/// Normalize a raw domain into the catalog's natural key.
///
/// Lowercases, trims, strips an optional scheme, a leading `www.` and any
/// path suffix. Rejects inputs that leave nothing behind.
pub fn normalize_domain(raw: &str) -> CatalogResult<String> {
    let mut domain = raw.trim().to_ascii_lowercase();

    for scheme in ["https://", "http://"] {
        if let Some(rest) = domain.strip_prefix(scheme) {
            domain = rest.to_string();
            break;
        }
    }

    if let Some(idx) = domain.find('/') {
        domain.truncate(idx);
    }

    if let Some(rest) = domain.strip_prefix("www.") {
        domain = rest.to_string();
    }

    let domain = domain.trim_end_matches('.').to_string();

    if domain.is_empty() {
        return Err(CatalogError::Validation(format!(
            "'{}' is not a valid domain",
            raw
        )));
    }

    Ok(domain)
}

/// DTO for creating or refreshing a company (ingestion upserts by domain)
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpsertCompany {
    #[validate(length(min = 1, max = 255))]
    pub domain: String,
    pub name: Option<String>,
    pub website_url: Option<String>,
    pub country: Option<String>,
    pub industry: Option<String>,
    pub employee_range: Option<String>,
    #[serde(default)]
    pub tech_tags: Vec<String>,
}

/// Monthly traffic snapshot for one (company, month, geography) triple
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSnapshot {
    pub company_id: Uuid,
    pub month: NaiveDate,
    pub country: String,
    pub visits: Option<f64>,
    pub pages_per_visit: Option<f64>,
    pub avg_visit_secs: Option<f64>,
    pub bounce_rate: Option<f64>,
    pub page_views: Option<f64>,
    pub load_ts: DateTime<Utc>,
}

/// Structured filters for catalog queries
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompanyFilter {
    /// Lower bound on the latest worldwide monthly visits
    pub min_visits: Option<f64>,
    pub country: Option<String>,
    pub industry: Option<String>,
    /// All listed tags must be present
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

fn default_limit() -> u64 {
    50
}

/// A company joined with its latest worldwide metric snapshot
#[derive(Debug, Clone, Serialize)]
pub struct CompanyWithMetrics {
    pub company: Company,
    pub metrics: Option<MetricSnapshot>,
}

/// One page of a structured catalog query
#[derive(Debug, Clone, Serialize)]
pub struct CompanyPage {
    pub companies: Vec<CompanyWithMetrics>,
    pub total: u64,
}
