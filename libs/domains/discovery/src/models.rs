use core_config::env_parse_or_default;
use domain_catalog::{Company, CompanyFilter, MetricSnapshot};
use domain_vector::SearchFilter;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{DiscoveryError, DiscoveryResult};

/// Structured constraints a search request can carry alongside the prompt
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchFilters {
    /// Lower bound on the latest worldwide monthly visits
    pub min_visits: Option<f64>,
    pub country: Option<String>,
    pub industry: Option<String>,
    /// All listed tags must be present
    #[serde(default)]
    pub tags: Vec<String>,
}

impl SearchFilters {
    pub(crate) fn to_index_filter(&self) -> SearchFilter {
        SearchFilter {
            min_visits: self.min_visits,
            country: self.country.clone(),
            industry: self.industry.clone(),
            tags: self.tags.clone(),
        }
    }

    pub(crate) fn to_catalog_filter(&self, limit: u64) -> CompanyFilter {
        CompanyFilter {
            min_visits: self.min_visits,
            country: self.country.clone(),
            industry: self.industry.clone(),
            tags: self.tags.clone(),
            limit,
            offset: 0,
        }
    }
}

/// One discovery request
///
/// A present prompt selects the semantic path; `None` runs a structured
/// catalog query instead. Pages are 1-based.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SearchRequest {
    pub prompt: Option<String>,
    #[serde(default)]
    pub filters: SearchFilters,
    /// Companies currently on any of these lists are dropped from results
    #[serde(default)]
    pub exclude_lists: Vec<String>,
    #[validate(range(min = 1))]
    #[serde(default = "default_page")]
    pub page: u32,
    #[validate(range(min = 1, max = 200))]
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    20
}

impl SearchRequest {
    pub(crate) fn check(&self) -> DiscoveryResult<()> {
        self.validate()
            .map_err(|e| DiscoveryError::Validation(e.to_string()))?;

        if let Some(prompt) = &self.prompt
            && prompt.trim().is_empty()
        {
            return Err(DiscoveryError::Validation(
                "prompt must not be blank; omit it for a filter-only query".to_string(),
            ));
        }

        Ok(())
    }
}

/// One ranked result
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveredCompany {
    pub company: Company,
    /// Cosine distance to the prompt; absent on the filter-only path
    pub distance: Option<f32>,
    pub metrics: Option<MetricSnapshot>,
}

/// One page of ranked results. `total` counts matches after exclusion,
/// across all pages.
#[derive(Debug, Clone, Serialize)]
pub struct SearchPage {
    pub results: Vec<DiscoveredCompany>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

/// Orchestrator tuning knobs
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Over-fetch multiplier: the index is asked for
    /// `per_page * page * depth_factor` candidates so exclusion filtering
    /// does not starve a page
    pub depth_factor: u32,
    /// Hard ceiling on candidates fetched per request
    pub max_candidates: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            depth_factor: 4,
            max_candidates: 1000,
        }
    }
}

impl DiscoveryConfig {
    pub fn from_env() -> Result<Self, core_config::ConfigError> {
        Ok(Self {
            depth_factor: env_parse_or_default("DISCOVERY_DEPTH_FACTOR", 4)?,
            max_candidates: env_parse_or_default("DISCOVERY_MAX_CANDIDATES", 1000)?,
        })
    }

    pub(crate) fn candidate_count(&self, page: u32, per_page: u32) -> u64 {
        let wanted = per_page as u64 * page as u64 * self.depth_factor as u64;
        wanted.min(self.max_candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> SearchRequest {
        SearchRequest {
            prompt: Some("fintech startups in europe".to_string()),
            filters: SearchFilters::default(),
            exclude_lists: Vec::new(),
            page: 1,
            per_page: 20,
        }
    }

    #[test]
    fn test_blank_prompt_rejected() {
        let mut req = request();
        req.prompt = Some("   ".to_string());
        assert!(matches!(req.check(), Err(DiscoveryError::Validation(_))));
    }

    #[test]
    fn test_missing_prompt_is_valid() {
        let mut req = request();
        req.prompt = None;
        assert!(req.check().is_ok());
    }

    #[test]
    fn test_page_and_per_page_bounds() {
        let mut req = request();
        req.page = 0;
        assert!(req.check().is_err());

        let mut req = request();
        req.per_page = 201;
        assert!(req.check().is_err());

        let mut req = request();
        req.per_page = 200;
        assert!(req.check().is_ok());
    }

    #[test]
    fn test_candidate_count_overfetch_and_cap() {
        let config = DiscoveryConfig::default();
        assert_eq!(config.candidate_count(1, 20), 80);
        assert_eq!(config.candidate_count(2, 20), 160);
        // 200 * 10 * 4 exceeds the ceiling
        assert_eq!(config.candidate_count(10, 200), 1000);
    }
}
