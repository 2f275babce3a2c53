use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use domain_catalog::{CatalogRepository, Company, MetricSnapshot};
use domain_outreach::{MembershipStore, OutreachError};
use domain_vector::{EmbeddingProvider, SearchHit, SearchQuery, VectorIndex};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::error::{DiscoveryError, DiscoveryResult};
use crate::models::{DiscoveredCompany, DiscoveryConfig, SearchPage, SearchRequest};

/// The search pipeline.
///
/// Holds no per-request state; concurrent searches share it freely. The
/// embedding call happens before any catalog or membership reads, and no
/// lock is ever held while waiting on the provider.
pub struct DiscoveryOrchestrator<P, V, C, M> {
    provider: Arc<P>,
    index: Arc<V>,
    catalog: Arc<C>,
    memberships: Arc<M>,
    config: DiscoveryConfig,
}

impl<P, V, C, M> DiscoveryOrchestrator<P, V, C, M>
where
    P: EmbeddingProvider,
    V: VectorIndex,
    C: CatalogRepository,
    M: MembershipStore,
{
    pub fn new(provider: Arc<P>, index: Arc<V>, catalog: Arc<C>, memberships: Arc<M>) -> Self {
        Self {
            provider,
            index,
            catalog,
            memberships,
            config: DiscoveryConfig::default(),
        }
    }

    pub fn with_config(mut self, config: DiscoveryConfig) -> Self {
        self.config = config;
        self
    }

    #[instrument(skip(self, request), fields(
        semantic = request.prompt.is_some(),
        page = request.page,
        per_page = request.per_page,
    ))]
    pub async fn search(&self, request: SearchRequest) -> DiscoveryResult<SearchPage> {
        request.check()?;

        match request.prompt.clone() {
            Some(prompt) => self.semantic_search(&prompt, &request).await,
            None => self.structured_search(&request).await,
        }
    }

    /// Prompt-driven path: embed, filtered kNN with over-fetch, catalog
    /// join, membership exclusion, paginate.
    async fn semantic_search(
        &self,
        prompt: &str,
        request: &SearchRequest,
    ) -> DiscoveryResult<SearchPage> {
        let embedding = self
            .provider
            .embed(prompt)
            .await
            .map_err(DiscoveryError::Provider)?;

        let query = SearchQuery {
            vector: embedding.values,
            filter: request.filters.to_index_filter(),
            limit: self.config.candidate_count(request.page, request.per_page),
        };
        let hits = self
            .index
            .search(&query)
            .await
            .map_err(DiscoveryError::Index)?;
        debug!(candidates = hits.len(), "Vector index returned candidates");

        let candidate_ids: Vec<Uuid> = hits.iter().map(|h| h.company_id).collect();
        let excluded = self
            .excluded_ids(&request.exclude_lists, &candidate_ids)
            .await?;

        let survivors: Vec<SearchHit> = hits
            .into_iter()
            .filter(|hit| !excluded.contains(&hit.company_id))
            .collect();
        let total = survivors.len() as u64;

        let start = (request.page - 1) as usize * request.per_page as usize;
        let page_hits: Vec<SearchHit> = survivors
            .into_iter()
            .skip(start)
            .take(request.per_page as usize)
            .collect();

        let page_ids: Vec<Uuid> = page_hits.iter().map(|h| h.company_id).collect();
        let mut companies = self.company_map(&page_ids).await?;
        let mut metrics = self.metrics_map(&page_ids).await?;

        // Candidates the catalog no longer knows are dropped, not errors
        let results = page_hits
            .into_iter()
            .filter_map(|hit| {
                companies.remove(&hit.company_id).map(|company| DiscoveredCompany {
                    company,
                    distance: Some(hit.distance),
                    metrics: metrics.remove(&hit.company_id),
                })
            })
            .collect();

        Ok(SearchPage {
            results,
            total,
            page: request.page,
            per_page: request.per_page,
        })
    }

    /// Promptless path: structured catalog query ordered by traffic, so
    /// companies without embeddings remain discoverable.
    async fn structured_search(&self, request: &SearchRequest) -> DiscoveryResult<SearchPage> {
        let fetch = self.config.candidate_count(request.page, request.per_page);
        let catalog_page = self
            .catalog
            .list(&request.filters.to_catalog_filter(fetch))
            .await?;

        let candidate_ids: Vec<Uuid> = catalog_page
            .companies
            .iter()
            .map(|c| c.company.id)
            .collect();
        let excluded = self
            .excluded_ids(&request.exclude_lists, &candidate_ids)
            .await?;

        let excluded_in_fetch = candidate_ids
            .iter()
            .filter(|id| excluded.contains(id))
            .count() as u64;
        let total = catalog_page.total.saturating_sub(excluded_in_fetch);

        let start = (request.page - 1) as usize * request.per_page as usize;
        let results = catalog_page
            .companies
            .into_iter()
            .filter(|c| !excluded.contains(&c.company.id))
            .skip(start)
            .take(request.per_page as usize)
            .map(|c| DiscoveredCompany {
                company: c.company,
                distance: None,
                metrics: c.metrics,
            })
            .collect();

        Ok(SearchPage {
            results,
            total,
            page: request.page,
            per_page: request.per_page,
        })
    }

    /// Union of current members of every excluded list, restricted to the
    /// candidate set. Computed at request time; an unknown slug is an error
    /// even when there are no candidates to exclude.
    async fn excluded_ids(
        &self,
        exclude_lists: &[String],
        candidates: &[Uuid],
    ) -> DiscoveryResult<HashSet<Uuid>> {
        let mut lists = Vec::with_capacity(exclude_lists.len());
        for slug in exclude_lists {
            let list = self
                .memberships
                .get_list_by_slug(slug)
                .await?
                .ok_or_else(|| OutreachError::ListNotFound(slug.clone()))?;
            lists.push(list);
        }

        let mut excluded = HashSet::new();
        if candidates.is_empty() {
            return Ok(excluded);
        }

        for list in lists {
            let members = self
                .memberships
                .current_members_among(list.id, candidates)
                .await?;
            excluded.extend(members);
        }

        Ok(excluded)
    }

    async fn company_map(&self, ids: &[Uuid]) -> DiscoveryResult<HashMap<Uuid, Company>> {
        let companies = self.catalog.get_many(ids).await?;
        Ok(companies.into_iter().map(|c| (c.id, c)).collect())
    }

    async fn metrics_map(&self, ids: &[Uuid]) -> DiscoveryResult<HashMap<Uuid, MetricSnapshot>> {
        let metrics = self.catalog.latest_metrics(ids).await?;
        Ok(metrics.into_iter().map(|m| (m.company_id, m)).collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use chrono::Utc;
    use domain_catalog::{
        CatalogResult, CompanyFilter, CompanyPage, CompanyWithMetrics, UpsertCompany,
    };
    use domain_outreach::{
        MembershipAction, MembershipEvent, MembershipPage, OutreachList, OutreachResult,
        PromoteOutcome,
    };
    use domain_vector::{
        CompanyPoint, EmbeddingModel, EmbeddingResult, SearchFilter, VectorError, VectorResult,
    };

    use super::*;
    use crate::models::SearchFilters;

    struct FakeProvider {
        calls: AtomicU32,
        fail_with: Option<fn() -> VectorError>,
        model: EmbeddingModel,
    }

    impl FakeProvider {
        fn ok() -> Self {
            Self {
                calls: AtomicU32::new(0),
                fail_with: None,
                model: EmbeddingModel::Custom {
                    name: "test".to_string(),
                    dimension: 3,
                },
            }
        }

        fn failing(error: fn() -> VectorError) -> Self {
            Self {
                fail_with: Some(error),
                ..Self::ok()
            }
        }
    }

    #[async_trait]
    impl EmbeddingProvider for FakeProvider {
        fn model(&self) -> &EmbeddingModel {
            &self.model
        }

        async fn embed(&self, _text: &str) -> VectorResult<EmbeddingResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(error) = self.fail_with {
                return Err(error());
            }
            Ok(EmbeddingResult {
                values: vec![0.1, 0.2, 0.3],
                dimension: 3,
                tokens_used: 1,
            })
        }

        async fn embed_batch(&self, texts: &[String]) -> VectorResult<Vec<EmbeddingResult>> {
            let mut results = Vec::new();
            for text in texts {
                results.push(self.embed(text).await?);
            }
            Ok(results)
        }
    }

    struct FakeIndex {
        hits: Vec<SearchHit>,
        fail: bool,
        last_query: Mutex<Option<(SearchFilter, u64)>>,
    }

    impl FakeIndex {
        fn with_hits(hits: Vec<SearchHit>) -> Self {
            Self {
                hits,
                fail: false,
                last_query: Mutex::new(None),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::with_hits(Vec::new())
            }
        }
    }

    #[async_trait]
    impl VectorIndex for FakeIndex {
        async fn ensure_collection(&self) -> VectorResult<()> {
            Ok(())
        }

        async fn upsert(&self, _point: CompanyPoint) -> VectorResult<()> {
            Ok(())
        }

        async fn upsert_batch(&self, _points: Vec<CompanyPoint>) -> VectorResult<()> {
            Ok(())
        }

        async fn search(&self, query: &SearchQuery) -> VectorResult<Vec<SearchHit>> {
            if self.fail {
                return Err(VectorError::Index("connection refused".to_string()));
            }
            *self.last_query.lock().unwrap() = Some((query.filter.clone(), query.limit));
            Ok(self.hits.iter().take(query.limit as usize).cloned().collect())
        }

        async fn delete(&self, _company_id: Uuid) -> VectorResult<()> {
            Ok(())
        }
    }

    struct FakeCatalog {
        companies: Vec<Company>,
    }

    #[async_trait]
    impl CatalogRepository for FakeCatalog {
        async fn upsert(&self, _input: UpsertCompany) -> CatalogResult<Company> {
            unimplemented!("not used by the orchestrator")
        }

        async fn get(&self, id: Uuid) -> CatalogResult<Option<Company>> {
            Ok(self.companies.iter().find(|c| c.id == id).cloned())
        }

        async fn get_by_domain(&self, domain: &str) -> CatalogResult<Option<Company>> {
            Ok(self.companies.iter().find(|c| c.domain == domain).cloned())
        }

        async fn get_many(&self, ids: &[Uuid]) -> CatalogResult<Vec<Company>> {
            Ok(self
                .companies
                .iter()
                .filter(|c| ids.contains(&c.id))
                .cloned()
                .collect())
        }

        async fn latest_metrics(&self, _ids: &[Uuid]) -> CatalogResult<Vec<MetricSnapshot>> {
            Ok(Vec::new())
        }

        async fn upsert_metrics(&self, _snapshots: Vec<MetricSnapshot>) -> CatalogResult<u64> {
            unimplemented!("not used by the orchestrator")
        }

        async fn list(&self, filter: &CompanyFilter) -> CatalogResult<CompanyPage> {
            let matching: Vec<CompanyWithMetrics> = self
                .companies
                .iter()
                .filter(|c| {
                    filter
                        .industry
                        .as_ref()
                        .is_none_or(|want| c.industry.as_deref() == Some(want.as_str()))
                })
                .take(filter.limit as usize)
                .map(|c| CompanyWithMetrics {
                    company: c.clone(),
                    metrics: None,
                })
                .collect();

            Ok(CompanyPage {
                total: matching.len() as u64,
                companies: matching,
            })
        }
    }

    struct FakeMemberships {
        lists: Vec<OutreachList>,
        members: Vec<(Uuid, Uuid)>,
    }

    impl FakeMemberships {
        fn empty() -> Self {
            Self {
                lists: Vec::new(),
                members: Vec::new(),
            }
        }

        fn with_members(slug: &str, company_ids: &[Uuid]) -> Self {
            let list = OutreachList {
                id: Uuid::now_v7(),
                slug: slug.to_string(),
                name: slug.to_string(),
                created_at: Utc::now(),
            };
            let members = company_ids.iter().map(|id| (list.id, *id)).collect();
            Self {
                lists: vec![list],
                members,
            }
        }
    }

    #[async_trait]
    impl MembershipStore for FakeMemberships {
        async fn get_list_by_slug(&self, slug: &str) -> OutreachResult<Option<OutreachList>> {
            Ok(self.lists.iter().find(|l| l.slug == slug).cloned())
        }

        async fn record(
            &self,
            _list_id: Uuid,
            _company_id: Uuid,
            _action: MembershipAction,
            _actor: &str,
        ) -> OutreachResult<MembershipEvent> {
            unimplemented!("not used by the orchestrator")
        }

        async fn latest_event(
            &self,
            _list_id: Uuid,
            _company_id: Uuid,
        ) -> OutreachResult<Option<MembershipEvent>> {
            unimplemented!("not used by the orchestrator")
        }

        async fn history(
            &self,
            _list_id: Uuid,
            _company_id: Uuid,
        ) -> OutreachResult<Vec<MembershipEvent>> {
            unimplemented!("not used by the orchestrator")
        }

        async fn current_members(
            &self,
            _list_id: Uuid,
            _limit: u64,
            _offset: u64,
        ) -> OutreachResult<MembershipPage> {
            unimplemented!("not used by the orchestrator")
        }

        async fn current_members_among(
            &self,
            list_id: Uuid,
            candidates: &[Uuid],
        ) -> OutreachResult<Vec<Uuid>> {
            Ok(self
                .members
                .iter()
                .filter(|(l, c)| *l == list_id && candidates.contains(c))
                .map(|(_, c)| *c)
                .collect())
        }

        async fn promote(
            &self,
            _from_list: &OutreachList,
            _to_list: &OutreachList,
            _company_id: Uuid,
            _actor: &str,
        ) -> OutreachResult<PromoteOutcome> {
            unimplemented!("not used by the orchestrator")
        }
    }

    fn company(id: Uuid, domain: &str, industry: &str) -> Company {
        Company {
            id,
            domain: domain.to_string(),
            name: Some(domain.to_string()),
            website_url: None,
            country: Some("US".to_string()),
            industry: Some(industry.to_string()),
            employee_range: None,
            tech_tags: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn hit(id: Uuid, distance: f32) -> SearchHit {
        SearchHit {
            company_id: id,
            distance,
        }
    }

    fn request(prompt: Option<&str>) -> SearchRequest {
        SearchRequest {
            prompt: prompt.map(String::from),
            filters: SearchFilters::default(),
            exclude_lists: Vec::new(),
            page: 1,
            per_page: 2,
        }
    }

    fn orchestrator(
        provider: FakeProvider,
        index: FakeIndex,
        catalog: FakeCatalog,
        memberships: FakeMemberships,
    ) -> DiscoveryOrchestrator<FakeProvider, FakeIndex, FakeCatalog, FakeMemberships> {
        DiscoveryOrchestrator::new(
            Arc::new(provider),
            Arc::new(index),
            Arc::new(catalog),
            Arc::new(memberships),
        )
    }

    #[tokio::test]
    async fn test_results_ranked_by_distance() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();

        let orchestrator = orchestrator(
            FakeProvider::ok(),
            FakeIndex::with_hits(vec![hit(a, 0.1), hit(b, 0.3)]),
            FakeCatalog {
                companies: vec![company(a, "a.com", "Fintech"), company(b, "b.com", "Fintech")],
            },
            FakeMemberships::empty(),
        );

        let page = orchestrator.search(request(Some("fintech"))).await.unwrap();

        assert_eq!(page.total, 2);
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.results[0].company.id, a);
        assert_eq!(page.results[0].distance, Some(0.1));
        assert_eq!(page.results[1].company.id, b);
    }

    #[tokio::test]
    async fn test_excluded_list_members_are_dropped() {
        let kept = Uuid::now_v7();
        let reached = Uuid::now_v7();

        let orchestrator = orchestrator(
            FakeProvider::ok(),
            FakeIndex::with_hits(vec![hit(reached, 0.1), hit(kept, 0.2)]),
            FakeCatalog {
                companies: vec![
                    company(kept, "kept.com", "Fintech"),
                    company(reached, "reached.com", "Fintech"),
                ],
            },
            FakeMemberships::with_members("reached_out", &[reached]),
        );

        let mut req = request(Some("fintech"));
        req.exclude_lists = vec!["reached_out".to_string()];
        let page = orchestrator.search(req).await.unwrap();

        assert_eq!(page.total, 1);
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].company.id, kept);
    }

    #[tokio::test]
    async fn test_provider_failure_is_fatal() {
        let orchestrator = orchestrator(
            FakeProvider::failing(|| VectorError::RateLimited),
            FakeIndex::with_hits(Vec::new()),
            FakeCatalog { companies: vec![] },
            FakeMemberships::empty(),
        );

        let err = orchestrator
            .search(request(Some("fintech")))
            .await
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::Provider(_)));
    }

    #[tokio::test]
    async fn test_index_failure_is_fatal() {
        let orchestrator = orchestrator(
            FakeProvider::ok(),
            FakeIndex::failing(),
            FakeCatalog { companies: vec![] },
            FakeMemberships::empty(),
        );

        let err = orchestrator
            .search(request(Some("fintech")))
            .await
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::Index(_)));
    }

    #[tokio::test]
    async fn test_filters_are_pushed_into_the_index() {
        let index = Arc::new(FakeIndex::with_hits(Vec::new()));

        let orchestrator = DiscoveryOrchestrator::new(
            Arc::new(FakeProvider::ok()),
            index.clone(),
            Arc::new(FakeCatalog { companies: vec![] }),
            Arc::new(FakeMemberships::empty()),
        );

        let mut req = request(Some("fintech"));
        req.filters = SearchFilters {
            min_visits: Some(5000.0),
            country: Some("DE".to_string()),
            industry: None,
            tags: vec!["react".to_string()],
        };
        orchestrator.search(req).await.unwrap();

        let (filter, limit) = index.last_query.lock().unwrap().clone().unwrap();
        assert_eq!(filter.min_visits, Some(5000.0));
        assert_eq!(filter.country.as_deref(), Some("DE"));
        assert_eq!(filter.tags, vec!["react".to_string()]);
        // per_page 2 * page 1 * depth factor 4
        assert_eq!(limit, 8);
    }

    #[tokio::test]
    async fn test_promptless_query_skips_the_provider() {
        let no_embedding = Uuid::now_v7();

        let provider = Arc::new(FakeProvider::ok());
        let orchestrator = DiscoveryOrchestrator::new(
            provider.clone(),
            Arc::new(FakeIndex::with_hits(Vec::new())),
            Arc::new(FakeCatalog {
                companies: vec![company(no_embedding, "shop.example", "Retail")],
            }),
            Arc::new(FakeMemberships::empty()),
        );

        let page = orchestrator.search(request(None)).await.unwrap();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].company.id, no_embedding);
        assert_eq!(page.results[0].distance, None);
    }

    #[tokio::test]
    async fn test_pagination_slices_after_exclusion() {
        let ids: Vec<Uuid> = (0..5).map(|_| Uuid::now_v7()).collect();
        let hits: Vec<SearchHit> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| hit(*id, 0.1 * (i + 1) as f32))
            .collect();
        let companies: Vec<Company> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| company(*id, &format!("c{}.com", i), "Fintech"))
            .collect();

        let orchestrator = orchestrator(
            FakeProvider::ok(),
            FakeIndex::with_hits(hits),
            FakeCatalog { companies },
            FakeMemberships::empty(),
        );

        let mut req = request(Some("fintech"));
        req.page = 2;
        let page = orchestrator.search(req).await.unwrap();

        assert_eq!(page.total, 5);
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.results[0].company.id, ids[2]);
        assert_eq!(page.results[1].company.id, ids[3]);
    }

    #[tokio::test]
    async fn test_unknown_exclude_list_is_an_error() {
        let id = Uuid::now_v7();
        let orchestrator = orchestrator(
            FakeProvider::ok(),
            FakeIndex::with_hits(vec![hit(id, 0.1)]),
            FakeCatalog {
                companies: vec![company(id, "a.com", "Fintech")],
            },
            FakeMemberships::empty(),
        );

        let mut req = request(Some("fintech"));
        req.exclude_lists = vec!["no-such-list".to_string()];
        let err = orchestrator.search(req).await.unwrap_err();

        assert!(matches!(
            err,
            DiscoveryError::Outreach(OutreachError::ListNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_exclude_list_is_an_error_with_no_candidates() {
        let orchestrator = orchestrator(
            FakeProvider::ok(),
            FakeIndex::with_hits(Vec::new()),
            FakeCatalog { companies: vec![] },
            FakeMemberships::empty(),
        );

        let mut req = request(Some("fintech"));
        req.exclude_lists = vec!["no-such-list".to_string()];
        let err = orchestrator.search(req).await.unwrap_err();

        assert!(matches!(
            err,
            DiscoveryError::Outreach(OutreachError::ListNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_candidates_missing_from_catalog_are_skipped() {
        let known = Uuid::now_v7();
        let stale = Uuid::now_v7();

        let orchestrator = orchestrator(
            FakeProvider::ok(),
            FakeIndex::with_hits(vec![hit(stale, 0.1), hit(known, 0.2)]),
            FakeCatalog {
                companies: vec![company(known, "known.com", "Fintech")],
            },
            FakeMemberships::empty(),
        );

        let page = orchestrator.search(request(Some("fintech"))).await.unwrap();

        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].company.id, known);
    }
}
