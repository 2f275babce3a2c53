use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbBackend, EntityTrait, FromQueryResult, QueryFilter,
    QueryOrder, Statement, Value,
};
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{company, metric_snapshot};
use crate::error::CatalogResult;
use crate::models::{
    Company, CompanyFilter, CompanyPage, CompanyWithMetrics, MetricSnapshot, UpsertCompany,
    WORLDWIDE,
};
use crate::repository::CatalogRepository;

/// PostgreSQL implementation of the catalog repository
#[derive(Clone)]
pub struct PgCatalogRepository {
    db: DatabaseConnection,
}

impl PgCatalogRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Flattened row for the company + latest-metrics lateral join
#[derive(Debug, FromQueryResult)]
struct CompanyMetricsRow {
    id: Uuid,
    domain: String,
    name: Option<String>,
    website_url: Option<String>,
    country: Option<String>,
    industry: Option<String>,
    employee_range: Option<String>,
    tech_tags: serde_json::Value,
    created_at: DateTimeWithTimeZone,
    updated_at: DateTimeWithTimeZone,
    month: Option<NaiveDate>,
    metrics_country: Option<String>,
    visits: Option<f64>,
    pages_per_visit: Option<f64>,
    avg_visit_secs: Option<f64>,
    bounce_rate: Option<f64>,
    page_views: Option<f64>,
    load_ts: Option<DateTimeWithTimeZone>,
}

impl From<CompanyMetricsRow> for CompanyWithMetrics {
    fn from(row: CompanyMetricsRow) -> Self {
        let metrics = match (row.month, row.metrics_country, row.load_ts) {
            (Some(month), Some(country), Some(load_ts)) => Some(MetricSnapshot {
                company_id: row.id,
                month,
                country,
                visits: row.visits,
                pages_per_visit: row.pages_per_visit,
                avg_visit_secs: row.avg_visit_secs,
                bounce_rate: row.bounce_rate,
                page_views: row.page_views,
                load_ts: load_ts.into(),
            }),
            _ => None,
        };

        Self {
            company: Company {
                id: row.id,
                domain: row.domain,
                name: row.name,
                website_url: row.website_url,
                country: row.country,
                industry: row.industry,
                employee_range: row.employee_range,
                tech_tags: serde_json::from_value(row.tech_tags).unwrap_or_default(),
                created_at: row.created_at.into(),
                updated_at: row.updated_at.into(),
            },
            metrics,
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct CountRow {
    total: i64,
}

const LATERAL_JOIN: &str = "LEFT JOIN LATERAL (\
     SELECT * FROM company_metrics_monthly lm \
     WHERE lm.company_id = c.id AND lm.country = $1 \
     ORDER BY lm.month DESC LIMIT 1\
     ) m ON TRUE";

/// Builds the shared WHERE clause for list/count, pushing params into `values`
fn build_conditions(filter: &CompanyFilter, values: &mut Vec<Value>) -> Vec<String> {
    let mut conditions = Vec::new();

    if let Some(country) = &filter.country {
        values.push(country.clone().into());
        conditions.push(format!("c.country = ${}", values.len()));
    }
    if let Some(industry) = &filter.industry {
        values.push(industry.clone().into());
        conditions.push(format!("c.industry = ${}", values.len()));
    }
    if !filter.tags.is_empty() {
        values.push(serde_json::json!(filter.tags).into());
        conditions.push(format!("c.tech_tags @> ${}", values.len()));
    }
    if let Some(min_visits) = filter.min_visits {
        values.push(min_visits.into());
        conditions.push(format!("m.visits >= ${}", values.len()));
    }

    conditions
}

#[async_trait]
impl CatalogRepository for PgCatalogRepository {
    #[instrument(skip(self, input), fields(domain = %input.domain))]
    async fn upsert(&self, input: UpsertCompany) -> CatalogResult<Company> {
        let active: company::ActiveModel = input.into();

        let model = company::Entity::insert(active)
            .on_conflict(
                OnConflict::column(company::Column::Domain)
                    .update_columns([
                        company::Column::Name,
                        company::Column::WebsiteUrl,
                        company::Column::Country,
                        company::Column::Industry,
                        company::Column::EmployeeRange,
                        company::Column::TechTags,
                        company::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_with_returning(&self.db)
            .await?;

        Ok(model.into())
    }

    #[instrument(skip(self))]
    async fn get(&self, id: Uuid) -> CatalogResult<Option<Company>> {
        let model = company::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn get_by_domain(&self, domain: &str) -> CatalogResult<Option<Company>> {
        let model = company::Entity::find()
            .filter(company::Column::Domain.eq(domain))
            .one(&self.db)
            .await?;
        Ok(model.map(Into::into))
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn get_many(&self, ids: &[Uuid]) -> CatalogResult<Vec<Company>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = company::Entity::find()
            .filter(company::Column::Id.is_in(ids.to_vec()))
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn latest_metrics(&self, ids: &[Uuid]) -> CatalogResult<Vec<MetricSnapshot>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        // Ordered so the first row per company is its newest worldwide month.
        let rows = metric_snapshot::Entity::find()
            .filter(metric_snapshot::Column::CompanyId.is_in(ids.to_vec()))
            .filter(metric_snapshot::Column::Country.eq(WORLDWIDE))
            .order_by_asc(metric_snapshot::Column::CompanyId)
            .order_by_desc(metric_snapshot::Column::Month)
            .all(&self.db)
            .await?;

        let mut latest: Vec<MetricSnapshot> = Vec::new();
        for row in rows {
            if latest.last().map(|m| m.company_id) != Some(row.company_id) {
                latest.push(row.into());
            }
        }

        Ok(latest)
    }

    #[instrument(skip(self, snapshots), fields(count = snapshots.len()))]
    async fn upsert_metrics(&self, snapshots: Vec<MetricSnapshot>) -> CatalogResult<u64> {
        if snapshots.is_empty() {
            return Ok(0);
        }

        let count = snapshots.len() as u64;
        let models: Vec<metric_snapshot::ActiveModel> =
            snapshots.into_iter().map(Into::into).collect();

        metric_snapshot::Entity::insert_many(models)
            .on_conflict(
                OnConflict::columns([
                    metric_snapshot::Column::CompanyId,
                    metric_snapshot::Column::Month,
                    metric_snapshot::Column::Country,
                ])
                .update_columns([
                    metric_snapshot::Column::Visits,
                    metric_snapshot::Column::PagesPerVisit,
                    metric_snapshot::Column::AvgVisitSecs,
                    metric_snapshot::Column::BounceRate,
                    metric_snapshot::Column::PageViews,
                    metric_snapshot::Column::LoadTs,
                ])
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        Ok(count)
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, offset = filter.offset))]
    async fn list(&self, filter: &CompanyFilter) -> CatalogResult<CompanyPage> {
        let mut values: Vec<Value> = vec![WORLDWIDE.into()];
        let conditions = build_conditions(filter, &mut values);

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_sql = format!(
            "SELECT COUNT(*) AS total FROM companies c {} {}",
            LATERAL_JOIN, where_clause
        );
        let count = CountRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            &count_sql,
            values.clone(),
        ))
        .one(&self.db)
        .await?
        .map(|row| row.total as u64)
        .unwrap_or(0);

        values.push(filter.limit.into());
        let limit_idx = values.len();
        values.push(filter.offset.into());
        let offset_idx = values.len();

        let select_sql = format!(
            "SELECT c.id, c.domain, c.name, c.website_url, c.country, c.industry, \
             c.employee_range, c.tech_tags, c.created_at, c.updated_at, \
             m.month, m.country AS metrics_country, m.visits, m.pages_per_visit, \
             m.avg_visit_secs, m.bounce_rate, m.page_views, m.load_ts \
             FROM companies c {} {} \
             ORDER BY m.visits DESC NULLS LAST, c.id ASC \
             LIMIT ${} OFFSET ${}",
            LATERAL_JOIN, where_clause, limit_idx, offset_idx
        );

        let rows = CompanyMetricsRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            &select_sql,
            values,
        ))
        .all(&self.db)
        .await?;

        Ok(CompanyPage {
            companies: rows.into_iter().map(Into::into).collect(),
            total: count,
        })
    }
}
