use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sea-ORM entity for the company_metrics_monthly table
///
/// Composite key (company_id, month, country); one row per ingestion period.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "company_metrics_monthly")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub company_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub month: Date,
    #[sea_orm(primary_key, auto_increment = false)]
    pub country: String,
    pub visits: Option<f64>,
    pub pages_per_visit: Option<f64>,
    pub avg_visit_secs: Option<f64>,
    pub bounce_rate: Option<f64>,
    pub page_views: Option<f64>,
    pub load_ts: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::company::Entity",
        from = "Column::CompanyId",
        to = "super::company::Column::Id"
    )]
    Company,
}

impl Related<super::company::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::models::MetricSnapshot {
    fn from(model: Model) -> Self {
        Self {
            company_id: model.company_id,
            month: model.month,
            country: model.country,
            visits: model.visits,
            pages_per_visit: model.pages_per_visit,
            avg_visit_secs: model.avg_visit_secs,
            bounce_rate: model.bounce_rate,
            page_views: model.page_views,
            load_ts: model.load_ts.into(),
        }
    }
}

impl From<crate::models::MetricSnapshot> for ActiveModel {
    fn from(snapshot: crate::models::MetricSnapshot) -> Self {
        ActiveModel {
            company_id: Set(snapshot.company_id),
            month: Set(snapshot.month),
            country: Set(snapshot.country),
            visits: Set(snapshot.visits),
            pages_per_visit: Set(snapshot.pages_per_visit),
            avg_visit_secs: Set(snapshot.avg_visit_secs),
            bounce_rate: Set(snapshot.bounce_rate),
            page_views: Set(snapshot.page_views),
            load_ts: Set(snapshot.load_ts.into()),
        }
    }
}
