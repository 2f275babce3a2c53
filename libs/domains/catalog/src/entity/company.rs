use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sea-ORM entity for the companies table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "companies")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub domain: String,
    pub name: Option<String>,
    pub website_url: Option<String>,
    pub country: Option<String>,
    pub industry: Option<String>,
    pub employee_range: Option<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub tech_tags: Json,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::metric_snapshot::Entity")]
    MetricSnapshots,
}

impl Related<super::metric_snapshot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MetricSnapshots.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::models::Company {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            domain: model.domain,
            name: model.name,
            website_url: model.website_url,
            country: model.country,
            industry: model.industry,
            employee_range: model.employee_range,
            tech_tags: serde_json::from_value(model.tech_tags).unwrap_or_default(),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl From<crate::models::UpsertCompany> for ActiveModel {
    fn from(input: crate::models::UpsertCompany) -> Self {
        ActiveModel {
            id: Set(Uuid::now_v7()),
            domain: Set(input.domain),
            name: Set(input.name),
            website_url: Set(input.website_url),
            country: Set(input.country),
            industry: Set(input.industry),
            employee_range: Set(input.employee_range),
            tech_tags: Set(serde_json::json!(input.tech_tags)),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(chrono::Utc::now().into()),
        }
    }
}
