use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "status_changes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub from_status: String,
    pub to_status: String,
    pub actor: String,
    pub recorded_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn new(company_id: Uuid, from_status: &str, to_status: &str, actor: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            company_id,
            from_status: from_status.to_string(),
            to_status: to_status.to_string(),
            actor,
            recorded_at: chrono::Utc::now().into(),
        }
    }

    pub fn into_active(self) -> ActiveModel {
        ActiveModel {
            id: Set(self.id),
            company_id: Set(self.company_id),
            from_status: Set(self.from_status),
            to_status: Set(self.to_status),
            actor: Set(self.actor),
            recorded_at: Set(self.recorded_at),
        }
    }
}

impl From<Model> for crate::models::StatusChange {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            company_id: model.company_id,
            from_status: model.from_status,
            to_status: model.to_status,
            actor: model.actor,
            recorded_at: model.recorded_at.into(),
        }
    }
}
