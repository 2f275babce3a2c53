use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::MembershipAction;

/// Append-only log row; never updated or deleted
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "membership_events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub list_id: Uuid,
    pub company_id: Uuid,
    pub action: MembershipAction,
    pub actor: String,
    pub recorded_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::list::Entity",
        from = "Column::ListId",
        to = "super::list::Column::Id"
    )]
    List,
}

impl Related<super::list::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::List.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn new(list_id: Uuid, company_id: Uuid, action: MembershipAction, actor: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            list_id,
            company_id,
            action,
            actor,
            recorded_at: chrono::Utc::now().into(),
        }
    }

    pub fn into_active(self) -> ActiveModel {
        ActiveModel {
            id: Set(self.id),
            list_id: Set(self.list_id),
            company_id: Set(self.company_id),
            action: Set(self.action),
            actor: Set(self.actor),
            recorded_at: Set(self.recorded_at),
        }
    }
}

impl From<Model> for crate::models::MembershipEvent {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            list_id: model.list_id,
            company_id: model.company_id,
            action: model.action,
            actor: model.actor,
            recorded_at: model.recorded_at.into(),
        }
    }
}
