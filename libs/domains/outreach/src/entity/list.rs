use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "lists")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub slug: String,
    pub name: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::membership_event::Entity")]
    MembershipEvents,
}

impl Related<super::membership_event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MembershipEvents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::models::OutreachList {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            slug: model.slug,
            name: model.name,
            created_at: model.created_at.into(),
        }
    }
}
