use chrono::{DateTime, Utc};
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use strum::Display;
use uuid::Uuid;

/// Slug of the list holding prospects worth pursuing
pub const INTERESTED: &str = "interested";

/// Slug of the list holding companies already contacted
pub const REACHED_OUT: &str = "reached_out";

/// What a membership event did to the (list, company) pair
///
/// `DeriveActiveEnum` already provides `TryFrom<&str>`, so no strum
/// `EnumString` here: the two impls collide.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "membership_action")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MembershipAction {
    #[sea_orm(string_value = "added")]
    Added,
    #[sea_orm(string_value = "removed")]
    Removed,
}

/// A named outreach list, identified by a stable slug
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutreachList {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// One row of the append-only membership log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembershipEvent {
    pub id: Uuid,
    pub list_id: Uuid,
    pub company_id: Uuid,
    pub action: MembershipAction,
    pub actor: String,
    pub recorded_at: DateTime<Utc>,
}

/// Audit record of a company moving between pipeline stages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChange {
    pub id: Uuid,
    pub company_id: Uuid,
    pub from_status: String,
    pub to_status: String,
    pub actor: String,
    pub recorded_at: DateTime<Utc>,
}

/// A company currently on a list, with the timestamp of the event that
/// put it there
#[derive(Debug, Clone, Serialize)]
pub struct ListMember {
    pub company_id: Uuid,
    pub since: DateTime<Utc>,
}

/// One page of a list's current members
#[derive(Debug, Clone, Serialize)]
pub struct MembershipPage {
    pub members: Vec<ListMember>,
    pub total: u64,
}

/// Outcome of a promotion attempt
#[derive(Debug, Clone)]
pub enum PromoteOutcome {
    Promoted(StatusChange),
    /// The company was already on the target list; nothing was written
    AlreadyPromoted,
}

/// Derive membership from a company's event history on one list.
///
/// The latest event wins; ties on timestamp fall back to event id, which
/// is time-ordered (UUIDv7). An empty history means not a member.
pub fn current_membership(events: &[MembershipEvent]) -> bool {
    events
        .iter()
        .max_by(|a, b| {
            a.recorded_at
                .cmp(&b.recorded_at)
                .then_with(|| a.id.cmp(&b.id))
        })
        .map(|event| event.action == MembershipAction::Added)
        .unwrap_or(false)
}
