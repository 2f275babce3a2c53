use async_trait::async_trait;
use uuid::Uuid;

use crate::error::OutreachResult;
use crate::models::{
    MembershipAction, MembershipEvent, MembershipPage, OutreachList, PromoteOutcome,
};

/// Repository trait for the membership event log
#[async_trait]
pub trait MembershipStore: Send + Sync {
    async fn get_list_by_slug(&self, slug: &str) -> OutreachResult<Option<OutreachList>>;

    /// Append one event to the log
    async fn record(
        &self,
        list_id: Uuid,
        company_id: Uuid,
        action: MembershipAction,
        actor: &str,
    ) -> OutreachResult<MembershipEvent>;

    /// The most recent event for a (list, company) pair, if any
    async fn latest_event(
        &self,
        list_id: Uuid,
        company_id: Uuid,
    ) -> OutreachResult<Option<MembershipEvent>>;

    /// Full event history for a (list, company) pair, oldest first
    async fn history(
        &self,
        list_id: Uuid,
        company_id: Uuid,
    ) -> OutreachResult<Vec<MembershipEvent>>;

    /// Companies whose latest event on the list is an add, newest adds first
    async fn current_members(
        &self,
        list_id: Uuid,
        limit: u64,
        offset: u64,
    ) -> OutreachResult<MembershipPage>;

    /// Subset of `candidates` currently on the list; order is not specified
    async fn current_members_among(
        &self,
        list_id: Uuid,
        candidates: &[Uuid],
    ) -> OutreachResult<Vec<Uuid>>;

    /// Move a company between lists and record the status transition, all in
    /// one transaction. A company already on the target list is left alone.
    async fn promote(
        &self,
        from_list: &OutreachList,
        to_list: &OutreachList,
        company_id: Uuid,
        actor: &str,
    ) -> OutreachResult<PromoteOutcome>;
}
