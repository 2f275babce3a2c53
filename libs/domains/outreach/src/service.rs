use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{OutreachError, OutreachResult};
use crate::keylock::KeyedLocks;
use crate::models::{
    INTERESTED, MembershipAction, MembershipEvent, MembershipPage, OutreachList, PromoteOutcome,
    REACHED_OUT,
};
use crate::repository::MembershipStore;

/// List membership service.
///
/// Adds and removes are idempotent: an operation that would not change the
/// derived membership appends nothing. Writes for the same company are
/// serialized through per-company locks, so concurrent duplicate requests
/// collapse into one event.
pub struct ListService<R: MembershipStore> {
    repository: Arc<R>,
    locks: KeyedLocks<Uuid>,
}

impl<R: MembershipStore> ListService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            locks: KeyedLocks::new(),
        }
    }

    async fn resolve_list(&self, slug: &str) -> OutreachResult<OutreachList> {
        self.repository
            .get_list_by_slug(slug)
            .await?
            .ok_or_else(|| OutreachError::ListNotFound(slug.to_string()))
    }

    fn validate_actor(actor: &str) -> OutreachResult<()> {
        if actor.trim().is_empty() {
            return Err(OutreachError::Validation(
                "actor must not be blank".to_string(),
            ));
        }
        Ok(())
    }

    /// Add a company to a list. Returns the appended event, or `None` when
    /// the company was already a member.
    #[instrument(skip(self))]
    pub async fn add(
        &self,
        list_slug: &str,
        company_id: Uuid,
        actor: &str,
    ) -> OutreachResult<Option<MembershipEvent>> {
        Self::validate_actor(actor)?;
        let list = self.resolve_list(list_slug).await?;

        let _guard = self.locks.acquire(company_id).await;

        let latest = self.repository.latest_event(list.id, company_id).await?;
        if latest.map(|e| e.action) == Some(MembershipAction::Added) {
            return Ok(None);
        }

        let event = self
            .repository
            .record(list.id, company_id, MembershipAction::Added, actor)
            .await?;
        info!(%company_id, list = %list.slug, "Company added to list");
        Ok(Some(event))
    }

    /// Remove a company from a list. Returns the appended event, or `None`
    /// when the company was not a member.
    #[instrument(skip(self))]
    pub async fn remove(
        &self,
        list_slug: &str,
        company_id: Uuid,
        actor: &str,
    ) -> OutreachResult<Option<MembershipEvent>> {
        Self::validate_actor(actor)?;
        let list = self.resolve_list(list_slug).await?;

        let _guard = self.locks.acquire(company_id).await;

        let latest = self.repository.latest_event(list.id, company_id).await?;
        if latest.map(|e| e.action) != Some(MembershipAction::Added) {
            return Ok(None);
        }

        let event = self
            .repository
            .record(list.id, company_id, MembershipAction::Removed, actor)
            .await?;
        info!(%company_id, list = %list.slug, "Company removed from list");
        Ok(Some(event))
    }

    /// Move a company from "interested" to "reached out" in one transaction.
    /// Promoting a company already reached out is a no-op.
    #[instrument(skip(self))]
    pub async fn promote(&self, company_id: Uuid, actor: &str) -> OutreachResult<PromoteOutcome> {
        Self::validate_actor(actor)?;
        let from_list = self.resolve_list(INTERESTED).await?;
        let to_list = self.resolve_list(REACHED_OUT).await?;

        let _guard = self.locks.acquire(company_id).await;

        self.repository
            .promote(&from_list, &to_list, company_id, actor)
            .await
    }

    #[instrument(skip(self))]
    pub async fn members(
        &self,
        list_slug: &str,
        limit: u64,
        offset: u64,
    ) -> OutreachResult<MembershipPage> {
        if limit == 0 || limit > 500 {
            return Err(OutreachError::Validation(
                "limit must be between 1 and 500".to_string(),
            ));
        }
        let list = self.resolve_list(list_slug).await?;
        self.repository.current_members(list.id, limit, offset).await
    }

    #[instrument(skip(self))]
    pub async fn is_member(&self, list_slug: &str, company_id: Uuid) -> OutreachResult<bool> {
        let list = self.resolve_list(list_slug).await?;
        let latest = self.repository.latest_event(list.id, company_id).await?;
        Ok(latest.map(|e| e.action) == Some(MembershipAction::Added))
    }

    /// Which of `candidates` are currently on the list
    #[instrument(skip(self, candidates), fields(count = candidates.len()))]
    pub async fn members_among(
        &self,
        list_slug: &str,
        candidates: &[Uuid],
    ) -> OutreachResult<Vec<Uuid>> {
        let list = self.resolve_list(list_slug).await?;
        self.repository
            .current_members_among(list.id, candidates)
            .await
    }

    /// Full audit trail for a (list, company) pair, oldest first
    #[instrument(skip(self))]
    pub async fn history(
        &self,
        list_slug: &str,
        company_id: Uuid,
    ) -> OutreachResult<Vec<MembershipEvent>> {
        let list = self.resolve_list(list_slug).await?;
        self.repository.history(list.id, company_id).await
    }
}
