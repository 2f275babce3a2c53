use async_trait::async_trait;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, DbErr, EntityTrait,
    FromQueryResult, QueryFilter, QueryOrder, SqlErr, Statement, TransactionTrait, Value,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::entity::{list, membership_event, status_change};
use crate::error::{OutreachError, OutreachResult};
use crate::models::{
    ListMember, MembershipAction, MembershipEvent, MembershipPage, OutreachList, PromoteOutcome,
};
use crate::repository::MembershipStore;

/// PostgreSQL implementation of the membership event log
#[derive(Clone)]
pub struct PgMembershipStore {
    db: DatabaseConnection,
}

impl PgMembershipStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Latest-per-company view of one list's event log
const LATEST_EVENTS_CTE: &str = "WITH latest AS (\
     SELECT DISTINCT ON (company_id) company_id, action, recorded_at \
     FROM membership_events \
     WHERE list_id = $1 \
     ORDER BY company_id, recorded_at DESC, id DESC\
     )";

#[derive(Debug, FromQueryResult)]
struct MemberRow {
    company_id: Uuid,
    recorded_at: DateTimeWithTimeZone,
}

#[derive(Debug, FromQueryResult)]
struct CountRow {
    total: i64,
}

#[derive(Debug, FromQueryResult)]
struct IdRow {
    company_id: Uuid,
}

async fn latest_event_on<C: ConnectionTrait>(
    conn: &C,
    list_id: Uuid,
    company_id: Uuid,
) -> Result<Option<membership_event::Model>, DbErr> {
    membership_event::Entity::find()
        .filter(membership_event::Column::ListId.eq(list_id))
        .filter(membership_event::Column::CompanyId.eq(company_id))
        .order_by_desc(membership_event::Column::RecordedAt)
        .order_by_desc(membership_event::Column::Id)
        .one(conn)
        .await
}

async fn append_event<C: ConnectionTrait>(
    conn: &C,
    event: membership_event::Model,
) -> OutreachResult<membership_event::Model> {
    let company_id = event.company_id;
    let list_id = event.list_id;

    membership_event::Entity::insert(event.clone().into_active())
        .exec_without_returning(conn)
        .await
        .map_err(|err| map_fk_violation(err, company_id, list_id))?;

    Ok(event)
}

fn map_fk_violation(err: DbErr, company_id: Uuid, list_id: Uuid) -> OutreachError {
    match err.sql_err() {
        Some(SqlErr::ForeignKeyConstraintViolation(message)) => {
            if message.contains("company") {
                OutreachError::CompanyNotFound(company_id)
            } else {
                OutreachError::ListNotFound(list_id.to_string())
            }
        }
        _ => err.into(),
    }
}

#[async_trait]
impl MembershipStore for PgMembershipStore {
    #[instrument(skip(self))]
    async fn get_list_by_slug(&self, slug: &str) -> OutreachResult<Option<OutreachList>> {
        let model = list::Entity::find()
            .filter(list::Column::Slug.eq(slug))
            .one(&self.db)
            .await?;
        Ok(model.map(Into::into))
    }

    #[instrument(skip(self), fields(action = %action))]
    async fn record(
        &self,
        list_id: Uuid,
        company_id: Uuid,
        action: MembershipAction,
        actor: &str,
    ) -> OutreachResult<MembershipEvent> {
        let event = membership_event::Model::new(list_id, company_id, action, actor.to_string());
        let event = append_event(&self.db, event).await?;
        Ok(event.into())
    }

    #[instrument(skip(self))]
    async fn latest_event(
        &self,
        list_id: Uuid,
        company_id: Uuid,
    ) -> OutreachResult<Option<MembershipEvent>> {
        let event = latest_event_on(&self.db, list_id, company_id).await?;
        Ok(event.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn history(
        &self,
        list_id: Uuid,
        company_id: Uuid,
    ) -> OutreachResult<Vec<MembershipEvent>> {
        let events = membership_event::Entity::find()
            .filter(membership_event::Column::ListId.eq(list_id))
            .filter(membership_event::Column::CompanyId.eq(company_id))
            .order_by_asc(membership_event::Column::RecordedAt)
            .order_by_asc(membership_event::Column::Id)
            .all(&self.db)
            .await?;

        Ok(events.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn current_members(
        &self,
        list_id: Uuid,
        limit: u64,
        offset: u64,
    ) -> OutreachResult<MembershipPage> {
        let count_sql = format!(
            "{} SELECT COUNT(*) AS total FROM latest WHERE action = 'added'",
            LATEST_EVENTS_CTE
        );
        let total = CountRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            &count_sql,
            [list_id.into()],
        ))
        .one(&self.db)
        .await?
        .map(|row| row.total as u64)
        .unwrap_or(0);

        let select_sql = format!(
            "{} SELECT company_id, recorded_at FROM latest WHERE action = 'added' \
             ORDER BY recorded_at DESC, company_id ASC LIMIT $2 OFFSET $3",
            LATEST_EVENTS_CTE
        );
        let rows = MemberRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            &select_sql,
            [list_id.into(), limit.into(), offset.into()],
        ))
        .all(&self.db)
        .await?;

        Ok(MembershipPage {
            members: rows
                .into_iter()
                .map(|row| ListMember {
                    company_id: row.company_id,
                    since: row.recorded_at.into(),
                })
                .collect(),
            total,
        })
    }

    #[instrument(skip(self, candidates), fields(count = candidates.len()))]
    async fn current_members_among(
        &self,
        list_id: Uuid,
        candidates: &[Uuid],
    ) -> OutreachResult<Vec<Uuid>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let mut values: Vec<Value> = vec![list_id.into()];
        let placeholders: Vec<String> = candidates
            .iter()
            .map(|id| {
                values.push((*id).into());
                format!("${}", values.len())
            })
            .collect();

        let sql = format!(
            "{} SELECT company_id FROM latest \
             WHERE action = 'added' AND company_id IN ({})",
            LATEST_EVENTS_CTE,
            placeholders.join(", ")
        );

        let rows = IdRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            &sql,
            values,
        ))
        .all(&self.db)
        .await?;

        Ok(rows.into_iter().map(|row| row.company_id).collect())
    }

    #[instrument(skip(self, from_list, to_list), fields(from = %from_list.slug, to = %to_list.slug))]
    async fn promote(
        &self,
        from_list: &OutreachList,
        to_list: &OutreachList,
        company_id: Uuid,
        actor: &str,
    ) -> OutreachResult<PromoteOutcome> {
        let txn = self.db.begin().await?;

        let latest_target = latest_event_on(&txn, to_list.id, company_id).await?;
        if latest_target.map(|e| e.action) == Some(MembershipAction::Added) {
            txn.commit().await?;
            return Ok(PromoteOutcome::AlreadyPromoted);
        }

        let latest_source = latest_event_on(&txn, from_list.id, company_id).await?;
        if latest_source.map(|e| e.action) == Some(MembershipAction::Added) {
            append_event(
                &txn,
                membership_event::Model::new(
                    from_list.id,
                    company_id,
                    MembershipAction::Removed,
                    actor.to_string(),
                ),
            )
            .await?;
        }

        append_event(
            &txn,
            membership_event::Model::new(
                to_list.id,
                company_id,
                MembershipAction::Added,
                actor.to_string(),
            ),
        )
        .await?;

        let change = status_change::Model::new(
            company_id,
            &from_list.slug,
            &to_list.slug,
            actor.to_string(),
        );
        status_change::Entity::insert(change.clone().into_active())
            .exec_without_returning(&txn)
            .await
            .map_err(|err| map_fk_violation(err, company_id, to_list.id))?;

        txn.commit().await?;

        info!(%company_id, "Company promoted");
        Ok(PromoteOutcome::Promoted(change.into()))
    }
}
