use sea_orm_migration::sea_query::extension::postgres::Type;
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(MembershipAction::Enum)
                    .values([MembershipAction::Added, MembershipAction::Removed])
                    .to_owned(),
            )
            .await?;

        // Append-only audit log; current membership is derived from the most
        // recent event per (list_id, company_id). Rows are never updated or
        // deleted.
        manager
            .create_table(
                Table::create()
                    .table(MembershipEvents::Table)
                    .if_not_exists()
                    .col(pk_uuid(MembershipEvents::Id))
                    .col(uuid(MembershipEvents::ListId))
                    .col(uuid(MembershipEvents::CompanyId))
                    .col(
                        ColumnDef::new(MembershipEvents::Action)
                            .enumeration(
                                MembershipAction::Enum,
                                [MembershipAction::Added, MembershipAction::Removed],
                            )
                            .not_null(),
                    )
                    .col(string(MembershipEvents::Actor))
                    .col(
                        timestamp_with_time_zone(MembershipEvents::RecordedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_membership_events_list")
                            .from(MembershipEvents::Table, MembershipEvents::ListId)
                            .to(Lists::Table, Lists::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_membership_events_company")
                            .from(MembershipEvents::Table, MembershipEvents::CompanyId)
                            .to(Companies::Table, Companies::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_membership_events_pair")
                    .table(MembershipEvents::Table)
                    .col(MembershipEvents::ListId)
                    .col(MembershipEvents::CompanyId)
                    .col(MembershipEvents::RecordedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MembershipEvents::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(MembershipAction::Enum).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum MembershipEvents {
    Table,
    Id,
    ListId,
    CompanyId,
    Action,
    Actor,
    RecordedAt,
}

#[derive(DeriveIden)]
enum MembershipAction {
    #[sea_orm(iden = "membership_action")]
    Enum,
    Added,
    Removed,
}

#[derive(DeriveIden)]
enum Lists {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Companies {
    Table,
    Id,
}
