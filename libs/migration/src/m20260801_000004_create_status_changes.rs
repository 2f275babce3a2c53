use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Append-only trail of logical status transitions (promote)
        manager
            .create_table(
                Table::create()
                    .table(StatusChanges::Table)
                    .if_not_exists()
                    .col(pk_uuid(StatusChanges::Id))
                    .col(uuid(StatusChanges::CompanyId))
                    .col(string(StatusChanges::FromStatus))
                    .col(string(StatusChanges::ToStatus))
                    .col(string(StatusChanges::Actor))
                    .col(
                        timestamp_with_time_zone(StatusChanges::RecordedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_status_changes_company")
                            .from(StatusChanges::Table, StatusChanges::CompanyId)
                            .to(Companies::Table, Companies::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_status_changes_company")
                    .table(StatusChanges::Table)
                    .col(StatusChanges::CompanyId)
                    .col(StatusChanges::RecordedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(StatusChanges::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum StatusChanges {
    Table,
    Id,
    CompanyId,
    FromStatus,
    ToStatus,
    Actor,
    RecordedAt,
}

#[derive(DeriveIden)]
enum Companies {
    Table,
    Id,
}
