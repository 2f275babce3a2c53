use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Lists::Table)
                    .if_not_exists()
                    .col(pk_uuid(Lists::Id))
                    .col(string_uniq(Lists::Slug))
                    .col(string(Lists::Name))
                    .col(
                        timestamp_with_time_zone(Lists::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Lists::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Lists {
    Table,
    Id,
    Slug,
    Name,
    CreatedAt,
}
