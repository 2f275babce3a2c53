use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Companies::Table)
                    .if_not_exists()
                    .col(pk_uuid(Companies::Id))
                    // Normalized, case-insensitive natural key
                    .col(string_uniq(Companies::Domain))
                    .col(string_null(Companies::Name))
                    .col(string_null(Companies::WebsiteUrl))
                    .col(string_null(Companies::Country))
                    .col(string_null(Companies::Industry))
                    .col(string_null(Companies::EmployeeRange))
                    .col(json_binary(Companies::TechTags).default("[]"))
                    .col(
                        timestamp_with_time_zone(Companies::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Companies::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_companies_industry")
                    .table(Companies::Table)
                    .col(Companies::Industry)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_companies_country")
                    .table(Companies::Table)
                    .col(Companies::Country)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Companies::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Companies {
    Table,
    Id,
    Domain,
    Name,
    WebsiteUrl,
    Country,
    Industry,
    EmployeeRange,
    TechTags,
    CreatedAt,
    UpdatedAt,
}
