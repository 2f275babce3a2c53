use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // One row per (company, calendar month, geography scope); re-ingestion
        // of the same period overwrites the whole row.
        manager
            .create_table(
                Table::create()
                    .table(CompanyMetricsMonthly::Table)
                    .if_not_exists()
                    .col(uuid(CompanyMetricsMonthly::CompanyId))
                    .col(date(CompanyMetricsMonthly::Month))
                    .col(string(CompanyMetricsMonthly::Country))
                    .col(double_null(CompanyMetricsMonthly::Visits))
                    .col(double_null(CompanyMetricsMonthly::PagesPerVisit))
                    .col(double_null(CompanyMetricsMonthly::AvgVisitSecs))
                    .col(double_null(CompanyMetricsMonthly::BounceRate))
                    .col(double_null(CompanyMetricsMonthly::PageViews))
                    .col(
                        timestamp_with_time_zone(CompanyMetricsMonthly::LoadTs)
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(CompanyMetricsMonthly::CompanyId)
                            .col(CompanyMetricsMonthly::Month)
                            .col(CompanyMetricsMonthly::Country),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_company_metrics_company")
                            .from(
                                CompanyMetricsMonthly::Table,
                                CompanyMetricsMonthly::CompanyId,
                            )
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Latest-snapshot lookups scan (company_id, country) ordered by month
        manager
            .create_index(
                Index::create()
                    .name("idx_company_metrics_latest")
                    .table(CompanyMetricsMonthly::Table)
                    .col(CompanyMetricsMonthly::CompanyId)
                    .col(CompanyMetricsMonthly::Country)
                    .col(CompanyMetricsMonthly::Month)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CompanyMetricsMonthly::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CompanyMetricsMonthly {
    Table,
    CompanyId,
    Month,
    Country,
    Visits,
    PagesPerVisit,
    AvgVisitSecs,
    BounceRate,
    PageViews,
    LoadTs,
}

#[derive(DeriveIden)]
enum Companies {
    Table,
    Id,
}
