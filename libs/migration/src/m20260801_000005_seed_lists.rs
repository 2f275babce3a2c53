use sea_orm_migration::prelude::*;
use uuid::Uuid;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Bootstrap reference data; lists are not created at runtime
        let insert = Query::insert()
            .into_table(Lists::Table)
            .columns([Lists::Id, Lists::Slug, Lists::Name])
            .values_panic([
                Uuid::new_v4().into(),
                "interested".into(),
                "Interested".into(),
            ])
            .values_panic([
                Uuid::new_v4().into(),
                "reached_out".into(),
                "Reached Out".into(),
            ])
            .to_owned();

        manager.exec_stmt(insert).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let delete = Query::delete()
            .from_table(Lists::Table)
            .cond_where(Expr::col(Lists::Slug).is_in(["interested", "reached_out"]))
            .to_owned();

        manager.exec_stmt(delete).await
    }
}

#[derive(DeriveIden)]
enum Lists {
    Table,
    Id,
    Slug,
    Name,
}
