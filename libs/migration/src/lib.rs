pub use sea_orm_migration::prelude::*;

mod m20260801_000000_create_companies;
mod m20260801_000001_create_company_metrics;
mod m20260801_000002_create_lists;
mod m20260801_000003_create_membership_events;
mod m20260801_000004_create_status_changes;
mod m20260801_000005_seed_lists;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260801_000000_create_companies::Migration),
            Box::new(m20260801_000001_create_company_metrics::Migration),
            Box::new(m20260801_000002_create_lists::Migration),
            Box::new(m20260801_000003_create_membership_events::Migration),
            Box::new(m20260801_000004_create_status_changes::Migration),
            Box::new(m20260801_000005_seed_lists::Migration),
        ]
    }
}
