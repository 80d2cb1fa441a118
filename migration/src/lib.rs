pub use sea_orm_migration::prelude::*;

pub mod entities;
mod m20261001_000001_counter_tables;
mod m20261001_000002_settings_cache_queue;
mod m20261001_000003_content_catalog;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_counter_tables::Migration),
            Box::new(m20261001_000002_settings_cache_queue::Migration),
            Box::new(m20261001_000003_content_catalog::Migration),
        ]
    }
}
