pub use sea_orm_migration::prelude::*;

pub mod entities;
mod m20250301_000001_ctas;
mod m20250301_000002_cta_events;
mod m20250301_000003_app_settings;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_ctas::Migration),
            Box::new(m20250301_000002_cta_events::Migration),
            Box::new(m20250301_000003_app_settings::Migration),
        ]
    }
}
