pub use sea_orm_migration::prelude::*;

mod iden;
mod m20241113_000001_create_reservation_tables;
mod m20241124_000002_create_ordering_tables;
mod m20241130_000003_user_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20241113_000001_create_reservation_tables::Migration),
            Box::new(m20241124_000002_create_ordering_tables::Migration),
            Box::new(m20241130_000003_user_table::Migration),
        ]
    }
}
