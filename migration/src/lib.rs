pub use sea_orm_migration::prelude::*;

mod m20260901_000001_create_products;
mod m20260901_000002_create_discounts;
mod m20260901_000003_create_orders;
mod m20260915_000001_add_order_tracking;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260901_000001_create_products::Migration),
            Box::new(m20260901_000002_create_discounts::Migration),
            Box::new(m20260901_000003_create_orders::Migration),
            Box::new(m20260915_000001_add_order_tracking::Migration),
        ]
    }
}
