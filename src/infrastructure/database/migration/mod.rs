//! Database migrations

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
	fn migrations() -> Vec<Box<dyn MigrationTrait>> {
		vec![
			Box::new(m20250301_000001_create_initial_tables::Migration),
			Box::new(m20250301_000002_create_pedigree_relationships::Migration),
			Box::new(m20250315_000001_create_registry_sessions::Migration),
		]
	}
}

mod m20250301_000001_create_initial_tables;
mod m20250301_000002_create_pedigree_relationships;
mod m20250315_000001_create_registry_sessions;
