//! Create registry sessions table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
	async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		manager
			.create_table(
				Table::create()
					.table(RegistrySessions::Table)
					.if_not_exists()
					.col(
						ColumnDef::new(RegistrySessions::Id)
							.integer()
							.not_null()
							.auto_increment()
							.primary_key(),
					)
					.col(
						ColumnDef::new(RegistrySessions::Uuid)
							.uuid()
							.not_null()
							.unique_key(),
					)
					.col(ColumnDef::new(RegistrySessions::Cookies).text().not_null())
					.col(
						ColumnDef::new(RegistrySessions::ExpiresAt)
							.timestamp()
							.not_null(),
					)
					.col(
						ColumnDef::new(RegistrySessions::IsActive)
							.boolean()
							.not_null()
							.default(true),
					)
					.col(
						ColumnDef::new(RegistrySessions::LoginMethod)
							.text()
							.not_null(),
					)
					.col(
						ColumnDef::new(RegistrySessions::CreatedAt)
							.timestamp()
							.not_null(),
					)
					.to_owned(),
			)
			.await?;

		// Session acquisition picks the most recently created valid session
		manager
			.create_index(
				Index::create()
					.name("idx_registry_session_created_at")
					.table(RegistrySessions::Table)
					.col(RegistrySessions::CreatedAt)
					.to_owned(),
			)
			.await?;

		Ok(())
	}

	async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		manager
			.drop_table(Table::drop().table(RegistrySessions::Table).to_owned())
			.await
	}
}

#[derive(DeriveIden)]
enum RegistrySessions {
	Table,
	Id,
	Uuid,
	Cookies,
	ExpiresAt,
	IsActive,
	LoginMethod,
	CreatedAt,
}
