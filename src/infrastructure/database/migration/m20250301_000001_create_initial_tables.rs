//! Create dogs and titles tables

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
	async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		manager
			.create_table(
				Table::create()
					.table(Dogs::Table)
					.if_not_exists()
					.col(
						ColumnDef::new(Dogs::Id)
							.integer()
							.not_null()
							.auto_increment()
							.primary_key(),
					)
					.col(
						ColumnDef::new(Dogs::RegistrationId)
							.text()
							.not_null()
							.unique_key(),
					)
					.col(ColumnDef::new(Dogs::Name).text().not_null())
					.col(ColumnDef::new(Dogs::Sex).text().not_null())
					.col(ColumnDef::new(Dogs::Breed).text().not_null())
					.col(ColumnDef::new(Dogs::BirthDate).date())
					.col(ColumnDef::new(Dogs::DeathDate).date())
					.col(
						ColumnDef::new(Dogs::Deceased)
							.boolean()
							.not_null()
							.default(false),
					)
					.col(ColumnDef::new(Dogs::Color).text())
					.col(ColumnDef::new(Dogs::ImageUrl).text())
					.col(ColumnDef::new(Dogs::Status).text().not_null())
					.col(ColumnDef::new(Dogs::CreatedAt).timestamp().not_null())
					.col(ColumnDef::new(Dogs::UpdatedAt).timestamp().not_null())
					.to_owned(),
			)
			.await?;

		manager
			.create_table(
				Table::create()
					.table(Titles::Table)
					.if_not_exists()
					.col(
						ColumnDef::new(Titles::Id)
							.integer()
							.not_null()
							.auto_increment()
							.primary_key(),
					)
					.col(ColumnDef::new(Titles::DogId).integer().not_null())
					.col(ColumnDef::new(Titles::Code).text().not_null())
					.col(ColumnDef::new(Titles::CreatedAt).timestamp().not_null())
					.foreign_key(
						ForeignKey::create()
							.name("fk_title_dog")
							.from(Titles::Table, Titles::DogId)
							.to(Dogs::Table, Dogs::Id)
							.on_delete(ForeignKeyAction::Cascade),
					)
					.to_owned(),
			)
			.await?;

		// Title import is idempotent against this key
		manager
			.create_index(
				Index::create()
					.name("idx_title_dog_code_unique")
					.table(Titles::Table)
					.col(Titles::DogId)
					.col(Titles::Code)
					.unique()
					.to_owned(),
			)
			.await?;

		Ok(())
	}

	async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		manager
			.drop_table(Table::drop().table(Titles::Table).to_owned())
			.await?;
		manager
			.drop_table(Table::drop().table(Dogs::Table).to_owned())
			.await
	}
}

#[derive(DeriveIden)]
enum Dogs {
	Table,
	Id,
	RegistrationId,
	Name,
	Sex,
	Breed,
	BirthDate,
	DeathDate,
	Deceased,
	Color,
	ImageUrl,
	Status,
	CreatedAt,
	UpdatedAt,
}

#[derive(DeriveIden)]
enum Titles {
	Table,
	Id,
	DogId,
	Code,
	CreatedAt,
}
