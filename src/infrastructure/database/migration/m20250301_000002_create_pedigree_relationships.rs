//! Create pedigree relationships table
//!
//! Edges of the ancestry graph: (descendant, path) identifies a lineage
//! slot, and the full composite key keeps resynchronization from
//! accumulating duplicates.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
	async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		manager
			.create_table(
				Table::create()
					.table(PedigreeRelationships::Table)
					.if_not_exists()
					.col(
						ColumnDef::new(PedigreeRelationships::Id)
							.integer()
							.not_null()
							.auto_increment()
							.primary_key(),
					)
					.col(
						ColumnDef::new(PedigreeRelationships::DescendantId)
							.integer()
							.not_null(),
					)
					.col(
						ColumnDef::new(PedigreeRelationships::AncestorId)
							.integer()
							.not_null(),
					)
					.col(
						ColumnDef::new(PedigreeRelationships::RelationshipType)
							.text()
							.not_null(),
					)
					.col(
						ColumnDef::new(PedigreeRelationships::Generation)
							.integer()
							.not_null(),
					)
					.col(ColumnDef::new(PedigreeRelationships::Path).text().not_null())
					.col(
						ColumnDef::new(PedigreeRelationships::CreatedAt)
							.timestamp()
							.not_null(),
					)
					.foreign_key(
						ForeignKey::create()
							.name("fk_pedigree_descendant")
							.from(
								PedigreeRelationships::Table,
								PedigreeRelationships::DescendantId,
							)
							.to(Dogs::Table, Dogs::Id)
							.on_delete(ForeignKeyAction::Cascade),
					)
					.foreign_key(
						ForeignKey::create()
							.name("fk_pedigree_ancestor")
							.from(
								PedigreeRelationships::Table,
								PedigreeRelationships::AncestorId,
							)
							.to(Dogs::Table, Dogs::Id)
							.on_delete(ForeignKeyAction::Cascade),
					)
					.to_owned(),
			)
			.await?;

		// Full uniqueness key guarding idempotent resynchronization
		manager
			.create_index(
				Index::create()
					.name("idx_pedigree_unique_edge")
					.table(PedigreeRelationships::Table)
					.col(PedigreeRelationships::DescendantId)
					.col(PedigreeRelationships::AncestorId)
					.col(PedigreeRelationships::RelationshipType)
					.col(PedigreeRelationships::Generation)
					.col(PedigreeRelationships::Path)
					.unique()
					.to_owned(),
			)
			.await?;

		// A descendant has at most one ancestor per lineage slot
		manager
			.create_index(
				Index::create()
					.name("idx_pedigree_descendant_path_unique")
					.table(PedigreeRelationships::Table)
					.col(PedigreeRelationships::DescendantId)
					.col(PedigreeRelationships::Path)
					.unique()
					.to_owned(),
			)
			.await?;

		manager
			.create_index(
				Index::create()
					.name("idx_pedigree_descendant")
					.table(PedigreeRelationships::Table)
					.col(PedigreeRelationships::DescendantId)
					.to_owned(),
			)
			.await?;

		Ok(())
	}

	async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		manager
			.drop_table(
				Table::drop()
					.table(PedigreeRelationships::Table)
					.to_owned(),
			)
			.await
	}
}

#[derive(DeriveIden)]
enum PedigreeRelationships {
	Table,
	Id,
	DescendantId,
	AncestorId,
	RelationshipType,
	Generation,
	Path,
	CreatedAt,
}

#[derive(DeriveIden)]
enum Dogs {
	Table,
	Id,
}
