//! Pedigree relationship entity
//!
//! One row encodes "ancestor occupies lineage position `path` relative to
//! descendant". `relationship_type` and `generation` are derived from the
//! path and stored denormalized for querying; the path remains the source
//! of truth.

use crate::domain::{PathError, PedigreePath, RelationshipKind};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pedigree_relationships")]
pub struct Model {
	#[sea_orm(primary_key)]
	pub id: i32,
	pub descendant_id: i32,
	pub ancestor_id: i32,
	/// SIRE or DAM, always equal to the path's final digit
	pub relationship_type: String,
	/// Always equal to the path length
	pub generation: i32,
	/// String of '0'/'1' digits read from the descendant
	pub path: String,
	pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
	#[sea_orm(
		belongs_to = "super::dog::Entity",
		from = "Column::DescendantId",
		to = "super::dog::Column::Id"
	)]
	Descendant,
	#[sea_orm(
		belongs_to = "super::dog::Entity",
		from = "Column::AncestorId",
		to = "super::dog::Column::Id"
	)]
	Ancestor,
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
	pub fn pedigree_path(&self) -> Result<PedigreePath, PathError> {
		PedigreePath::parse(&self.path)
	}

	pub fn kind(&self) -> RelationshipKind {
		self.relationship_type
			.parse()
			.unwrap_or(RelationshipKind::Sire)
	}
}
