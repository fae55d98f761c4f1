//! Relationship store for ancestry edges
//!
//! Enforces the path scheme's structural invariants on top of the database
//! constraints: relationship type and generation are always derived from the
//! path, inserts are guarded by existence checks on the full uniqueness key,
//! and branch deletion follows the string-prefix relation.

use sea_orm::{
	ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

use crate::domain::{LineageSide, PathError, PedigreePath};
use crate::infrastructure::database::entities::pedigree_relationship;

/// Relationship store errors
#[derive(Error, Debug)]
pub enum StoreError {
	#[error("database error: {0}")]
	Database(#[from] DbErr),

	#[error("invalid pedigree path: {0}")]
	Path(#[from] PathError),

	/// An edge references a dog row that no longer exists; the schema's
	/// foreign keys make this a programming error, so it fails loudly
	#[error("relationship edge references missing dog {0}")]
	DanglingEdge(i32),
}

/// Persistence service for pedigree relationship edges
#[derive(Clone)]
pub struct PedigreeStore {
	db: DatabaseConnection,
}

impl PedigreeStore {
	pub fn new(db: DatabaseConnection) -> Self {
		Self { db }
	}

	/// The edge occupying the exact (descendant, path) slot, if any.
	/// One call per tree node in tree reconstruction.
	pub async fn find(
		&self,
		descendant_id: i32,
		path: &PedigreePath,
	) -> Result<Option<pedigree_relationship::Model>, StoreError> {
		let edge = pedigree_relationship::Entity::find()
			.filter(pedigree_relationship::Column::DescendantId.eq(descendant_id))
			.filter(pedigree_relationship::Column::Path.eq(path.as_str()))
			.one(&self.db)
			.await?;
		Ok(edge)
	}

	/// Idempotent insert: creates the edge unless a row with the full
	/// uniqueness key already exists. Returns whether a row was created.
	pub async fn ensure(
		&self,
		descendant_id: i32,
		ancestor_id: i32,
		path: &PedigreePath,
	) -> Result<bool, StoreError> {
		let kind = path.relationship_kind();
		let generation = path.generation() as i32;

		let existing = pedigree_relationship::Entity::find()
			.filter(pedigree_relationship::Column::DescendantId.eq(descendant_id))
			.filter(pedigree_relationship::Column::AncestorId.eq(ancestor_id))
			.filter(pedigree_relationship::Column::RelationshipType.eq(kind.to_string()))
			.filter(pedigree_relationship::Column::Generation.eq(generation))
			.filter(pedigree_relationship::Column::Path.eq(path.as_str()))
			.one(&self.db)
			.await?;
		if existing.is_some() {
			return Ok(false);
		}

		self.insert_edge(descendant_id, ancestor_id, path).await?;
		debug!(descendant_id, ancestor_id, path = %path, "Created pedigree edge");
		Ok(true)
	}

	/// Manual pedigree editing: put `ancestor_id` at the given slot,
	/// replacing whatever occupied it
	pub async fn set_ancestor(
		&self,
		descendant_id: i32,
		ancestor_id: i32,
		path: &PedigreePath,
	) -> Result<(), StoreError> {
		pedigree_relationship::Entity::delete_many()
			.filter(pedigree_relationship::Column::DescendantId.eq(descendant_id))
			.filter(pedigree_relationship::Column::Path.eq(path.as_str()))
			.exec(&self.db)
			.await?;
		self.insert_edge(descendant_id, ancestor_id, path).await?;
		Ok(())
	}

	/// Delete the edge at `prefix` and every edge on the branch beneath it.
	/// Used when a lineage branch is cleared for re-entry or superseded by
	/// resynchronization. Returns the number of edges removed.
	pub async fn clear_branch(
		&self,
		descendant_id: i32,
		prefix: &PedigreePath,
	) -> Result<u64, StoreError> {
		// Paths only contain '0'/'1', so no LIKE-escaping is needed
		let result = pedigree_relationship::Entity::delete_many()
			.filter(pedigree_relationship::Column::DescendantId.eq(descendant_id))
			.filter(pedigree_relationship::Column::Path.starts_with(prefix.as_str()))
			.exec(&self.db)
			.await?;
		debug!(
			descendant_id,
			prefix = %prefix,
			removed = result.rows_affected,
			"Cleared pedigree branch"
		);
		Ok(result.rows_affected)
	}

	/// Generation-1 parents of a dog: (sire edge, dam edge)
	pub async fn parents_of(
		&self,
		descendant_id: i32,
	) -> Result<
		(
			Option<pedigree_relationship::Model>,
			Option<pedigree_relationship::Model>,
		),
		StoreError,
	> {
		let sire = self
			.find(descendant_id, &LineageSide::Paternal.root_path())
			.await?;
		let dam = self
			.find(descendant_id, &LineageSide::Maternal.root_path())
			.await?;
		Ok((sire, dam))
	}

	/// Sync targets: descendants with both a sire and a dam edge at
	/// generation 1. A registry tree lookup needs both parents.
	pub async fn descendants_with_both_parents(&self) -> Result<Vec<i32>, StoreError> {
		let with_sire: HashSet<i32> = pedigree_relationship::Entity::find()
			.filter(pedigree_relationship::Column::Path.eq("0"))
			.all(&self.db)
			.await?
			.into_iter()
			.map(|edge| edge.descendant_id)
			.collect();
		let mut targets: Vec<i32> = pedigree_relationship::Entity::find()
			.filter(pedigree_relationship::Column::Path.eq("1"))
			.all(&self.db)
			.await?
			.into_iter()
			.map(|edge| edge.descendant_id)
			.filter(|id| with_sire.contains(id))
			.collect();
		targets.sort_unstable();
		Ok(targets)
	}

	async fn insert_edge(
		&self,
		descendant_id: i32,
		ancestor_id: i32,
		path: &PedigreePath,
	) -> Result<pedigree_relationship::Model, StoreError> {
		let edge = pedigree_relationship::ActiveModel {
			descendant_id: Set(descendant_id),
			ancestor_id: Set(ancestor_id),
			relationship_type: Set(path.relationship_kind().to_string()),
			generation: Set(path.generation() as i32),
			path: Set(path.as_str().to_string()),
			created_at: Set(chrono::Utc::now()),
			..Default::default()
		}
		.insert(&self.db)
		.await?;
		Ok(edge)
	}
}
