//! Pedigree tree reconstruction
//!
//! Rebuilds a bounded-depth binary ancestor tree from the flat relationship
//! store by recursive (descendant, path) lookup: one store lookup per
//! emitted node, terminating early wherever an ancestor is unknown.

use futures::future::BoxFuture;
use futures::FutureExt;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

use crate::domain::{LineageSide, PedigreePath, RelationshipKind, TreeNode, TreePayload};
use crate::infrastructure::database::entities::{dog, title};
use crate::services::pedigree_store::{PedigreeStore, StoreError};

/// Trees are capped at three generations for display; deeper data stays in
/// the store and is reachable by rebuilding from an intermediate ancestor.
pub const DEFAULT_MAX_DEPTH: u32 = 3;

/// Reconstructs ancestor trees for presentation layers
#[derive(Clone)]
pub struct TreeBuilder {
	db: DatabaseConnection,
	store: PedigreeStore,
}

impl TreeBuilder {
	pub fn new(db: DatabaseConnection) -> Self {
		let store = PedigreeStore::new(db.clone());
		Self { db, store }
	}

	/// Build one side of a dog's pedigree. `None` when the side's root
	/// ancestor is unknown; the caller renders nothing for that line.
	pub async fn build_tree(
		&self,
		descendant_id: i32,
		side: LineageSide,
		max_depth: u32,
	) -> Result<Option<TreeNode>, StoreError> {
		self.node_at(descendant_id, side.root_path(), max_depth).await
	}

	fn node_at(
		&self,
		descendant_id: i32,
		path: PedigreePath,
		max_depth: u32,
	) -> BoxFuture<'_, Result<Option<TreeNode>, StoreError>> {
		async move {
			let Some(edge) = self.store.find(descendant_id, &path).await? else {
				return Ok(None);
			};

			let ancestor = dog::Entity::find_by_id(edge.ancestor_id)
				.one(&self.db)
				.await?
				.ok_or(StoreError::DanglingEdge(edge.ancestor_id))?;

			let titles = title::Entity::find()
				.filter(title::Column::DogId.eq(ancestor.id))
				.order_by_asc(title::Column::Id)
				.all(&self.db)
				.await?
				.into_iter()
				.map(|t| t.code)
				.collect();

			let payload = TreePayload {
				dog_id: ancestor.id,
				registration_id: ancestor.registration_id,
				name: ancestor.name,
				titles,
				image_url: ancestor.image_url,
				label: path.label(),
				generation: path.generation(),
				path: path.clone(),
			};

			let mut children = Vec::new();
			if path.generation() < max_depth {
				for branch in [RelationshipKind::Sire, RelationshipKind::Dam] {
					if let Some(child) = self
						.node_at(descendant_id, path.child(branch), max_depth)
						.await?
					{
						children.push(child);
					}
				}
			}

			Ok(Some(TreeNode { payload, children }))
		}
		.boxed()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::domain::Sex;
	use crate::services::pedigree_store::tests::{insert_dog, setup};

	fn path(raw: &str) -> PedigreePath {
		PedigreePath::parse(raw).unwrap()
	}

	#[tokio::test]
	async fn builds_paternal_tree_and_omits_missing_maternal_side() {
		let (db, store) = setup().await;
		let child = insert_dog(db.conn(), "DK100/2022", "Pup", Sex::Male).await;
		let sire = insert_dog(db.conn(), "DK050/2019", "Sire", Sex::Male).await;
		let grandsire = insert_dog(db.conn(), "DK020/2016", "Grandsire", Sex::Male).await;
		let granddam = insert_dog(db.conn(), "DK021/2016", "Granddam", Sex::Female).await;

		store.ensure(child.id, sire.id, &path("0")).await.unwrap();
		store.ensure(child.id, grandsire.id, &path("00")).await.unwrap();
		store.ensure(child.id, granddam.id, &path("01")).await.unwrap();

		let builder = TreeBuilder::new(db.conn().clone());
		let tree = builder
			.build_tree(child.id, LineageSide::Paternal, DEFAULT_MAX_DEPTH)
			.await
			.unwrap()
			.expect("paternal side present");

		assert_eq!(tree.payload.name, "Sire");
		assert_eq!(tree.payload.label, "Father");
		assert_eq!(tree.children.len(), 2);

		let sire_branch = tree.child(RelationshipKind::Sire).unwrap();
		assert_eq!(sire_branch.payload.path, path("00"));
		assert_eq!(sire_branch.payload.label, "Paternal Grandfather");
		assert!(sire_branch.children.is_empty());

		let dam_branch = tree.child(RelationshipKind::Dam).unwrap();
		assert_eq!(dam_branch.payload.path, path("01"));
		assert!(dam_branch.children.is_empty());

		// No maternal edges at all: that side is absent, not an error
		let maternal = builder
			.build_tree(child.id, LineageSide::Maternal, DEFAULT_MAX_DEPTH)
			.await
			.unwrap();
		assert!(maternal.is_none());
	}

	#[tokio::test]
	async fn recursion_stops_at_max_depth() {
		let (db, store) = setup().await;
		let child = insert_dog(db.conn(), "DK100/2022", "Pup", Sex::Male).await;
		let g1 = insert_dog(db.conn(), "G1", "G1", Sex::Male).await;
		let g2 = insert_dog(db.conn(), "G2", "G2", Sex::Male).await;
		let g3 = insert_dog(db.conn(), "G3", "G3", Sex::Male).await;
		let g4 = insert_dog(db.conn(), "G4", "G4", Sex::Male).await;

		store.ensure(child.id, g1.id, &path("0")).await.unwrap();
		store.ensure(child.id, g2.id, &path("00")).await.unwrap();
		store.ensure(child.id, g3.id, &path("000")).await.unwrap();
		store.ensure(child.id, g4.id, &path("0000")).await.unwrap();

		let builder = TreeBuilder::new(db.conn().clone());
		let tree = builder
			.build_tree(child.id, LineageSide::Paternal, 3)
			.await
			.unwrap()
			.unwrap();

		let gen2 = tree.child(RelationshipKind::Sire).unwrap();
		let gen3 = gen2.child(RelationshipKind::Sire).unwrap();
		assert_eq!(gen3.payload.generation, 3);
		// The generation-4 edge exists in the store but is not rendered
		assert!(gen3.children.is_empty());
	}

	#[tokio::test]
	async fn payload_carries_titles_and_image() {
		use chrono::Utc;
		use sea_orm::{ActiveModelTrait, ActiveValue::Set};

		let (db, store) = setup().await;
		let child = insert_dog(db.conn(), "DK100/2022", "Pup", Sex::Male).await;
		let sire = insert_dog(db.conn(), "DK050/2019", "Sire", Sex::Male).await;

		for code in ["CH", "WW21"] {
			title::ActiveModel {
				dog_id: Set(sire.id),
				code: Set(code.to_string()),
				created_at: Set(Utc::now()),
				..Default::default()
			}
			.insert(db.conn())
			.await
			.unwrap();
		}
		store.ensure(child.id, sire.id, &path("0")).await.unwrap();

		let builder = TreeBuilder::new(db.conn().clone());
		let tree = builder
			.build_tree(child.id, LineageSide::Paternal, DEFAULT_MAX_DEPTH)
			.await
			.unwrap()
			.unwrap();

		assert_eq!(tree.payload.titles, vec!["CH", "WW21"]);
		assert_eq!(tree.payload.registration_id, "DK050/2019");
	}
}
