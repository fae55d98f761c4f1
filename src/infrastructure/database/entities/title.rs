//! Title entity
//!
//! One row per (dog, title code). The registry delivers titles as a single
//! space-separated string of codes; importing splits that string and relies
//! on the (dog_id, code) uniqueness for idempotency.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "titles")]
pub struct Model {
	#[sea_orm(primary_key)]
	pub id: i32,
	pub dog_id: i32,
	pub code: String,
	pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
	#[sea_orm(
		belongs_to = "super::dog::Entity",
		from = "Column::DogId",
		to = "super::dog::Column::Id"
	)]
	Dog,
}

impl Related<super::dog::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Dog.def()
	}
}

impl ActiveModelBehavior for ActiveModel {}
