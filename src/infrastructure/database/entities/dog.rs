//! Dog entity

use crate::domain::{DogStatus, Sex};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "dogs")]
pub struct Model {
	#[sea_orm(primary_key)]
	pub id: i32,
	/// External registry identifier, often containing slashes
	#[sea_orm(unique)]
	pub registration_id: String,
	pub name: String,
	pub sex: String,
	pub breed: String,
	pub birth_date: Option<Date>,
	pub death_date: Option<Date>,
	pub deceased: bool,
	pub color: Option<String>,
	pub image_url: Option<String>,
	/// COMPLETE or PLACEHOLDER; placeholders exist only to satisfy
	/// relationship edges and await enrichment
	pub status: String,
	pub created_at: DateTimeUtc,
	pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
	#[sea_orm(has_many = "super::title::Entity")]
	Title,
}

impl Related<super::title::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Title.def()
	}
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
	pub fn sex(&self) -> Sex {
		self.sex.parse().unwrap_or(Sex::Unknown)
	}

	pub fn status(&self) -> DogStatus {
		self.status.parse().unwrap_or(DogStatus::Complete)
	}

	pub fn is_placeholder(&self) -> bool {
		self.status() == DogStatus::Placeholder
	}
}
