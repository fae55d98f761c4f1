//! Registry session entity
//!
//! Authentication state for the external pedigree registry. Sessions are
//! created by the login collaborator and invalidated here when a fetch
//! response turns out to be a login page.

use chrono::Utc;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "registry_sessions")]
pub struct Model {
	#[sea_orm(primary_key)]
	pub id: i32,
	#[sea_orm(unique)]
	pub uuid: Uuid,
	/// Opaque cookie blob sent verbatim in the Cookie header
	pub cookies: String,
	pub expires_at: DateTimeUtc,
	pub is_active: bool,
	/// PASSWORD or OAUTH, whichever login flow produced the session
	pub login_method: String,
	pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
	/// Usable right now: active and not past its expiry
	pub fn is_valid(&self) -> bool {
		self.is_active && self.expires_at > Utc::now()
	}
}
