//! Registry session management
//!
//! The login handshake itself is an external collaborator; it deposits
//! sessions here. This module hands out valid sessions to the sync engine
//! and invalidates them when the client detects expiry.

use chrono::{DateTime, Utc};
use sea_orm::{
	ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
	QueryOrder, Set,
};
use strum::{Display, EnumString};
use tracing::{info, warn};
use uuid::Uuid;

use crate::infrastructure::database::entities::registry_session;

/// A stored registry session row
pub type Session = registry_session::Model;

/// The two login flows the registry supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum LoginMethod {
	Password,
	OAuth,
}

/// Tracks registry sessions with expiry and invalidation
#[derive(Clone)]
pub struct SessionManager {
	db: DatabaseConnection,
}

impl SessionManager {
	pub fn new(db: DatabaseConnection) -> Self {
		Self { db }
	}

	/// A currently usable session: active and unexpired. With `id`, only
	/// that session qualifies; without, the most recently created valid one
	/// wins. Expiry is part of the query so a newer expired session never
	/// shadows an older usable one.
	pub async fn get_valid_session(&self, id: Option<Uuid>) -> Result<Option<Session>, DbErr> {
		let mut query = registry_session::Entity::find()
			.filter(registry_session::Column::IsActive.eq(true))
			.filter(registry_session::Column::ExpiresAt.gt(Utc::now()));
		if let Some(id) = id {
			query = query.filter(registry_session::Column::Uuid.eq(id));
		}
		query
			.order_by_desc(registry_session::Column::CreatedAt)
			.one(&self.db)
			.await
	}

	/// Mark a session inactive. Called when a fetch response turns out to
	/// be a login page, so the next run acquires a fresh session.
	pub async fn invalidate(&self, id: Uuid) -> Result<(), DbErr> {
		let Some(session) = registry_session::Entity::find()
			.filter(registry_session::Column::Uuid.eq(id))
			.one(&self.db)
			.await?
		else {
			warn!("Cannot invalidate unknown registry session {id}");
			return Ok(());
		};

		let mut active: registry_session::ActiveModel = session.into();
		active.is_active = Set(false);
		active.update(&self.db).await?;
		info!("Invalidated registry session {id}");
		Ok(())
	}

	/// Store a freshly obtained session. Used by the login collaborator.
	pub async fn store_session(
		&self,
		cookies: String,
		expires_at: DateTime<Utc>,
		login_method: LoginMethod,
	) -> Result<Session, DbErr> {
		let session = registry_session::ActiveModel {
			uuid: Set(Uuid::new_v4()),
			cookies: Set(cookies),
			expires_at: Set(expires_at),
			is_active: Set(true),
			login_method: Set(login_method.to_string()),
			created_at: Set(Utc::now()),
			..Default::default()
		}
		.insert(&self.db)
		.await?;
		info!("Stored registry session {}", session.uuid);
		Ok(session)
	}
}
