//! Registry synchronization engine
//!
//! Imports pedigree data from the external registry for every locally known
//! dog that has both generation-1 parents recorded. Targets are processed
//! strictly one at a time with a pacing delay between registry calls; the
//! only run-fatal condition is having no valid session. Everything written
//! is guarded by existence checks, so re-running against unchanged source
//! data creates nothing.

use chrono::Utc;
use sea_orm::{
	ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{DogStatus, PathError, PedigreePath};
use crate::infrastructure::database::entities::{dog, title};
use crate::infrastructure::registry::{PedigreeSource, RawAncestor, RegistryError, Session, SessionManager};
use crate::services::pedigree_store::{PedigreeStore, StoreError};

/// Tuning for a synchronization run
#[derive(Debug, Clone)]
pub struct SyncOptions {
	/// Generations requested from the registry
	pub depth: u8,
	/// Delay between per-target registry calls. Politeness toward the
	/// third-party service, not a correctness requirement.
	pub pacing: Duration,
	/// Pin the run to a specific session instead of the most recent one
	pub session_id: Option<Uuid>,
	/// Breed assigned to placeholder ancestors
	pub placeholder_breed: String,
}

impl Default for SyncOptions {
	fn default() -> Self {
		Self {
			depth: 3,
			pacing: Duration::from_millis(400),
			session_id: None,
			placeholder_breed: "Unknown".to_string(),
		}
	}
}

/// Aggregate outcome of a synchronization run
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
	pub targets_processed: u64,
	/// Targets never attempted because the session died mid-run
	pub targets_skipped: u64,
	pub trees_fetched: u64,
	pub ancestors_created: u64,
	pub relationships_created: u64,
	/// Slots whose stale occupant was superseded by fresh registry data
	pub relationships_replaced: u64,
	pub titles_created: u64,
	/// Pedigrees the registry does not have; expected, not errors
	pub not_found: u64,
	/// Pedigrees the registry refused to serve; expected, not errors
	pub access_denied: u64,
	pub errors: Vec<String>,
}

/// Run-level synchronization errors
#[derive(Error, Debug)]
pub enum SyncError {
	/// The only run-fatal condition: nothing to authenticate with
	#[error("no valid registry session available")]
	NoSession,

	#[error("database error: {0}")]
	Database(#[from] DbErr),

	#[error("store error: {0}")]
	Store(#[from] StoreError),
}

/// Errors scoped to a single target; recorded, never run-fatal
#[derive(Error, Debug)]
enum TargetError {
	#[error("{0}")]
	Registry(#[from] RegistryError),

	#[error("database error: {0}")]
	Database(#[from] DbErr),

	#[error("store error: {0}")]
	Store(#[from] StoreError),

	#[error("registry returned invalid path: {0}")]
	Path(#[from] PathError),

	#[error("generation-1 parent record missing")]
	MissingParent,
}

/// Orchestrates session acquisition, per-target fetch, and mapping of raw
/// registry records into local placeholders, titles, and relationship edges
pub struct SyncEngine<S: PedigreeSource> {
	db: DatabaseConnection,
	store: PedigreeStore,
	sessions: SessionManager,
	source: S,
	options: SyncOptions,
}

impl<S: PedigreeSource> SyncEngine<S> {
	pub fn new(db: DatabaseConnection, source: S, options: SyncOptions) -> Self {
		let store = PedigreeStore::new(db.clone());
		let sessions = SessionManager::new(db.clone());
		Self {
			db,
			store,
			sessions,
			source,
			options,
		}
	}

	/// Run one synchronization pass over all eligible dogs
	pub async fn run(&self) -> Result<SyncReport, SyncError> {
		let session = self
			.sessions
			.get_valid_session(self.options.session_id)
			.await?
			.ok_or(SyncError::NoSession)?;

		let targets = self.store.descendants_with_both_parents().await?;
		info!(
			targets = targets.len(),
			session = %session.uuid,
			"Starting pedigree synchronization"
		);

		let mut report = SyncReport::default();
		let mut session_dead = false;

		for (index, dog_id) in targets.iter().copied().enumerate() {
			if session_dead {
				report
					.errors
					.push(format!("dog {dog_id}: skipped, registry session expired"));
				report.targets_skipped += 1;
				continue;
			}
			if index > 0 {
				tokio::time::sleep(self.options.pacing).await;
			}

			match self.sync_target(&session, dog_id, &mut report).await {
				Ok(()) => {}
				Err(TargetError::Registry(RegistryError::NotFound)) => {
					report.not_found += 1;
				}
				Err(TargetError::Registry(RegistryError::AccessDenied)) => {
					report.access_denied += 1;
				}
				Err(TargetError::Registry(RegistryError::SessionExpired)) => {
					report
						.errors
						.push(format!("dog {dog_id}: registry session expired"));
					if let Err(e) = self.sessions.invalidate(session.uuid).await {
						report
							.errors
							.push(format!("failed to invalidate session {}: {e}", session.uuid));
					}
					// No retry within the run; the next run gets a fresh session
					session_dead = true;
				}
				Err(e) => {
					warn!(dog_id, error = %e, "Pedigree sync failed for target");
					report.errors.push(format!("dog {dog_id}: {e}"));
				}
			}
			report.targets_processed += 1;
		}

		info!(
			processed = report.targets_processed,
			skipped = report.targets_skipped,
			fetched = report.trees_fetched,
			ancestors = report.ancestors_created,
			relationships = report.relationships_created,
			titles = report.titles_created,
			errors = report.errors.len(),
			"Pedigree synchronization finished"
		);
		Ok(report)
	}

	async fn sync_target(
		&self,
		session: &Session,
		dog_id: i32,
		report: &mut SyncReport,
	) -> Result<(), TargetError> {
		let (sire_edge, dam_edge) = self.store.parents_of(dog_id).await?;
		let (Some(sire_edge), Some(dam_edge)) = (sire_edge, dam_edge) else {
			// Enumeration guarantees both edges; losing one mid-run is odd
			// but only fatal to this target
			return Err(TargetError::MissingParent);
		};

		let sire = dog::Entity::find_by_id(sire_edge.ancestor_id)
			.one(&self.db)
			.await?
			.ok_or(TargetError::MissingParent)?;
		let dam = dog::Entity::find_by_id(dam_edge.ancestor_id)
			.one(&self.db)
			.await?
			.ok_or(TargetError::MissingParent)?;

		let records = self
			.source
			.fetch_pedigree_tree(
				session,
				Some(&sire.registration_id),
				Some(&dam.registration_id),
				self.options.depth,
			)
			.await?;
		report.trees_fetched += 1;

		for record in &records {
			// The empty-path record is the queried dog itself
			if record.path.is_empty() {
				continue;
			}
			let path = PedigreePath::parse(&record.path)?;

			let ancestor_id = self.ensure_ancestor(record, &path, report).await?;
			self.import_titles(ancestor_id, &record.titles, report).await?;

			// The slot may already hold a stale ancestor from an earlier
			// sync or manual entry; the registry supersedes it
			match self.store.find(dog_id, &path).await? {
				Some(edge) if edge.ancestor_id == ancestor_id => {}
				Some(_) => {
					self.store.set_ancestor(dog_id, ancestor_id, &path).await?;
					report.relationships_replaced += 1;
				}
				None => {
					if self.store.ensure(dog_id, ancestor_id, &path).await? {
						report.relationships_created += 1;
					}
				}
			}
		}

		Ok(())
	}

	/// Find or create the local dog record for a raw ancestor. Absent
	/// records become placeholders with path-inferred sex and the default
	/// breed; existing placeholders are enriched with any registry data
	/// the local record still lacks.
	async fn ensure_ancestor(
		&self,
		record: &RawAncestor,
		path: &PedigreePath,
		report: &mut SyncReport,
	) -> Result<i32, TargetError> {
		if let Some(existing) = dog::Entity::find()
			.filter(dog::Column::RegistrationId.eq(&record.id))
			.one(&self.db)
			.await?
		{
			let fill_name = existing.name.is_empty() && !record.name.is_empty();
			let fill_color = existing.color.is_none() && record.color.is_some();
			if existing.is_placeholder() && (fill_name || fill_color) {
				let id = existing.id;
				let mut active: dog::ActiveModel = existing.into();
				if fill_name {
					active.name = Set(record.name.clone());
				}
				if fill_color {
					active.color = Set(record.color.clone());
				}
				active.updated_at = Set(Utc::now());
				active.update(&self.db).await?;
				return Ok(id);
			}
			return Ok(existing.id);
		}

		let now = Utc::now();
		let created = dog::ActiveModel {
			registration_id: Set(record.id.clone()),
			name: Set(record.name.clone()),
			sex: Set(path.sex().to_string()),
			breed: Set(self.options.placeholder_breed.clone()),
			deceased: Set(false),
			color: Set(record.color.clone()),
			status: Set(DogStatus::Placeholder.to_string()),
			created_at: Set(now),
			updated_at: Set(now),
			..Default::default()
		}
		.insert(&self.db)
		.await?;
		report.ancestors_created += 1;
		Ok(created.id)
	}

	/// Import title codes idempotently against the (dog, code) key
	async fn import_titles(
		&self,
		dog_id: i32,
		titles: &str,
		report: &mut SyncReport,
	) -> Result<(), TargetError> {
		for code in titles.split_whitespace() {
			let exists = title::Entity::find()
				.filter(title::Column::DogId.eq(dog_id))
				.filter(title::Column::Code.eq(code))
				.one(&self.db)
				.await?
				.is_some();
			if exists {
				continue;
			}
			title::ActiveModel {
				dog_id: Set(dog_id),
				code: Set(code.to_string()),
				created_at: Set(Utc::now()),
				..Default::default()
			}
			.insert(&self.db)
			.await?;
			report.titles_created += 1;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::domain::Sex;
	use crate::infrastructure::database::entities::pedigree_relationship;
	use crate::infrastructure::database::Database;
	use crate::infrastructure::registry::LoginMethod;
	use crate::services::pedigree_store::tests::insert_dog;
	use async_trait::async_trait;
	use chrono::Duration as ChronoDuration;
	use sea_orm::PaginatorTrait;
	use std::collections::VecDeque;
	use std::sync::Mutex;

	/// Returns the same ancestor list on every fetch
	struct RepeatSource {
		records: Vec<RawAncestor>,
	}

	#[async_trait]
	impl PedigreeSource for RepeatSource {
		async fn fetch_pedigree_tree(
			&self,
			_session: &Session,
			sire_id: Option<&str>,
			dam_id: Option<&str>,
			_depth: u8,
		) -> Result<Vec<RawAncestor>, RegistryError> {
			assert!(sire_id.is_some() && dam_id.is_some());
			Ok(self.records.clone())
		}
	}

	/// Pops one scripted response per fetch
	struct ScriptedSource {
		responses: Mutex<VecDeque<Result<Vec<RawAncestor>, RegistryError>>>,
	}

	impl ScriptedSource {
		fn new(responses: Vec<Result<Vec<RawAncestor>, RegistryError>>) -> Self {
			Self {
				responses: Mutex::new(responses.into()),
			}
		}
	}

	#[async_trait]
	impl PedigreeSource for ScriptedSource {
		async fn fetch_pedigree_tree(
			&self,
			_session: &Session,
			_sire_id: Option<&str>,
			_dam_id: Option<&str>,
			_depth: u8,
		) -> Result<Vec<RawAncestor>, RegistryError> {
			self.responses
				.lock()
				.unwrap()
				.pop_front()
				.expect("unexpected registry fetch")
		}
	}

	fn raw(path: &str, id: &str, name: &str, titles: &str) -> RawAncestor {
		RawAncestor {
			path: path.to_string(),
			id: id.to_string(),
			name: name.to_string(),
			titles: titles.to_string(),
			color: None,
			health_codes: None,
		}
	}

	fn quick_options() -> SyncOptions {
		SyncOptions {
			pacing: Duration::ZERO,
			..Default::default()
		}
	}

	/// One dog with both parents recorded, plus a live session
	async fn setup_target() -> (Database, i32) {
		let db = Database::create_in_memory().await.unwrap();
		db.migrate().await.unwrap();

		let store = PedigreeStore::new(db.conn().clone());
		let child = insert_dog(db.conn(), "DK100/2022", "Pup", Sex::Male).await;
		let sire = insert_dog(db.conn(), "DK050/2019", "Sire A", Sex::Male).await;
		let dam = insert_dog(db.conn(), "DK051/2019", "Dam B", Sex::Female).await;
		store
			.ensure(child.id, sire.id, &PedigreePath::parse("0").unwrap())
			.await
			.unwrap();
		store
			.ensure(child.id, dam.id, &PedigreePath::parse("1").unwrap())
			.await
			.unwrap();

		SessionManager::new(db.conn().clone())
			.store_session(
				"JSESSIONID=test".into(),
				Utc::now() + ChronoDuration::hours(1),
				LoginMethod::Password,
			)
			.await
			.unwrap();

		(db, child.id)
	}

	fn registry_tree() -> Vec<RawAncestor> {
		vec![
			raw("", "DK100/2022", "Pup", ""),
			raw("0", "DK050/2019", "Sire A", ""),
			raw("1", "DK051/2019", "Dam B", ""),
			raw("00", "DK020/2016", "Grandsire", "CH WW21"),
			raw("01", "DK021/2016", "Granddam", ""),
		]
	}

	#[tokio::test]
	async fn maps_registry_tree_into_placeholders_and_edges() {
		let (db, child_id) = setup_target().await;
		let engine = SyncEngine::new(
			db.conn().clone(),
			RepeatSource {
				records: registry_tree(),
			},
			quick_options(),
		);

		let report = engine.run().await.unwrap();

		assert_eq!(report.targets_processed, 1);
		assert_eq!(report.trees_fetched, 1);
		// Sire/dam already local; the two grandparents are new
		assert_eq!(report.ancestors_created, 2);
		// Gen-1 edges pre-existed; "00" and "01" are new
		assert_eq!(report.relationships_created, 2);
		assert_eq!(report.titles_created, 2);
		assert!(report.errors.is_empty());

		// Exactly 4 edges for the target, root excluded
		let edges = pedigree_relationship::Entity::find()
			.filter(pedigree_relationship::Column::DescendantId.eq(child_id))
			.count(db.conn())
			.await
			.unwrap();
		assert_eq!(edges, 4);

		// Placeholder carries the path-inferred sex and default breed
		let granddam = dog::Entity::find()
			.filter(dog::Column::RegistrationId.eq("DK021/2016"))
			.one(db.conn())
			.await
			.unwrap()
			.unwrap();
		assert!(granddam.is_placeholder());
		assert_eq!(granddam.sex(), Sex::Female);
		assert_eq!(granddam.breed, "Unknown");
	}

	#[tokio::test]
	async fn second_run_creates_nothing() {
		let (db, _child_id) = setup_target().await;
		let engine = SyncEngine::new(
			db.conn().clone(),
			RepeatSource {
				records: registry_tree(),
			},
			quick_options(),
		);

		let first = engine.run().await.unwrap();
		assert!(first.ancestors_created > 0);

		let second = engine.run().await.unwrap();
		assert_eq!(second.ancestors_created, 0);
		assert_eq!(second.relationships_created, 0);
		assert_eq!(second.titles_created, 0);
		assert!(second.errors.is_empty());

		let dogs = dog::Entity::find().count(db.conn()).await.unwrap();
		let edges = pedigree_relationship::Entity::find()
			.count(db.conn())
			.await
			.unwrap();
		let titles = title::Entity::find().count(db.conn()).await.unwrap();
		assert_eq!(dogs, 5);
		assert_eq!(edges, 4);
		assert_eq!(titles, 2);
	}

	#[tokio::test]
	async fn missing_pedigree_is_tallied_and_run_continues() {
		let (db, _child_id) = setup_target().await;

		// Second eligible target
		let store = PedigreeStore::new(db.conn().clone());
		let other = insert_dog(db.conn(), "DK200/2021", "Other", Sex::Female).await;
		let sire = insert_dog(db.conn(), "DK150/2018", "OtherSire", Sex::Male).await;
		let dam = insert_dog(db.conn(), "DK151/2018", "OtherDam", Sex::Female).await;
		store
			.ensure(other.id, sire.id, &PedigreePath::parse("0").unwrap())
			.await
			.unwrap();
		store
			.ensure(other.id, dam.id, &PedigreePath::parse("1").unwrap())
			.await
			.unwrap();

		let engine = SyncEngine::new(
			db.conn().clone(),
			ScriptedSource::new(vec![Err(RegistryError::NotFound), Ok(registry_tree())]),
			quick_options(),
		);

		let report = engine.run().await.unwrap();
		assert_eq!(report.targets_processed, 2);
		assert_eq!(report.not_found, 1);
		assert_eq!(report.trees_fetched, 1);
		// Not-found is an expected outcome, not an error
		assert!(report.errors.is_empty());
	}

	#[tokio::test]
	async fn resync_supersedes_stale_slot_occupants() {
		let (db, child_id) = setup_target().await;
		let store = PedigreeStore::new(db.conn().clone());

		// A manually entered, wrong grandsire occupying the "00" slot
		let wrong = insert_dog(db.conn(), "DK999/2015", "Wrong", Sex::Male).await;
		store
			.set_ancestor(child_id, wrong.id, &PedigreePath::parse("00").unwrap())
			.await
			.unwrap();

		let engine = SyncEngine::new(
			db.conn().clone(),
			RepeatSource {
				records: registry_tree(),
			},
			quick_options(),
		);
		let report = engine.run().await.unwrap();

		assert_eq!(report.relationships_replaced, 1);
		// Only "01" is a brand-new slot
		assert_eq!(report.relationships_created, 1);

		let edge = store
			.find(child_id, &PedigreePath::parse("00").unwrap())
			.await
			.unwrap()
			.unwrap();
		let grandsire = dog::Entity::find_by_id(edge.ancestor_id)
			.one(db.conn())
			.await
			.unwrap()
			.unwrap();
		assert_eq!(grandsire.registration_id, "DK020/2016");
	}

	#[tokio::test]
	async fn no_valid_session_aborts_the_run() {
		let db = Database::create_in_memory().await.unwrap();
		db.migrate().await.unwrap();

		let engine = SyncEngine::new(
			db.conn().clone(),
			RepeatSource { records: vec![] },
			quick_options(),
		);

		let result = engine.run().await;
		assert!(matches!(result, Err(SyncError::NoSession)));
	}

	#[tokio::test]
	async fn session_expiry_invalidates_and_skips_remaining_targets() {
		let (db, _child_id) = setup_target().await;

		let store = PedigreeStore::new(db.conn().clone());
		let other = insert_dog(db.conn(), "DK200/2021", "Other", Sex::Female).await;
		let sire = insert_dog(db.conn(), "DK150/2018", "OtherSire", Sex::Male).await;
		let dam = insert_dog(db.conn(), "DK151/2018", "OtherDam", Sex::Female).await;
		store
			.ensure(other.id, sire.id, &PedigreePath::parse("0").unwrap())
			.await
			.unwrap();
		store
			.ensure(other.id, dam.id, &PedigreePath::parse("1").unwrap())
			.await
			.unwrap();

		let engine = SyncEngine::new(
			db.conn().clone(),
			ScriptedSource::new(vec![Err(RegistryError::SessionExpired)]),
			quick_options(),
		);

		let report = engine.run().await.unwrap();
		// The target hit by the expiry counts as processed; the one after
		// it was never attempted and counts as skipped
		assert_eq!(report.targets_processed, 1);
		assert_eq!(report.targets_skipped, 1);
		assert_eq!(report.trees_fetched, 0);
		// One expiry error, one skip notice
		assert_eq!(report.errors.len(), 2);

		// The session is out of rotation for the next run
		let sessions = SessionManager::new(db.conn().clone());
		assert!(sessions.get_valid_session(None).await.unwrap().is_none());
	}

	#[tokio::test]
	async fn enriches_existing_placeholder_records() {
		let (db, _child_id) = setup_target().await;

		// A placeholder created by manual edge entry: no name, no color
		let bare = dog::ActiveModel {
			registration_id: Set("DK020/2016".to_string()),
			name: Set(String::new()),
			sex: Set(Sex::Male.to_string()),
			breed: Set("Unknown".to_string()),
			deceased: Set(false),
			status: Set(DogStatus::Placeholder.to_string()),
			created_at: Set(Utc::now()),
			updated_at: Set(Utc::now()),
			..Default::default()
		}
		.insert(db.conn())
		.await
		.unwrap();

		let mut records = registry_tree();
		records[3].color = Some("Sable".to_string());
		let engine = SyncEngine::new(db.conn().clone(), RepeatSource { records }, quick_options());
		let report = engine.run().await.unwrap();

		// The bare record was reused, not duplicated
		assert_eq!(report.ancestors_created, 1);
		let enriched = dog::Entity::find_by_id(bare.id)
			.one(db.conn())
			.await
			.unwrap()
			.unwrap();
		assert_eq!(enriched.name, "Grandsire");
		assert_eq!(enriched.color.as_deref(), Some("Sable"));
	}
}
