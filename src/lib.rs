//! Kennel Core
//!
//! Core library of a record-management application for a dog breeding
//! operation. The interesting part is the pedigree ancestry subsystem:
//! lineage positions encoded as binary path strings, bounded-depth tree
//! reconstruction from a flat edge store, and a synchronization engine that
//! imports ancestry from an external registry behind a cookie session.

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod services;

use crate::config::AppConfig;
use crate::infrastructure::database::Database;
use crate::infrastructure::registry::{PedigreeSource, RegistryClient, SessionManager};
use crate::services::{PedigreeStore, SyncEngine, SyncOptions, TreeBuilder};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::info;

/// Initialize console logging. `RUST_LOG` wins over the passed default.
pub fn init_logging(default_level: &str) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(default_level.to_string()));
	let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// The main context for all core operations
pub struct Core {
	/// Application configuration
	config: Arc<RwLock<AppConfig>>,

	/// Breeding records database
	pub database: Arc<Database>,

	/// Registry session tracking
	pub sessions: SessionManager,

	/// Ancestry edge store
	pub pedigree: PedigreeStore,

	/// Pedigree tree reconstruction
	pub trees: TreeBuilder,
}

impl Core {
	/// Initialize a new Core instance with default data directory
	pub async fn new() -> anyhow::Result<Self> {
		let data_dir = crate::config::default_data_dir()?;
		Self::new_with_config(data_dir).await
	}

	/// Initialize a new Core instance with custom data directory
	pub async fn new_with_config(data_dir: PathBuf) -> anyhow::Result<Self> {
		info!("Initializing Kennel Core at {:?}", data_dir);

		// 1. Load or create app config
		let config = AppConfig::load_or_create(&data_dir)?;
		config.ensure_directories()?;
		let config = Arc::new(RwLock::new(config));

		// 2. Open the records database and bring the schema up to date
		let db_path = data_dir.join("kennel.db");
		let database = if db_path.exists() {
			Database::open(&db_path).await?
		} else {
			Database::create(&db_path).await?
		};
		database.migrate().await?;
		let database = Arc::new(database);

		// 3. Wire services over the shared connection
		let conn = database.conn().clone();
		let sessions = SessionManager::new(conn.clone());
		let pedigree = PedigreeStore::new(conn.clone());
		let trees = TreeBuilder::new(conn);

		info!("Kennel Core initialized");

		Ok(Self {
			config,
			database,
			sessions,
			pedigree,
			trees,
		})
	}

	/// Get the application configuration
	pub fn config(&self) -> Arc<RwLock<AppConfig>> {
		self.config.clone()
	}

	/// Registry client configured from the current config
	pub async fn registry_client(&self) -> RegistryClient {
		let config = self.config.read().await;
		RegistryClient::new(config.registry.base_url.clone())
	}

	/// Synchronization engine over the given pedigree source. Callers pass
	/// `registry_client()` in production and a mock source in tests.
	pub async fn sync_engine<S: PedigreeSource>(&self, source: S) -> SyncEngine<S> {
		let config = self.config.read().await;
		let options = SyncOptions {
			depth: config.registry.fetch_depth,
			pacing: Duration::from_millis(config.registry.pacing_ms),
			session_id: None,
			placeholder_breed: config.registry.placeholder_breed.clone(),
		};
		SyncEngine::new(self.database.conn().clone(), source, options)
	}

	/// Shutdown the core gracefully
	pub async fn shutdown(&self) -> anyhow::Result<()> {
		info!("Shutting down Kennel Core...");
		self.config.read().await.save()?;
		info!("Kennel Core shutdown complete");
		Ok(())
	}
}
