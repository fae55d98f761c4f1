//! Application configuration

pub mod app_config;
pub mod migration;

pub use app_config::AppConfig;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// External registry settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
	/// Base URL of the third-party pedigree registry
	pub base_url: String,
	/// Generations requested per pedigree fetch
	pub fetch_depth: u8,
	/// Delay between per-dog registry calls during synchronization
	pub pacing_ms: u64,
	/// Breed assigned to placeholder ancestors created by sync
	pub placeholder_breed: String,
}

impl Default for RegistryConfig {
	fn default() -> Self {
		Self {
			base_url: "https://pedigree-registry.example.com/api".to_string(),
			fetch_depth: 3,
			pacing_ms: 400,
			placeholder_breed: "Unknown".to_string(),
		}
	}
}

/// Default data directory for the application
pub fn default_data_dir() -> Result<PathBuf> {
	dirs::data_dir()
		.map(|dir| dir.join("kennel"))
		.ok_or_else(|| anyhow!("Could not determine platform data directory"))
}
