//! HTTP client for the external pedigree registry

use async_trait::async_trait;
use reqwest::{header, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::session::Session;

/// Raw ancestor record as returned by the registry's pedigree-tree endpoint.
///
/// The registry uses the same path notation as the local scheme ('0' =
/// father-direction, '1' = mother-direction); the record with an empty path
/// is the queried dog itself.
#[derive(Debug, Clone, Deserialize)]
pub struct RawAncestor {
	/// Position path in the registry's notation
	pub path: String,
	/// Registry registration identifier
	pub id: String,
	pub name: String,
	/// Space-separated title codes, no per-title metadata
	#[serde(default)]
	pub titles: String,
	#[serde(default)]
	pub color: Option<String>,
	/// Health test result codes, carried through but not modeled further
	#[serde(default)]
	pub health_codes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PedigreeTreeResponse {
	dogs: Vec<RawAncestor>,
}

/// Registry fetch errors
#[derive(Error, Debug)]
pub enum RegistryError {
	/// Programming error: the endpoint cannot be queried without a parent
	#[error("at least one of sire or dam identifier is required")]
	MissingParents,

	/// The response was a login page: the session cookie is dead.
	/// Distinct from transient failures; triggers session invalidation.
	#[error("registry session has expired")]
	SessionExpired,

	/// Pedigree not present in the registry; expected, tallied, not fatal
	#[error("pedigree not found in registry")]
	NotFound,

	/// Registry refused access to this pedigree; expected, tallied
	#[error("registry denied access to the requested pedigree")]
	AccessDenied,

	#[error("registry request failed: {0}")]
	Http(#[from] reqwest::Error),

	#[error("unexpected registry payload: {0}")]
	UnexpectedPayload(String),
}

/// Fetch-by-parent-ids capability of the registry, mockable for tests
#[async_trait]
pub trait PedigreeSource: Send + Sync {
	/// Fetch the raw ancestor list for the pedigree tree spanned by the
	/// given parents, `depth` generations deep. At least one parent
	/// identifier is required.
	async fn fetch_pedigree_tree(
		&self,
		session: &Session,
		sire_id: Option<&str>,
		dam_id: Option<&str>,
		depth: u8,
	) -> Result<Vec<RawAncestor>, RegistryError>;
}

/// Markers that identify the registry's login page. A dead session does not
/// produce an auth status code: the registry redirects to the login form and
/// reqwest follows the redirect, so expiry arrives as a 200 with this body.
const LOGIN_PAGE_MARKERS: &[&str] = &["id=\"login-form\"", "action=\"/login\"", "Please sign in"];

/// reqwest-backed registry client
pub struct RegistryClient {
	client: reqwest::Client,
	base_url: String,
}

impl RegistryClient {
	pub fn new(base_url: impl Into<String>) -> Self {
		Self {
			client: reqwest::Client::new(),
			base_url: base_url.into(),
		}
	}

	fn looks_like_login_page(body: &str) -> bool {
		LOGIN_PAGE_MARKERS.iter().any(|marker| body.contains(marker))
	}
}

#[async_trait]
impl PedigreeSource for RegistryClient {
	async fn fetch_pedigree_tree(
		&self,
		session: &Session,
		sire_id: Option<&str>,
		dam_id: Option<&str>,
		depth: u8,
	) -> Result<Vec<RawAncestor>, RegistryError> {
		if sire_id.is_none() && dam_id.is_none() {
			return Err(RegistryError::MissingParents);
		}

		// Registration ids contain slashes; reqwest percent-encodes query
		// values, so they are passed through unescaped here.
		let mut query: Vec<(&str, String)> = vec![("gens", depth.to_string())];
		if let Some(sire) = sire_id {
			query.push(("sire", sire.to_string()));
		}
		if let Some(dam) = dam_id {
			query.push(("dam", dam.to_string()));
		}

		debug!(sire = ?sire_id, dam = ?dam_id, depth, "Fetching pedigree tree from registry");

		let response = self
			.client
			.get(format!("{}/pedigree/tree", self.base_url))
			.header(header::COOKIE, &session.cookies)
			.query(&query)
			.send()
			.await?;

		let status = response.status();
		let body = response.text().await?;

		// A dead cookie can surface under any status: some registries answer
		// 401/403 with the login form itself. The body is inspected before
		// the status is mapped so expiry always wins.
		if Self::looks_like_login_page(&body) {
			warn!("Registry returned a login page; session cookie is no longer valid");
			return Err(RegistryError::SessionExpired);
		}

		match status {
			StatusCode::NOT_FOUND => return Err(RegistryError::NotFound),
			StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
				return Err(RegistryError::AccessDenied)
			}
			s if !s.is_success() => {
				return Err(RegistryError::UnexpectedPayload(format!("HTTP {s}")))
			}
			_ => {}
		}

		let parsed: PedigreeTreeResponse = serde_json::from_str(&body)
			.map_err(|e| RegistryError::UnexpectedPayload(e.to_string()))?;

		debug!(records = parsed.dogs.len(), "Registry returned pedigree tree");
		Ok(parsed.dogs)
	}
}
