//! Lineage path codec
//!
//! An ancestor's position relative to a descendant is encoded as a string of
//! binary digits read left to right from the descendant: `'0'` steps to the
//! father, `'1'` to the mother. Generation equals path length, and the final
//! digit alone determines both the line (sire/dam) and the sex inferred for
//! the individual at that position.

use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumString};
use thiserror::Error;

use super::dog::Sex;

/// Errors from constructing a pedigree path
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
	/// Empty paths have no last digit and therefore no line or generation
	#[error("pedigree path must not be empty")]
	Empty,

	/// Paths may only contain the digits '0' and '1'
	#[error("pedigree path may only contain '0' and '1', got {0:?}")]
	InvalidCharacter(char),
}

/// Line of descent an edge belongs to: sire = male line (`'0'`),
/// dam = female line (`'1'`). Derived from a path's final digit, never
/// stored independently of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "UPPERCASE")]
pub enum RelationshipKind {
	Sire,
	Dam,
}

impl RelationshipKind {
	fn digit(self) -> char {
		match self {
			RelationshipKind::Sire => '0',
			RelationshipKind::Dam => '1',
		}
	}
}

/// A validated lineage position: non-empty, digits restricted to '0'/'1'.
///
/// The string-prefix relation on paths is the ancestor-of-ancestor relation:
/// "011" lies on the branch beneath "01".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PedigreePath(String);

impl PedigreePath {
	pub fn parse(raw: &str) -> Result<Self, PathError> {
		if raw.is_empty() {
			return Err(PathError::Empty);
		}
		if let Some(bad) = raw.chars().find(|c| *c != '0' && *c != '1') {
			return Err(PathError::InvalidCharacter(bad));
		}
		Ok(Self(raw.to_string()))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Generation of the ancestor at this path, always >= 1
	pub fn generation(&self) -> u32 {
		self.0.len() as u32
	}

	fn last_digit(&self) -> char {
		// Invariant: never empty after parse
		self.0.chars().next_back().unwrap_or('0')
	}

	/// Line of descent, determined solely by the final digit
	pub fn relationship_kind(&self) -> RelationshipKind {
		match self.last_digit() {
			'0' => RelationshipKind::Sire,
			_ => RelationshipKind::Dam,
		}
	}

	/// Sex inferred from the position. A heuristic for placeholder records
	/// only; an authoritative sex on the dog itself always wins.
	pub fn sex(&self) -> Sex {
		match self.relationship_kind() {
			RelationshipKind::Sire => Sex::Male,
			RelationshipKind::Dam => Sex::Female,
		}
	}

	/// Extend the path one generation further along the given line
	pub fn child(&self, branch: RelationshipKind) -> PedigreePath {
		let mut extended = self.0.clone();
		extended.push(branch.digit());
		PedigreePath(extended)
	}

	/// Path of the individual this ancestor is a parent of, `None` at
	/// generation 1 (the parent would be the descendant itself)
	pub fn parent(&self) -> Option<PedigreePath> {
		if self.0.len() <= 1 {
			return None;
		}
		Some(PedigreePath(self.0[..self.0.len() - 1].to_string()))
	}

	/// True when `self` lies on the branch rooted at `prefix`
	pub fn is_within(&self, prefix: &PedigreePath) -> bool {
		self.0.starts_with(&prefix.0)
	}

	/// Human-readable relation name.
	///
	/// Exact for generations 1-3; generation 4 and beyond collapses to a
	/// generic "{N}th Generation Grandfather/Grandmother" keyed on the final
	/// digit only.
	pub fn label(&self) -> String {
		match self.as_str() {
			"0" => "Father".to_string(),
			"1" => "Mother".to_string(),
			"00" => "Paternal Grandfather".to_string(),
			"01" => "Paternal Grandmother".to_string(),
			"10" => "Maternal Grandfather".to_string(),
			"11" => "Maternal Grandmother".to_string(),
			path if path.len() == 3 => {
				let chain: Vec<&str> = path
					.chars()
					.map(|c| if c == '0' { "Father" } else { "Mother" })
					.collect();
				format!("{}'s {}'s {}", chain[0], chain[1], chain[2])
			}
			_ => {
				let role = match self.relationship_kind() {
					RelationshipKind::Sire => "Grandfather",
					RelationshipKind::Dam => "Grandmother",
				};
				format!("{} Generation {}", ordinal(self.generation()), role)
			}
		}
	}
}

impl fmt::Display for PedigreePath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl TryFrom<String> for PedigreePath {
	type Error = PathError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		PedigreePath::parse(&value)
	}
}

impl From<PedigreePath> for String {
	fn from(path: PedigreePath) -> Self {
		path.0
	}
}

fn ordinal(n: u32) -> String {
	let suffix = match (n % 10, n % 100) {
		(_, 11..=13) => "th",
		(1, _) => "st",
		(2, _) => "nd",
		(3, _) => "rd",
		_ => "th",
	};
	format!("{n}{suffix}")
}
