//! Dog domain types

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Sex of a dog. `Unknown` covers records where no authoritative sex has
/// been entered and the path heuristic was not applicable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Sex {
	Male,
	Female,
	Unknown,
}

/// Whether a dog record is a complete entry or a minimal placeholder
/// created only to satisfy a pedigree relationship edge.
///
/// Placeholders carry an inferred sex and a default breed until a later
/// sync pass or manual edit enriches them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "UPPERCASE")]
pub enum DogStatus {
	Complete,
	Placeholder,
}
