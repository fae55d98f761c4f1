//! Pedigree tree output contract for presentation layers

use serde::Serialize;
use strum::{Display, EnumString};

use super::pedigree::{PedigreePath, RelationshipKind};

/// Which half of a dog's pedigree a tree covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize)]
#[strum(serialize_all = "lowercase")]
pub enum LineageSide {
	Paternal,
	Maternal,
}

impl LineageSide {
	/// Path of the side's root ancestor: "0" for paternal, "1" for maternal
	pub fn root_path(self) -> PedigreePath {
		let raw = match self {
			LineageSide::Paternal => "0",
			LineageSide::Maternal => "1",
		};
		// A single binary digit is always a valid path
		PedigreePath::parse(raw).unwrap_or_else(|_| unreachable!())
	}
}

/// One ancestor in a rendered pedigree tree
#[derive(Debug, Clone, Serialize)]
pub struct TreePayload {
	pub dog_id: i32,
	pub registration_id: String,
	pub name: String,
	pub titles: Vec<String>,
	pub image_url: Option<String>,
	pub label: String,
	pub generation: u32,
	pub path: PedigreePath,
}

/// Binary tree node: up to two children, sire branch before dam branch.
/// Absent ancestors are omitted rather than represented as empty nodes.
#[derive(Debug, Clone, Serialize)]
pub struct TreeNode {
	pub payload: TreePayload,
	pub children: Vec<TreeNode>,
}

impl TreeNode {
	/// Child on the given line, if known
	pub fn child(&self, kind: RelationshipKind) -> Option<&TreeNode> {
		self.children
			.iter()
			.find(|node| node.payload.path.relationship_kind() == kind)
	}
}
