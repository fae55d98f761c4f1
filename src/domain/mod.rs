//! Pure domain types shared across the pedigree subsystem

pub mod dog;
pub mod pedigree;
pub mod tree;

pub use dog::{DogStatus, Sex};
pub use pedigree::{PathError, PedigreePath, RelationshipKind};
pub use tree::{LineageSide, TreeNode, TreePayload};
