//! Services operating on the breeding records store

pub mod pedigree_store;
pub mod sync;
pub mod tree_builder;

pub use pedigree_store::{PedigreeStore, StoreError};
pub use sync::{SyncEngine, SyncError, SyncOptions, SyncReport};
pub use tree_builder::{TreeBuilder, DEFAULT_MAX_DEPTH};
