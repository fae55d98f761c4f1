//! Sea-ORM entity definitions
//!
//! These map the breeding records and pedigree edges to database tables.

pub mod dog;
pub mod pedigree_relationship;
pub mod registry_session;
pub mod title;

// Re-export all entities
pub use dog::Entity as Dog;
pub use pedigree_relationship::Entity as PedigreeRelationship;
pub use registry_session::Entity as RegistrySession;
pub use title::Entity as Title;

// Re-export active models for easy access
pub use dog::ActiveModel as DogActive;
pub use pedigree_relationship::ActiveModel as PedigreeRelationshipActive;
pub use registry_session::ActiveModel as RegistrySessionActive;
pub use title::ActiveModel as TitleActive;
