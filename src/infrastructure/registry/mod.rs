//! External pedigree registry collaborator
//!
//! The registry is a third-party HTTP service with cookie-session
//! authentication. The fragile parts (page structure, login detection) are
//! isolated behind the `PedigreeSource` trait so everything above it can be
//! tested against a mock.

pub mod client;
pub mod session;

pub use client::{PedigreeSource, RawAncestor, RegistryClient, RegistryError};
pub use session::{LoginMethod, Session, SessionManager};
