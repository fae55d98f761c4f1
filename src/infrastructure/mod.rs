//! Infrastructure: persistence and external collaborators

pub mod database;
pub mod registry;
