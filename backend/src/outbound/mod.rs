//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **memory**: process-local repositories used when no database is set
//! - **media**: filesystem image storage under the media root
//!
//! Adapters are thin translators between domain types and storage
//! representations. They contain no business logic.

pub mod media;
pub mod memory;
pub mod persistence;
