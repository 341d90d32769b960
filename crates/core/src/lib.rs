//! Domain types, constants, and pure logic for the feedback service.
//!
//! Nothing in this crate performs I/O; the database, storage, CRM and HTTP
//! crates build on top of it.

pub mod error;
pub mod feedback;
pub mod i18n;
pub mod pagination;
pub mod ticket;
pub mod types;
