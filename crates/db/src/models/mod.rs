//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - Insert and partial-update inputs
//! - Query parameters for list endpoints

pub mod feedback;
