//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod feedback_repo;

pub use feedback_repo::FeedbackRepo;
