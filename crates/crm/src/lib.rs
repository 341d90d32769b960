//! Monday.com integration for bug-report intake.
//!
//! [`MondayClient`] talks to the Monday GraphQL API. Every piece of user
//! text travels as a GraphQL variable, never spliced into the query
//! document. [`intake`] builds the ticket item and attaches files.

pub mod client;
pub mod intake;

pub use client::{CrmError, MondayClient};
pub use intake::{BoardTarget, BugTicket, FileUpload, FileUploadResult, IntakeOutcome};
