//! Request extractors shared by handlers.

pub mod locale;
pub mod request_meta;
