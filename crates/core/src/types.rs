/// Feedback ids are text: either a database-generated UUID string or an
/// externally supplied ticket number.
pub type FeedbackId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
