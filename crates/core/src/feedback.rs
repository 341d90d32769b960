//! Feedback status constants, status policy, and submission validation.
//!
//! Defines the built-in status set mirrored by the `feedback_status`
//! Postgres enum, the policy applied when a write carries an unrecognised
//! status, and the validation helpers used by the API layer.

use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Status constants
// ---------------------------------------------------------------------------

/// Initial status for a newly submitted record.
pub const STATUS_PENDING: &str = "pending";

/// Built-in status set, in enum declaration order.
///
/// The database enum is authoritative at runtime; this list is used when
/// the enum is not installed yet and by the schema migration.
pub const DEFAULT_STATUSES: &[&str] = &[
    STATUS_PENDING,
    "new",
    "inReview",
    "triaged",
    "inProgress",
    "planned",
    "blocked",
    "needsInfo",
    "resolved",
    "completed",
    "verified",
    "deployed",
    "closed",
    "duplicate",
    "wontFix",
    "invalid",
    "migrated",
    "archived",
    "reopened",
    "ok",
];

// ---------------------------------------------------------------------------
// Field defaults and limits
// ---------------------------------------------------------------------------

/// Title stored when a submission carries none.
pub const DEFAULT_TITLE: &str = "Untitled Request";

/// Type stored when a submission carries none.
pub const DEFAULT_TYPE: &str = "support";

pub const TYPE_BUG: &str = "bug";
pub const TYPE_SUGGESTION: &str = "suggestion";

/// Maximum length for the user-provided description (characters).
pub const MAX_DESCRIPTION_LENGTH: usize = 10_000;

/// Maximum length for titles (characters).
pub const MAX_TITLE_LENGTH: usize = 500;

// ---------------------------------------------------------------------------
// Status policy
// ---------------------------------------------------------------------------

/// What a write path does with a status outside the allowed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidStatusPolicy {
    /// Replace the value with [`STATUS_PENDING`].
    CoerceToDefault,
    /// Fail with a validation error.
    Reject,
}

impl FromStr for InvalidStatusPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "coerce" | "coerce_to_default" => Ok(Self::CoerceToDefault),
            "reject" => Ok(Self::Reject),
            other => Err(CoreError::Validation(format!(
                "Unknown status policy '{other}'. Must be 'coerce' or 'reject'"
            ))),
        }
    }
}

impl fmt::Display for InvalidStatusPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CoerceToDefault => f.write_str("coerce"),
            Self::Reject => f.write_str("reject"),
        }
    }
}

/// Check whether `status` is a member of `allowed`.
pub fn is_allowed_status<S: AsRef<str>>(status: &str, allowed: &[S]) -> bool {
    allowed.iter().any(|s| s.as_ref() == status)
}

/// Validate that a status string is one of the allowed statuses.
pub fn validate_status<S: AsRef<str>>(status: &str, allowed: &[S]) -> Result<(), CoreError> {
    if is_allowed_status(status, allowed) {
        Ok(())
    } else {
        let names: Vec<&str> = allowed.iter().map(AsRef::as_ref).collect();
        Err(CoreError::Validation(format!(
            "Invalid status '{status}'. Must be one of: {names:?}"
        )))
    }
}

/// Apply `policy` to a candidate status.
///
/// Returns the status to persist. Under [`InvalidStatusPolicy::Reject`] an
/// unrecognised value is an error; under
/// [`InvalidStatusPolicy::CoerceToDefault`] it becomes [`STATUS_PENDING`].
pub fn apply_status_policy<S: AsRef<str>>(
    policy: InvalidStatusPolicy,
    candidate: &str,
    allowed: &[S],
) -> Result<String, CoreError> {
    match validate_status(candidate, allowed) {
        Ok(()) => Ok(candidate.to_string()),
        Err(e) => match policy {
            InvalidStatusPolicy::Reject => Err(e),
            InvalidStatusPolicy::CoerceToDefault => Ok(STATUS_PENDING.to_string()),
        },
    }
}

/// Resolve the status for a new record: absent means pending, present is
/// subject to `policy`.
pub fn resolve_insert_status<S: AsRef<str>>(
    policy: InvalidStatusPolicy,
    candidate: Option<&str>,
    allowed: &[S],
) -> Result<String, CoreError> {
    match candidate.map(str::trim).filter(|s| !s.is_empty()) {
        Some(status) => apply_status_policy(policy, status, allowed),
        None => Ok(STATUS_PENDING.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Submission validation
// ---------------------------------------------------------------------------

/// Return the trimmed value of a required text field, or `None` if it is
/// absent or blank.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Validate that every `(name, value)` pair is present and non-blank.
///
/// The error message names all missing fields at once.
pub fn require_fields(fields: &[(&str, Option<&str>)]) -> Result<(), CoreError> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| non_blank(*value).is_none())
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )))
    }
}

/// Validate the description length.
pub fn validate_description(description: &str) -> Result<(), CoreError> {
    let len = description.chars().count();
    if len > MAX_DESCRIPTION_LENGTH {
        return Err(CoreError::Validation(format!(
            "Description exceeds maximum length of {MAX_DESCRIPTION_LENGTH} characters (got {len})"
        )));
    }
    Ok(())
}

/// Validate the title length.
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    let len = title.chars().count();
    if len > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Title exceeds maximum length of {MAX_TITLE_LENGTH} characters (got {len})"
        )));
    }
    Ok(())
}

/// Title to store: the trimmed input, or [`DEFAULT_TITLE`] when blank.
pub fn title_or_default(title: Option<&str>) -> String {
    non_blank(title).unwrap_or(DEFAULT_TITLE).to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_default_statuses_are_valid() {
        for s in DEFAULT_STATUSES {
            assert!(
                validate_status(s, DEFAULT_STATUSES).is_ok(),
                "Status '{s}' should be valid"
            );
        }
    }

    #[test]
    fn unknown_status_is_invalid() {
        assert!(validate_status("unknown", DEFAULT_STATUSES).is_err());
        assert!(validate_status("", DEFAULT_STATUSES).is_err());
        // Matching is case-sensitive, as in the Postgres enum.
        assert!(validate_status("inreview", DEFAULT_STATUSES).is_err());
    }

    #[test]
    fn validation_accepts_owned_allowed_sets() {
        let live = vec!["pending".to_string(), "custom".to_string()];
        assert!(validate_status("custom", &live).is_ok());
        assert!(validate_status("closed", &live).is_err());
    }

    #[test]
    fn reject_policy_fails_on_invalid_status() {
        let err = apply_status_policy(InvalidStatusPolicy::Reject, "bogus", DEFAULT_STATUSES)
            .unwrap_err();
        assert!(err.to_string().contains("Invalid status 'bogus'"));
    }

    #[test]
    fn coerce_policy_falls_back_to_pending() {
        let status =
            apply_status_policy(InvalidStatusPolicy::CoerceToDefault, "bogus", DEFAULT_STATUSES)
                .unwrap();
        assert_eq!(status, STATUS_PENDING);
    }

    #[test]
    fn valid_status_passes_either_policy() {
        for policy in [InvalidStatusPolicy::Reject, InvalidStatusPolicy::CoerceToDefault] {
            assert_eq!(
                apply_status_policy(policy, "resolved", DEFAULT_STATUSES).unwrap(),
                "resolved"
            );
        }
    }

    #[test]
    fn absent_insert_status_is_pending() {
        assert_eq!(
            resolve_insert_status(InvalidStatusPolicy::Reject, None, DEFAULT_STATUSES).unwrap(),
            STATUS_PENDING
        );
        assert_eq!(
            resolve_insert_status(InvalidStatusPolicy::Reject, Some("  "), DEFAULT_STATUSES)
                .unwrap(),
            STATUS_PENDING
        );
    }

    #[test]
    fn policy_parses_from_config_strings() {
        assert_eq!(
            "coerce".parse::<InvalidStatusPolicy>().unwrap(),
            InvalidStatusPolicy::CoerceToDefault
        );
        assert_eq!(
            " Reject ".parse::<InvalidStatusPolicy>().unwrap(),
            InvalidStatusPolicy::Reject
        );
        assert!("ignore".parse::<InvalidStatusPolicy>().is_err());
    }

    #[test]
    fn require_fields_names_every_missing_field() {
        let err = require_fields(&[
            ("app_name", None),
            ("description", Some("   ")),
            ("title", Some("ok")),
        ])
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: Missing required fields: app_name, description"
        );
    }

    #[test]
    fn require_fields_passes_when_all_present() {
        assert!(require_fields(&[("app_name", Some("demo"))]).is_ok());
    }

    #[test]
    fn description_within_limit_is_valid() {
        let desc = "a".repeat(MAX_DESCRIPTION_LENGTH);
        assert!(validate_description(&desc).is_ok());
    }

    #[test]
    fn description_over_limit_is_invalid() {
        let desc = "a".repeat(MAX_DESCRIPTION_LENGTH + 1);
        assert!(validate_description(&desc).is_err());
    }

    #[test]
    fn blank_title_gets_default() {
        assert_eq!(title_or_default(None), DEFAULT_TITLE);
        assert_eq!(title_or_default(Some("")), DEFAULT_TITLE);
        assert_eq!(title_or_default(Some(" Crash on save ")), "Crash on save");
    }
}
