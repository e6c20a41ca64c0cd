//! Validation rules shared by every API call.

use std::fmt;

use thiserror::Error;

use super::ParamBundle;

/// Smallest accepted page size.
pub const LIMIT_MIN: i64 = 1;
/// Largest accepted page size for paginated lists.
pub const LIMIT_MAX: i64 = 25;
/// Largest accepted page size for report events.
pub const EVENTS_LIMIT_MAX: i64 = 10_000;
/// First page number.
pub const PAGE_MIN: i64 = 1;
/// Longest accepted report code.
pub const REPORT_CODE_MAX_LEN: usize = 32;

/// A call argument violated a constraint. Raised before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Numeric value outside its bounds.
    #[error("{field} is out of range: got {value}, expected {}", Bounds(.min, .max))]
    OutOfRange {
        /// Offending field.
        field: &'static str,
        /// Supplied value.
        value: i64,
        /// Inclusive lower bound.
        min: i64,
        /// Inclusive upper bound, if any.
        max: Option<i64>,
    },

    /// Value not in the allowed set.
    #[error("{field} is not in the allowed set: got {value:?}, expected one of {}", .allowed.join(", "))]
    NotAllowed {
        /// Offending field.
        field: &'static str,
        /// Supplied value.
        value: String,
        /// Accepted values.
        allowed: Vec<&'static str>,
    },

    /// Some, but not all, of a group of fields were supplied.
    #[error("{} must be provided together (missing {})", .fields.join(", "), .missing.join(", "))]
    Incomplete {
        /// Fields that must be supplied together.
        fields: Vec<&'static str>,
        /// Fields of the group that were not supplied.
        missing: Vec<&'static str>,
    },

    /// None of a set of alternative fields was supplied.
    #[error("one of {} is required", .fields.join(", "))]
    Missing {
        /// Alternatives, any one of which satisfies the call.
        fields: Vec<&'static str>,
    },

    /// Start of a time window after its end.
    #[error("{start_field} ({start}) must not be after {end_field} ({end})")]
    InvalidOrder {
        /// Field holding the window start.
        start_field: &'static str,
        /// Field holding the window end.
        end_field: &'static str,
        /// Normalized start.
        start: i64,
        /// Normalized end.
        end: i64,
    },

    /// Timestamp that cannot be normalized.
    #[error("{field} is not a valid timestamp: {value}")]
    InvalidTimestamp {
        /// Offending field.
        field: &'static str,
        /// Supplied value.
        value: i64,
    },

    /// Numeric ID that is fractional, non-finite or below 1.
    #[error("{field} is not a valid ID: {value}")]
    InvalidId {
        /// Offending field.
        field: &'static str,
        /// Supplied value, as given.
        value: String,
    },

    /// String that does not match the expected format.
    #[error("{field} has an invalid format: {value:?} ({expected})")]
    InvalidFormat {
        /// Offending field.
        field: &'static str,
        /// Supplied value.
        value: String,
        /// Description of the accepted format.
        expected: &'static str,
    },
}

impl ValidationError {
    /// Fields named by this error.
    #[must_use]
    pub fn fields(&self) -> Vec<&'static str> {
        match self {
            Self::OutOfRange { field, .. }
            | Self::NotAllowed { field, .. }
            | Self::InvalidTimestamp { field, .. }
            | Self::InvalidId { field, .. }
            | Self::InvalidFormat { field, .. } => vec![*field],
            Self::Incomplete { fields, .. } | Self::Missing { fields } => fields.clone(),
            Self::InvalidOrder {
                start_field,
                end_field,
                ..
            } => vec![*start_field, *end_field],
        }
    }
}

struct Bounds<'a>(&'a i64, &'a Option<i64>);

impl fmt::Display for Bounds<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.1 {
            Some(max) => write!(f, "{}..={max}", self.0),
            None => write!(f, ">= {}", self.0),
        }
    }
}

/// Check `min <= value <= max` (no upper bound when `max` is `None`).
pub const fn validate_range(
    value: i64,
    min: i64,
    max: Option<i64>,
    field: &'static str,
) -> Result<i64, ValidationError> {
    let above_max = match max {
        Some(max) => value > max,
        None => false,
    };
    if value < min || above_max {
        return Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(value)
}

/// Page size for paginated lists.
pub const fn validate_limit(limit: i64) -> Result<i64, ValidationError> {
    validate_range(limit, LIMIT_MIN, Some(LIMIT_MAX), "limit")
}

/// Page size for report events.
pub const fn validate_events_limit(limit: i64) -> Result<i64, ValidationError> {
    validate_range(limit, LIMIT_MIN, Some(EVENTS_LIMIT_MAX), "limit")
}

/// 1-based page number.
pub const fn validate_page(page: i64) -> Result<i64, ValidationError> {
    validate_range(page, PAGE_MIN, None, "page")
}

/// Match `value` against `allowed`, ignoring ASCII case.
///
/// Returns the canonical spelling from `allowed`.
pub fn validate_enum(
    value: &str,
    allowed: &[&'static str],
    field: &'static str,
) -> Result<&'static str, ValidationError> {
    allowed
        .iter()
        .copied()
        .find(|candidate| candidate.eq_ignore_ascii_case(value.trim()))
        .ok_or_else(|| ValidationError::NotAllowed {
            field,
            value: value.to_string(),
            allowed: allowed.to_vec(),
        })
}

/// Fail when some, but not all, of `fields` carry a value in `bundle`.
///
/// Explicit nulls count as not supplied.
pub fn validate_group(bundle: &ParamBundle, fields: &[&'static str]) -> Result<(), ValidationError> {
    let missing: Vec<&'static str> = fields
        .iter()
        .copied()
        .filter(|field| !bundle.has_value(field))
        .collect();

    if missing.is_empty() || missing.len() == fields.len() {
        Ok(())
    } else {
        Err(ValidationError::Incomplete {
            fields: fields.to_vec(),
            missing,
        })
    }
}

/// Fail when none of `fields` carries a value in `bundle`.
pub fn require_any(bundle: &ParamBundle, fields: &[&'static str]) -> Result<(), ValidationError> {
    if fields.iter().any(|field| bundle.has_value(field)) {
        Ok(())
    } else {
        Err(ValidationError::Missing {
            fields: fields.to_vec(),
        })
    }
}

/// Fail when both ends of a window are set and `start > end`.
pub const fn validate_order(
    start: Option<i64>,
    end: Option<i64>,
    start_field: &'static str,
    end_field: &'static str,
) -> Result<(), ValidationError> {
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(ValidationError::InvalidOrder {
                start_field,
                end_field,
                start,
                end,
            });
        }
    }
    Ok(())
}

/// Report codes: 1 to 32 ASCII letters and digits.
pub fn validate_report_code(code: &str) -> Result<&str, ValidationError> {
    let valid = !code.is_empty()
        && code.len() <= REPORT_CODE_MAX_LEN
        && code.bytes().all(|b| b.is_ascii_alphanumeric());
    if valid {
        Ok(code)
    } else {
        Err(ValidationError::InvalidFormat {
            field: "code",
            value: code.to_string(),
            expected: "1-32 ASCII letters and digits",
        })
    }
}

/// Names, slugs and similar free text: must not be blank.
pub fn validate_non_empty<'a>(value: &'a str, field: &'static str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::InvalidFormat {
            field,
            value: value.to_string(),
            expected: "non-empty text",
        })
    } else {
        Ok(trimmed)
    }
}
