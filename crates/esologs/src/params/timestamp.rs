//! Timestamp normalization.
//!
//! The API takes milliseconds since the Unix epoch. Callers commonly hold
//! seconds instead, so bare integers go through a magnitude check: values
//! below [`SECONDS_THRESHOLD`] are read as seconds. That cut-off is
//! 2286-11-20 in seconds and 1970-04-26 in milliseconds, so millisecond
//! values from the first four months of 1970 are misread. Use
//! [`Timestamp::from_millis`] when that matters.

use chrono::{DateTime, Utc};

use super::ValidationError;

/// Bare integers below this are seconds, at or above it milliseconds.
pub const SECONDS_THRESHOLD: i64 = 10_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Auto,
    Seconds,
    Millis,
}

/// A point in time as supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    value: i64,
    unit: Unit,
}

impl Timestamp {
    /// Seconds or milliseconds, decided by magnitude.
    #[must_use]
    pub const fn auto(value: i64) -> Self {
        Self {
            value,
            unit: Unit::Auto,
        }
    }

    /// Seconds since the Unix epoch.
    #[must_use]
    pub const fn from_secs(secs: i64) -> Self {
        Self {
            value: secs,
            unit: Unit::Seconds,
        }
    }

    /// Milliseconds since the Unix epoch.
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self {
            value: millis,
            unit: Unit::Millis,
        }
    }

    /// Wire value in milliseconds.
    pub fn to_millis(self, field: &'static str) -> Result<i64, ValidationError> {
        let invalid = || ValidationError::InvalidTimestamp {
            field,
            value: self.value,
        };
        if self.value < 0 {
            return Err(invalid());
        }
        let is_seconds = match self.unit {
            Unit::Auto => self.value < SECONDS_THRESHOLD,
            Unit::Seconds => true,
            Unit::Millis => false,
        };
        if is_seconds {
            self.value.checked_mul(1000).ok_or_else(invalid)
        } else {
            Ok(self.value)
        }
    }
}

impl From<i64> for Timestamp {
    fn from(value: i64) -> Self {
        Self::auto(value)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self::from_millis(value.timestamp_millis())
    }
}

/// Normalize `value` to milliseconds for `field`.
pub fn normalize_timestamp(
    value: impl Into<Timestamp>,
    field: &'static str,
) -> Result<i64, ValidationError> {
    value.into().to_millis(field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn seconds_are_scaled() {
        assert_eq!(normalize_timestamp(1_700_000_000_i64, "startTime"), Ok(1_700_000_000_000));
        assert_eq!(normalize_timestamp(0_i64, "startTime"), Ok(0));
        assert_eq!(
            normalize_timestamp(SECONDS_THRESHOLD - 1, "startTime"),
            Ok((SECONDS_THRESHOLD - 1) * 1000)
        );
    }

    #[test]
    fn millis_pass_through() {
        assert_eq!(
            normalize_timestamp(1_700_000_000_000_i64, "startTime"),
            Ok(1_700_000_000_000)
        );
        assert_eq!(
            normalize_timestamp(SECONDS_THRESHOLD, "startTime"),
            Ok(SECONDS_THRESHOLD)
        );
    }

    #[test]
    fn explicit_units_skip_the_heuristic() {
        assert_eq!(Timestamp::from_millis(5_000).to_millis("t"), Ok(5_000));
        assert_eq!(
            Timestamp::from_secs(SECONDS_THRESHOLD).to_millis("t"),
            Ok(SECONDS_THRESHOLD * 1000)
        );

        let instant = Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap();
        assert_eq!(normalize_timestamp(instant, "t"), Ok(1_700_000_000_000));
    }

    #[test]
    fn negative_and_overflowing_values_fail() {
        assert_eq!(
            normalize_timestamp(-1_i64, "endTime"),
            Err(ValidationError::InvalidTimestamp {
                field: "endTime",
                value: -1
            })
        );
        assert!(Timestamp::from_secs(i64::MAX).to_millis("t").is_err());
        assert!(Timestamp::from_millis(-5).to_millis("t").is_err());
    }
}
