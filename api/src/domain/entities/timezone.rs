//! IANA timezone validation
//!
//! Fixed abbreviations ("PST", "EST") are rejected even though the tz
//! database carries legacy single-name zones for some of them: an
//! abbreviation is ambiguous across daylight-saving transitions, and a
//! dashboard that silently pins it to one offset reports wrong day
//! boundaries for half the year.

use chrono_tz::Tz;
use serde::Serialize;

use crate::error::DomainError;

/// A timezone name that has passed registry validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValidTimezone(Tz);

impl ValidTimezone {
    pub const UTC: ValidTimezone = ValidTimezone(Tz::UTC);

    /// Validate a user-supplied zone name. Empty or whitespace-only input
    /// defaults to UTC; anything else must be a canonical IANA identifier.
    pub fn parse(name: &str) -> Result<Self, DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(Self::UTC);
        }
        // Canonical IANA identifiers are Area/Location; the only bare name
        // accepted is UTC itself.
        if name != "UTC" && !name.contains('/') {
            return Err(DomainError::InvalidTimezone(name.to_string()));
        }
        name.parse::<Tz>()
            .map(ValidTimezone)
            .map_err(|_| DomainError::InvalidTimezone(name.to_string()))
    }

    pub fn tz(&self) -> Tz {
        self.0
    }

    pub fn name(&self) -> &'static str {
        self.0.name()
    }
}

impl Default for ValidTimezone {
    fn default() -> Self {
        Self::UTC
    }
}

impl std::fmt::Display for ValidTimezone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_canonical_zone_names() {
        for name in [
            "America/Los_Angeles",
            "America/New_York",
            "Europe/London",
            "Asia/Kolkata",
            "Australia/Sydney",
        ] {
            assert!(ValidTimezone::parse(name).is_ok(), "rejected {}", name);
        }
    }

    #[test]
    fn empty_input_defaults_to_utc() {
        assert_eq!(ValidTimezone::parse("").unwrap(), ValidTimezone::UTC);
        assert_eq!(ValidTimezone::parse("  ").unwrap(), ValidTimezone::UTC);
    }

    #[test]
    fn explicit_utc_is_accepted() {
        assert_eq!(ValidTimezone::parse("UTC").unwrap().name(), "UTC");
    }

    #[test]
    fn abbreviations_are_rejected_not_defaulted() {
        for name in ["PST", "EST", "MST", "GMT", "CET"] {
            let err = ValidTimezone::parse(name).unwrap_err();
            assert!(
                matches!(err, DomainError::InvalidTimezone(ref n) if n == name),
                "{} should be InvalidTimezone",
                name
            );
        }
    }

    #[test]
    fn unknown_zone_is_rejected() {
        assert!(matches!(
            ValidTimezone::parse("Invalid/Timezone"),
            Err(DomainError::InvalidTimezone(_))
        ));
    }
}
