//! Validated display names.

use std::{fmt, str::FromStr};

use crate::IdentityError;

/// Maximum display name length in characters.
pub const MAX_IDENTITY_LEN: usize = 25;

/// A user's display name within the room.
///
/// # Invariants
///
/// - Trimmed: no leading or trailing whitespace
/// - Non-empty
/// - At most [`MAX_IDENTITY_LEN`] characters (Unicode scalar values)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity(String);

impl Identity {
    /// Trim and validate a raw name.
    pub fn parse(raw: &str) -> Result<Self, IdentityError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(IdentityError::Empty);
        }

        let len = trimmed.chars().count();
        if len > MAX_IDENTITY_LEN {
            return Err(IdentityError::TooLong { len, max: MAX_IDENTITY_LEN });
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl FromStr for Identity {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Identity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Identity {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_surrounding_whitespace() {
        let identity = Identity::parse("  Alice \t").unwrap();
        assert_eq!(identity.as_str(), "Alice");
    }

    #[test]
    fn whitespace_only_rejected() {
        assert_eq!(Identity::parse("   "), Err(IdentityError::Empty));
        assert_eq!(Identity::parse(""), Err(IdentityError::Empty));
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let name = "é".repeat(MAX_IDENTITY_LEN);
        assert!(Identity::parse(&name).is_ok());

        let name = "é".repeat(MAX_IDENTITY_LEN + 1);
        assert_eq!(
            Identity::parse(&name),
            Err(IdentityError::TooLong { len: MAX_IDENTITY_LEN + 1, max: MAX_IDENTITY_LEN })
        );
    }

    #[test]
    fn length_checked_after_trim() {
        let name = format!("   {}   ", "a".repeat(MAX_IDENTITY_LEN));
        assert!(Identity::parse(&name).is_ok());
    }
}
