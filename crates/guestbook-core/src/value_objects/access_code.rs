//! Event access code - the short code guests type in or scan from a QR code

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DomainError;
use crate::generation::ACCESS_CODE;

/// Normalized (uppercase) six-character access code
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccessCode(String);

impl AccessCode {
    /// Normalize user input and check it against the access code alphabet.
    ///
    /// Surrounding whitespace is ignored and letters are uppercased, so
    /// `" abc123"` and `"ABC123"` produce the same code.
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let normalized = input.trim().to_ascii_uppercase();
        if ACCESS_CODE.matches(&normalized) {
            Ok(Self(normalized))
        } else {
            Err(DomainError::InvalidAccessCode(input.trim().to_string()))
        }
    }

    /// Fresh random code
    pub fn generate() -> Self {
        Self(ACCESS_CODE.generate())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for AccessCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AccessCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for AccessCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for AccessCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_input_is_normalized() {
        let lower = AccessCode::parse("abc123").unwrap();
        let upper = AccessCode::parse("ABC123").unwrap();
        assert_eq!(lower, upper);
        assert_eq!(lower.as_str(), "ABC123");
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        assert_eq!(AccessCode::parse("  xy9z8w \n").unwrap().as_str(), "XY9Z8W");
    }

    #[test]
    fn test_malformed_codes_are_rejected() {
        for bad in ["", "ABC12", "ABC1234", "AB-123", "ÄBC123"] {
            assert!(
                matches!(AccessCode::parse(bad), Err(DomainError::InvalidAccessCode(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_generated_codes_parse() {
        let code = AccessCode::generate();
        assert_eq!(AccessCode::parse(code.as_str()).unwrap(), code);
    }

    #[test]
    fn test_serde_normalizes() {
        let code: AccessCode = serde_json::from_str("\"wed001\"").unwrap();
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"WED001\"");
    }
}
