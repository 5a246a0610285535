//! Secret String Value Object
//!
//! Wraps a sensitive value so it cannot leak through `Debug`, `Display`,
//! or serialization. Callers must go through `expose()` to read it, which
//! keeps every use of the raw value greppable.

use serde::Deserialize;
use std::fmt;

/// Placeholder shown wherever a secret would otherwise appear
pub const REDACTED: &str = "<redacted>";

/// A string whose value must never appear in logs, diffs, or state
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Read the underlying value
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretString({})", REDACTED)
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", REDACTED)
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expose_returns_value() {
        let secret = SecretString::new("hunter2");
        assert_eq!(secret.expose(), "hunter2");
    }

    #[test]
    fn debug_redacts_value() {
        let secret = SecretString::new("hunter2");
        let formatted = format!("{:?}", secret);
        assert!(!formatted.contains("hunter2"));
        assert!(formatted.contains(REDACTED));
    }

    #[test]
    fn display_redacts_value() {
        let secret = SecretString::new("hunter2");
        assert_eq!(format!("{}", secret), REDACTED);
    }

    #[test]
    fn deserializes_from_plain_string() {
        #[derive(Deserialize)]
        struct Holder {
            password: SecretString,
        }
        let holder: Holder = toml::from_str("password = \"hunter2\"").unwrap();
        assert_eq!(holder.password.expose(), "hunter2");
    }

    #[test]
    fn is_empty_for_empty_value() {
        assert!(SecretString::new("").is_empty());
        assert!(!SecretString::new("x").is_empty());
    }
}
