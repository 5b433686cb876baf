//! Access/secret key pair used for request signing.

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A secret value that is redacted in logs and debug output and wiped on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Secret<T: Zeroize>(T);

impl<T: Zeroize> Secret<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Expose the secret value.
    ///
    /// Use this method sparingly and only when necessary.
    pub fn expose(&self) -> &T {
        &self.0
    }
}

impl<T: Zeroize> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl<T: Zeroize> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret([REDACTED])")
    }
}

pub type SecretString = Secret<String>;

/// HMAC credentials. Signing is all-or-nothing: a pair with either half
/// missing is never constructed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    access_key: String,
    secret_key: SecretString,
}

impl Credentials {
    /// Returns `None` unless both keys are non-empty.
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Option<Self> {
        let access_key = access_key.into();
        let secret_key = secret_key.into();
        if access_key.is_empty() || secret_key.is_empty() {
            return None;
        }
        Some(Self {
            access_key,
            secret_key: Secret::new(secret_key),
        })
    }

    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    pub fn secret_key(&self) -> &SecretString {
        &self.secret_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &self.secret_key)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_keys_required() {
        assert!(Credentials::new("EXAMPLE", "EXAMPLE").is_some());
        assert!(Credentials::new("", "EXAMPLE").is_none());
        assert!(Credentials::new("EXAMPLE", "").is_none());
        assert!(Credentials::new("", "").is_none());
    }

    #[test]
    fn test_secret_is_redacted() {
        let credentials = Credentials::new("access", "hunter2").unwrap();
        let debug = format!("{credentials:?}");

        assert!(debug.contains("access"));
        assert!(!debug.contains("hunter2"));
        assert_eq!(credentials.secret_key().to_string(), "[REDACTED]");
        assert_eq!(credentials.secret_key().expose(), "hunter2");
    }
}
