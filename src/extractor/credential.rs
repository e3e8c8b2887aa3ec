use secrecy::{ExposeSecret, SecretBox};
use std::fmt;

/// An API credential that never shows up in logs or debug output
pub struct Credential(SecretBox<str>);

impl Credential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretBox::new(Box::from(value.into().as_str())))
    }

    /// Exposes the secret; only call this when building a request
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Returns true if the credential is empty or whitespace
    pub fn is_blank(&self) -> bool {
        self.expose().trim().is_empty()
    }
}

impl Clone for Credential {
    fn clone(&self) -> Self {
        Self::new(self.expose())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for Credential {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for Credential {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
