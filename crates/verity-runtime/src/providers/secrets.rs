//! API keys for the search, NLI and LLM services.
//!
//! Keys are wrapped in [`SecretString`] as soon as they are read. `Debug`
//! and `Display` show where a key came from, never its value; the raw value
//! is only reachable through [`ApiCredential::expose`].

use secrecy::{ExposeSecret, SecretString};
use std::fmt;

use super::ProviderError;

/// Where a key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialOrigin {
    /// Read from the named environment variable
    Env(&'static str),

    /// Passed to a constructor
    Explicit,
}

impl fmt::Display for CredentialOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialOrigin::Env(var) => write!(f, "${}", var),
            CredentialOrigin::Explicit => write!(f, "explicit key"),
        }
    }
}

pub struct ApiCredential {
    value: SecretString,
    origin: CredentialOrigin,
}

impl ApiCredential {
    pub fn explicit(value: impl Into<String>) -> Self {
        Self {
            value: SecretString::from(value.into()),
            origin: CredentialOrigin::Explicit,
        }
    }

    /// Read a key from `var`. Blank counts as unset.
    pub fn from_env(var: &'static str) -> Result<Self, ProviderError> {
        match std::env::var(var) {
            Ok(value) if !value.trim().is_empty() => Ok(Self {
                value: SecretString::from(value.trim().to_string()),
                origin: CredentialOrigin::Env(var),
            }),
            _ => Err(ProviderError::NotConfigured(format!("set {}", var))),
        }
    }

    /// [`from_env`](Self::from_env) for optional collaborators: a missing
    /// key is logged once and yields `None`.
    pub fn from_env_optional(var: &'static str) -> Option<Self> {
        let credential = Self::from_env(var).ok();
        if credential.is_none() {
            tracing::warn!(var, "API key not set, service disabled");
        }
        credential
    }

    /// The raw key. Call only where it goes on the wire.
    pub fn expose(&self) -> &str {
        self.value.expose_secret()
    }

    pub fn origin(&self) -> CredentialOrigin {
        self.origin
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiCredential({}, [REDACTED])", self.origin)
    }
}

impl fmt::Display for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED] from {}", self.origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "hf_0123456789abcdef";

    #[test]
    fn test_value_never_formatted() {
        let cred = ApiCredential::explicit(SECRET);
        let debug = format!("{:?}", cred);
        let display = cred.to_string();

        assert!(!debug.contains(SECRET));
        assert!(!display.contains(SECRET));
        assert_eq!(display, "[REDACTED] from explicit key");
        assert_eq!(cred.expose(), SECRET);
    }

    #[test]
    fn test_env_key_is_trimmed_and_tagged() {
        std::env::set_var("VERITY_TEST_KEY_PRESENT", " env-key ");
        let cred = ApiCredential::from_env("VERITY_TEST_KEY_PRESENT").unwrap();
        std::env::remove_var("VERITY_TEST_KEY_PRESENT");

        assert_eq!(cred.expose(), "env-key");
        assert_eq!(cred.origin(), CredentialOrigin::Env("VERITY_TEST_KEY_PRESENT"));
        assert!(format!("{:?}", cred).contains("$VERITY_TEST_KEY_PRESENT"));
    }

    #[test]
    fn test_missing_or_blank_env_is_not_configured() {
        let err = ApiCredential::from_env("VERITY_TEST_KEY_MISSING_12345").unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
        assert!(err.to_string().contains("VERITY_TEST_KEY_MISSING_12345"));
        assert!(ApiCredential::from_env_optional("VERITY_TEST_KEY_MISSING_12345").is_none());

        std::env::set_var("VERITY_TEST_KEY_BLANK", "   ");
        assert!(ApiCredential::from_env("VERITY_TEST_KEY_BLANK").is_err());
        std::env::remove_var("VERITY_TEST_KEY_BLANK");
    }
}
