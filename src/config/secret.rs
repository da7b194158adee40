//! Secure handling of the backend password
//!
//! The basic-auth password is kept in a `secrecy` container so it is zeroed on drop and never
//! shows up in `Debug` output or log lines. It is only exposed when the `Authorization` header
//! is built.
//!
//! ```rust
//! use geoindex::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let password = secret_string("changeme".to_string());
//! assert_eq!(password.expose_secret(), "changeme");
//! assert!(!format!("{password:?}").contains("changeme"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

/// Password text; only reachable through `ExposeSecret`
#[derive(Clone, Debug, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}
impl SerializableSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl PartialEq<str> for SecretValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for SecretValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// Secret string as stored in [`crate::config::BackendConfig::password`]
pub type SecretString = Secret<SecretValue>;

/// Wraps a plain string as a [`SecretString`]
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_secret_string_creation() {
        let secret = secret_string("changeme".to_string());
        assert_eq!(secret.expose_secret(), "changeme");
        assert_eq!(secret.expose_secret().as_ref(), "changeme");
    }

    #[test]
    fn test_secret_debug_redacted() {
        let secret = secret_string("hunter2".to_string());
        let debug_output = format!("{secret:?}");

        assert!(!debug_output.contains("hunter2"));
        assert!(debug_output.contains("REDACTED"));
    }

    #[test]
    fn test_secret_deserialize_from_toml() {
        #[derive(Deserialize)]
        struct Backend {
            password: SecretString,
        }

        let backend: Backend = toml::from_str("password = \"changeme\"").unwrap();
        assert_eq!(backend.password.expose_secret(), "changeme");
    }
}
