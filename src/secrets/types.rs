//! Redacting string type for KMS credentials and key material.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Placeholder written wherever a secret is serialized without [`expose`]
pub const REDACTED: &str = "[REDACTED]";

/// Credential or private key text that must never appear in logs.
///
/// Used for every secret in a provider field bag (Vault AppRole secret, AWS
/// secret key and session token, Azure client secret, GCP private key, Gemalto
/// token) and for pending private keys.
///
/// - `Debug` prints `SecretString([REDACTED])` and `Display` prints `[REDACTED]`
/// - default serialization writes `"[REDACTED]"` (an unset secret stays `""`);
///   documents sent to the backend
///   opt in with `#[serde(serialize_with = "crate::secrets::expose")]`
/// - deserialization accepts the real value (draft files, fetched configuration);
///   a value equal to [`REDACTED`] is kept as a placeholder, see [`Self::is_redacted`]
/// - the buffer is zeroed on drop
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Borrow the underlying value. Never log the result.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when the value is the placeholder written by redacting serialization.
    ///
    /// Such a value was read back from a redacted dump and is not a credential.
    pub fn is_redacted(&self) -> bool {
        self.0 == REDACTED
    }

    /// True when the value is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

/// Serialize the real value of a [`SecretString`].
pub fn expose<S>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(secret.expose_secret())
}

impl Serialize for SecretString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if self.0.is_empty() {
            serializer.serialize_str("")
        } else {
            serializer.serialize_str(REDACTED)
        }
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(SecretString(value.unwrap_or_default()))
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretString([REDACTED])")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl PartialEq for SecretString {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for SecretString {}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_and_display_are_redacted() {
        let secret = SecretString::new("approle-secret-value");

        assert_eq!(format!("{:?}", secret), "SecretString([REDACTED])");
        assert_eq!(format!("{}", secret), "[REDACTED]");
    }

    #[test]
    fn test_default_serialization_is_redacted() {
        #[derive(Serialize)]
        struct Credentials {
            accesskey: String,
            secretkey: SecretString,
        }

        let creds = Credentials {
            accesskey: "AK123".to_string(),
            secretkey: SecretString::new("SK456"),
        };

        let json = serde_json::to_string(&creds).unwrap();
        assert!(json.contains("AK123"));
        assert!(!json.contains("SK456"));
    }

    #[test]
    fn test_expose_serializes_real_value() {
        #[derive(Serialize)]
        struct Credentials {
            accesskey: String,
            #[serde(serialize_with = "expose")]
            secretkey: SecretString,
        }

        let creds = Credentials {
            accesskey: "AK123".to_string(),
            secretkey: SecretString::new("SK456"),
        };

        let json = serde_json::to_string(&creds).unwrap();
        assert_eq!(json, r#"{"accesskey":"AK123","secretkey":"SK456"}"#);
    }

    #[test]
    fn test_deserialization_accepts_values_and_null() {
        let secret: SecretString = serde_json::from_str("\"client-secret\"").unwrap();
        assert_eq!(secret.expose_secret(), "client-secret");

        let missing: SecretString = serde_json::from_str("null").unwrap();
        assert!(missing.is_empty());
    }

    #[test]
    fn test_redacted_dump_reads_back_as_placeholder() {
        let dumped = serde_json::to_string(&SecretString::new("SK456")).unwrap();
        let read_back: SecretString = serde_json::from_str(&dumped).unwrap();

        assert!(read_back.is_redacted());
        assert!(!SecretString::new("SK456").is_redacted());
        assert!(!SecretString::default().is_redacted());
        assert_eq!(serde_json::to_string(&SecretString::default()).unwrap(), "\"\"");
    }

    #[test]
    fn test_blank_detection() {
        assert!(SecretString::new("").is_blank());
        assert!(SecretString::new("  \t").is_blank());
        assert!(!SecretString::new(" token ").is_blank());
        assert_eq!(SecretString::new("12345").len(), 5);
    }
}
