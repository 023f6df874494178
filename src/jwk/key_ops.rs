use alloc::{borrow::Cow, string::String};

use serde::{Deserialize, Serialize};

/// The key operations (`key_ops`) parameter as defined in [Section 4.3 of RFC
/// 7517]. All possible values are registered in the [IANA `JSON Web Key
/// Operations` registry].
///
/// [Section 4.3 of RFC 7517]: <https://datatracker.ietf.org/doc/html/rfc7517#section-4.3>
/// [IANA `JSON Web Key Operations` registry]: <https://www.iana.org/assignments/jose/jose.xhtml#web-key-operations>
#[non_exhaustive]
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum KeyOperation {
    /// Compute digital signatures or MACs
    Sign,
    /// Verify digital signatures or MACs
    Verify,
    /// Encrypt content
    Encrypt,
    /// Decrypt content and validate decryption
    Decrypt,
    /// Encrypt a key
    WrapKey,
    /// Decrypt a key and validate the decryption
    UnwrapKey,
    /// Derive a key
    DeriveKey,
    /// Derive bits not to be used as a key
    DeriveBits,
    /// An unregistered, case-sensitive operation
    Other(String),
}

impl KeyOperation {
    /// The registered name.
    pub fn name(&self) -> &str {
        match self {
            Self::Sign => "sign",
            Self::Verify => "verify",
            Self::Encrypt => "encrypt",
            Self::Decrypt => "decrypt",
            Self::WrapKey => "wrapKey",
            Self::UnwrapKey => "unwrapKey",
            Self::DeriveKey => "deriveKey",
            Self::DeriveBits => "deriveBits",
            Self::Other(s) => s,
        }
    }
}

impl Serialize for KeyOperation {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.name().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for KeyOperation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let val = <Cow<'_, str> as Deserialize>::deserialize(deserializer)?;
        Ok(match &*val {
            "sign" => Self::Sign,
            "verify" => Self::Verify,
            "encrypt" => Self::Encrypt,
            "decrypt" => Self::Decrypt,
            "wrapKey" => Self::WrapKey,
            "unwrapKey" => Self::UnwrapKey,
            "deriveKey" => Self::DeriveKey,
            "deriveBits" => Self::DeriveBits,
            _ => Self::Other(val.into_owned()),
        })
    }
}
