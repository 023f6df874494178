use alloc::{borrow::Cow, string::String};

use serde::{Deserialize, Serialize};

use super::KeyOperation;

/// The public key use (`use`) parameter as defined in [Section 4.2 of RFC
/// 7517]. All possible values are registered in the [IANA `JSON Web Key Use`
/// registry].
///
/// [Section 4.2 of RFC 7517]: <https://datatracker.ietf.org/doc/html/rfc7517#section-4.2>
/// [IANA `JSON Web Key Use` registry]: <https://www.iana.org/assignments/jose/jose.xhtml#web-key-use>
#[non_exhaustive]
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum KeyUsage {
    /// The `sig` (signature) value
    Signing,
    /// The `enc` (encryption) value
    Encryption,
    /// Some other case-sensitive [`String`] that did not match any of the
    /// publicly known variants
    Other(String),
}

impl KeyUsage {
    /// The registered name.
    pub fn name(&self) -> &str {
        match self {
            Self::Signing => "sig",
            Self::Encryption => "enc",
            Self::Other(s) => s,
        }
    }

    /// Returns `true` if a key with this use may perform `op`.
    ///
    /// Unknown uses permit nothing.
    pub(crate) fn permits(&self, op: &KeyOperation) -> bool {
        match self {
            Self::Signing => matches!(op, KeyOperation::Sign | KeyOperation::Verify),
            Self::Encryption => matches!(
                op,
                KeyOperation::Encrypt
                    | KeyOperation::Decrypt
                    | KeyOperation::WrapKey
                    | KeyOperation::UnwrapKey
                    | KeyOperation::DeriveKey
                    | KeyOperation::DeriveBits
            ),
            Self::Other(_) => false,
        }
    }
}

impl Serialize for KeyUsage {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.name().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for KeyUsage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let val = <Cow<'_, str> as Deserialize>::deserialize(deserializer)?;
        Ok(match &*val {
            "sig" => Self::Signing,
            "enc" => Self::Encryption,
            _ => Self::Other(val.into_owned()),
        })
    }
}
