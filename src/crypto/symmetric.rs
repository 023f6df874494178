use alloc::{string::String, vec::Vec};
use core::fmt;

use secrecy::{ExposeSecret as _, SecretSlice};

/// A shared secret: an HMAC key, a key encryption key, a direct content
/// encryption key or a PBES2 password.
///
/// The bytes are wiped from memory when the key is dropped, and never appear
/// in the [`Debug`](fmt::Debug) output.
#[derive(Clone)]
pub struct SymmetricKey {
    key: SecretSlice<u8>,
    key_id: Option<String>,
}

impl SymmetricKey {
    /// Creates a new key from the given bytes.
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self {
            key: SecretSlice::from(key.into()),
            key_id: None,
        }
    }

    /// Generates a new random key of `len` bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the random number generator failed.
    pub fn generate(len: usize) -> Result<Self, super::Error> {
        let key = super::random_bytes(len)?;
        Ok(Self::new(key.as_slice()))
    }

    /// Attaches a key id, which is put into the `kid` header parameter of
    /// every token that is protected with this key.
    #[must_use]
    pub fn with_key_id(mut self, key_id: impl Into<String>) -> Self {
        self.key_id = Some(key_id.into());
        self
    }

    /// The key id of this key, if any.
    pub fn key_id(&self) -> Option<&str> {
        self.key_id.as_deref()
    }

    /// The length of the key in bytes.
    pub fn len(&self) -> usize {
        self.key.expose_secret().len()
    }

    /// Returns `true` if the key has no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn expose(&self) -> &[u8] {
        self.key.expose_secret()
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymmetricKey")
            .field("len", &self.len())
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_hides_key() {
        let key = SymmetricKey::new(*b"very secret bytes").with_key_id("k1");
        let debug = format!("{key:?}");
        assert!(!debug.contains("very"));
        assert!(debug.contains("k1"));
        assert_eq!(key.len(), 17);
    }

    #[test]
    fn generate_is_random() {
        let a = SymmetricKey::generate(32).unwrap();
        let b = SymmetricKey::generate(32).unwrap();
        assert_eq!(a.len(), 32);
        assert_ne!(a.expose(), b.expose());
    }
}
