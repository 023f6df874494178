//! This module contains the JWK Set implementation.

use alloc::{borrow::ToOwned, vec::Vec};

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::JsonWebKey;
use crate::error::ConfigurationError;

/// A list of [`JsonWebKey`] objects, parsed according to [Section 5 of RFC
/// 7517](https://www.rfc-editor.org/rfc/rfc7517#section-5).
///
/// Keys with a `kty` this crate does not implement are skipped while parsing,
/// a key of a known type with invalid members fails the whole set.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct JsonWebKeySet {
    keys: Vec<JsonWebKey>,
}

impl JsonWebKeySet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tries to find the JWK with the given key ID parameter set.
    pub fn find_by_key_id(&self, key_id: &str) -> Option<&JsonWebKey> {
        self.keys
            .iter()
            .find(|key| key.key_id().is_some_and(|id| id == key_id))
    }

    /// Selects the key for a token: the key with the given `kid`, or the only
    /// key in this set if the token carries no `kid`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::KeyNotFound`] if no key matches, or the
    /// token has no `kid` and the set does not contain exactly one key.
    pub fn select(&self, key_id: Option<&str>) -> Result<&JsonWebKey, ConfigurationError> {
        match key_id {
            Some(kid) => self
                .find_by_key_id(kid)
                .ok_or_else(|| ConfigurationError::KeyNotFound(Some(kid.to_owned()))),
            None => match self.keys.as_slice() {
                [key] => Ok(key),
                _ => Err(ConfigurationError::KeyNotFound(None)),
            },
        }
    }

    /// Returns an iterator over all the JWKs in this set.
    pub fn iter(&self) -> impl Iterator<Item = &JsonWebKey> {
        self.keys.iter()
    }

    /// The number of keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` if the set contains no keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Adds a key to this set.
    pub fn push(&mut self, key: JsonWebKey) {
        self.keys.push(key);
    }
}

impl<'de> Deserialize<'de> for JsonWebKeySet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Repr {
            keys: Vec<Map<alloc::string::String, Value>>,
        }

        let repr = Repr::deserialize(deserializer)?;
        let mut keys = Vec::with_capacity(repr.keys.len());
        for members in repr.keys {
            match members.get("kty").and_then(Value::as_str) {
                Some("oct" | "RSA" | "EC") => {
                    keys.push(JsonWebKey::from_members(members).map_err(de::Error::custom)?);
                }
                kty => debug!(?kty, "skipping key of unsupported type"),
            }
        }

        Ok(Self { keys })
    }
}

impl<'a> IntoIterator for &'a JsonWebKeySet {
    type IntoIter = core::slice::Iter<'a, JsonWebKey>;
    type Item = &'a JsonWebKey;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}

impl IntoIterator for JsonWebKeySet {
    type IntoIter = alloc::vec::IntoIter<Self::Item>;
    type Item = JsonWebKey;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.into_iter()
    }
}

impl From<Vec<JsonWebKey>> for JsonWebKeySet {
    fn from(keys: Vec<JsonWebKey>) -> Self {
        Self { keys }
    }
}

impl FromIterator<JsonWebKey> for JsonWebKeySet {
    fn from_iter<T: IntoIterator<Item = JsonWebKey>>(iter: T) -> Self {
        let keys = iter.into_iter().collect();
        Self { keys }
    }
}
