//! The claim set of a JSON Web Token, [section 4 of RFC 7519], and its
//! validation.
//!
//! [section 4 of RFC 7519]: <https://datatracker.ietf.org/doc/html/rfc7519#section-4>

mod context;
mod validator;

use alloc::{format, string::String, vec::Vec};
use core::fmt;

use hashbrown::DefaultHashBuilder;
use indexmap::IndexMap;
use serde::{
    de::{self, MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};
use serde_json::Value;

pub use self::{context::ValidationContext, validator::Validator};
use crate::error::ParseError;

type Members = IndexMap<String, Value, DefaultHashBuilder>;

/// An ordered set of claims, each name appearing at most once.
///
/// Like [`Header`](crate::Header), a claim set is extended by creating a new
/// one with [`with_claim`](Self::with_claim).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Claims {
    members: Members,
}

impl Claims {
    /// An empty claim set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a claim set from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Json`] if `json` is not an object or a name
    /// appears twice.
    pub fn from_slice(json: &[u8]) -> Result<Self, ParseError> {
        Ok(serde_json::from_slice(json)?)
    }

    /// Serializes this claim set into a JSON object.
    pub fn to_vec(&self) -> Vec<u8> {
        // a map of strings to JSON values always serializes
        serde_json::to_vec(self).unwrap_or_default()
    }

    /// Returns a copy of this claim set with `name` set to `value`. An
    /// existing claim keeps its position.
    #[must_use]
    pub fn with_claim(&self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut members = self.members.clone();
        members.insert(name.into(), value.into());
        Self { members }
    }

    /// Sets `name` to `value`, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.members.insert(name.into(), value.into())
    }

    /// Removes the claim `name`, keeping the order of the other claims.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.members.shift_remove(name)
    }

    /// The value of the claim `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.members.get(name)
    }

    /// Returns `true` if the claim `name` is present.
    pub fn contains(&self, name: &str) -> bool {
        self.members.contains_key(name)
    }

    /// The claims in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.members.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// The number of claims.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` if there are no claims.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// `iss`, if it is a string.
    pub fn issuer(&self) -> Option<&str> {
        self.get("iss").and_then(Value::as_str)
    }

    /// `sub`, if it is a string.
    pub fn subject(&self) -> Option<&str> {
        self.get("sub").and_then(Value::as_str)
    }

    /// `aud`, which may be a single string or an array of strings.
    pub fn audience(&self) -> Vec<&str> {
        match self.get("aud") {
            Some(Value::String(aud)) => alloc::vec![aud.as_str()],
            Some(Value::Array(aud)) => aud.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// `exp` in seconds since the epoch.
    pub fn expiration(&self) -> Option<f64> {
        self.get("exp").and_then(Value::as_f64)
    }

    /// `nbf` in seconds since the epoch.
    pub fn not_before(&self) -> Option<f64> {
        self.get("nbf").and_then(Value::as_f64)
    }

    /// `iat` in seconds since the epoch.
    pub fn issued_at(&self) -> Option<f64> {
        self.get("iat").and_then(Value::as_f64)
    }

    /// `jti`, if it is a string.
    pub fn id(&self) -> Option<&str> {
        self.get("jti").and_then(Value::as_str)
    }
}

impl<N: Into<String>, V: Into<Value>> FromIterator<(N, V)> for Claims {
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        Self {
            members: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

impl Serialize for Claims {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.members.len()))?;
        for (name, value) in &self.members {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Claims {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ClaimsVisitor;

        impl<'de> Visitor<'de> for ClaimsVisitor {
            type Value = Claims;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object of claims")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut members = Members::with_capacity_and_hasher(
                    map.size_hint().unwrap_or(0),
                    DefaultHashBuilder::default(),
                );
                while let Some((name, value)) = map.next_entry::<String, Value>()? {
                    if members.contains_key(&name) {
                        return Err(de::Error::custom(format!("duplicate claim `{name}`")));
                    }
                    members.insert(name, value);
                }
                Ok(Claims { members })
            }
        }

        deserializer.deserialize_map(ClaimsVisitor)
    }
}
