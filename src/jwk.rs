//! Implementation of JSON Web Key (JWK) as defined in [RFC 7517]
//!
//! A [`JsonWebKey`] wraps one of the key types of [`crypto`](crate::crypto)
//! together with the metadata of the JWK format. Keys are turned into
//! algorithm instances using
//! [`SignatureAlgorithm::from_jwk`](crate::jws::SignatureAlgorithm::from_jwk)
//! and [`KeyManagement::from_jwk`](crate::jwe::KeyManagement::from_jwk), which
//! also enforce the `use`, `key_ops` and `alg` members.
//!
//! [RFC 7517]: <https://datatracker.ietf.org/doc/html/rfc7517>

mod key_ops;
mod key_use;
mod material;
mod set;
mod thumbprint;

use alloc::{borrow::ToOwned, string::String, vec::Vec};

use hashbrown::HashSet;
use serde::{de, ser::SerializeMap as _, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

#[doc(inline)]
pub use self::{key_ops::KeyOperation, key_use::KeyUsage, set::JsonWebKeySet};
use crate::{
    crypto::{ec::EcKey, rsa::RsaKey, SymmetricKey},
    error::{ConfigurationError, ParseError},
    jwa::JsonWebAlgorithm,
};

/// The key material of a [`JsonWebKey`], one variant per supported `kty`.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum JsonWebKeyType {
    /// `oct`, a symmetric key
    Symmetric(SymmetricKey),
    /// `RSA`
    Rsa(RsaKey),
    /// `EC`, a key on one of the NIST P curves
    Ec(EcKey),
}

impl JsonWebKeyType {
    /// The `kty` member for this key type.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Symmetric(_) => "oct",
            Self::Rsa(_) => "RSA",
            Self::Ec(_) => "EC",
        }
    }

    fn key_id(&self) -> Option<&str> {
        match self {
            Self::Symmetric(key) => key.key_id(),
            Self::Rsa(key) => key.key_id(),
            Self::Ec(key) => key.key_id(),
        }
    }
}

impl From<SymmetricKey> for JsonWebKeyType {
    fn from(key: SymmetricKey) -> Self {
        Self::Symmetric(key)
    }
}

impl From<RsaKey> for JsonWebKeyType {
    fn from(key: RsaKey) -> Self {
        Self::Rsa(key)
    }
}

impl From<EcKey> for JsonWebKeyType {
    fn from(key: EcKey) -> Self {
        Self::Ec(key)
    }
}

/// What a key is about to be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Purpose {
    Signature,
    Encryption,
}

const SIGNATURE_OPERATIONS: &[KeyOperation] = &[KeyOperation::Sign, KeyOperation::Verify];
const ENCRYPTION_OPERATIONS: &[KeyOperation] = &[
    KeyOperation::Encrypt,
    KeyOperation::Decrypt,
    KeyOperation::WrapKey,
    KeyOperation::UnwrapKey,
];

impl Purpose {
    const fn operations(self) -> &'static [KeyOperation] {
        match self {
            Self::Signature => SIGNATURE_OPERATIONS,
            Self::Encryption => ENCRYPTION_OPERATIONS,
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Signature => "signatures",
            Self::Encryption => "encryption",
        }
    }
}

/// A JSON Web Key as defined in [RFC 7517], supporting the `oct`, `RSA` and
/// `EC` key types.
///
/// Members that are not understood are kept and serialized again.
///
/// [RFC 7517]: <https://datatracker.ietf.org/doc/html/rfc7517>
#[derive(Debug, Clone)]
pub struct JsonWebKey {
    key_type: JsonWebKeyType,
    key_use: Option<KeyUsage>,
    key_operations: Option<Vec<KeyOperation>>,
    algorithm: Option<JsonWebAlgorithm>,
    key_id: Option<String>,
    additional: Map<String, Value>,
}

impl JsonWebKey {
    /// Wraps a key. The key id of the key becomes the `kid` member.
    pub fn new(key: impl Into<JsonWebKeyType>) -> Self {
        let key_type = key.into();
        Self {
            key_id: key_type.key_id().map(ToOwned::to_owned),
            key_type,
            key_use: None,
            key_operations: None,
            algorithm: None,
            additional: Map::new(),
        }
    }

    /// The key material.
    pub fn key_type(&self) -> &JsonWebKeyType {
        &self.key_type
    }

    /// The `use` member.
    pub fn key_use(&self) -> Option<&KeyUsage> {
        self.key_use.as_ref()
    }

    /// The `key_ops` member.
    pub fn key_operations(&self) -> Option<&[KeyOperation]> {
        self.key_operations.as_deref()
    }

    /// The `alg` member.
    pub fn algorithm(&self) -> Option<&JsonWebAlgorithm> {
        self.algorithm.as_ref()
    }

    /// The `kid` member.
    pub fn key_id(&self) -> Option<&str> {
        self.key_id.as_deref()
    }

    /// Members that are not interpreted by this crate.
    pub fn additional(&self) -> &Map<String, Value> {
        &self.additional
    }

    /// Sets the `kid` member.
    #[must_use]
    pub fn with_key_id(mut self, key_id: impl Into<String>) -> Self {
        self.key_id = Some(key_id.into());
        self
    }

    /// Sets the `use` member.
    #[must_use]
    pub fn with_key_use(mut self, key_use: KeyUsage) -> Self {
        self.key_use = Some(key_use);
        self
    }

    /// Sets the `key_ops` member, dropping duplicates.
    #[must_use]
    pub fn with_key_operations(mut self, ops: impl IntoIterator<Item = KeyOperation>) -> Self {
        let mut unique = Vec::new();
        for op in ops {
            if !unique.contains(&op) {
                unique.push(op);
            }
        }
        self.key_operations = Some(unique);
        self
    }

    /// Sets the `alg` member.
    #[must_use]
    pub fn with_algorithm(mut self, alg: impl Into<JsonWebAlgorithm>) -> Self {
        self.algorithm = Some(alg.into());
        self
    }

    /// Returns `true` if this key contains no secret material, meaning it is
    /// an RSA or EC public key.
    pub fn is_public(&self) -> bool {
        match &self.key_type {
            JsonWebKeyType::Symmetric(_) => false,
            JsonWebKeyType::Rsa(key) => key.private_key().is_none(),
            JsonWebKeyType::Ec(key) => key.private_key().is_none(),
        }
    }

    /// The public part of this key with all metadata, or `None` for
    /// symmetric keys.
    pub fn to_public(&self) -> Option<Self> {
        let key_type = match &self.key_type {
            JsonWebKeyType::Symmetric(_) => return None,
            JsonWebKeyType::Rsa(key) => JsonWebKeyType::Rsa(key.to_public_key().into()),
            JsonWebKeyType::Ec(key) => JsonWebKeyType::Ec(key.to_public_key().into()),
        };
        Some(Self {
            key_type,
            ..self.clone()
        })
    }

    /// Checks the `alg`, `use` and `key_ops` members before the key is used
    /// with `algorithm`.
    pub(crate) fn check_usage(
        &self,
        algorithm: &JsonWebAlgorithm,
        purpose: Purpose,
    ) -> Result<(), ConfigurationError> {
        if let Some(declared) = &self.algorithm {
            if declared != algorithm {
                return Err(ConfigurationError::AlgorithmMismatch {
                    declared: declared.name().to_owned(),
                    supplied: algorithm.name().to_owned(),
                });
            }
        }

        let allowed = purpose.operations();
        if let Some(key_use) = &self.key_use {
            if !allowed.iter().any(|op| key_use.permits(op)) {
                return Err(ConfigurationError::KeyUsage(purpose.name()));
            }
        }
        if let Some(ops) = &self.key_operations {
            if !ops.iter().any(|op| allowed.contains(op)) {
                return Err(ConfigurationError::KeyUsage(purpose.name()));
            }
        }

        Ok(())
    }

    /// The symmetric key, carrying this JWK's key id.
    pub(crate) fn symmetric(&self) -> Option<SymmetricKey> {
        match &self.key_type {
            JsonWebKeyType::Symmetric(key) => {
                Some(self.attach_key_id(key.clone(), |k, id| k.with_key_id(id)))
            }
            _ => None,
        }
    }

    /// The RSA key, carrying this JWK's key id.
    pub(crate) fn rsa(&self) -> Option<RsaKey> {
        match &self.key_type {
            JsonWebKeyType::Rsa(RsaKey::Public(key)) => {
                Some(self.attach_key_id(key.clone(), |k, id| k.with_key_id(id)).into())
            }
            JsonWebKeyType::Rsa(RsaKey::Private(key)) => {
                Some(self.attach_key_id(key.clone(), |k, id| k.with_key_id(id)).into())
            }
            _ => None,
        }
    }

    /// The EC key, carrying this JWK's key id.
    pub(crate) fn ec(&self) -> Option<EcKey> {
        match &self.key_type {
            JsonWebKeyType::Ec(EcKey::Public(key)) => {
                Some(self.attach_key_id(key.clone(), |k, id| k.with_key_id(id)).into())
            }
            JsonWebKeyType::Ec(EcKey::Private(key)) => {
                Some(self.attach_key_id(key.clone(), |k, id| k.with_key_id(id)).into())
            }
            _ => None,
        }
    }

    fn attach_key_id<K>(&self, key: K, with_key_id: impl FnOnce(K, String) -> K) -> K {
        match &self.key_id {
            Some(id) => with_key_id(key, id.clone()),
            None => key,
        }
    }

    /// Builds a key from the members of a JSON object.
    pub(crate) fn from_members(mut members: Map<String, Value>) -> Result<Self, ParseError> {
        let kty = match members.remove("kty") {
            Some(Value::String(kty)) => kty,
            _ => return Err(ParseError::InvalidKey("kty")),
        };
        let key_type = material::parse(&kty, &mut members)?;

        let key_use = members
            .remove("use")
            .map(serde_json::from_value::<KeyUsage>)
            .transpose()
            .map_err(|_| ParseError::InvalidKey("use"))?;

        let key_operations = members
            .remove("key_ops")
            .map(serde_json::from_value::<Vec<KeyOperation>>)
            .transpose()
            .map_err(|_| ParseError::InvalidKey("key_ops"))?;
        if let Some(ops) = &key_operations {
            let mut seen = HashSet::new();
            if !ops.iter().all(|op| seen.insert(op)) {
                return Err(ParseError::InvalidKey("key_ops"));
            }
        }

        let algorithm = members
            .remove("alg")
            .map(serde_json::from_value::<JsonWebAlgorithm>)
            .transpose()
            .map_err(|_| ParseError::InvalidKey("alg"))?;

        let key_id = match members.remove("kid") {
            Some(Value::String(kid)) => Some(kid),
            Some(_) => return Err(ParseError::InvalidKey("kid")),
            None => None,
        };

        Ok(Self {
            key_type,
            key_use,
            key_operations,
            algorithm,
            key_id,
            additional: members,
        })
    }
}

impl PartialEq for JsonWebKey {
    fn eq(&self, other: &Self) -> bool {
        match (serde_json::to_value(self), serde_json::to_value(other)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

impl Serialize for JsonWebKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        material::serialize(&self.key_type, &mut map)?;
        if let Some(key_use) = &self.key_use {
            map.serialize_entry("use", key_use)?;
        }
        if let Some(ops) = &self.key_operations {
            map.serialize_entry("key_ops", ops)?;
        }
        if let Some(alg) = &self.algorithm {
            map.serialize_entry("alg", alg)?;
        }
        if let Some(kid) = &self.key_id {
            map.serialize_entry("kid", kid)?;
        }
        for (name, value) in &self.additional {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for JsonWebKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let members = Map::<String, Value>::deserialize(deserializer)?;
        Self::from_members(members).map_err(de::Error::custom)
    }
}
