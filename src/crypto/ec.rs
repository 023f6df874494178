//! The primitives for working with keys on the NIST prime curves.

use alloc::{string::String, vec::Vec};
use core::fmt;

use zeroize::Zeroizing;

use super::{
    backend::{
        interface::{
            self,
            ec::{PrivateKey as _, PublicKey as _},
        },
        Backend,
    },
    Result,
};

type BackendPublicKey = <Backend as interface::Backend>::EcPublicKey;
type BackendPrivateKey = <Backend as interface::Backend>::EcPrivateKey;

/// The curves that can be used with ECDSA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Curve {
    /// NIST P-256, also known as secp256r1
    P256,
    /// NIST P-384, also known as secp384r1
    P384,
    /// NIST P-521, also known as secp521r1
    P521,
}

impl Curve {
    /// The name of the curve as it appears in the `crv` member of a JWK.
    pub const fn name(self) -> &'static str {
        match self {
            Self::P256 => "P-256",
            Self::P384 => "P-384",
            Self::P521 => "P-521",
        }
    }

    /// Looks up a curve by its JWK name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "P-256" => Some(Self::P256),
            "P-384" => Some(Self::P384),
            "P-521" => Some(Self::P521),
            _ => None,
        }
    }

    /// The size of a coordinate (and of the private scalar) in bytes.
    pub const fn field_size(self) -> usize {
        match self {
            Self::P256 => 32,
            Self::P384 => 48,
            Self::P521 => 66,
        }
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An EC public key.
#[derive(Clone)]
pub struct PublicKey {
    inner: BackendPublicKey,
    curve: Curve,
    key_id: Option<String>,
}

impl PublicKey {
    /// Creates a public key from its affine coordinates, each exactly
    /// [`Curve::field_size`] bytes long.
    ///
    /// # Errors
    ///
    /// Returns an error if the coordinates have the wrong size or the point is
    /// not on the curve.
    pub fn new(curve: Curve, x: &[u8], y: &[u8]) -> Result<Self> {
        Ok(Self {
            inner: BackendPublicKey::new(curve, x, y)?,
            curve,
            key_id: None,
        })
    }

    /// Attaches a key id.
    #[must_use]
    pub fn with_key_id(mut self, key_id: impl Into<String>) -> Self {
        self.key_id = Some(key_id.into());
        self
    }

    /// The key id of this key, if any.
    pub fn key_id(&self) -> Option<&str> {
        self.key_id.as_deref()
    }

    /// The curve of this key.
    pub const fn curve(&self) -> Curve {
        self.curve
    }

    /// The affine coordinates `(x, y)`, each full field width.
    ///
    /// # Errors
    ///
    /// Returns an error if the point has no affine representation.
    pub fn coordinates(&self) -> Result<(Vec<u8>, Vec<u8>)> {
        self.inner.to_point()
    }

    pub(crate) fn verify_der(&self, msg: &[u8], signature: &[u8]) -> bool {
        self.inner.verify(msg, signature)
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.curve == other.curve
            && matches!(
                (self.coordinates(), other.coordinates()),
                (Ok(a), Ok(b)) if a == b
            )
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKey")
            .field("curve", &self.curve)
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

/// An EC private key.
#[derive(Clone)]
pub struct PrivateKey {
    inner: BackendPrivateKey,
    curve: Curve,
    key_id: Option<String>,
}

impl PrivateKey {
    /// Creates a private key from the public point and the private scalar
    /// `d`, all exactly [`Curve::field_size`] bytes long.
    ///
    /// # Errors
    ///
    /// Returns an error if a value has the wrong size, the point is not on the
    /// curve, or `d` does not belong to the point.
    pub fn new(curve: Curve, x: &[u8], y: &[u8], d: &[u8]) -> Result<Self> {
        Ok(Self {
            inner: BackendPrivateKey::new(curve, x, y, d)?,
            curve,
            key_id: None,
        })
    }

    /// Generates a new random key on `curve`.
    ///
    /// # Errors
    ///
    /// Returns an error if the random number generator failed.
    pub fn generate(curve: Curve) -> Result<Self> {
        Ok(Self {
            inner: BackendPrivateKey::generate(curve)?,
            curve,
            key_id: None,
        })
    }

    /// Attaches a key id.
    #[must_use]
    pub fn with_key_id(mut self, key_id: impl Into<String>) -> Self {
        self.key_id = Some(key_id.into());
        self
    }

    /// The key id of this key, if any.
    pub fn key_id(&self) -> Option<&str> {
        self.key_id.as_deref()
    }

    /// The curve of this key.
    pub const fn curve(&self) -> Curve {
        self.curve
    }

    /// Derives the public key, keeping the key id.
    pub fn to_public_key(&self) -> PublicKey {
        PublicKey {
            inner: self.inner.to_public_key(),
            curve: self.curve,
            key_id: self.key_id.clone(),
        }
    }

    pub(crate) fn private_scalar(&self) -> Zeroizing<Vec<u8>> {
        self.inner.private_material()
    }

    pub(crate) fn sign_der(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.inner.sign(data)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("curve", &self.curve)
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

/// Either half of an EC key pair.
#[derive(Debug, Clone)]
pub enum EcKey {
    /// A public key, only usable for verification.
    Public(PublicKey),
    /// A private key.
    Private(PrivateKey),
}

impl EcKey {
    /// The curve of this key.
    pub const fn curve(&self) -> Curve {
        match self {
            Self::Public(key) => key.curve(),
            Self::Private(key) => key.curve(),
        }
    }

    /// The key id of this key, if any.
    pub fn key_id(&self) -> Option<&str> {
        match self {
            Self::Public(key) => key.key_id(),
            Self::Private(key) => key.key_id(),
        }
    }

    /// The public half of this key.
    pub fn to_public_key(&self) -> PublicKey {
        match self {
            Self::Public(key) => key.clone(),
            Self::Private(key) => key.to_public_key(),
        }
    }

    /// The private half, if this is a private key.
    pub fn private_key(&self) -> Option<&PrivateKey> {
        match self {
            Self::Public(_) => None,
            Self::Private(key) => Some(key),
        }
    }
}

impl From<PublicKey> for EcKey {
    fn from(key: PublicKey) -> Self {
        Self::Public(key)
    }
}

impl From<PrivateKey> for EcKey {
    fn from(key: PrivateKey) -> Self {
        Self::Private(key)
    }
}
