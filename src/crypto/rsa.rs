//! The primitives for working with [RSA] keys.
//!
//! [RSA]: https://en.wikipedia.org/wiki/RSA_cryptosystem

use alloc::{string::String, vec::Vec};
use core::fmt;

use secrecy::SecretSlice;
use zeroize::Zeroizing;

use super::{
    backend::{
        interface::{
            self,
            rsa::{
                PrivateKey as _, PrivateKeyComponents, PrivateKeyCrtComponents,
                PrivateKeyPrimeComponents, PublicKey as _, PublicKeyComponents,
            },
        },
        Backend,
    },
    Result,
};
use crate::jwa;

type BackendPublicKey = <Backend as interface::Backend>::RsaPublicKey;
type BackendPrivateKey = <Backend as interface::Backend>::RsaPrivateKey;

/// The RSA public key type.
#[derive(Clone)]
pub struct PublicKey {
    inner: BackendPublicKey,
    key_id: Option<String>,
}

impl PublicKey {
    /// Creates a public key from the modulus `n` and the exponent `e`, both
    /// big-endian.
    ///
    /// # Errors
    ///
    /// Returns an error if the numbers do not form a valid RSA public key.
    pub fn from_components(n: &[u8], e: &[u8]) -> Result<Self> {
        let inner = BackendPublicKey::from_components(PublicKeyComponents {
            n: n.to_vec(),
            e: e.to_vec(),
        })?;

        Ok(Self {
            inner,
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

    /// The modulus, big-endian and without leading zeros.
    pub fn n(&self) -> Vec<u8> {
        self.inner.components().n
    }

    /// The public exponent, big-endian and without leading zeros.
    pub fn e(&self) -> Vec<u8> {
        self.inner.components().e
    }

    pub(crate) fn verify(&self, alg: jwa::RsassaPkcs1V1_5, msg: &[u8], signature: &[u8]) -> bool {
        self.inner.verify(alg, msg, signature)
    }

    pub(crate) fn encrypt(&self, alg: jwa::Rsaes, data: &[u8]) -> Result<Vec<u8>> {
        self.inner.encrypt(alg, data)
    }
}

impl Eq for PublicKey {}
impl PartialEq for PublicKey {
    fn eq(&self, o: &Self) -> bool {
        let (a, b) = (self.inner.components(), o.inner.components());
        a.n == b.n && a.e == b.e
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.inner.components();
        f.debug_struct("PublicKey")
            .field("bits", &(c.n.len() * 8))
            .field("e", &c.e)
            .field("key_id", &self.key_id)
            .finish()
    }
}

/// The RSA private key type.
#[derive(Clone)]
pub struct PrivateKey {
    inner: BackendPrivateKey,
    key_id: Option<String>,
}

/// The private numbers of a [`PrivateKey`], all big-endian.
pub(crate) struct PrivateNumbers {
    pub d: SecretSlice<u8>,
    pub p: SecretSlice<u8>,
    pub q: SecretSlice<u8>,
    pub dp: SecretSlice<u8>,
    pub dq: SecretSlice<u8>,
    pub qi: SecretSlice<u8>,
}

impl PrivateKey {
    /// Generates a new private key with a modulus of `bits` bits.
    ///
    /// # Errors
    ///
    /// Returns an error if `bits` is too small or the generation failed.
    pub fn generate(bits: usize) -> Result<Self> {
        Ok(Self {
            inner: BackendPrivateKey::generate(bits)?,
            key_id: None,
        })
    }

    /// Creates a private key from its numbers, all big-endian.
    ///
    /// # Errors
    ///
    /// Returns an error if the numbers do not form a consistent RSA key.
    pub fn from_components(n: &[u8], e: &[u8], d: &[u8], p: &[u8], q: &[u8]) -> Result<Self> {
        let inner = BackendPrivateKey::from_components(
            PrivateKeyComponents {
                d: SecretSlice::from(d.to_vec()),
                prime: PrivateKeyPrimeComponents {
                    p: SecretSlice::from(p.to_vec()),
                    q: SecretSlice::from(q.to_vec()),
                },
            },
            PublicKeyComponents {
                n: n.to_vec(),
                e: e.to_vec(),
            },
        )?;

        Ok(Self {
            inner,
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

    /// Derives the public key, keeping the key id.
    pub fn to_public_key(&self) -> PublicKey {
        PublicKey {
            inner: self.inner.to_public_key(),
            key_id: self.key_id.clone(),
        }
    }

    pub(crate) fn private_numbers(&self) -> Result<PrivateNumbers> {
        let (
            PrivateKeyComponents {
                d,
                prime: PrivateKeyPrimeComponents { p, q },
            },
            PrivateKeyCrtComponents { dp, dq, qi },
        ) = self.inner.private_components()?;

        Ok(PrivateNumbers {
            d,
            p,
            q,
            dp,
            dq,
            qi,
        })
    }

    pub(crate) fn sign(&self, alg: jwa::RsassaPkcs1V1_5, data: &[u8]) -> Result<Vec<u8>> {
        self.inner.sign(alg, data)
    }

    pub(crate) fn decrypt(&self, alg: jwa::Rsaes, data: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        self.inner.decrypt(alg, data)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("bits", &(self.inner.public_components().n.len() * 8))
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

/// Either half of an RSA key pair.
///
/// Signing and decryption require the [`Private`](RsaKey::Private) variant,
/// verification and encryption work with both.
#[derive(Debug, Clone)]
pub enum RsaKey {
    /// A public key.
    Public(PublicKey),
    /// A private key.
    Private(PrivateKey),
}

impl RsaKey {
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

impl From<PublicKey> for RsaKey {
    fn from(key: PublicKey) -> Self {
        Self::Public(key)
    }
}

impl From<PrivateKey> for RsaKey {
    fn from(key: PrivateKey) -> Self {
        Self::Private(key)
    }
}
