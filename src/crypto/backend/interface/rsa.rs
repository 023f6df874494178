//! The interfaces for RSA.

use alloc::vec::Vec;

use secrecy::SecretSlice;
use zeroize::Zeroizing;

use crate::{crypto::Result, jwa};

/// The prime factors of a private key.
pub(crate) struct PrivateKeyPrimeComponents {
    pub p: SecretSlice<u8>,
    pub q: SecretSlice<u8>,
}

/// The CRT values of a private key.
pub(crate) struct PrivateKeyCrtComponents {
    pub dp: SecretSlice<u8>,
    pub dq: SecretSlice<u8>,
    pub qi: SecretSlice<u8>,
}

/// The components of a private key.
///
/// All fields in this struct are big integers represented in big endian bytes.
pub(crate) struct PrivateKeyComponents {
    pub d: SecretSlice<u8>,
    pub prime: PrivateKeyPrimeComponents,
}

/// The components of a public key.
///
/// All fields in this struct are of type `Vec<u8>` and are
/// big integers represented in big endian bytes.
pub(crate) struct PublicKeyComponents {
    pub n: Vec<u8>,
    pub e: Vec<u8>,
}

/// The common operations for an RSA private key.
pub(crate) trait PrivateKey: Sized + Clone {
    /// The public key type.
    type PublicKey: PublicKey;

    /// Generates a new private key with a modulus of `bits` bits.
    fn generate(bits: usize) -> Result<Self>;

    /// Creates a new RSA private key from the given private key components.
    fn from_components(
        private: PrivateKeyComponents,
        public: PublicKeyComponents,
    ) -> Result<Self>;

    /// Creates a new public key from this private key.
    fn to_public_key(&self) -> Self::PublicKey;

    /// Returns the private components of this key.
    fn private_components(&self) -> Result<(PrivateKeyComponents, PrivateKeyCrtComponents)>;

    /// Returns the public components of this key.
    fn public_components(&self) -> PublicKeyComponents;

    /// Signs the given data using this key.
    fn sign(&self, alg: jwa::RsassaPkcs1V1_5, data: &[u8]) -> Result<Vec<u8>>;

    /// Decrypts the given data using this key.
    fn decrypt(&self, alg: jwa::Rsaes, data: &[u8]) -> Result<Zeroizing<Vec<u8>>>;
}

/// The common operations for an RSA public key.
pub(crate) trait PublicKey: Sized + Clone {
    /// Creates a new RSA public key from the given public key components.
    fn from_components(components: PublicKeyComponents) -> Result<Self>;

    /// Returns the components of this key.
    fn components(&self) -> PublicKeyComponents;

    /// Verifies if the message is valid for the given signature and algorithm.
    ///
    /// Returns `true` if the signature is valid, `false` otherwise.
    fn verify(&self, alg: jwa::RsassaPkcs1V1_5, msg: &[u8], signature: &[u8]) -> bool;

    /// Encrypts the given data using this key.
    fn encrypt(&self, alg: jwa::Rsaes, data: &[u8]) -> Result<Vec<u8>>;
}
