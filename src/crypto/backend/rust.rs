//! This backend implements the primitives using the [RustCrypto] ecosystem.
//!
//! [RustCrypto]: https://github.com/RustCrypto

use alloc::vec::Vec;

use rand_core::RngCore as _;
use sha2::Digest as _;
use thiserror::Error;

use super::interface;
use crate::jwa;

pub(crate) mod aes;
pub(crate) mod ec;
pub(crate) mod hmac;
pub(crate) mod rsa;

/// The errors that can be produced by the rust crypto backend.
///
/// None of the variants carries key material.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The error returned if the key is invalid.
    #[error("invalid key length")]
    InvalidLength,

    /// RSA operation failed.
    #[error("an RSA operation failed: {0}")]
    Rsa(::rsa::errors::Error),

    /// The RSA key does not consist of exactly two primes.
    #[error("only RSA keys with exactly two primes are supported")]
    RsaTwoPrimes,

    /// The RSA key is missing its precomputed CRT values.
    #[error("the RSA key was not precomputed")]
    RsaNotPrecomputed,

    /// An elliptic curve operation failed.
    #[error("an elliptic curve operation failed")]
    EllipticCurve(elliptic_curve::Error),

    /// An ECDSA operation failed.
    #[error("an ECDSA operation failed")]
    Ecdsa(signature::Error),

    /// An EC coordinate or scalar has the wrong size.
    #[error("invalid EC point: expected {expected} bytes per coordinate, got {actual}")]
    InvalidEcPoint { expected: usize, actual: usize },

    /// The point is not on the curve, or does not belong to the private key.
    #[error("invalid EC key")]
    InvalidEcKey,

    /// An AEAD operation failed.
    #[error("AEAD operation failed")]
    Aead,
}

impl From<digest::InvalidLength> for BackendError {
    fn from(_: digest::InvalidLength) -> Self {
        Self::InvalidLength
    }
}

impl From<::rsa::errors::Error> for BackendError {
    fn from(x: ::rsa::errors::Error) -> Self {
        Self::Rsa(x)
    }
}

impl From<elliptic_curve::Error> for BackendError {
    fn from(x: elliptic_curve::Error) -> Self {
        Self::EllipticCurve(x)
    }
}

impl From<signature::Error> for BackendError {
    fn from(x: signature::Error) -> Self {
        Self::Ecdsa(x)
    }
}

impl From<aes_gcm::Error> for BackendError {
    fn from(_: aes_gcm::Error) -> Self {
        Self::Aead
    }
}

/// The [RustCrypto] based backend.
///
/// [RustCrypto]: https://github.com/RustCrypto
#[derive(Debug)]
pub enum Backend {}

impl interface::Backend for Backend {
    type Error = BackendError;
    type Hmac = hmac::Mac;
    type AesBlockCipher = aes::BlockCipher;
    type AesGcm = aes::Gcm;
    type RsaPrivateKey = rsa::PrivateKey;
    type RsaPublicKey = rsa::PublicKey;
    type EcPrivateKey = ec::PrivateKey;
    type EcPublicKey = ec::PublicKey;

    fn fill_random(buf: &mut [u8]) -> Result<(), Self::Error> {
        use rand_core::OsRng;

        OsRng.fill_bytes(buf);
        Ok(())
    }

    fn sha256(data: &[u8]) -> Vec<u8> {
        sha2::Sha256::digest(data).to_vec()
    }

    fn pbkdf2_hmac(prf: jwa::Hmac, password: &[u8], salt: &[u8], rounds: u32, out: &mut [u8]) {
        match prf {
            jwa::Hmac::Hs256 => pbkdf2::pbkdf2_hmac::<sha2::Sha256>(password, salt, rounds, out),
            jwa::Hmac::Hs384 => pbkdf2::pbkdf2_hmac::<sha2::Sha384>(password, salt, rounds, out),
            jwa::Hmac::Hs512 => pbkdf2::pbkdf2_hmac::<sha2::Sha512>(password, salt, rounds, out),
        }
    }
}
