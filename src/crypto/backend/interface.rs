//! Common traits that define the API each backend must implement.

use alloc::vec::Vec;
use core::{error, fmt};

use crate::jwa;

pub(crate) mod aes;
pub(crate) mod ec;
pub(crate) mod hmac;
pub(crate) mod rsa;

/// The backend trait that all backends must implement.
///
/// This trait is used to define some commonly used operations, like generating
/// random data.
pub(crate) trait Backend {
    /// The error type that is used by this backend.
    type Error: fmt::Debug + fmt::Display + error::Error;

    /// The HMAC implementation.
    type Hmac: hmac::Mac;

    /// The raw AES block cipher.
    type AesBlockCipher: aes::BlockCipher;

    /// The AES-GCM AEAD.
    type AesGcm: aes::Gcm;

    /// The RSA private key type.
    type RsaPrivateKey: rsa::PrivateKey<PublicKey = Self::RsaPublicKey>;

    /// The RSA public key type.
    type RsaPublicKey: rsa::PublicKey;

    /// The EC private key type.
    type EcPrivateKey: ec::PrivateKey<PublicKey = Self::EcPublicKey>;

    /// The EC public key type.
    type EcPublicKey: ec::PublicKey;

    /// Fills the given buffer with random data.
    fn fill_random(buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Hashes the data with SHA-256.
    fn sha256(data: &[u8]) -> Vec<u8>;

    /// Derives `out.len()` bytes from the password using PBKDF2 with the given
    /// HMAC as PRF.
    fn pbkdf2_hmac(prf: jwa::Hmac, password: &[u8], salt: &[u8], rounds: u32, out: &mut [u8]);
}
