//! Content encryption, [section 5 of RFC 7518].
//!
//! [section 5 of RFC 7518]: <https://datatracker.ietf.org/doc/html/rfc7518#section-5>

use alloc::vec::Vec;
use core::fmt;

use tracing::warn;
use zeroize::Zeroizing;

use crate::{
    crypto::{self, SymmetricKey},
    error::{AuthenticationError, ConfigurationError},
    jwa::{AesCbcHs, AesGcm, JsonWebContentEncryptionAlgorithm},
    Result,
};

const CBC_IV_SIZE: usize = 16;
const GCM_IV_SIZE: usize = 12;
const GCM_TAG_SIZE: usize = 16;

/// An initialization vector for a single encryption.
///
/// The only way to get one is [`ContentEncryption::generate_iv`], and it can
/// not be cloned.
pub struct Iv(Vec<u8>);

impl Iv {
    /// The raw bytes, as they are put into the token.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[cfg(test)]
    pub(crate) fn from_bytes(iv: &[u8]) -> Self {
        Self(iv.to_vec())
    }
}

impl fmt::Debug for Iv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Iv").field(&self.0.len()).finish()
    }
}

/// An authenticated content encryption algorithm (`enc`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentEncryption {
    /// AES in CBC mode with an HMAC over the ciphertext.
    AesCbcHs(AesCbcHs),
    /// AES in Galois/Counter mode.
    AesGcm(AesGcm),
}

impl ContentEncryption {
    /// The size of the content encryption key in bytes.
    pub const fn key_size(self) -> usize {
        match self {
            Self::AesCbcHs(variant) => variant.key_size(),
            Self::AesGcm(variant) => variant.key_size(),
        }
    }

    /// The size of the initialization vector in bytes.
    pub const fn iv_size(self) -> usize {
        match self {
            Self::AesCbcHs(_) => CBC_IV_SIZE,
            Self::AesGcm(_) => GCM_IV_SIZE,
        }
    }

    /// The size of the authentication tag in bytes.
    pub const fn tag_size(self) -> usize {
        match self {
            Self::AesCbcHs(variant) => variant.key_size() / 2,
            Self::AesGcm(_) => GCM_TAG_SIZE,
        }
    }

    /// The identifier of the `enc` parameter.
    pub fn algorithm(self) -> JsonWebContentEncryptionAlgorithm {
        match self {
            Self::AesCbcHs(variant) => variant.into(),
            Self::AesGcm(variant) => variant.into(),
        }
    }

    /// Draws a fresh random initialization vector.
    ///
    /// # Errors
    ///
    /// Returns an error if the random number generator failed.
    pub fn generate_iv(self) -> Result<Iv> {
        let mut iv = alloc::vec![0u8; self.iv_size()];
        crypto::fill_random(&mut iv)?;
        Ok(Iv(iv))
    }

    fn check_sizes(self, key: &[u8], iv: &[u8]) -> Result<(), ConfigurationError> {
        if key.len() != self.key_size() {
            return Err(ConfigurationError::InvalidKeyLength {
                expected: self.key_size(),
                actual: key.len(),
            });
        }
        if iv.len() != self.iv_size() {
            return Err(ConfigurationError::InvalidIvLength {
                expected: self.iv_size(),
                actual: iv.len(),
            });
        }
        Ok(())
    }

    /// Encrypts `plaintext` and authenticates it together with `aad`,
    /// returning the ciphertext and the authentication tag.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if the key has the wrong size.
    pub fn encrypt(
        self,
        plaintext: &[u8],
        key: &SymmetricKey,
        iv: &Iv,
        aad: &[u8],
    ) -> Result<(Vec<u8>, Vec<u8>)> {
        let key = key.expose();
        let iv = iv.as_bytes();
        self.check_sizes(key, iv)?;

        match self {
            Self::AesCbcHs(variant) => {
                let (mac_key, enc_key) = key.split_at(key.len() / 2);
                let ciphertext = crypto::aes::cbc_encrypt(enc_key, iv, plaintext)?;
                let al = aad_bit_length(aad)?;
                let mut tag =
                    crypto::hmac::sign(variant.hmac(), mac_key, &[aad, iv, &ciphertext[..], &al[..]])?;
                tag.truncate(self.tag_size());
                Ok((ciphertext, tag))
            }
            Self::AesGcm(_) => Ok(crypto::aes::gcm_encrypt(key, iv, aad, plaintext)?),
        }
    }

    /// Checks the authentication tag and decrypts `ciphertext`.
    ///
    /// Nothing is decrypted before the tag was verified, and no plaintext is
    /// returned if verification failed.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if the key or the IV has the wrong
    /// size, and [`AuthenticationError::TagMismatch`] if the ciphertext or
    /// any authenticated input was modified.
    pub fn decrypt(
        self,
        ciphertext: &[u8],
        key: &SymmetricKey,
        iv: &[u8],
        aad: &[u8],
        tag: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>> {
        let key = key.expose();
        self.check_sizes(key, iv)?;

        let plaintext = if tag.len() != self.tag_size() {
            None
        } else {
            match self {
                Self::AesCbcHs(variant) => {
                    let (mac_key, enc_key) = key.split_at(key.len() / 2);
                    let al = aad_bit_length(aad)?;
                    let valid = crypto::hmac::verify_truncated(
                        variant.hmac(),
                        mac_key,
                        &[aad, iv, ciphertext, &al[..]],
                        tag,
                    )?;
                    if valid {
                        crypto::aes::cbc_decrypt(enc_key, iv, ciphertext)?
                    } else {
                        None
                    }
                }
                Self::AesGcm(_) => crypto::aes::gcm_decrypt(key, iv, aad, ciphertext, tag)?,
            }
        };

        plaintext.ok_or_else(|| {
            let enc = self.algorithm();
            warn!(enc = enc.name(), "JWE authentication tag mismatch");
            AuthenticationError::TagMismatch.into()
        })
    }
}

/// AL, the last part of the MAC input `AAD || IV || ciphertext || AL`: the
/// bit length of the AAD as a 64 bit big endian integer.
fn aad_bit_length(aad: &[u8]) -> Result<[u8; 8], ConfigurationError> {
    u64::try_from(aad.len())
        .ok()
        .and_then(|len| len.checked_mul(8))
        .map(u64::to_be_bytes)
        .ok_or(ConfigurationError::InputTooLarge)
}

impl TryFrom<&JsonWebContentEncryptionAlgorithm> for ContentEncryption {
    type Error = ConfigurationError;

    fn try_from(value: &JsonWebContentEncryptionAlgorithm) -> Result<Self, Self::Error> {
        match value {
            JsonWebContentEncryptionAlgorithm::AesCbcHs(variant) => Ok(Self::AesCbcHs(*variant)),
            JsonWebContentEncryptionAlgorithm::AesGcm(variant) => Ok(Self::AesGcm(*variant)),
            JsonWebContentEncryptionAlgorithm::Other(name) => {
                Err(ConfigurationError::UnsupportedAlgorithm(name.clone()))
            }
        }
    }
}

impl From<AesCbcHs> for ContentEncryption {
    fn from(x: AesCbcHs) -> Self {
        Self::AesCbcHs(x)
    }
}

impl From<AesGcm> for ContentEncryption {
    fn from(x: AesGcm) -> Self {
        Self::AesGcm(x)
    }
}
