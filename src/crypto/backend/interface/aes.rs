//! The interfaces for AES.

use alloc::vec::Vec;

use crate::crypto::Result;

/// The size of a single AES block in bytes.
pub(crate) const BLOCK_SIZE: usize = 16;

/// The raw AES block cipher. Modes of operation are built on top of it.
pub(crate) trait BlockCipher: Sized {
    /// Creates a new cipher, the key size selects AES-128, AES-192 or AES-256.
    fn new(key: &[u8]) -> Result<Self>;

    /// Encrypts a single block in place.
    fn encrypt_block(&self, block: &mut [u8; BLOCK_SIZE]);

    /// Decrypts a single block in place.
    fn decrypt_block(&self, block: &mut [u8; BLOCK_SIZE]);
}

/// AES in Galois/Counter Mode with a 96 bit nonce and a 128 bit tag.
pub(crate) trait Gcm: Sized {
    /// Creates a new cipher, the key size selects AES-128, AES-192 or AES-256.
    fn new(key: &[u8]) -> Result<Self>;

    /// Encrypts `buffer` in place and returns the authentication tag.
    fn encrypt(&self, iv: &[u8], aad: &[u8], buffer: &mut [u8]) -> Result<Vec<u8>>;

    /// Decrypts `buffer` in place.
    ///
    /// Returns `false` if the tag did not match, in which case the contents of
    /// `buffer` must not be used.
    fn decrypt(&self, iv: &[u8], aad: &[u8], buffer: &mut [u8], tag: &[u8]) -> Result<bool>;
}
