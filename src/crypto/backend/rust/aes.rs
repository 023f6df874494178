use alloc::vec::Vec;

use ::aes::{
    cipher::{BlockDecrypt as _, BlockEncrypt as _, KeyInit as _},
    Aes128, Aes192, Aes256, Block,
};
use aes_gcm::{
    aead::{consts::U12, generic_array::GenericArray, AeadInPlace as _},
    Aes128Gcm, Aes256Gcm, AesGcm,
};

use super::BackendError;
use crate::crypto::{
    backend::interface::aes::{self, BLOCK_SIZE},
    Result,
};

type Aes192Gcm = AesGcm<Aes192, U12>;

const GCM_IV_SIZE: usize = 12;
const GCM_TAG_SIZE: usize = 16;

enum ErasedCipher {
    Aes128(Aes128),
    Aes192(Aes192),
    Aes256(Aes256),
}

/// A low level AES block cipher.
#[repr(transparent)]
pub(crate) struct BlockCipher {
    inner: ErasedCipher,
}

impl aes::BlockCipher for BlockCipher {
    fn new(key: &[u8]) -> Result<Self> {
        let inner = match key.len() {
            16 => ErasedCipher::Aes128(Aes128::new_from_slice(key)?),
            24 => ErasedCipher::Aes192(Aes192::new_from_slice(key)?),
            32 => ErasedCipher::Aes256(Aes256::new_from_slice(key)?),
            _ => return Err(BackendError::InvalidLength.into()),
        };

        Ok(Self { inner })
    }

    fn encrypt_block(&self, block: &mut [u8; BLOCK_SIZE]) {
        let block = Block::from_mut_slice(block);
        match &self.inner {
            ErasedCipher::Aes128(cipher) => cipher.encrypt_block(block),
            ErasedCipher::Aes192(cipher) => cipher.encrypt_block(block),
            ErasedCipher::Aes256(cipher) => cipher.encrypt_block(block),
        }
    }

    fn decrypt_block(&self, block: &mut [u8; BLOCK_SIZE]) {
        let block = Block::from_mut_slice(block);
        match &self.inner {
            ErasedCipher::Aes128(cipher) => cipher.decrypt_block(block),
            ErasedCipher::Aes192(cipher) => cipher.decrypt_block(block),
            ErasedCipher::Aes256(cipher) => cipher.decrypt_block(block),
        }
    }
}

enum ErasedGcm {
    Aes128(Aes128Gcm),
    Aes192(Aes192Gcm),
    Aes256(Aes256Gcm),
}

/// A low level AES-GCM cipher.
#[repr(transparent)]
pub(crate) struct Gcm {
    inner: ErasedGcm,
}

impl aes::Gcm for Gcm {
    fn new(key: &[u8]) -> Result<Self> {
        let inner = match key.len() {
            16 => ErasedGcm::Aes128(Aes128Gcm::new_from_slice(key)?),
            24 => ErasedGcm::Aes192(Aes192Gcm::new_from_slice(key)?),
            32 => ErasedGcm::Aes256(Aes256Gcm::new_from_slice(key)?),
            _ => return Err(BackendError::InvalidLength.into()),
        };

        Ok(Self { inner })
    }

    fn encrypt(&self, iv: &[u8], aad: &[u8], buffer: &mut [u8]) -> Result<Vec<u8>> {
        if iv.len() != GCM_IV_SIZE {
            return Err(BackendError::InvalidLength.into());
        }
        let nonce = GenericArray::from_slice(iv);

        let tag = match &self.inner {
            ErasedGcm::Aes128(cipher) => cipher.encrypt_in_place_detached(nonce, aad, buffer)?,
            ErasedGcm::Aes192(cipher) => cipher.encrypt_in_place_detached(nonce, aad, buffer)?,
            ErasedGcm::Aes256(cipher) => cipher.encrypt_in_place_detached(nonce, aad, buffer)?,
        };

        Ok(tag.to_vec())
    }

    fn decrypt(&self, iv: &[u8], aad: &[u8], buffer: &mut [u8], tag: &[u8]) -> Result<bool> {
        if iv.len() != GCM_IV_SIZE {
            return Err(BackendError::InvalidLength.into());
        }
        if tag.len() != GCM_TAG_SIZE {
            return Ok(false);
        }
        let nonce = GenericArray::from_slice(iv);
        let tag = GenericArray::from_slice(tag);

        let res = match &self.inner {
            ErasedGcm::Aes128(cipher) => cipher.decrypt_in_place_detached(nonce, aad, buffer, tag),
            ErasedGcm::Aes192(cipher) => cipher.decrypt_in_place_detached(nonce, aad, buffer, tag),
            ErasedGcm::Aes256(cipher) => cipher.decrypt_in_place_detached(nonce, aad, buffer, tag),
        };

        Ok(res.is_ok())
    }
}
