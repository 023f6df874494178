//! Modes of operation on top of the raw AES block cipher, and AES-GCM.
//!
//! Integrity failures are reported as `None`, everything else (wrong key or IV
//! sizes) as an error.

use alloc::vec::Vec;

use subtle::ConstantTimeEq as _;
use zeroize::Zeroizing;

use super::{
    backend::{
        interface::{
            self,
            aes::{BlockCipher as _, Gcm as _, BLOCK_SIZE},
        },
        Backend, BackendError,
    },
    Result,
};

type BackendBlockCipher = <Backend as interface::Backend>::AesBlockCipher;
type BackendGcm = <Backend as interface::Backend>::AesGcm;

/// The default initial value of RFC 3394.
const KEY_WRAP_IV: [u8; 8] = [0xA6; 8];
const SEMIBLOCK: usize = 8;

/// Wraps `key` with `kek` using the AES Key Wrap algorithm of [RFC 3394].
///
/// [RFC 3394]: <https://datatracker.ietf.org/doc/html/rfc3394>
pub(crate) fn key_wrap(kek: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    if key.len() < 2 * SEMIBLOCK || key.len() % SEMIBLOCK != 0 {
        return Err(BackendError::InvalidLength.into());
    }

    let cipher = BackendBlockCipher::new(kek)?;
    let n = key.len() / SEMIBLOCK;

    let mut a = KEY_WRAP_IV;
    let mut r = Zeroizing::new(key.to_vec());
    let mut block = Zeroizing::new([0u8; BLOCK_SIZE]);

    for j in 0..6 {
        for i in 1..=n {
            let ri = &mut r[(i - 1) * SEMIBLOCK..i * SEMIBLOCK];

            block[..SEMIBLOCK].copy_from_slice(&a);
            block[SEMIBLOCK..].copy_from_slice(ri);
            cipher.encrypt_block(&mut block);

            let t = ((n * j + i) as u64).to_be_bytes();
            for (a, (b, t)) in a.iter_mut().zip(block[..SEMIBLOCK].iter().zip(t)) {
                *a = b ^ t;
            }
            ri.copy_from_slice(&block[SEMIBLOCK..]);
        }
    }

    let mut wrapped = Vec::with_capacity(key.len() + SEMIBLOCK);
    wrapped.extend_from_slice(&a);
    wrapped.extend_from_slice(&r);
    Ok(wrapped)
}

/// Unwraps a key that was wrapped using [`key_wrap`].
///
/// Returns `None` if the integrity check failed or the input has an
/// impossible length.
pub(crate) fn key_unwrap(kek: &[u8], wrapped: &[u8]) -> Result<Option<Zeroizing<Vec<u8>>>> {
    let cipher = BackendBlockCipher::new(kek)?;

    if wrapped.len() < 3 * SEMIBLOCK || wrapped.len() % SEMIBLOCK != 0 {
        return Ok(None);
    }

    let n = wrapped.len() / SEMIBLOCK - 1;

    let mut a = [0u8; SEMIBLOCK];
    a.copy_from_slice(&wrapped[..SEMIBLOCK]);
    let mut r = Zeroizing::new(wrapped[SEMIBLOCK..].to_vec());
    let mut block = Zeroizing::new([0u8; BLOCK_SIZE]);

    for j in (0..6).rev() {
        for i in (1..=n).rev() {
            let ri = &mut r[(i - 1) * SEMIBLOCK..i * SEMIBLOCK];

            let t = ((n * j + i) as u64).to_be_bytes();
            for (b, (a, t)) in block[..SEMIBLOCK].iter_mut().zip(a.iter().zip(t)) {
                *b = a ^ t;
            }
            block[SEMIBLOCK..].copy_from_slice(ri);
            cipher.decrypt_block(&mut block);

            a.copy_from_slice(&block[..SEMIBLOCK]);
            ri.copy_from_slice(&block[SEMIBLOCK..]);
        }
    }

    if bool::from(a[..].ct_eq(&KEY_WRAP_IV[..])) {
        Ok(Some(r))
    } else {
        Ok(None)
    }
}

/// Encrypts `plaintext` using AES in CBC mode with PKCS#7 padding.
pub(crate) fn cbc_encrypt(key: &[u8], iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = BackendBlockCipher::new(key)?;
    let mut prev: [u8; BLOCK_SIZE] = iv.try_into().map_err(|_| BackendError::InvalidLength)?;

    let pad = BLOCK_SIZE - plaintext.len() % BLOCK_SIZE;
    let mut out = Vec::with_capacity(plaintext.len() + pad);
    out.extend_from_slice(plaintext);
    // pad is in 1..=16
    out.resize(plaintext.len() + pad, pad as u8);

    for chunk in out.chunks_exact_mut(BLOCK_SIZE) {
        for (c, p) in chunk.iter_mut().zip(prev) {
            *c ^= p;
        }
        prev.copy_from_slice(chunk);
        cipher.encrypt_block(&mut prev);
        chunk.copy_from_slice(&prev);
    }

    Ok(out)
}

/// Decrypts AES-CBC `ciphertext` and removes the PKCS#7 padding.
///
/// Returns `None` if the ciphertext is not a non-empty multiple of the block
/// size or the padding is invalid.
pub(crate) fn cbc_decrypt(
    key: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
) -> Result<Option<Zeroizing<Vec<u8>>>> {
    let cipher = BackendBlockCipher::new(key)?;
    let mut prev: [u8; BLOCK_SIZE] = iv.try_into().map_err(|_| BackendError::InvalidLength)?;

    if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
        return Ok(None);
    }

    let mut out = Zeroizing::new(ciphertext.to_vec());
    let mut block = [0u8; BLOCK_SIZE];

    for chunk in out.chunks_exact_mut(BLOCK_SIZE) {
        block.copy_from_slice(chunk);
        let next = block;
        cipher.decrypt_block(&mut block);
        for ((c, b), p) in chunk.iter_mut().zip(block).zip(prev) {
            *c = b ^ p;
        }
        prev = next;
    }

    let pad = usize::from(out[out.len() - 1]);
    if pad == 0 || pad > BLOCK_SIZE || out[out.len() - pad..].iter().any(|&b| usize::from(b) != pad) {
        return Ok(None);
    }

    let len = out.len() - pad;
    out.truncate(len);
    Ok(Some(out))
}

/// Encrypts `plaintext` using AES-GCM, returning the ciphertext and the tag.
pub(crate) fn gcm_encrypt(
    key: &[u8],
    iv: &[u8],
    aad: &[u8],
    plaintext: &[u8],
) -> Result<(Vec<u8>, Vec<u8>)> {
    let cipher = BackendGcm::new(key)?;
    let mut buffer = plaintext.to_vec();
    let tag = cipher.encrypt(iv, aad, &mut buffer)?;
    Ok((buffer, tag))
}

/// Decrypts AES-GCM `ciphertext`, returning `None` if the tag did not match.
pub(crate) fn gcm_decrypt(
    key: &[u8],
    iv: &[u8],
    aad: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
) -> Result<Option<Zeroizing<Vec<u8>>>> {
    let cipher = BackendGcm::new(key)?;
    let mut buffer = Zeroizing::new(ciphertext.to_vec());

    if cipher.decrypt(iv, aad, &mut buffer, tag)? {
        Ok(Some(buffer))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn rfc3394_wrap_128_bit_key_with_128_bit_kek() {
        let kek = hex!("000102030405060708090A0B0C0D0E0F");
        let key = hex!("00112233445566778899AABBCCDDEEFF");
        let expected = hex!("1FA68B0A8112B447 AEF34BD8FB5A7B82 9D3E862371D2CFE5");

        let wrapped = key_wrap(&kek, &key).unwrap();
        assert_eq!(wrapped, expected);

        let unwrapped = key_unwrap(&kek, &wrapped).unwrap().unwrap();
        assert_eq!(&unwrapped[..], &key);
    }

    #[test]
    fn unwrap_detects_tampering() {
        let kek = [7u8; 24];
        let mut wrapped = key_wrap(&kek, &[1u8; 32]).unwrap();
        wrapped[10] ^= 1;
        assert!(key_unwrap(&kek, &wrapped).unwrap().is_none());
        assert!(key_unwrap(&kek, &wrapped[..16]).unwrap().is_none());
    }

    #[test]
    fn wrap_rejects_bad_sizes() {
        assert!(key_wrap(&[0u8; 15], &[0u8; 16]).is_err());
        assert!(key_wrap(&[0u8; 16], &[0u8; 12]).is_err());
        assert!(key_wrap(&[0u8; 16], &[0u8; 8]).is_err());
    }

    #[test]
    fn cbc_nist_vector() {
        // SP 800-38A F.2.1, first block
        let key = hex!("2b7e151628aed2a6abf7158809cf4f3c");
        let iv = hex!("000102030405060708090a0b0c0d0e0f");
        let plaintext = hex!("6bc1bee22e409f96e93d7e117393172a");

        let ciphertext = cbc_encrypt(&key, &iv, &plaintext).unwrap();
        assert_eq!(ciphertext.len(), 32);
        assert_eq!(ciphertext[..16], hex!("7649abac8119b246cee98e9b12e9197d"));

        let decrypted = cbc_decrypt(&key, &iv, &ciphertext).unwrap().unwrap();
        assert_eq!(&decrypted[..], &plaintext);
    }

    #[test]
    fn cbc_rejects_bad_lengths() {
        let key = [0u8; 16];
        assert!(cbc_encrypt(&key, &[0u8; 12], b"abc").is_err());
        assert!(cbc_decrypt(&key, &[0u8; 16], &[]).unwrap().is_none());
        assert!(cbc_decrypt(&key, &[0u8; 16], &[0u8; 17]).unwrap().is_none());
    }

    #[test]
    fn gcm_tag_mismatch() {
        let key = [3u8; 32];
        let iv = [9u8; 12];
        let (ciphertext, mut tag) = gcm_encrypt(&key, &iv, b"aad", b"secret").unwrap();
        assert_eq!(tag.len(), 16);

        let plain = gcm_decrypt(&key, &iv, b"aad", &ciphertext, &tag).unwrap().unwrap();
        assert_eq!(&plain[..], b"secret");

        assert!(gcm_decrypt(&key, &iv, b"aaD", &ciphertext, &tag).unwrap().is_none());
        tag[0] ^= 0x80;
        assert!(gcm_decrypt(&key, &iv, b"aad", &ciphertext, &tag).unwrap().is_none());
    }

    proptest! {
        #[test]
        fn key_wrap_inverts(kek in prop::sample::select(vec![16usize, 24, 32]), semiblocks in 2usize..8, seed: u8) {
            let kek = vec![seed; kek];
            let key: Vec<u8> = (0..semiblocks * 8).map(|i| (i as u8).wrapping_mul(seed)).collect();

            let wrapped = key_wrap(&kek, &key).unwrap();
            prop_assert_eq!(wrapped.len(), key.len() + 8);
            let unwrapped = key_unwrap(&kek, &wrapped).unwrap().unwrap();
            prop_assert_eq!(&unwrapped[..], &key[..]);
        }

        #[test]
        fn cbc_inverts(plaintext in prop::collection::vec(any::<u8>(), 0..100)) {
            let key = [5u8; 32];
            let iv = [6u8; 16];
            let ciphertext = cbc_encrypt(&key, &iv, &plaintext).unwrap();
            prop_assert_eq!(ciphertext.len() % 16, 0);
            prop_assert!(ciphertext.len() > plaintext.len());
            let decrypted = cbc_decrypt(&key, &iv, &ciphertext).unwrap().unwrap();
            prop_assert_eq!(&decrypted[..], &plaintext[..]);
        }
    }
}
