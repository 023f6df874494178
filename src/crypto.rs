//! Cryptographic primitives.
//!
//! This module contains the key types used by the algorithms of this crate.
//! The primitives themselves live behind an internal backend interface, which
//! is implemented using the [RustCrypto](https://github.com/RustCrypto)
//! crates.

pub(crate) mod aes;
pub(crate) mod backend;
pub mod ec;
pub(crate) mod hmac;
pub mod rsa;
mod symmetric;

use alloc::vec::Vec;
use core::{error, fmt};

use backend::interface;
use zeroize::Zeroizing;

pub use self::symmetric::SymmetricKey;
use self::backend::Backend;

/// The result type used for cryptographic operations.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// The erased error type that is used to generalize all errors that all the
/// cryptographic libraries can return.
pub struct Error {
    inner: <Backend as interface::Backend>::Error,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.inner, f)
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        Some(&self.inner)
    }
}

impl<E> From<E> for Error
where
    <Backend as interface::Backend>::Error: From<E>,
{
    fn from(err: E) -> Self {
        Self {
            inner: <Backend as interface::Backend>::Error::from(err),
        }
    }
}

/// Fills the given buffer with random data.
#[inline]
pub(crate) fn fill_random(buf: &mut [u8]) -> Result<()> {
    <Backend as interface::Backend>::fill_random(buf).map_err(|e| Error { inner: e })
}

/// Returns `len` fresh random bytes, wiped when dropped.
pub(crate) fn random_bytes(len: usize) -> Result<Zeroizing<Vec<u8>>> {
    let mut buf = Zeroizing::new(alloc::vec![0u8; len]);
    fill_random(&mut buf)?;
    Ok(buf)
}

/// Performs a quick Sha256 of the given data.
#[inline]
pub(crate) fn sha256(data: &[u8]) -> Vec<u8> {
    <Backend as interface::Backend>::sha256(data)
}

/// Derives a key of `len` bytes using PBKDF2.
pub(crate) fn pbkdf2(
    prf: crate::jwa::Hmac,
    password: &[u8],
    salt: &[u8],
    rounds: u32,
    len: usize,
) -> Zeroizing<Vec<u8>> {
    let mut out = Zeroizing::new(alloc::vec![0u8; len]);
    <Backend as interface::Backend>::pbkdf2_hmac(prf, password, salt, rounds, &mut out);
    out
}
