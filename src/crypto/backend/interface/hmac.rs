//! The interface for HMAC.

use alloc::vec::Vec;

use crate::{crypto::Result, jwa};

/// An HMAC computation in progress.
pub(crate) trait Mac: Sized {
    /// Starts a computation keyed with `key`.
    fn new(variant: jwa::Hmac, key: &[u8]) -> Result<Self>;

    /// Feeds `data` into the computation. Calling this with the parts of an
    /// input has the same result as calling it once with their
    /// concatenation.
    fn update(&mut self, data: &[u8]);

    /// The full, untruncated tag.
    fn finalize(self) -> Vec<u8>;
}
