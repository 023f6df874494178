//! The primitives for working with [HMAC] algorithms.
//!
//! [HMAC]: https://en.wikipedia.org/wiki/HMAC

use alloc::vec::Vec;

use subtle::ConstantTimeEq as _;

use super::{
    backend::{
        interface::{self, hmac::Mac as _},
        Backend,
    },
    Result,
};
use crate::jwa;

type BackendMac = <Backend as interface::Backend>::Hmac;

/// Computes the HMAC over the concatenation of `parts`.
pub(crate) fn sign(variant: jwa::Hmac, key: &[u8], parts: &[&[u8]]) -> Result<Vec<u8>> {
    let mut mac = BackendMac::new(variant, key)?;
    for part in parts {
        mac.update(part);
    }
    Ok(mac.finalize())
}

/// Recomputes the HMAC over `parts` and compares its first `tag.len()` bytes
/// in constant time.
///
/// An empty tag or one that is longer than the output never matches.
pub(crate) fn verify_truncated(
    variant: jwa::Hmac,
    key: &[u8],
    parts: &[&[u8]],
    tag: &[u8],
) -> Result<bool> {
    let expected = sign(variant, key, parts)?;
    if tag.is_empty() || tag.len() > expected.len() {
        return Ok(false);
    }
    Ok(bool::from(expected[..tag.len()].ct_eq(tag)))
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;

    const KEY: &[u8] = b"Jefe";
    const DATA: &[u8] = b"what do ya want for nothing?";

    #[test]
    fn rfc4231_case_2() {
        let tag = sign(jwa::Hmac::Hs256, KEY, &[DATA]).unwrap();
        assert_eq!(
            tag,
            hex!("5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843")
        );

        let split: &[&[u8]] = &[&DATA[..11], &DATA[..0], &DATA[11..]];
        assert!(verify_truncated(jwa::Hmac::Hs256, KEY, split, &tag[..16]).unwrap());
        assert!(!verify_truncated(jwa::Hmac::Hs256, KEY, &[&DATA[1..]], &tag[..16]).unwrap());
        assert!(!verify_truncated(jwa::Hmac::Hs256, KEY, split, &[]).unwrap());
    }

    #[test]
    fn rfc4231_case_2_sha512() {
        let tag = sign(jwa::Hmac::Hs512, KEY, &[DATA]).unwrap();
        assert_eq!(
            tag,
            hex!(
                "164b7a7bfcf819e2e395fbe73b56e0a387bd64222e831fd610270cd7ea250554"
                "9758bf75c05a994a6d034f65f8f0e6fdcaeab1a34d4a6b4b636e070a38bce737"
            )
        );
    }
}
