//! Conversion between the ASN.1 DER encoding of an ECDSA signature and the
//! fixed width `r || s` form used by JWS ([section 3.4 of RFC 7518]).
//!
//! [section 3.4 of RFC 7518]: <https://datatracker.ietf.org/doc/html/rfc7518#section-3.4>

use alloc::vec::Vec;

const SEQUENCE: u8 = 0x30;
const INTEGER: u8 = 0x02;

/// Reads a DER length, returning it and the remaining input.
fn read_length(input: &[u8]) -> Option<(usize, &[u8])> {
    let (&first, rest) = input.split_first()?;
    match first {
        0..=0x7f => Some((usize::from(first), rest)),
        0x81 => {
            let (&len, rest) = rest.split_first()?;
            // long form is only allowed for lengths that need it
            (len >= 0x80).then_some((usize::from(len), rest))
        }
        _ => None,
    }
}

fn read_integer(input: &[u8]) -> Option<(&[u8], &[u8])> {
    let (&tag, rest) = input.split_first()?;
    if tag != INTEGER {
        return None;
    }
    let (len, rest) = read_length(rest)?;
    if len == 0 || rest.len() < len {
        return None;
    }
    let (value, rest) = rest.split_at(len);
    // negative numbers are not valid signature components
    if value[0] & 0x80 != 0 {
        return None;
    }
    Some((value, rest))
}

fn write_length(out: &mut Vec<u8>, len: usize) {
    if len < 0x80 {
        out.push(len as u8);
    } else {
        // never above 255 for the curves in use
        out.push(0x81);
        out.push(len as u8);
    }
}

fn write_integer(out: &mut Vec<u8>, value: &[u8]) {
    let start = value.iter().position(|&b| b != 0).unwrap_or(value.len());
    let value = &value[start..];
    let pad = value.first().map_or(true, |&b| b & 0x80 != 0);

    out.push(INTEGER);
    write_length(out, value.len() + usize::from(pad));
    if pad {
        out.push(0);
    }
    out.extend_from_slice(value);
}

/// Converts a DER encoded signature into `r || s`, each half `size` bytes.
///
/// Returns `None` if `der` is malformed or a component does not fit into
/// `size` bytes.
pub(crate) fn der_to_fixed(der: &[u8], size: usize) -> Option<Vec<u8>> {
    let (&tag, rest) = der.split_first()?;
    if tag != SEQUENCE {
        return None;
    }
    let (len, rest) = read_length(rest)?;
    if rest.len() != len {
        return None;
    }

    let (r, rest) = read_integer(rest)?;
    let (s, rest) = read_integer(rest)?;
    if !rest.is_empty() {
        return None;
    }

    let mut out = Vec::with_capacity(size * 2);
    for component in [r, s] {
        let start = component.iter().position(|&b| b != 0).unwrap_or(component.len());
        let component = &component[start..];
        if component.len() > size {
            return None;
        }
        out.resize(out.len() + size - component.len(), 0);
        out.extend_from_slice(component);
    }
    Some(out)
}

/// Converts `r || s` into a DER encoded signature. The length of `fixed` must
/// be even, which the caller guarantees by checking it against the curve.
pub(crate) fn fixed_to_der(fixed: &[u8]) -> Vec<u8> {
    let (r, s) = fixed.split_at(fixed.len() / 2);

    let mut body = Vec::with_capacity(fixed.len() + 6);
    write_integer(&mut body, r);
    write_integer(&mut body, s);

    let mut out = Vec::with_capacity(body.len() + 3);
    out.push(SEQUENCE);
    write_length(&mut out, body.len());
    out.extend_from_slice(&body);
    out
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn short_form() {
        let fixed = [[0u8; 31].as_slice(), &[1], &[0x80], &[0u8; 31]].concat();
        let der = fixed_to_der(&fixed);
        let expected = [hex!("3026 020101 0221 0080").as_slice(), &[0u8; 31]].concat();
        assert_eq!(der, expected);
        assert_eq!(der_to_fixed(&der, 32).unwrap(), fixed);
    }

    #[test]
    fn p521_uses_long_form() {
        let fixed = [0xffu8; 132];
        let der = fixed_to_der(&fixed);
        assert_eq!(&der[..3], &[0x30, 0x81, 0x8a]);
        assert_eq!(der_to_fixed(&der, 66).unwrap(), fixed);
    }

    #[test]
    fn rejects_malformed() {
        assert!(der_to_fixed(&[], 32).is_none());
        assert!(der_to_fixed(&hex!("3006 020101 020101 00"), 32).is_none());
        assert!(der_to_fixed(&hex!("3006 020101 030101"), 32).is_none());
        assert!(der_to_fixed(&hex!("3006 020181 020101"), 32).is_none());
        // r is wider than the curve
        let wide = fixed_to_der(&[0x7fu8; 66]);
        assert!(der_to_fixed(&wide, 32).is_none());
    }

    proptest! {
        #[test]
        fn fixed_der_fixed(size in prop_oneof![Just(32usize), Just(48), Just(66)], seed in any::<[u8; 32]>()) {
            let fixed = (0..size * 2).map(|i| seed[i % 32].wrapping_mul(i as u8)).collect::<Vec<_>>();
            let der = fixed_to_der(&fixed);
            prop_assert_eq!(der_to_fixed(&der, size), Some(fixed));
        }
    }
}
