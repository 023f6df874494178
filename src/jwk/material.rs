//! (De)serialization of the key type specific members of a JWK, as defined in
//! [section 6 of RFC 7518].
//!
//! [section 6 of RFC 7518]: <https://datatracker.ietf.org/doc/html/rfc7518#section-6>

use alloc::{string::String, vec::Vec};

use base64ct::{Base64UrlUnpadded, Encoding as _};
use secrecy::ExposeSecret as _;
use serde::ser::{Error as _, SerializeMap};
use serde_json::{Map, Value};
use zeroize::Zeroizing;

use super::JsonWebKeyType;
use crate::{
    base64_url,
    crypto::{
        ec::{self, Curve, EcKey},
        rsa::{self, RsaKey},
        SymmetricKey,
    },
    error::ParseError,
    Base64UrlString,
};

fn entry<M: SerializeMap>(map: &mut M, name: &'static str, bytes: &[u8]) -> Result<(), M::Error> {
    map.serialize_entry(name, &Base64UrlString::encode(bytes))
}

fn secret_entry<M: SerializeMap>(
    map: &mut M,
    name: &'static str,
    bytes: &[u8],
) -> Result<(), M::Error> {
    let encoded = Zeroizing::new(Base64UrlUnpadded::encode_string(bytes));
    map.serialize_entry(name, encoded.as_str())
}

/// Writes `kty` and the key material members.
pub(super) fn serialize<M: SerializeMap>(key: &JsonWebKeyType, map: &mut M) -> Result<(), M::Error> {
    map.serialize_entry("kty", key.name())?;

    match key {
        JsonWebKeyType::Symmetric(key) => secret_entry(map, "k", key.expose()),
        JsonWebKeyType::Rsa(key) => {
            let public = key.to_public_key();
            entry(map, "n", &public.n())?;
            entry(map, "e", &public.e())?;

            if let Some(private) = key.private_key() {
                let numbers = private.private_numbers().map_err(M::Error::custom)?;
                secret_entry(map, "d", numbers.d.expose_secret())?;
                secret_entry(map, "p", numbers.p.expose_secret())?;
                secret_entry(map, "q", numbers.q.expose_secret())?;
                secret_entry(map, "dp", numbers.dp.expose_secret())?;
                secret_entry(map, "dq", numbers.dq.expose_secret())?;
                secret_entry(map, "qi", numbers.qi.expose_secret())?;
            }
            Ok(())
        }
        JsonWebKeyType::Ec(key) => {
            let (x, y) = key
                .to_public_key()
                .coordinates()
                .map_err(M::Error::custom)?;
            map.serialize_entry("crv", key.curve().name())?;
            entry(map, "x", &x)?;
            entry(map, "y", &y)?;

            if let Some(private) = key.private_key() {
                secret_entry(map, "d", &private.private_scalar())?;
            }
            Ok(())
        }
    }
}

/// Removes a base64url member from `members`.
fn take(
    members: &mut Map<String, Value>,
    name: &'static str,
) -> Result<Option<Zeroizing<Vec<u8>>>, ParseError> {
    match members.remove(name) {
        None => Ok(None),
        Some(Value::String(encoded)) => {
            let encoded = Zeroizing::new(encoded);
            base64_url::decode(&encoded)
                .map(|bytes| Some(Zeroizing::new(bytes)))
                .map_err(|_| ParseError::InvalidKey(name))
        }
        Some(_) => Err(ParseError::InvalidKey(name)),
    }
}

fn require(
    members: &mut Map<String, Value>,
    name: &'static str,
) -> Result<Zeroizing<Vec<u8>>, ParseError> {
    take(members, name)?.ok_or(ParseError::InvalidKey(name))
}

/// Parses the key material of the given `kty`, removing the consumed members.
pub(super) fn parse(
    kty: &str,
    members: &mut Map<String, Value>,
) -> Result<JsonWebKeyType, ParseError> {
    match kty {
        "oct" => {
            let k = require(members, "k")?;
            Ok(SymmetricKey::new(k.as_slice()).into())
        }
        "RSA" => parse_rsa(members).map(JsonWebKeyType::Rsa),
        "EC" => parse_ec(members).map(JsonWebKeyType::Ec),
        _ => Err(ParseError::InvalidKey("kty")),
    }
}

fn parse_rsa(members: &mut Map<String, Value>) -> Result<RsaKey, ParseError> {
    let n = require(members, "n")?;
    let e = require(members, "e")?;

    let Some(d) = take(members, "d")? else {
        return rsa::PublicKey::from_components(&n, &e)
            .map(RsaKey::from)
            .map_err(|_| ParseError::InvalidKey("n"));
    };

    if members.contains_key("oth") {
        // keys with more than two primes are not supported
        return Err(ParseError::InvalidKey("oth"));
    }
    let p = require(members, "p")?;
    let q = require(members, "q")?;
    // the CRT values are recomputed from the primes
    for name in ["dp", "dq", "qi"] {
        take(members, name)?;
    }

    rsa::PrivateKey::from_components(&n, &e, &d, &p, &q)
        .map(RsaKey::from)
        .map_err(|_| ParseError::InvalidKey("d"))
}

fn parse_ec(members: &mut Map<String, Value>) -> Result<EcKey, ParseError> {
    let curve = match members.remove("crv") {
        Some(Value::String(crv)) => Curve::from_name(&crv).ok_or(ParseError::InvalidKey("crv"))?,
        _ => return Err(ParseError::InvalidKey("crv")),
    };
    let x = require(members, "x")?;
    let y = require(members, "y")?;

    match take(members, "d")? {
        Some(d) => ec::PrivateKey::new(curve, &x, &y, &d)
            .map(EcKey::from)
            .map_err(|_| ParseError::InvalidKey("d")),
        None => ec::PublicKey::new(curve, &x, &y)
            .map(EcKey::from)
            .map_err(|_| ParseError::InvalidKey("x")),
    }
}
