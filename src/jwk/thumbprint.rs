//! JSON Web Key Thumbprints as defined in [RFC 7638].
//!
//! [RFC 7638]: <https://datatracker.ietf.org/doc/html/rfc7638>

use alloc::{collections::BTreeMap, string::String, vec::Vec};

use serde_json::Value;

use super::{JsonWebKey, JsonWebKeyType};
use crate::{crypto, Base64UrlString, Result};

impl JsonWebKey {
    /// The canonical JSON of the required members of this key, which is the
    /// input of the thumbprint hash.
    ///
    /// Use this if the thumbprint should be computed with a hash function
    /// other than SHA-256.
    ///
    /// # Errors
    ///
    /// Returns an error if the public key could not be exported.
    pub fn thumbprint_prehashed(&self) -> Result<String> {
        let mut members = BTreeMap::new();
        members.insert("kty", String::from(self.key_type.name()));

        match &self.key_type {
            JsonWebKeyType::Symmetric(key) => {
                members.insert("k", Base64UrlString::encode(key.expose()).into_inner());
            }
            JsonWebKeyType::Rsa(key) => {
                let public = key.to_public_key();
                members.insert("n", Base64UrlString::encode(public.n()).into_inner());
                members.insert("e", Base64UrlString::encode(public.e()).into_inner());
            }
            JsonWebKeyType::Ec(key) => {
                let (x, y) = key.to_public_key().coordinates()?;
                members.insert("crv", String::from(key.curve().name()));
                members.insert("x", Base64UrlString::encode(x).into_inner());
                members.insert("y", Base64UrlString::encode(y).into_inner());
            }
        }

        // lexicographic order, no whitespace
        let members = members
            .into_iter()
            .map(|(name, value)| alloc::format!("\"{name}\":{}", Value::String(value)))
            .collect::<Vec<_>>();
        Ok(alloc::format!("{{{}}}", members.join(",")))
    }

    /// The SHA-256 thumbprint of this key.
    ///
    /// # Errors
    ///
    /// Returns an error if the public key could not be exported.
    pub fn thumbprint_sha256(&self) -> Result<Vec<u8>> {
        let json = self.thumbprint_prehashed()?;
        Ok(crypto::sha256(json.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::crypto::SymmetricKey;

    #[test]
    fn rfc7638_example() {
        let key: JsonWebKey = serde_json::from_value(json!({
            "kty": "RSA",
            "n": "0vx7agoebGcQSuuPiLJXZptN9nndrQmbXEps2aiAFbWhM78LhWx4cbbfAAtVT86zwu1RK7aPFFxuhDR1L6tSoc_BJECPebWKRXjBZCiFV4n3oknjhMstn64tZ_2W-5JsGY4Hc5n9yBXArwl93lqt7_RN5w6Cf0h4QyQ5v-65YGjQR0_FDW2QvzqY368QQMicAtaSqzs8KJZgnYb9c7d0zgdAZHzu6qMQvRL5hajrn1n91CbOpbISD08qNLyrdkt-bFTWhAI4vMQFh6WeZu0fM4lFd2NcRwr3XPksINHaQ-G_xBniIqbw0Ls1jF44-csFCur-kEgU8awapJzKnqDKgw",
            "e": "AQAB",
            "alg": "RS256",
            "kid": "2011-04-29"
        }))
        .unwrap();

        let prehashed = key.thumbprint_prehashed().unwrap();
        assert!(prehashed.starts_with(r#"{"e":"AQAB","kty":"RSA","n":"0vx7"#));

        let thumbprint = Base64UrlString::encode(key.thumbprint_sha256().unwrap());
        assert_eq!(&*thumbprint, "NzbLsXh8uDCcd-6MNwXF4W_7noWXFZAfHkxZsRGC9Xs");
    }

    #[test]
    fn ignores_metadata() {
        let key = JsonWebKey::new(SymmetricKey::new(*b"secret"));
        let with_kid = key.clone().with_key_id("some id");
        assert_eq!(
            key.thumbprint_prehashed().unwrap(),
            r#"{"k":"c2VjcmV0","kty":"oct"}"#
        );
        assert_eq!(
            key.thumbprint_sha256().unwrap(),
            with_kid.thumbprint_sha256().unwrap()
        );
    }
}
