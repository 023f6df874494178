//! JSON Web Tokens (JWT) as defined in [RFC 7519]
//!
//! A JWT is either a JWS or a JWE whose payload is a [`Claims`] object, or,
//! for nested tokens, another JWT. [`JsonWebToken`] tells the two shapes
//! apart by their number of segments and resolves keys from a
//! [`JsonWebKeySet`].
//!
//! [RFC 7519]: <https://datatracker.ietf.org/doc/html/rfc7519>

use alloc::{borrow::ToOwned, string::ToString, vec::Vec};
use core::{fmt, str::FromStr};

use tracing::debug;

use crate::{
    claims::{Claims, ValidationContext},
    error::{ConfigurationError, ParseError},
    format::Compact,
    header::{self, Header, JoseHeader, Parameter},
    jwa::JsonWebAlgorithm,
    jwe::{Compression, ContentEncryption, JsonWebEncryption, KeyManagement},
    jwk::{JsonWebKey, JsonWebKeySet},
    jws::{JsonWebSignature, SignatureAlgorithm},
    Error, Result, Unverified,
};

/// A token in the compact serialization, either signed or encrypted.
///
/// Nothing about a decoded token is trusted until [`payload`](Self::payload)
/// or [`claims`](Self::claims) verified or decrypted it.
#[derive(Debug, Clone)]
pub struct JsonWebToken {
    inner: Inner,
}

#[derive(Debug, Clone)]
enum Inner {
    Signed(JsonWebSignature),
    Encrypted(JsonWebEncryption),
}

fn with_default_type(header: &Header) -> Result<Header> {
    if header.contains("typ") {
        Ok(header.clone())
    } else {
        Ok(header.with_parameter(Parameter::typ("JWT")?))
    }
}

impl JsonWebToken {
    /// Signs `claims`. `typ` is set to `JWT` unless `header` has one.
    ///
    /// # Errors
    ///
    /// See [`JsonWebSignature::sign`].
    pub fn sign(claims: &Claims, header: &Header, algorithm: &SignatureAlgorithm) -> Result<Self> {
        let jws = JsonWebSignature::sign(claims.to_vec(), &with_default_type(header)?, algorithm)?;
        Ok(Self {
            inner: Inner::Signed(jws),
        })
    }

    /// Encrypts `claims`. `typ` is set to `JWT` unless `header` has one.
    ///
    /// # Errors
    ///
    /// See [`JsonWebEncryption::encrypt`].
    pub fn encrypt(
        claims: &Claims,
        header: &Header,
        key: &KeyManagement,
        content: ContentEncryption,
        compression: Option<Compression>,
    ) -> Result<Self> {
        let jwe = JsonWebEncryption::encrypt(
            claims.to_vec(),
            &with_default_type(header)?,
            key,
            content,
            compression,
        )?;
        Ok(Self {
            inner: Inner::Encrypted(jwe),
        })
    }

    /// Encrypts the compact serialization of `token`, marking the result as
    /// a nested token with `cty: JWT`.
    ///
    /// # Errors
    ///
    /// See [`JsonWebEncryption::encrypt`].
    pub fn nest(
        token: &JsonWebToken,
        header: &Header,
        key: &KeyManagement,
        content: ContentEncryption,
        compression: Option<Compression>,
    ) -> Result<Self> {
        let inner = token.encode()?.to_string();
        let header = header.with_parameter(Parameter::content_type("JWT")?);
        let jwe = JsonWebEncryption::encrypt(inner, &header, key, content, compression)?;
        Ok(Self {
            inner: Inner::Encrypted(jwe),
        })
    }

    /// Returns `true` for a JWE.
    pub fn is_encrypted(&self) -> bool {
        matches!(self.inner, Inner::Encrypted(_))
    }

    /// The headers of the outermost token. They are not verified yet.
    pub fn header(&self) -> Unverified<&JoseHeader> {
        let header = match &self.inner {
            Inner::Signed(jws) => jws.header(),
            Inner::Encrypted(jwe) => jwe.header(),
        };
        Unverified { value: header }
    }

    /// The compact serialization.
    ///
    /// # Errors
    ///
    /// Returns an error if the token can not be represented in the compact
    /// serialization.
    pub fn encode(&self) -> Result<Compact> {
        match &self.inner {
            Inner::Signed(jws) => jws.encode(),
            Inner::Encrypted(jwe) => jwe.encode(),
        }
    }

    /// Verifies or decrypts this token and returns the innermost payload.
    ///
    /// The key is selected from `keys` by the `kid` of each token, or is the
    /// only key of the set if a token has no `kid`. The algorithm declared in
    /// the header has to be allowed by the key. A payload whose `cty` is
    /// `JWT` is processed as a nested token.
    ///
    /// # Errors
    ///
    /// Returns an error if no key fits, or verification or decryption failed
    /// at any level.
    pub fn payload(&self, keys: &JsonWebKeySet) -> Result<Vec<u8>> {
        let (header, payload) = match &self.inner {
            Inner::Signed(jws) => {
                let key = select(jws.header(), keys)?;
                let algorithm = match declared(jws.header())? {
                    JsonWebAlgorithm::Signing(alg) => SignatureAlgorithm::from_jwk(alg, key)?,
                    other => return Err(unsupported(other)),
                };
                let jws = Unverified { value: jws.clone() }
                    .verify(&algorithm)?
                    .into_inner();
                (jws.header().clone(), jws.into_payload())
            }
            Inner::Encrypted(jwe) => {
                let key = select(jwe.header(), keys)?;
                let algorithm = match declared(jwe.header())? {
                    JsonWebAlgorithm::Encryption(alg) => KeyManagement::from_jwk(alg, key)?,
                    other => return Err(unsupported(other)),
                };
                let decrypted = jwe.decrypt(&algorithm)?;
                (decrypted.header().clone(), decrypted.into_payload())
            }
        };

        let nested = header
            .content_type()
            .is_some_and(|cty| header::is_jwt(cty.into_inner()));
        if !nested {
            return Ok(payload);
        }

        debug!("processing nested JWT");
        let inner = core::str::from_utf8(&payload).map_err(|_| ParseError::Utf8)?;
        inner.parse::<Self>()?.payload(keys)
    }

    /// Verifies or decrypts this token like [`payload`](Self::payload), parses
    /// the innermost payload as claims and validates them against `context`.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload could not be recovered, is not a JSON
    /// object, or a claim failed validation.
    pub fn claims(&self, keys: &JsonWebKeySet, context: &ValidationContext) -> Result<Claims> {
        let claims = Claims::from_slice(&self.payload(keys)?)?;
        context.validate(&claims)?;
        Ok(claims)
    }
}

fn select<'a>(header: &JoseHeader, keys: &'a JsonWebKeySet) -> Result<&'a JsonWebKey> {
    Ok(keys.select(header.key_id().map(|kid| kid.into_inner()))?)
}

fn declared(header: &JoseHeader) -> Result<&JsonWebAlgorithm> {
    Ok(header
        .algorithm()
        .ok_or(ConfigurationError::MissingParameter("alg"))?
        .into_inner())
}

fn unsupported(algorithm: &JsonWebAlgorithm) -> Error {
    ConfigurationError::UnsupportedAlgorithm(algorithm.name().to_owned()).into()
}

impl FromStr for JsonWebToken {
    type Err = Error;

    /// Decodes a compact token: 3 segments are a JWS, 5 a JWE.
    fn from_str(s: &str) -> Result<Self> {
        let inner = match s.split('.').count() {
            3 => Inner::Signed(JsonWebSignature::decode(s)?.value),
            5 => Inner::Encrypted(JsonWebEncryption::decode(s)?),
            n => return Err(ParseError::UnknownTokenShape(n).into()),
        };
        Ok(Self { inner })
    }
}

impl fmt::Display for JsonWebToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let compact = self.encode().map_err(|_| fmt::Error)?;
        fmt::Display::fmt(&compact, f)
    }
}
