use alloc::{
    borrow::ToOwned,
    boxed::Box,
    format,
    string::{String, ToString},
    vec::Vec,
};

use base64ct::{Base64, Encoding as _};
use mediatype::{names::APPLICATION, MediaTypeBuf};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use super::Error;
use crate::{
    base64_url::{self, Base64UrlString},
    jwa::{JsonWebAlgorithm, JsonWebCompressionAlgorithm, JsonWebContentEncryptionAlgorithm},
    JsonWebKey,
};

/// A single, typed JOSE header parameter.
///
/// Registered parameters are validated when they are parsed, everything else
/// ends up in [`Parameter::Other`] with its raw JSON value.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Parameter {
    /// `alg`, the signature or key management algorithm.
    Algorithm(JsonWebAlgorithm),
    /// `enc`, the content encryption algorithm of a JWE.
    ContentEncryption(JsonWebContentEncryptionAlgorithm),
    /// `zip`, the compression applied to the plaintext of a JWE.
    Compression(JsonWebCompressionAlgorithm),
    /// `kid`, a hint which key was used.
    KeyId(String),
    /// `jku`, the URL of a JWK Set.
    JwkSetUrl(String),
    /// `jwk`, the public key the token was protected with.
    JsonWebKey(Box<JsonWebKey>),
    /// `x5u`, the URL of an X.509 certificate chain.
    X509Url(String),
    /// `x5c`, DER encoded X.509 certificates, serialized using standard
    /// (padded) base64.
    X509CertificateChain(Vec<Vec<u8>>),
    /// `x5t`, the SHA-1 thumbprint of the DER encoded certificate.
    X509Sha1Thumbprint([u8; 20]),
    /// `x5t#S256`, the SHA-256 thumbprint of the DER encoded certificate.
    X509Sha256Thumbprint([u8; 32]),
    /// `typ`, the media type of the complete token.
    Type(MediaTypeBuf),
    /// `cty`, the media type of the secured payload.
    ContentType(MediaTypeBuf),
    /// `crit`, the extensions a recipient must understand.
    Critical(Vec<String>),
    /// `iv`, the initialization vector of AES GCM key wrapping.
    InitializationVector(Vec<u8>),
    /// `tag`, the authentication tag of AES GCM key wrapping.
    AuthenticationTag(Vec<u8>),
    /// `p2s`, the PBES2 salt input.
    Pbes2SaltInput(Vec<u8>),
    /// `p2c`, the PBES2 iteration count.
    Pbes2Count(u32),
    /// `apu`, agreement PartyUInfo.
    AgreementPartyUInfo(Vec<u8>),
    /// `apv`, agreement PartyVInfo.
    AgreementPartyVInfo(Vec<u8>),
    /// `epk`, an ephemeral public key. Key agreement is not implemented, so
    /// the key is kept as a raw JSON object.
    EphemeralPublicKey(Map<String, Value>),
    /// `b64`, whether the JWS payload is base64url encoded ([RFC 7797]).
    ///
    /// [RFC 7797]: <https://datatracker.ietf.org/doc/html/rfc7797>
    Base64Payload(bool),
    /// Any parameter not registered above.
    Other {
        /// The member name.
        name: String,
        /// The raw JSON value.
        value: Value,
    },
}

impl Parameter {
    /// Parses the JSON `value` of the header member `name` into its typed
    /// representation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `name` is a registered
    /// parameter and `value` does not have the required format.
    pub fn parse(name: &str, value: Value) -> Result<Self, Error> {
        let invalid = || Error::InvalidParameter(name.to_owned());

        Ok(match name {
            "alg" => Self::Algorithm(serde_json::from_value(value).map_err(|_| invalid())?),
            "enc" => {
                Self::ContentEncryption(serde_json::from_value(value).map_err(|_| invalid())?)
            }
            "zip" => Self::Compression(serde_json::from_value(value).map_err(|_| invalid())?),
            "kid" => Self::KeyId(string(value).ok_or_else(invalid)?),
            "jku" => Self::JwkSetUrl(string(value).ok_or_else(invalid)?),
            "x5u" => Self::X509Url(string(value).ok_or_else(invalid)?),
            "jwk" => {
                let key: JsonWebKey = serde_json::from_value(value).map_err(|_| invalid())?;
                // the header must never carry secret key material
                if !key.is_public() {
                    return Err(invalid());
                }
                Self::JsonWebKey(Box::new(key))
            }
            "x5c" => {
                let Value::Array(certs) = value else {
                    return Err(invalid());
                };
                if certs.is_empty() {
                    return Err(invalid());
                }
                let certs = certs
                    .iter()
                    .map(|c| c.as_str().and_then(|c| Base64::decode_vec(c).ok()))
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(invalid)?;
                Self::X509CertificateChain(certs)
            }
            "x5t" => Self::X509Sha1Thumbprint(
                bytes(&value)
                    .and_then(|b| b.try_into().ok())
                    .ok_or_else(invalid)?,
            ),
            "x5t#S256" => Self::X509Sha256Thumbprint(
                bytes(&value)
                    .and_then(|b| b.try_into().ok())
                    .ok_or_else(invalid)?,
            ),
            "typ" => Self::Type(
                value
                    .as_str()
                    .and_then(parse_media_type)
                    .ok_or_else(invalid)?,
            ),
            "cty" => Self::ContentType(
                value
                    .as_str()
                    .and_then(parse_media_type)
                    .ok_or_else(invalid)?,
            ),
            "crit" => {
                let Value::Array(names) = value else {
                    return Err(invalid());
                };
                let names = names
                    .into_iter()
                    .map(string)
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(invalid)?;
                Self::Critical(names)
            }
            "iv" => Self::InitializationVector(bytes(&value).ok_or_else(invalid)?),
            "tag" => Self::AuthenticationTag(bytes(&value).ok_or_else(invalid)?),
            "p2s" => Self::Pbes2SaltInput(bytes(&value).ok_or_else(invalid)?),
            "p2c" => Self::Pbes2Count(
                value
                    .as_u64()
                    .and_then(|c| u32::try_from(c).ok())
                    .ok_or_else(invalid)?,
            ),
            "apu" => Self::AgreementPartyUInfo(bytes(&value).ok_or_else(invalid)?),
            "apv" => Self::AgreementPartyVInfo(bytes(&value).ok_or_else(invalid)?),
            "epk" => match value {
                Value::Object(key) => Self::EphemeralPublicKey(key),
                _ => return Err(invalid()),
            },
            "b64" => Self::Base64Payload(value.as_bool().ok_or_else(invalid)?),
            _ => Self::Other {
                name: name.to_owned(),
                value,
            },
        })
    }

    /// The member name of this parameter.
    pub fn name(&self) -> &str {
        match self {
            Self::Algorithm(_) => "alg",
            Self::ContentEncryption(_) => "enc",
            Self::Compression(_) => "zip",
            Self::KeyId(_) => "kid",
            Self::JwkSetUrl(_) => "jku",
            Self::JsonWebKey(_) => "jwk",
            Self::X509Url(_) => "x5u",
            Self::X509CertificateChain(_) => "x5c",
            Self::X509Sha1Thumbprint(_) => "x5t",
            Self::X509Sha256Thumbprint(_) => "x5t#S256",
            Self::Type(_) => "typ",
            Self::ContentType(_) => "cty",
            Self::Critical(_) => "crit",
            Self::InitializationVector(_) => "iv",
            Self::AuthenticationTag(_) => "tag",
            Self::Pbes2SaltInput(_) => "p2s",
            Self::Pbes2Count(_) => "p2c",
            Self::AgreementPartyUInfo(_) => "apu",
            Self::AgreementPartyVInfo(_) => "apv",
            Self::EphemeralPublicKey(_) => "epk",
            Self::Base64Payload(_) => "b64",
            Self::Other { name, .. } => name,
        }
    }

    /// The `typ` parameter, parsed from a media type string such as `JWT` or
    /// `application/example+jwt`.
    ///
    /// The value is serialized in the canonical media type form, so
    /// `application/example;part="1/2"` is written back as
    /// `application/example; part="1/2"`.
    ///
    /// # Errors
    ///
    /// Returns an error if `typ` is not a valid media type.
    pub fn typ(typ: &str) -> Result<Self, Error> {
        Self::parse("typ", Value::String(typ.to_owned()))
    }

    /// The `cty` parameter, see [`Parameter::typ`].
    ///
    /// # Errors
    ///
    /// Returns an error if `cty` is not a valid media type.
    pub fn content_type(cty: &str) -> Result<Self, Error> {
        Self::parse("cty", Value::String(cty.to_owned()))
    }
}

impl Serialize for Parameter {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Algorithm(alg) => alg.serialize(serializer),
            Self::ContentEncryption(enc) => enc.serialize(serializer),
            Self::Compression(zip) => zip.serialize(serializer),
            Self::KeyId(s) | Self::JwkSetUrl(s) | Self::X509Url(s) => s.serialize(serializer),
            Self::JsonWebKey(key) => key.serialize(serializer),
            Self::X509CertificateChain(certs) => serializer.collect_seq(
                certs.iter().map(|cert| Base64::encode_string(cert)),
            ),
            Self::X509Sha1Thumbprint(x) => Base64UrlString::encode(x).serialize(serializer),
            Self::X509Sha256Thumbprint(x) => Base64UrlString::encode(x).serialize(serializer),
            Self::Type(media) | Self::ContentType(media) => {
                serializer.serialize_str(&media_type_to_string(media))
            }
            Self::Critical(names) => names.serialize(serializer),
            Self::InitializationVector(x)
            | Self::AuthenticationTag(x)
            | Self::Pbes2SaltInput(x)
            | Self::AgreementPartyUInfo(x)
            | Self::AgreementPartyVInfo(x) => Base64UrlString::encode(x).serialize(serializer),
            Self::Pbes2Count(count) => count.serialize(serializer),
            Self::EphemeralPublicKey(key) => key.serialize(serializer),
            Self::Base64Payload(b64) => b64.serialize(serializer),
            Self::Other { value, .. } => value.serialize(serializer),
        }
    }
}

fn string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        _ => None,
    }
}

fn bytes(value: &Value) -> Option<Vec<u8>> {
    base64_url::decode(value.as_str()?).ok()
}

/// Parses a `typ` or `cty` value. A value without a `/` is shorthand for
/// `application/<value>` as of [section 4.1.9 of RFC 7515][1].
///
/// [1]: <https://datatracker.ietf.org/doc/html/rfc7515#section-4.1.9>
fn parse_media_type(raw: &str) -> Option<MediaTypeBuf> {
    let full = if raw.contains('/') {
        raw.to_owned()
    } else {
        format!("application/{raw}")
    };
    MediaTypeBuf::from_string(full).ok()
}

/// Serializes a media type, stripping the `application/` prefix if no other
/// `/` is present.
fn media_type_to_string(media: &MediaTypeBuf) -> String {
    let full = media.to_string();
    if media.ty() != APPLICATION || full.matches('/').count() != 1 {
        return full;
    }

    match full.split_once('/') {
        // `JWT` and `JOSE` are uppercase for compatibility with legacy
        // implementations
        Some((_, sub)) if ["jwt", "jose"].contains(&sub.to_ascii_lowercase().as_str()) => {
            sub.to_ascii_uppercase()
        }
        Some((_, sub)) => sub.to_string(),
        None => full,
    }
}

/// Returns `true` if the media type is `application/jwt`, which marks a
/// nested token.
pub(crate) fn is_jwt(media: &MediaTypeBuf) -> bool {
    media.ty().as_str().eq_ignore_ascii_case("application")
        && media.subty().as_str().eq_ignore_ascii_case("jwt")
        && media.suffix().is_none()
}

#[cfg(test)]
mod tests {
    use mediatype::{names::JWT, MediaType};
    use serde_json::json;

    use super::*;

    #[test]
    fn jwt_without_application_roundtrip() {
        let typ = Parameter::typ("JWT").unwrap();
        let Parameter::Type(ref media) = typ else {
            panic!("expected typ");
        };
        assert_eq!(*media, MediaType::new(APPLICATION, JWT));
        assert!(is_jwt(media));
        assert_eq!(serde_json::to_value(&typ).unwrap(), json!("JWT"));
    }

    #[test]
    fn media_type_with_parameters_keeps_prefix() {
        let cty = Parameter::content_type("application/example;part=\"1/2\"").unwrap();
        assert_eq!(
            serde_json::to_value(&cty).unwrap(),
            json!("application/example; part=\"1/2\"")
        );

        let cty = Parameter::content_type("text/plain").unwrap();
        assert_eq!(serde_json::to_value(&cty).unwrap(), json!("text/plain"));
    }

    #[test]
    fn thumbprints_have_fixed_sizes() {
        let sha1 = Base64UrlString::encode([1u8; 20]);
        assert!(matches!(
            Parameter::parse("x5t", json!(sha1.into_inner())),
            Ok(Parameter::X509Sha1Thumbprint(_))
        ));

        let short = Base64UrlString::encode([1u8; 19]);
        assert!(matches!(
            Parameter::parse("x5t", json!(short.into_inner())),
            Err(Error::InvalidParameter(name)) if name == "x5t"
        ));
        assert!(Parameter::parse("x5t#S256", json!(Base64UrlString::encode([0u8; 20]).into_inner())).is_err());
    }

    #[test]
    fn certificate_chain_uses_standard_base64() {
        let param = Parameter::parse("x5c", json!(["MIIB+w==", "AAE="])).unwrap();
        assert_eq!(
            param,
            Parameter::X509CertificateChain(vec![vec![0x30, 0x82, 0x01, 0xfb], vec![0, 1]])
        );
        assert_eq!(serde_json::to_value(&param).unwrap(), json!(["MIIB+w==", "AAE="]));
        assert!(Parameter::parse("x5c", json!(["MIIB-w"])).is_err());
        assert!(Parameter::parse("x5c", json!([])).is_err());
    }

    #[test]
    fn rejects_wrong_shapes() {
        assert!(Parameter::parse("p2c", json!(-1)).is_err());
        assert!(Parameter::parse("p2c", json!(1.5)).is_err());
        assert!(Parameter::parse("b64", json!("false")).is_err());
        assert!(Parameter::parse("iv", json!("AAE=")).is_err());
        assert!(Parameter::parse("crit", json!(["b64", 1])).is_err());
        assert!(Parameter::parse("kid", json!(1)).is_err());
        assert!(Parameter::parse("alg", json!(["HS256"])).is_err());
    }

    #[test]
    fn unknown_parameters_pass_through() {
        let param = Parameter::parse("http://example.com/is_root", json!(true)).unwrap();
        assert_eq!(param.name(), "http://example.com/is_root");
        assert_eq!(serde_json::to_value(&param).unwrap(), json!(true));
    }
}
