//! Implementation of JSON Web Algorithms (JWA) as defined in [RFC 7518]
//!
//! The enums in here only identify algorithms. The implementations live in
//! [`jws::SignatureAlgorithm`](crate::jws::SignatureAlgorithm),
//! [`jwe::KeyManagement`](crate::jwe::KeyManagement) and
//! [`jwe::ContentEncryption`](crate::jwe::ContentEncryption).
//!
//! [RFC 7518]: <https://datatracker.ietf.org/doc/html/rfc7518>

mod aes_cbc_hs;
mod aes_gcm;
mod aes_kw;
mod ecdsa;
mod hmac;
mod pbes2;
mod rsa;

use alloc::{borrow::Cow, string::String};

use serde::{de::value::CowStrDeserializer, Deserialize, Serialize};

#[doc(inline)]
pub use self::{
    aes_cbc_hs::AesCbcHs,
    aes_gcm::AesGcm,
    aes_kw::AesKw,
    ecdsa::EcDSA,
    hmac::Hmac,
    pbes2::Pbes2,
    rsa::{Rsaes, RsassaPkcs1V1_5},
};

/// Either a JSON Web Algorithm for signing operations or an algorithm for
/// key management, as it appears in the `alg` member of a JSON Web Key.
///
/// Possible values should be registered in the [IANA `JSON Web Signature and Encryption Algorithms` registry][1].
///
/// [1]: <https://www.iana.org/assignments/jose/jose.xhtml#web-signature-encryption-algorithms>
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum JsonWebAlgorithm {
    /// Signing algorithm.
    Signing(JsonWebSigningAlgorithm),
    /// Key management algorithm.
    Encryption(JsonWebEncryptionAlgorithm),
    /// Unknown algorithm.
    Other(String),
}

impl JsonWebAlgorithm {
    /// The registered name of this algorithm.
    pub fn name(&self) -> &str {
        match self {
            Self::Signing(alg) => alg.name(),
            Self::Encryption(alg) => alg.name(),
            Self::Other(alg) => alg,
        }
    }
}

impl<'de> Deserialize<'de> for JsonWebAlgorithm {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let val = <Cow<'_, str> as Deserialize>::deserialize(deserializer)?;
        let deser = CowStrDeserializer::<'_, D::Error>::new(val.clone());

        let signing = <JsonWebSigningAlgorithm as Deserialize>::deserialize(deser.clone())?;
        let encryption = <JsonWebEncryptionAlgorithm as Deserialize>::deserialize(deser)?;

        if !matches!(signing, JsonWebSigningAlgorithm::Other(_)) {
            return Ok(Self::Signing(signing));
        }

        if !matches!(encryption, JsonWebEncryptionAlgorithm::Other(_)) {
            return Ok(Self::Encryption(encryption));
        }

        Ok(Self::Other(val.into_owned()))
    }
}

impl From<JsonWebSigningAlgorithm> for JsonWebAlgorithm {
    fn from(x: JsonWebSigningAlgorithm) -> Self {
        Self::Signing(x)
    }
}

impl From<JsonWebEncryptionAlgorithm> for JsonWebAlgorithm {
    fn from(x: JsonWebEncryptionAlgorithm) -> Self {
        Self::Encryption(x)
    }
}

/// A JSON Web Algorithm (JWA) for singing operations (JWS) as defined in [RFC
/// 7518 section 3]
///
/// This enum covers the `alg` Header Parameter Values for JWS. It represents
/// the table from [section 3.1], without the RSASSA-PSS family.
///
/// [RFC 7518 section 3]: <https://datatracker.ietf.org/doc/html/rfc7518#section-3>
/// [section 3.1]: <https://datatracker.ietf.org/doc/html/rfc7518#section-3.1>
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum JsonWebSigningAlgorithm {
    /// HMAC with SHA-2 Functions
    Hmac(Hmac),
    /// RSASSA-PKCS1-v1_5 using SHA-2 Functions
    RsassaPkcs1V1_5(RsassaPkcs1V1_5),
    /// Digital Signature with ECDSA
    EcDSA(EcDSA),
    /// The "none" algorithm as defined in [section 3.6 of RFC 7518].
    ///
    /// Using this algorithm essentially means that there is
    /// no integrity protection for the JWS.
    ///
    /// [section 3.6 of RFC 7518]: <https://datatracker.ietf.org/doc/html/rfc7518#section-3.6>
    None,
    /// JSON Web Algorithms that are not recognised by this implementation.
    Other(String),
}

impl_serde_jwa!(
    JsonWebSigningAlgorithm,
    [
        "HS256" => Self::Hmac(Hmac::Hs256); Self::Hmac(Hmac::Hs256),
        "HS384" => Self::Hmac(Hmac::Hs384); Self::Hmac(Hmac::Hs384),
        "HS512" => Self::Hmac(Hmac::Hs512); Self::Hmac(Hmac::Hs512),

        "RS256" => Self::RsassaPkcs1V1_5(RsassaPkcs1V1_5::Rs256); Self::RsassaPkcs1V1_5(RsassaPkcs1V1_5::Rs256),
        "RS384" => Self::RsassaPkcs1V1_5(RsassaPkcs1V1_5::Rs384); Self::RsassaPkcs1V1_5(RsassaPkcs1V1_5::Rs384),
        "RS512" => Self::RsassaPkcs1V1_5(RsassaPkcs1V1_5::Rs512); Self::RsassaPkcs1V1_5(RsassaPkcs1V1_5::Rs512),

        "ES256" => Self::EcDSA(EcDSA::Es256); Self::EcDSA(EcDSA::Es256),
        "ES384" => Self::EcDSA(EcDSA::Es384); Self::EcDSA(EcDSA::Es384),
        "ES512" => Self::EcDSA(EcDSA::Es512); Self::EcDSA(EcDSA::Es512),

        "none" => Self::None; Self::None,
    ]
);

/// A JSON Web Algorithm (JWA) for encryption and decryption of Content
/// Encryption Key (CEK) as defined in [RFC 7518 section 4]
///
/// This enum covers the `alg` Header Parameter Values for JWE. It represents
/// the table from [section 4.1], without the ECDH-ES family.
///
/// [RFC 7518 section 4]: <https://datatracker.ietf.org/doc/html/rfc7518#section-4>
/// [section 4.1]: <https://datatracker.ietf.org/doc/html/rfc7518#section-4.1>
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum JsonWebEncryptionAlgorithm {
    /// Key Encryption with RSAES-PKCS1-v1_5 or RSAES OAEP
    Rsaes(Rsaes),
    /// AES Key Wrap
    AesKw(AesKw),
    /// Direct use of a shared symmetric key as the CEK as defined in [section
    /// 4.5]
    ///
    /// [section 4.5]: <https://datatracker.ietf.org/doc/html/rfc7518#section-4.5>
    Direct,
    /// Key wrapping with AES GCM
    AesGcmKw(AesGcm),
    /// PBES2 Key Encryption
    Pbes2(Pbes2),
    /// JSON Web Algorithms that are not recognised by this implementation.
    ///
    /// Note: When you deserialize the `alg` member of a JSON Web Key via the
    /// [`JsonWebAlgorithm`] enum, this variant will never be constructed,
    /// because it matches [`JsonWebSigningAlgorithm::Other`] first.
    Other(String),
}

impl_serde_jwa!(
    JsonWebEncryptionAlgorithm,
    [
        "RSA1_5" => Self::Rsaes(Rsaes::Pkcs1V1_5); Self::Rsaes(Rsaes::Pkcs1V1_5),
        "RSA-OAEP" => Self::Rsaes(Rsaes::Oaep); Self::Rsaes(Rsaes::Oaep),
        "RSA-OAEP-256" => Self::Rsaes(Rsaes::Oaep256); Self::Rsaes(Rsaes::Oaep256),
        "A128KW" => Self::AesKw(AesKw::Aes128); Self::AesKw(AesKw::Aes128),
        "A192KW" => Self::AesKw(AesKw::Aes192); Self::AesKw(AesKw::Aes192),
        "A256KW" => Self::AesKw(AesKw::Aes256); Self::AesKw(AesKw::Aes256),
        "dir" => Self::Direct; Self::Direct,
        "A128GCMKW" => Self::AesGcmKw(AesGcm::Aes128); Self::AesGcmKw(AesGcm::Aes128),
        "A192GCMKW" => Self::AesGcmKw(AesGcm::Aes192); Self::AesGcmKw(AesGcm::Aes192),
        "A256GCMKW" => Self::AesGcmKw(AesGcm::Aes256); Self::AesGcmKw(AesGcm::Aes256),
        "PBES2-HS256+A128KW" => Self::Pbes2(Pbes2::Hs256Aes128); Self::Pbes2(Pbes2::Hs256Aes128),
        "PBES2-HS384+A192KW" => Self::Pbes2(Pbes2::Hs384Aes192); Self::Pbes2(Pbes2::Hs384Aes192),
        "PBES2-HS512+A256KW" => Self::Pbes2(Pbes2::Hs512Aes256); Self::Pbes2(Pbes2::Hs512Aes256),
    ]
);

/// A JSON Web Algorithm (JWA) for content encryption and decryption of a JWE as
/// defined in [RFC 7518 section 5]
///
/// This enum covers the `enc` Header Parameter Values for JWE. It represents
/// the table from [section 5.1].
///
/// [RFC 7518 section 5]: <https://datatracker.ietf.org/doc/html/rfc7518#section-5>
/// [section 5.1]: <https://datatracker.ietf.org/doc/html/rfc7518#section-5.1>
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum JsonWebContentEncryptionAlgorithm {
    /// Content Encryption using AES in CBC mode with HMAC
    AesCbcHs(AesCbcHs),
    /// Content Encryption using AES GCM
    AesGcm(AesGcm),
    /// JSON Web Algorithms that are not recognised by this implementation.
    Other(String),
}

impl_serde_jwa!(
    JsonWebContentEncryptionAlgorithm,
    [
        "A128CBC-HS256" => Self::AesCbcHs(AesCbcHs::Aes128CbcHs256); Self::AesCbcHs(AesCbcHs::Aes128CbcHs256),
        "A192CBC-HS384" => Self::AesCbcHs(AesCbcHs::Aes192CbcHs384); Self::AesCbcHs(AesCbcHs::Aes192CbcHs384),
        "A256CBC-HS512" => Self::AesCbcHs(AesCbcHs::Aes256CbcHs512); Self::AesCbcHs(AesCbcHs::Aes256CbcHs512),

        "A128GCM" => Self::AesGcm(AesGcm::Aes128); Self::AesGcm(AesGcm::Aes128),
        "A192GCM" => Self::AesGcm(AesGcm::Aes192); Self::AesGcm(AesGcm::Aes192),
        "A256GCM" => Self::AesGcm(AesGcm::Aes256); Self::AesGcm(AesGcm::Aes256),
    ]
);

impl From<AesCbcHs> for JsonWebContentEncryptionAlgorithm {
    fn from(x: AesCbcHs) -> Self {
        Self::AesCbcHs(x)
    }
}

impl From<AesGcm> for JsonWebContentEncryptionAlgorithm {
    fn from(x: AesGcm) -> Self {
        Self::AesGcm(x)
    }
}

/// The compression algorithm of a JWE, the `zip` Header Parameter as defined
/// in [section 4.1.3 of RFC 7516].
///
/// [section 4.1.3 of RFC 7516]: <https://datatracker.ietf.org/doc/html/rfc7516#section-4.1.3>
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum JsonWebCompressionAlgorithm {
    /// The DEFLATE algorithm as defined in [RFC 1951](https://datatracker.ietf.org/doc/html/rfc1951).
    Deflate,
    /// Compression algorithms that are not recognised by this implementation.
    Other(String),
}

impl_serde_jwa!(
    JsonWebCompressionAlgorithm,
    [
        "DEF" => Self::Deflate; Self::Deflate,
    ]
);

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use core::str::FromStr;

    use super::*;

    #[test]
    fn others_not_stealing() {
        let jwa: JsonWebAlgorithm = serde_json::from_str("\"dir\"").unwrap();
        assert_eq!(
            jwa,
            JsonWebAlgorithm::Encryption(JsonWebEncryptionAlgorithm::Direct)
        );

        let jwa: JsonWebAlgorithm = serde_json::from_str("\"ES384\"").unwrap();
        assert_eq!(jwa, JsonWebAlgorithm::Signing(EcDSA::Es384.into()));

        let jwa: JsonWebAlgorithm = serde_json::from_str("\"XYZ\"").unwrap();
        assert_eq!(jwa, JsonWebAlgorithm::Other("XYZ".to_string()));
    }

    #[test]
    fn names_are_stable() {
        assert_eq!(
            JsonWebEncryptionAlgorithm::Pbes2(Pbes2::Hs384Aes192).to_string(),
            "PBES2-HS384+A192KW"
        );
        assert_eq!(
            serde_json::to_string(&JsonWebContentEncryptionAlgorithm::AesCbcHs(
                AesCbcHs::Aes192CbcHs384
            ))
            .unwrap(),
            "\"A192CBC-HS384\""
        );
        assert_eq!(
            JsonWebSigningAlgorithm::from_str("RS512"),
            Ok(JsonWebSigningAlgorithm::RsassaPkcs1V1_5(RsassaPkcs1V1_5::Rs512))
        );
    }

    #[test]
    fn unknown_names_are_kept() {
        let alg = JsonWebSigningAlgorithm::from_str("PS256").unwrap();
        assert_eq!(alg, JsonWebSigningAlgorithm::Other("PS256".to_string()));
        assert_eq!(alg.name(), "PS256");
        assert_eq!(serde_json::to_string(&alg).unwrap(), "\"PS256\"");
        assert_eq!(
            JsonWebCompressionAlgorithm::from_str("GZIP").unwrap(),
            JsonWebCompressionAlgorithm::Other("GZIP".to_string())
        );
    }

    #[test]
    fn none_is_case_sensitive() {
        assert_eq!(
            JsonWebSigningAlgorithm::from_str("none").unwrap(),
            JsonWebSigningAlgorithm::None
        );
        assert_eq!(
            JsonWebSigningAlgorithm::from_str("None").unwrap(),
            JsonWebSigningAlgorithm::Other("None".to_string())
        );
    }
}
