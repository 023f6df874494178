//! Implementation of JSON Web Encryption (JWE) as defined in [RFC 7516]
//!
//! [`JsonWebEncryption::encrypt`] protects a payload with a
//! [`KeyManagement`] algorithm and a [`ContentEncryption`] algorithm.
//! Decoding only checks the structure of a token, the payload is authenticated
//! and recovered by [`JsonWebEncryption::decrypt`].
//!
//! [RFC 7516]: <https://datatracker.ietf.org/doc/html/rfc7516>

mod compression;
mod content;
mod key;

use alloc::{borrow::ToOwned, string::String, vec::Vec};

use tracing::debug;

pub use self::{
    compression::{Compression, MAX_DECOMPRESSED_SIZE},
    content::{ContentEncryption, Iv},
    key::{KeyManagement, Pbes2Settings},
};
use crate::{
    base64_url,
    error::{ConfigurationError, ParseError},
    format::{Compact, FromFormat, IntoFormat, JsonFlattened},
    header::{self, Header, JoseHeader, Parameter, TokenKind},
    jwa::JsonWebAlgorithm,
    Base64UrlString, Result,
};

/// An encrypted payload together with its headers.
///
/// The protected header is kept exactly as it appeared on the wire, because
/// it is the additional authenticated data of the content encryption.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonWebEncryption {
    header: JoseHeader,
    raw_header: String,
    encrypted_key: Vec<u8>,
    iv: Vec<u8>,
    ciphertext: Vec<u8>,
    tag: Vec<u8>,
    aad: Option<Vec<u8>>,
}

/// The result of a successful decryption.
#[derive(Debug, Clone, PartialEq)]
pub struct Decrypted {
    header: JoseHeader,
    payload: Vec<u8>,
}

impl Decrypted {
    /// The headers of the token the payload was decrypted from.
    pub fn header(&self) -> &JoseHeader {
        &self.header
    }

    /// The decrypted, and if necessary decompressed, payload.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Consumes this value and returns the payload.
    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }
}

/// `zip` changes the plaintext, so it has to be integrity protected.
fn check_zip(header: &JoseHeader) -> Result<(), header::Error> {
    match header.compression() {
        Some(zip) if !zip.is_protected() => Err(header::Error::ExpectedProtected("zip".to_owned())),
        _ => Ok(()),
    }
}

/// `ASCII(protected)`, or `ASCII(protected || "." || BASE64URL(aad))` if the
/// JSON `aad` member is present.
fn additional_data(raw_header: &str, aad: Option<&[u8]>) -> Vec<u8> {
    let mut data = raw_header.as_bytes().to_vec();
    if let Some(aad) = aad {
        data.push(b'.');
        data.extend_from_slice(Base64UrlString::encode(aad).as_bytes());
    }
    data
}

impl JsonWebEncryption {
    /// Encrypts `payload`.
    ///
    /// The `alg` and `enc` parameters, `zip` if `compression` is set, `kid`
    /// if the key has an id, and the parameters the key management algorithm
    /// emits (`iv`, `tag`, `p2s`, `p2c`) are added to `header`, which becomes
    /// the protected header.
    ///
    /// # Errors
    ///
    /// Returns an error if the key does not fit `content`, the header
    /// violates the `crit` rules, or a primitive failed.
    pub fn encrypt(
        payload: impl AsRef<[u8]>,
        header: &Header,
        key: &KeyManagement,
        content: ContentEncryption,
        compression: Option<Compression>,
    ) -> Result<Self> {
        Self::seal(payload.as_ref(), header, None, None, key, content, compression)
    }

    /// Encrypts `payload` for the flattened JSON serialization, which can
    /// additionally carry an unprotected header and additional authenticated
    /// data (`aad`).
    ///
    /// # Errors
    ///
    /// See [`encrypt`](Self::encrypt). Additionally fails if `unprotected`
    /// shares a parameter with the protected header.
    pub fn encrypt_flattened(
        payload: impl AsRef<[u8]>,
        header: &Header,
        unprotected: Option<Header>,
        aad: Option<&[u8]>,
        key: &KeyManagement,
        content: ContentEncryption,
        compression: Option<Compression>,
    ) -> Result<Self> {
        Self::seal(
            payload.as_ref(),
            header,
            unprotected,
            aad,
            key,
            content,
            compression,
        )
    }

    fn seal(
        payload: &[u8],
        header: &Header,
        unprotected: Option<Header>,
        aad: Option<&[u8]>,
        key: &KeyManagement,
        content: ContentEncryption,
        compression: Option<Compression>,
    ) -> Result<Self> {
        let cek = key.cek_for_encryption(content.key_size())?;

        let mut parameters = Vec::with_capacity(4);
        parameters.push(Parameter::Algorithm(key.algorithm().into()));
        parameters.push(Parameter::ContentEncryption(content.algorithm()));
        if let Some(zip) = compression {
            parameters.push(Parameter::Compression(zip.algorithm()));
        }
        if let Some(kid) = key.key_id() {
            parameters.push(Parameter::KeyId(kid.to_owned()));
        }

        let (encrypted_key, extra) = key.encrypt(&cek)?;
        let protected = header.with_parameters(parameters).with_parameters(extra);

        let header = JoseHeader::flattened(protected, unprotected)?;
        header.check_critical(TokenKind::Jwe)?;
        check_zip(&header)?;

        let plaintext = match compression {
            Some(zip) => zip.compress(payload)?,
            None => payload.to_vec(),
        };

        let raw_header = header
            .protected()
            .encode()
            .map_err(ParseError::from)?
            .into_inner();
        let iv = content.generate_iv()?;
        let (ciphertext, tag) = content.encrypt(
            &plaintext,
            &cek,
            &iv,
            &additional_data(&raw_header, aad),
        )?;

        let (alg, enc) = (key.algorithm(), content.algorithm());
        debug!(
            alg = alg.name(),
            enc = enc.name(),
            compressed = compression.is_some(),
            "encrypted JWE"
        );
        Ok(Self {
            header,
            raw_header,
            encrypted_key,
            iv: iv.as_bytes().to_vec(),
            ciphertext,
            tag,
            aad: aad.map(<[u8]>::to_vec),
        })
    }

    /// Decodes the compact serialization.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if the input does not consist of exactly 5
    /// segments, a segment is malformed, or the protected header violates the
    /// header rules.
    pub fn decode(input: &str) -> Result<Self> {
        Self::from_format(Compact::from(input))
    }

    /// Serializes this JWE into the format `F`.
    ///
    /// # Errors
    ///
    /// See [`IntoFormat::into_format`].
    pub fn encode<F>(&self) -> Result<F>
    where
        Self: IntoFormat<F>,
    {
        self.into_format()
    }

    /// Decrypts the payload, taking the content encryption algorithm from the
    /// `enc` parameter.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if `alg` or `enc` is missing, unknown
    /// or does not match `key`, and an
    /// [`AuthenticationError`](crate::AuthenticationError) if any part
    /// of the token was modified.
    pub fn decrypt(&self, key: &KeyManagement) -> Result<Decrypted> {
        let enc = self
            .header
            .content_encryption()
            .ok_or(ConfigurationError::MissingParameter("enc"))?
            .into_inner();
        let content = ContentEncryption::try_from(enc)?;
        self.open(key, content)
    }

    /// Decrypts the payload with an explicitly chosen content encryption
    /// algorithm, which has to be the one the token declares.
    ///
    /// # Errors
    ///
    /// See [`decrypt`](Self::decrypt).
    pub fn decrypt_with(&self, key: &KeyManagement, content: ContentEncryption) -> Result<Decrypted> {
        let declared = self
            .header
            .content_encryption()
            .ok_or(ConfigurationError::MissingParameter("enc"))?
            .into_inner();
        let supplied = content.algorithm();
        if *declared != supplied {
            return Err(ConfigurationError::AlgorithmMismatch {
                declared: declared.name().to_owned(),
                supplied: supplied.name().to_owned(),
            }
            .into());
        }
        self.open(key, content)
    }

    fn open(&self, key: &KeyManagement, content: ContentEncryption) -> Result<Decrypted> {
        let declared = self
            .header
            .algorithm()
            .ok_or(ConfigurationError::MissingParameter("alg"))?
            .into_inner();
        let supplied = JsonWebAlgorithm::from(key.algorithm());
        if *declared != supplied {
            return Err(ConfigurationError::AlgorithmMismatch {
                declared: declared.name().to_owned(),
                supplied: supplied.name().to_owned(),
            }
            .into());
        }

        let cek = key.decrypt(&self.encrypted_key, &self.header)?;
        let plaintext = content.decrypt(
            &self.ciphertext,
            &cek,
            &self.iv,
            &additional_data(&self.raw_header, self.aad.as_deref()),
            &self.tag,
        )?;

        let payload = match self.header.compression() {
            Some(zip) => Compression::try_from(zip.into_inner())?.decompress(&plaintext)?,
            None => plaintext.to_vec(),
        };

        let enc = content.algorithm();
        debug!(alg = supplied.name(), enc = enc.name(), "decrypted JWE");
        Ok(Decrypted {
            header: self.header.clone(),
            payload,
        })
    }

    /// The merged headers.
    pub fn header(&self) -> &JoseHeader {
        &self.header
    }

    /// The encrypted content encryption key, empty for `dir`.
    pub fn encrypted_key(&self) -> &[u8] {
        &self.encrypted_key
    }

    /// The initialization vector of the content encryption.
    pub fn iv(&self) -> &[u8] {
        &self.iv
    }

    /// The ciphertext.
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// The authentication tag.
    pub fn tag(&self) -> &[u8] {
        &self.tag
    }

    /// The additional authenticated data of the JSON serialization.
    pub fn aad(&self) -> Option<&[u8]> {
        self.aad.as_deref()
    }
}

fn parse_header(raw: Option<&str>, unprotected: Vec<Header>) -> Result<JoseHeader> {
    let protected = match raw {
        Some(raw) => Header::from_slice(&base64_url::decode(raw)?)?,
        None => Header::new(),
    };

    let header = JoseHeader::new(protected, unprotected)?;
    header.check_critical(TokenKind::Jwe)?;
    check_zip(&header)?;
    Ok(header)
}

impl crate::sealed::Sealed for JsonWebEncryption {}

impl IntoFormat<Compact> for JsonWebEncryption {
    fn into_format(&self) -> Result<Compact> {
        if !self.header.unprotected().is_empty() {
            return Err(ConfigurationError::UnprotectedHeader.into());
        }
        if self.aad.is_some() {
            return Err(ConfigurationError::CompactAad.into());
        }

        let mut compact = Compact::with_capacity(5);
        compact.push_raw(self.raw_header.clone());
        compact.push(&self.encrypted_key);
        compact.push(&self.iv);
        compact.push(&self.ciphertext);
        compact.push(&self.tag);
        Ok(compact)
    }
}

/// The shared unprotected header is written as `unprotected`, a second one as
/// the per-recipient `header`.
impl IntoFormat<JsonFlattened> for JsonWebEncryption {
    fn into_format(&self) -> Result<JsonFlattened> {
        let mut json = JsonFlattened::default();

        if !self.raw_header.is_empty() {
            json.insert("protected", self.raw_header.clone());
        }
        for (name, header) in ["unprotected", "header"]
            .into_iter()
            .zip(self.header.unprotected())
        {
            json.insert(name, serde_json::to_value(header).map_err(ParseError::from)?);
        }
        if !self.encrypted_key.is_empty() {
            json.insert(
                "encrypted_key",
                Base64UrlString::encode(&self.encrypted_key).into_inner(),
            );
        }
        if let Some(aad) = &self.aad {
            json.insert("aad", Base64UrlString::encode(aad).into_inner());
        }
        json.insert("iv", Base64UrlString::encode(&self.iv).into_inner());
        json.insert(
            "ciphertext",
            Base64UrlString::encode(&self.ciphertext).into_inner(),
        );
        json.insert("tag", Base64UrlString::encode(&self.tag).into_inner());

        Ok(json)
    }
}

impl FromFormat<Compact> for JsonWebEncryption {
    fn from_format(input: Compact) -> Result<Self> {
        input.expect_len(5)?;

        let header = parse_header(input.part(0), Vec::new())?;
        debug!(segments = input.len(), "decoded compact JWE");

        Ok(Self {
            header,
            raw_header: input.part(0).unwrap_or_default().to_owned(),
            encrypted_key: input.decode_part(1)?,
            iv: input.decode_part(2)?,
            ciphertext: input.decode_part(3)?,
            tag: input.decode_part(4)?,
            aad: None,
        })
    }
}

impl FromFormat<JsonFlattened> for JsonWebEncryption {
    fn from_format(input: JsonFlattened) -> Result<Self> {
        if input.value.contains_key("recipients") {
            return Err(ParseError::InvalidMember("recipients").into());
        }

        let raw_header = input.string("protected")?;
        let mut unprotected = Vec::new();
        for name in ["unprotected", "header"] {
            if let Some(value) = input.value.get(name) {
                unprotected.push(Header::from_value(value.clone())?);
            }
        }
        if raw_header.is_none() && unprotected.is_empty() {
            return Err(ParseError::InvalidMember("protected").into());
        }

        let header = parse_header(raw_header, unprotected)?;
        let optional = |name| -> Result<Vec<u8>> {
            match input.string(name)? {
                Some(value) => Ok(base64_url::decode(value)?),
                None => Ok(Vec::new()),
            }
        };

        Ok(Self {
            header,
            raw_header: raw_header.unwrap_or_default().to_owned(),
            encrypted_key: optional("encrypted_key")?,
            iv: optional("iv")?,
            ciphertext: base64_url::decode(input.required_string("ciphertext")?)?,
            tag: optional("tag")?,
            aad: input
                .string("aad")?
                .map(base64_url::decode)
                .transpose()?,
        })
    }
}

impl core::fmt::Display for JsonWebEncryption {
    /// Writes the compact serialization, or the flattened JSON serialization
    /// if the compact one can not represent this token.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match IntoFormat::<Compact>::into_format(self) {
            Ok(compact) => core::fmt::Display::fmt(&compact, f),
            Err(_) => {
                let json: JsonFlattened = self.into_format().map_err(|_| core::fmt::Error)?;
                core::fmt::Display::fmt(&json, f)
            }
        }
    }
}

impl core::str::FromStr for JsonWebEncryption {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::decode(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        crypto::SymmetricKey,
        error::{AuthenticationError, Error},
        jwa::{AesCbcHs, AesGcm, AesKw},
    };

    // RFC 7516, appendix A.3
    const RFC_KEK: &str = "GawgguFyGrWKav7AX4VKUg";
    const RFC_TOKEN: &str = "eyJhbGciOiJBMTI4S1ciLCJlbmMiOiJBMTI4Q0JDLUhTMjU2In0.6KB707dM9YTIgHtLvtgWQ8mKwboJW3of9locizkDTHzBC2IlrT1oOQ.AxY8DCtDaGlsbGljb3RoZQ.KDlTtXchhZTGufMYmOYGS4HffxPSUrfmqCHXaI9wOGY.U0m_YmjN04DJvceFICbCVQ";

    fn rfc_key() -> KeyManagement {
        let kek = SymmetricKey::new(base64_url::decode(RFC_KEK).unwrap());
        KeyManagement::aes_kw(AesKw::Aes128, kek).unwrap()
    }

    fn gcm_dir() -> (KeyManagement, ContentEncryption) {
        let content = ContentEncryption::AesGcm(AesGcm::Aes256);
        let key = SymmetricKey::generate(content.key_size()).unwrap();
        (KeyManagement::direct(key), content)
    }

    #[test]
    fn rfc7516_a3() {
        let jwe = JsonWebEncryption::decode(RFC_TOKEN).unwrap();
        let decrypted = jwe.decrypt(&rfc_key()).unwrap();
        assert_eq!(decrypted.payload(), b"Live long and prosper.");

        let encoded: Compact = jwe.encode().unwrap();
        assert_eq!(encoded.to_string(), RFC_TOKEN);
    }

    #[test]
    fn roundtrip() {
        let key = rfc_key();
        let content = ContentEncryption::AesCbcHs(AesCbcHs::Aes128CbcHs256);
        let header = Header::new().with_parameter(Parameter::typ("JWT").unwrap());

        let jwe = JsonWebEncryption::encrypt(b"hello", &header, &key, content, None).unwrap();
        let compact = jwe.encode::<Compact>().unwrap().to_string();
        assert_eq!(compact.split('.').count(), 5);

        let decoded = JsonWebEncryption::decode(&compact).unwrap();
        assert_eq!(decoded, jwe);

        let decrypted = decoded.decrypt(&key).unwrap();
        assert_eq!(decrypted.payload(), b"hello");
        assert!(decrypted.header().protected().typ().is_some());
        assert_eq!(header.len(), 1);
    }

    #[test]
    fn tampered_header_fails_authentication() {
        let (key, content) = gcm_dir();
        let jwe = JsonWebEncryption::encrypt(b"secret", &Header::new(), &key, content, None).unwrap();
        let compact = jwe.encode::<Compact>().unwrap().to_string();

        let (header, rest) = compact.split_once('.').unwrap();
        let mut raw = base64_url::decode(header).unwrap();
        raw.extend_from_slice(b" ");
        let tampered = alloc::format!("{}.{}", Base64UrlString::encode(&raw), rest);

        assert!(matches!(
            JsonWebEncryption::decode(&tampered).unwrap().decrypt(&key),
            Err(Error::Authentication(AuthenticationError::TagMismatch))
        ));
    }

    #[test]
    fn declared_algorithms_must_match() {
        let (key, content) = gcm_dir();
        let jwe = JsonWebEncryption::encrypt(b"x", &Header::new(), &key, content, None).unwrap();

        assert!(matches!(
            jwe.decrypt_with(&key, ContentEncryption::AesGcm(AesGcm::Aes128)),
            Err(Error::Configuration(ConfigurationError::AlgorithmMismatch { .. }))
        ));
        assert!(matches!(
            jwe.decrypt(&rfc_key()),
            Err(Error::Configuration(ConfigurationError::AlgorithmMismatch { .. }))
        ));
        assert_eq!(jwe.decrypt_with(&key, content).unwrap().payload(), b"x");
    }

    #[test]
    fn segment_count() {
        assert!(matches!(
            JsonWebEncryption::decode("a.b.c"),
            Err(Error::Parse(ParseError::SegmentCount {
                expected: 5,
                actual: 3
            }))
        ));
    }

    #[test]
    fn flattened_json_with_aad() {
        let (key, content) = gcm_dir();
        let unprotected = Header::new().with_parameter(Parameter::KeyId("recipient".into()));

        let jwe = JsonWebEncryption::encrypt_flattened(
            b"payload",
            &Header::new(),
            Some(unprotected),
            Some(b"context"),
            &key,
            content,
            None,
        )
        .unwrap();

        assert!(matches!(
            jwe.encode::<Compact>(),
            Err(Error::Configuration(ConfigurationError::UnprotectedHeader))
        ));

        let json = jwe.encode::<JsonFlattened>().unwrap().to_string();
        let decoded =
            JsonWebEncryption::from_format(json.parse::<JsonFlattened>().unwrap()).unwrap();
        assert_eq!(decoded.aad(), Some(&b"context"[..]));
        assert_eq!(
            decoded.header().key_id().map(|kid| kid.is_protected()),
            Some(false)
        );
        assert_eq!(decoded.decrypt(&key).unwrap().payload(), b"payload");

        let mut value = decoded.encode::<JsonFlattened>().unwrap();
        value.insert("aad", Base64UrlString::encode(b"other").into_inner());
        let modified = JsonWebEncryption::from_format(value).unwrap();
        assert!(matches!(
            modified.decrypt(&key),
            Err(Error::Authentication(AuthenticationError::TagMismatch))
        ));
    }

    #[test]
    #[cfg(feature = "deflate")]
    fn compressed_payload() {
        let (key, content) = gcm_dir();
        let payload = b"{\"claim\":\"value\"}".repeat(50);

        let jwe = JsonWebEncryption::encrypt(
            &payload,
            &Header::new(),
            &key,
            content,
            Some(Compression::Deflate),
        )
        .unwrap();
        assert!(jwe.ciphertext().len() < payload.len());
        assert!(jwe.header().compression().unwrap().is_protected());

        let decrypted = jwe.decrypt(&key).unwrap();
        assert_eq!(decrypted.payload(), &payload[..]);
    }

    #[test]
    fn direct_rejects_encrypted_key() {
        let (key, content) = gcm_dir();
        let jwe = JsonWebEncryption::encrypt(b"x", &Header::new(), &key, content, None).unwrap();
        let compact = jwe.encode::<Compact>().unwrap().to_string();

        let mut parts = compact.split('.').map(ToOwned::to_owned).collect::<Vec<_>>();
        parts[1] = "AAAA".to_owned();
        let modified = JsonWebEncryption::decode(&parts.join(".")).unwrap();

        assert!(matches!(
            modified.decrypt(&key),
            Err(Error::Parse(ParseError::UnexpectedEncryptedKey))
        ));
    }
}
