//! Key management, [section 4 of RFC 7518]: how the content encryption key
//! is determined and transported.
//!
//! [section 4 of RFC 7518]: <https://datatracker.ietf.org/doc/html/rfc7518#section-4>

use alloc::{borrow::ToOwned, vec::Vec};

use tracing::{debug, warn};

use super::ContentEncryption;
use crate::{
    crypto::{self, rsa::RsaKey, SymmetricKey},
    error::{AuthenticationError, ConfigurationError, ParseError},
    header::{JoseHeader, Parameter},
    jwa::{AesGcm, AesKw, JsonWebEncryptionAlgorithm, Pbes2, Rsaes},
    jwk::{JsonWebKey, Purpose},
    Result,
};

const GCM_KW_IV_SIZE: usize = 12;
const GCM_KW_TAG_SIZE: usize = 16;
const PBES2_MIN_SALT_INPUT: usize = 8;

/// The iteration count and salt settings of PBES2.
///
/// The defaults are 100 000 iterations when encrypting, at most 1 000 000
/// accepted when decrypting, and a fresh 16 byte salt input per message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pbes2Settings {
    iteration_count: u32,
    max_iteration_count: u32,
    salt_input: Option<Vec<u8>>,
    salt_input_size: usize,
}

impl Default for Pbes2Settings {
    fn default() -> Self {
        Self {
            iteration_count: 100_000,
            max_iteration_count: 1_000_000,
            salt_input: None,
            salt_input_size: 16,
        }
    }
}

impl Pbes2Settings {
    /// The `p2c` used when encrypting. Zero is raised to one.
    #[must_use]
    pub fn with_iteration_count(mut self, count: u32) -> Self {
        self.iteration_count = count.max(1);
        self
    }

    /// The largest `p2c` accepted when decrypting.
    #[must_use]
    pub fn with_max_iteration_count(mut self, count: u32) -> Self {
        self.max_iteration_count = count;
        self
    }

    /// Uses a fixed `p2s` instead of a random one. Only meant for
    /// reproducing known answers, reusing a salt weakens every message.
    #[must_use]
    pub fn with_salt_input(mut self, salt_input: impl Into<Vec<u8>>) -> Self {
        self.salt_input = Some(salt_input.into());
        self
    }

    /// The iteration count used when encrypting.
    pub const fn iteration_count(&self) -> u32 {
        self.iteration_count
    }

    /// The largest iteration count accepted when decrypting.
    pub const fn max_iteration_count(&self) -> u32 {
        self.max_iteration_count
    }
}

/// A key management algorithm (`alg` of a JWE) together with its key.
#[derive(Debug, Clone)]
pub struct KeyManagement {
    inner: Inner,
}

#[derive(Debug, Clone)]
enum Inner {
    Direct(SymmetricKey),
    AesKw(AesKw, SymmetricKey),
    AesGcmKw(AesGcm, SymmetricKey),
    Rsaes(Rsaes, RsaKey),
    Pbes2(Pbes2, SymmetricKey, Pbes2Settings),
}

fn check_length(key: &SymmetricKey, expected: usize) -> Result<(), ConfigurationError> {
    if key.len() == expected {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidKeyLength {
            expected,
            actual: key.len(),
        })
    }
}

impl KeyManagement {
    /// Uses `key` directly as the content encryption key (`dir`). Its length
    /// must be the key size of the content encryption.
    pub fn direct(key: SymmetricKey) -> Self {
        Self {
            inner: Inner::Direct(key),
        }
    }

    /// AES Key Wrap of [RFC 3394](https://datatracker.ietf.org/doc/html/rfc3394).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidKeyLength`] if the key encryption
    /// key does not have the size of the variant.
    pub fn aes_kw(variant: AesKw, kek: SymmetricKey) -> Result<Self> {
        check_length(&kek, variant.key_size())?;
        Ok(Self {
            inner: Inner::AesKw(variant, kek),
        })
    }

    /// Key wrapping with AES GCM.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidKeyLength`] if the key encryption
    /// key does not have the size of the variant.
    pub fn aes_gcm_kw(variant: AesGcm, kek: SymmetricKey) -> Result<Self> {
        check_length(&kek, variant.key_size())?;
        Ok(Self {
            inner: Inner::AesGcmKw(variant, kek),
        })
    }

    /// Key encryption with RSA. Encrypting only needs the public key,
    /// decrypting requires the private key.
    pub fn rsaes(variant: Rsaes, key: impl Into<RsaKey>) -> Self {
        Self {
            inner: Inner::Rsaes(variant, key.into()),
        }
    }

    /// Password based key wrapping using the default [`Pbes2Settings`].
    pub fn pbes2(variant: Pbes2, password: SymmetricKey) -> Self {
        Self::pbes2_with(variant, password, Pbes2Settings::default())
    }

    /// Password based key wrapping.
    pub fn pbes2_with(variant: Pbes2, password: SymmetricKey, settings: Pbes2Settings) -> Self {
        Self {
            inner: Inner::Pbes2(variant, password, settings),
        }
    }

    /// Resolves `algorithm` to an implementation that uses `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if the algorithm is unknown, the key
    /// type does not fit, or the key forbids the usage.
    pub fn from_jwk(algorithm: &JsonWebEncryptionAlgorithm, key: &JsonWebKey) -> Result<Self> {
        key.check_usage(&algorithm.clone().into(), Purpose::Encryption)?;

        let key_type = || ConfigurationError::KeyType {
            key_type: key.key_type().name(),
            algorithm: algorithm.name().to_owned(),
        };
        let symmetric = || key.symmetric().ok_or_else(key_type);

        match algorithm {
            JsonWebEncryptionAlgorithm::Direct => Ok(Self::direct(symmetric()?)),
            JsonWebEncryptionAlgorithm::AesKw(variant) => Self::aes_kw(*variant, symmetric()?),
            JsonWebEncryptionAlgorithm::AesGcmKw(variant) => {
                Self::aes_gcm_kw(*variant, symmetric()?)
            }
            JsonWebEncryptionAlgorithm::Pbes2(variant) => Ok(Self::pbes2(*variant, symmetric()?)),
            JsonWebEncryptionAlgorithm::Rsaes(variant) => {
                Ok(Self::rsaes(*variant, key.rsa().ok_or_else(key_type)?))
            }
            JsonWebEncryptionAlgorithm::Other(name) => {
                Err(ConfigurationError::UnsupportedAlgorithm(name.clone()).into())
            }
        }
    }

    /// The identifier of the `alg` parameter.
    pub fn algorithm(&self) -> JsonWebEncryptionAlgorithm {
        match &self.inner {
            Inner::Direct(_) => JsonWebEncryptionAlgorithm::Direct,
            Inner::AesKw(variant, _) => (*variant).into(),
            Inner::AesGcmKw(variant, _) => JsonWebEncryptionAlgorithm::AesGcmKw(*variant),
            Inner::Rsaes(variant, _) => (*variant).into(),
            Inner::Pbes2(variant, ..) => (*variant).into(),
        }
    }

    /// The key id, which is put into the `kid` parameter.
    pub fn key_id(&self) -> Option<&str> {
        match &self.inner {
            Inner::Direct(key)
            | Inner::AesKw(_, key)
            | Inner::AesGcmKw(_, key)
            | Inner::Pbes2(_, key, _) => key.key_id(),
            Inner::Rsaes(_, key) => key.key_id(),
        }
    }

    /// The content encryption key for a new message: the shared key for
    /// `dir`, otherwise `len` fresh random bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidKeyLength`] if the shared key of
    /// `dir` does not have `len` bytes.
    pub fn cek_for_encryption(&self, len: usize) -> Result<SymmetricKey> {
        match &self.inner {
            Inner::Direct(key) => {
                check_length(key, len)?;
                Ok(key.clone())
            }
            _ => Ok(SymmetricKey::generate(len)?),
        }
    }

    /// Protects `cek`, returning the encrypted key and the header parameters
    /// the recipient needs to recover it.
    ///
    /// # Errors
    ///
    /// Returns an error if the primitive rejected the key, e.g. a CEK that is
    /// too long for the RSA modulus.
    pub fn encrypt(&self, cek: &SymmetricKey) -> Result<(Vec<u8>, Vec<Parameter>)> {
        match &self.inner {
            Inner::Direct(_) => Ok((Vec::new(), Vec::new())),
            Inner::AesKw(_, kek) => {
                let wrapped = crypto::aes::key_wrap(kek.expose(), cek.expose())?;
                Ok((wrapped, Vec::new()))
            }
            Inner::AesGcmKw(_, kek) => {
                let iv = crypto::random_bytes(GCM_KW_IV_SIZE)?;
                let (wrapped, tag) = crypto::aes::gcm_encrypt(kek.expose(), &iv, &[], cek.expose())?;
                Ok((
                    wrapped,
                    alloc::vec![
                        Parameter::InitializationVector(iv.to_vec()),
                        Parameter::AuthenticationTag(tag),
                    ],
                ))
            }
            Inner::Rsaes(variant, key) => Ok((
                key.to_public_key().encrypt(*variant, cek.expose())?,
                Vec::new(),
            )),
            Inner::Pbes2(variant, password, settings) => {
                let salt_input = match &settings.salt_input {
                    Some(salt_input) => salt_input.clone(),
                    None => crypto::random_bytes(settings.salt_input_size)?.to_vec(),
                };
                let count = settings.iteration_count;
                let kek = pbes2_key(*variant, password, &salt_input, count);
                let wrapped = crypto::aes::key_wrap(&kek, cek.expose())?;

                Ok((
                    wrapped,
                    alloc::vec![
                        Parameter::Pbes2SaltInput(salt_input),
                        Parameter::Pbes2Count(count),
                    ],
                ))
            }
        }
    }

    /// Recovers the content encryption key from `encrypted_key`, reading
    /// additional inputs (`iv`, `tag`, `p2s`, `p2c`) from `header`.
    ///
    /// For `RSA1_5` a failed decryption yields a random key instead of an
    /// error, so the failure only surfaces as an authentication tag mismatch
    /// of the content ([section 11.5 of RFC 7516]).
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if a required header parameter is
    /// missing or out of range, and an [`AuthenticationError`] if the key
    /// could not be unwrapped.
    ///
    /// [section 11.5 of RFC 7516]: <https://datatracker.ietf.org/doc/html/rfc7516#section-11.5>
    pub fn decrypt(&self, encrypted_key: &[u8], header: &JoseHeader) -> Result<SymmetricKey> {
        match &self.inner {
            Inner::Direct(key) => {
                if !encrypted_key.is_empty() {
                    return Err(ParseError::UnexpectedEncryptedKey.into());
                }
                Ok(key.clone())
            }
            Inner::AesKw(_, kek) => unwrap(kek.expose(), encrypted_key),
            Inner::AesGcmKw(_, kek) => {
                let iv = match header.get("iv").map(|p| p.into_inner()) {
                    Some(Parameter::InitializationVector(iv)) => iv,
                    _ => return Err(ConfigurationError::MissingParameter("iv").into()),
                };
                let tag = match header.get("tag").map(|p| p.into_inner()) {
                    Some(Parameter::AuthenticationTag(tag)) => tag,
                    _ => return Err(ConfigurationError::MissingParameter("tag").into()),
                };
                if iv.len() != GCM_KW_IV_SIZE {
                    return Err(ConfigurationError::InvalidIvLength {
                        expected: GCM_KW_IV_SIZE,
                        actual: iv.len(),
                    }
                    .into());
                }
                if tag.len() != GCM_KW_TAG_SIZE {
                    return Err(ConfigurationError::ParameterOutOfRange("tag").into());
                }

                crypto::aes::gcm_decrypt(kek.expose(), iv, &[], encrypted_key, tag)?
                    .map(|cek| SymmetricKey::new(cek.as_slice()))
                    .ok_or_else(|| {
                        warn!("AES GCM key unwrap failed");
                        AuthenticationError::KeyUnwrap.into()
                    })
            }
            Inner::Rsaes(variant, key) => {
                let private = key
                    .private_key()
                    .ok_or(ConfigurationError::MissingPrivateKey)?;

                match (variant, private.decrypt(*variant, encrypted_key)) {
                    (Rsaes::Pkcs1V1_5, result) => {
                        let expected = header
                            .content_encryption()
                            .and_then(|enc| ContentEncryption::try_from(enc.into_inner()).ok())
                            .map(ContentEncryption::key_size);
                        match (result, expected) {
                            (Ok(cek), Some(len)) if cek.len() == len => {
                                Ok(SymmetricKey::new(cek.as_slice()))
                            }
                            (_, len) => {
                                debug!("RSA1_5 decryption failed, continuing with a random key");
                                Ok(SymmetricKey::generate(len.unwrap_or(32))?)
                            }
                        }
                    }
                    (_, Ok(cek)) => Ok(SymmetricKey::new(cek.as_slice())),
                    (_, Err(_)) => {
                        let alg = self.algorithm();
                        warn!(alg = alg.name(), "RSA key decryption failed");
                        Err(AuthenticationError::KeyUnwrap.into())
                    }
                }
            }
            Inner::Pbes2(variant, password, settings) => {
                let salt_input = match header.get("p2s").map(|p| p.into_inner()) {
                    Some(Parameter::Pbes2SaltInput(salt)) => salt,
                    _ => return Err(ConfigurationError::MissingParameter("p2s").into()),
                };
                let count = match header.get("p2c").map(|p| p.into_inner()) {
                    Some(Parameter::Pbes2Count(count)) => *count,
                    _ => return Err(ConfigurationError::MissingParameter("p2c").into()),
                };
                if salt_input.len() < PBES2_MIN_SALT_INPUT {
                    return Err(ConfigurationError::ParameterOutOfRange("p2s").into());
                }
                if count == 0 || count > settings.max_iteration_count {
                    return Err(ConfigurationError::ParameterOutOfRange("p2c").into());
                }

                let kek = pbes2_key(*variant, password, salt_input, count);
                unwrap(&kek, encrypted_key)
            }
        }
    }
}

fn unwrap(kek: &[u8], encrypted_key: &[u8]) -> Result<SymmetricKey> {
    crypto::aes::key_unwrap(kek, encrypted_key)?
        .map(|cek| SymmetricKey::new(cek.as_slice()))
        .ok_or_else(|| {
            warn!("AES key unwrap integrity check failed");
            AuthenticationError::KeyUnwrap.into()
        })
}

/// PBKDF2 with the salt `UTF8(alg) || 0x00 || p2s`.
fn pbes2_key(
    variant: Pbes2,
    password: &SymmetricKey,
    salt_input: &[u8],
    count: u32,
) -> zeroize::Zeroizing<Vec<u8>> {
    let name = JsonWebEncryptionAlgorithm::Pbes2(variant);
    let name = name.name();

    let mut salt = Vec::with_capacity(name.len() + 1 + salt_input.len());
    salt.extend_from_slice(name.as_bytes());
    salt.push(0);
    salt.extend_from_slice(salt_input);

    crypto::pbkdf2(
        variant.hmac(),
        password.expose(),
        &salt,
        count,
        variant.key_wrap().key_size(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{base64_url, error::Error, header::Header};

    // RFC 7516, appendix A.3
    const CEK: [u8; 32] = [
        4, 211, 31, 197, 84, 157, 252, 254, 11, 100, 157, 250, 63, 170, 106, 206, 107, 124, 212,
        45, 111, 107, 9, 219, 200, 177, 0, 240, 143, 156, 44, 207,
    ];

    fn header(parameters: impl IntoIterator<Item = Parameter>) -> JoseHeader {
        JoseHeader::new(Header::new().with_parameters(parameters), Vec::new()).unwrap()
    }

    #[test]
    fn rfc7516_a3_key_wrap() {
        let kek = SymmetricKey::new(base64_url::decode("GawgguFyGrWKav7AX4VKUg").unwrap());
        let alg = KeyManagement::aes_kw(AesKw::Aes128, kek).unwrap();

        let (wrapped, parameters) = alg.encrypt(&SymmetricKey::new(CEK)).unwrap();
        assert!(parameters.is_empty());
        assert_eq!(
            wrapped,
            base64_url::decode("6KB707dM9YTIgHtLvtgWQ8mKwboJW3of9locizkDTHzBC2IlrT1oOQ").unwrap()
        );

        let cek = alg.decrypt(&wrapped, &header([])).unwrap();
        assert_eq!(cek.expose(), CEK);
    }

    #[test]
    fn direct_requires_empty_encrypted_key() {
        let alg = KeyManagement::direct(SymmetricKey::new([1u8; 32]));
        assert!(alg.cek_for_encryption(16).is_err());
        assert_eq!(alg.cek_for_encryption(32).unwrap().len(), 32);

        assert!(matches!(
            alg.decrypt(&[1], &header([])),
            Err(Error::Parse(ParseError::UnexpectedEncryptedKey))
        ));
    }

    #[test]
    fn gcm_kw_emits_and_requires_parameters() {
        let alg = KeyManagement::aes_gcm_kw(AesGcm::Aes256, SymmetricKey::new([9u8; 32])).unwrap();
        let cek = alg.cek_for_encryption(32).unwrap();
        let (wrapped, parameters) = alg.encrypt(&cek).unwrap();

        assert_eq!(parameters.len(), 2);
        let names = parameters.iter().map(Parameter::name).collect::<Vec<_>>();
        assert_eq!(names, ["iv", "tag"]);

        let complete = header(parameters.clone());
        assert_eq!(alg.decrypt(&wrapped, &complete).unwrap().expose(), cek.expose());

        let without_tag = header(parameters.iter().take(1).cloned());
        assert!(matches!(
            alg.decrypt(&wrapped, &without_tag),
            Err(Error::Configuration(ConfigurationError::MissingParameter("tag")))
        ));

        let mut tampered = wrapped.clone();
        tampered[0] ^= 1;
        assert!(matches!(
            alg.decrypt(&tampered, &complete),
            Err(Error::Authentication(AuthenticationError::KeyUnwrap))
        ));
    }

    #[test]
    fn pbes2_parameters() {
        let settings = Pbes2Settings::default().with_iteration_count(1000);
        let alg = KeyManagement::pbes2_with(
            Pbes2::Hs256Aes128,
            SymmetricKey::new(*b"Thus from my lips, by yours, my sin is purged."),
            settings,
        );
        let cek = alg.cek_for_encryption(32).unwrap();
        let (wrapped, parameters) = alg.encrypt(&cek).unwrap();

        assert!(matches!(&parameters[0], Parameter::Pbes2SaltInput(salt) if salt.len() == 16));
        assert_eq!(parameters[1], Parameter::Pbes2Count(1000));
        assert_eq!(
            alg.decrypt(&wrapped, &header(parameters.clone())).unwrap().expose(),
            cek.expose()
        );

        let too_many = header([parameters[0].clone(), Parameter::Pbes2Count(2_000_000)]);
        assert!(matches!(
            alg.decrypt(&wrapped, &too_many),
            Err(Error::Configuration(ConfigurationError::ParameterOutOfRange("p2c")))
        ));

        let no_salt = header([Parameter::Pbes2Count(1000)]);
        assert!(matches!(
            alg.decrypt(&wrapped, &no_salt),
            Err(Error::Configuration(ConfigurationError::MissingParameter("p2s")))
        ));

        let wrong_password = KeyManagement::pbes2(Pbes2::Hs256Aes128, SymmetricKey::new(*b"nope"));
        assert!(matches!(
            wrong_password.decrypt(&wrapped, &header(parameters)),
            Err(Error::Authentication(AuthenticationError::KeyUnwrap))
        ));
    }

    #[test]
    fn kek_length_is_checked() {
        assert!(matches!(
            KeyManagement::aes_kw(AesKw::Aes256, SymmetricKey::new([0u8; 16])),
            Err(Error::Configuration(ConfigurationError::InvalidKeyLength { expected: 32, actual: 16 }))
        ));
    }
}
