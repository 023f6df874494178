use alloc::{borrow::ToOwned, vec::Vec};

use super::der;
use crate::{
    crypto::{self, ec::EcKey, rsa::RsaKey, SymmetricKey},
    error::ConfigurationError,
    jwa::{EcDSA, Hmac, JsonWebSigningAlgorithm, RsassaPkcs1V1_5},
    jwk::{JsonWebKey, Purpose},
    Result,
};

/// The smallest RSA modulus accepted for signatures, in bytes.
const MIN_RSA_MODULUS: usize = 2048 / 8;

/// A signature algorithm together with the key it operates on.
///
/// The constructors check that the key fits the algorithm, so once a value
/// exists it can always be used for verification. Signing additionally
/// requires private key material.
#[derive(Debug, Clone)]
pub struct SignatureAlgorithm {
    inner: Inner,
}

#[derive(Debug, Clone)]
enum Inner {
    None,
    Hmac(Hmac, SymmetricKey),
    RsassaPkcs1V1_5(RsassaPkcs1V1_5, RsaKey),
    EcDsa(EcDSA, EcKey),
}

impl SignatureAlgorithm {
    /// The `none` algorithm: the signature is empty and only an empty
    /// signature validates.
    ///
    /// This is never selected implicitly, neither by [`from_jwk`](Self::from_jwk)
    /// nor by any decoding function.
    pub const fn none() -> Self {
        Self { inner: Inner::None }
    }

    /// HMAC with the given hash.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidKeyLength`] if the key is shorter
    /// than the hash output.
    pub fn hmac(variant: Hmac, key: SymmetricKey) -> Result<Self> {
        if key.len() < variant.output_size() {
            return Err(ConfigurationError::InvalidKeyLength {
                expected: variant.output_size(),
                actual: key.len(),
            }
            .into());
        }

        Ok(Self {
            inner: Inner::Hmac(variant, key),
        })
    }

    /// RSASSA-PKCS1-v1_5 with the given hash.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidKeyLength`] if the modulus is
    /// shorter than 2048 bits.
    pub fn rsassa_pkcs1_v1_5(variant: RsassaPkcs1V1_5, key: impl Into<RsaKey>) -> Result<Self> {
        let key = key.into();
        let size = key.to_public_key().n().len();
        if size < MIN_RSA_MODULUS {
            return Err(ConfigurationError::InvalidKeyLength {
                expected: MIN_RSA_MODULUS,
                actual: size,
            }
            .into());
        }

        Ok(Self {
            inner: Inner::RsassaPkcs1V1_5(variant, key),
        })
    }

    /// ECDSA on the curve of `variant`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::CurveMismatch`] if the key is on another
    /// curve.
    pub fn ecdsa(variant: EcDSA, key: impl Into<EcKey>) -> Result<Self> {
        let key = key.into();
        if key.curve() != variant.curve() {
            return Err(ConfigurationError::CurveMismatch {
                expected: variant.curve(),
                actual: key.curve(),
            }
            .into());
        }

        Ok(Self {
            inner: Inner::EcDsa(variant, key),
        })
    }

    /// Resolves `algorithm` to an implementation that uses `key`.
    ///
    /// The `alg`, `use` and `key_ops` members of the key must allow the
    /// algorithm.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if the algorithm is `none` or unknown,
    /// the key type does not fit, or the key forbids the usage.
    pub fn from_jwk(algorithm: &JsonWebSigningAlgorithm, key: &JsonWebKey) -> Result<Self> {
        key.check_usage(&algorithm.clone().into(), Purpose::Signature)?;

        let key_type = || ConfigurationError::KeyType {
            key_type: key.key_type().name(),
            algorithm: algorithm.name().to_owned(),
        };

        match algorithm {
            JsonWebSigningAlgorithm::Hmac(variant) => {
                Self::hmac(*variant, key.symmetric().ok_or_else(key_type)?)
            }
            JsonWebSigningAlgorithm::RsassaPkcs1V1_5(variant) => {
                Self::rsassa_pkcs1_v1_5(*variant, key.rsa().ok_or_else(key_type)?)
            }
            JsonWebSigningAlgorithm::EcDSA(variant) => {
                Self::ecdsa(*variant, key.ec().ok_or_else(key_type)?)
            }
            JsonWebSigningAlgorithm::None | JsonWebSigningAlgorithm::Other(_) => Err(
                ConfigurationError::UnsupportedAlgorithm(algorithm.name().to_owned()).into(),
            ),
        }
    }

    /// The identifier this algorithm contributes to the `alg` parameter.
    pub fn algorithm(&self) -> JsonWebSigningAlgorithm {
        match &self.inner {
            Inner::None => JsonWebSigningAlgorithm::None,
            Inner::Hmac(variant, _) => (*variant).into(),
            Inner::RsassaPkcs1V1_5(variant, _) => (*variant).into(),
            Inner::EcDsa(variant, _) => (*variant).into(),
        }
    }

    /// The key id of the key, which is put into the `kid` parameter.
    pub fn key_id(&self) -> Option<&str> {
        match &self.inner {
            Inner::None => None,
            Inner::Hmac(_, key) => key.key_id(),
            Inner::RsassaPkcs1V1_5(_, key) => key.key_id(),
            Inner::EcDsa(_, key) => key.key_id(),
        }
    }

    /// Signs `data`.
    ///
    /// ECDSA signatures are returned in the fixed width `r || s` form.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::MissingPrivateKey`] for an asymmetric
    /// algorithm without a private key, or an error of the backend.
    pub fn compute_signature(&self, data: &[u8]) -> Result<Vec<u8>> {
        match &self.inner {
            Inner::None => Ok(Vec::new()),
            Inner::Hmac(variant, key) => Ok(crypto::hmac::sign(*variant, key.expose(), &[data])?),
            Inner::RsassaPkcs1V1_5(variant, key) => {
                let private = key
                    .private_key()
                    .ok_or(ConfigurationError::MissingPrivateKey)?;
                Ok(private.sign(*variant, data)?)
            }
            Inner::EcDsa(variant, key) => {
                let private = key
                    .private_key()
                    .ok_or(ConfigurationError::MissingPrivateKey)?;
                let signature = private.sign_der(data)?;
                der::der_to_fixed(&signature, variant.curve().field_size()).ok_or_else(|| {
                    crypto::Error::from(::signature::Error::new()).into()
                })
            }
        }
    }

    /// Checks `signature` over `data`.
    ///
    /// An ECDSA signature that is not exactly twice the field size is
    /// rejected before the key is touched.
    ///
    /// # Errors
    ///
    /// Returns an error only if the backend failed; an invalid signature is
    /// reported as `Ok(false)`.
    pub fn validate_signature(&self, data: &[u8], signature: &[u8]) -> Result<bool> {
        match &self.inner {
            Inner::None => Ok(signature.is_empty()),
            Inner::Hmac(variant, key) => {
                if signature.len() != variant.output_size() {
                    return Ok(false);
                }
                Ok(crypto::hmac::verify_truncated(
                    *variant,
                    key.expose(),
                    &[data],
                    signature,
                )?)
            }
            Inner::RsassaPkcs1V1_5(variant, key) => {
                Ok(key.to_public_key().verify(*variant, data, signature))
            }
            Inner::EcDsa(variant, key) => {
                if signature.len() != variant.curve().field_size() * 2 {
                    return Ok(false);
                }
                let der = der::fixed_to_der(signature);
                Ok(key.to_public_key().verify_der(data, &der))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::ec::{self, Curve};

    #[test]
    fn hmac_key_length() {
        let short = SymmetricKey::new([0u8; 31]);
        assert!(SignatureAlgorithm::hmac(Hmac::Hs256, short).is_err());

        let key = SymmetricKey::new([0u8; 48]);
        assert!(SignatureAlgorithm::hmac(Hmac::Hs384, key.clone()).is_ok());
        assert!(SignatureAlgorithm::hmac(Hmac::Hs512, key).is_err());
    }

    #[test]
    fn hmac_rejects_truncated_signature() {
        let alg = SignatureAlgorithm::hmac(Hmac::Hs256, SymmetricKey::new([7u8; 32])).unwrap();
        let signature = alg.compute_signature(b"data").unwrap();

        assert_eq!(signature.len(), 32);
        assert!(alg.validate_signature(b"data", &signature).unwrap());
        assert!(!alg.validate_signature(b"data", &signature[..16]).unwrap());
        assert!(!alg.validate_signature(b"other", &signature).unwrap());
    }

    #[test]
    fn none_only_accepts_empty() {
        let alg = SignatureAlgorithm::none();
        assert!(alg.compute_signature(b"data").unwrap().is_empty());
        assert!(alg.validate_signature(b"data", b"").unwrap());
        assert!(!alg.validate_signature(b"data", b"x").unwrap());
    }

    #[test]
    fn ecdsa_curve_mismatch() {
        let key = ec::PrivateKey::generate(Curve::P384).unwrap();
        let err = SignatureAlgorithm::ecdsa(EcDSA::Es256, key).unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Configuration(ConfigurationError::CurveMismatch { .. })
        ));
    }

    #[test]
    fn ecdsa_signature_lengths() {
        for (variant, curve, len) in [
            (EcDSA::Es256, Curve::P256, 64),
            (EcDSA::Es384, Curve::P384, 96),
            (EcDSA::Es512, Curve::P521, 132),
        ] {
            let key = ec::PrivateKey::generate(curve).unwrap();
            let alg = SignatureAlgorithm::ecdsa(variant, key).unwrap();

            for _ in 0..8 {
                let signature = alg.compute_signature(b"payload").unwrap();
                assert_eq!(signature.len(), len);
                assert!(alg.validate_signature(b"payload", &signature).unwrap());
                assert!(!alg.validate_signature(b"payload", &signature[1..]).unwrap());
            }
        }
    }

    #[test]
    fn public_key_cannot_sign() {
        let key = ec::PrivateKey::generate(Curve::P256).unwrap().to_public_key();
        let alg = SignatureAlgorithm::ecdsa(EcDSA::Es256, key).unwrap();
        assert!(matches!(
            alg.compute_signature(b"x"),
            Err(crate::Error::Configuration(ConfigurationError::MissingPrivateKey))
        ));
    }

    #[test]
    fn from_jwk_never_yields_none() {
        let key = JsonWebKey::new(SymmetricKey::new([1u8; 32]));
        assert!(SignatureAlgorithm::from_jwk(&JsonWebSigningAlgorithm::None, &key).is_err());
        assert!(
            SignatureAlgorithm::from_jwk(&JsonWebSigningAlgorithm::Hmac(Hmac::Hs256), &key)
                .is_ok()
        );
        assert!(matches!(
            SignatureAlgorithm::from_jwk(&JsonWebSigningAlgorithm::EcDSA(EcDSA::Es256), &key),
            Err(crate::Error::Configuration(ConfigurationError::KeyType { key_type: "oct", .. }))
        ));
    }
}
