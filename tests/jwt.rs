mod common;

use common::{key, key_set, TestResult, Vectors};
use jwx::{
    claims::Validator,
    jwa::{AesCbcHs, AesGcm, EcDSA, Hmac, JsonWebEncryptionAlgorithm, JsonWebSigningAlgorithm, Rsaes},
    jwe::{ContentEncryption, KeyManagement},
    jwk::KeyUsage,
    jws::SignatureAlgorithm,
    Claims, ConfigurationError, Error, Header, JsonWebKeySet, JsonWebToken, ValidationContext,
    ValidationFailure,
};
use serde_json::json;

const NOW: u64 = 1_700_000_000;

fn claims() -> Claims {
    Claims::new()
        .with_claim("iss", "https://issuer.example")
        .with_claim("aud", json!(["api", "jwx"]))
        .with_claim("iat", NOW - 5)
        .with_claim("nbf", NOW - 5)
        .with_claim("exp", NOW + 300)
}

#[test]
fn validates_foreign_token() -> TestResult {
    let vectors = Vectors::load()?;
    let token: JsonWebToken = vectors.token("ES256")?.parse()?;

    let context = ValidationContext::new()
        .require("iss", "python")
        .require("aud", "jwx");
    let claims = token.claims(&key_set()?, &context)?;
    assert_eq!(claims.subject(), Some("vectors"));
    assert_eq!(claims.audience(), ["jwx"]);

    let wrong_audience = ValidationContext::new().require("aud", "someone else");
    assert!(matches!(
        token.claims(&key_set()?, &wrong_audience),
        Err(Error::Validation(err))
            if err.claim() == "aud" && err.reason() == &ValidationFailure::Constraint(Validator::Contains)
    ));
    Ok(())
}

#[test]
fn nested_signed_then_encrypted() -> TestResult {
    let keys = key_set()?;
    let signer = SignatureAlgorithm::from_jwk(&EcDSA::Es256.into(), &key("ec-p256")?)?;
    let encrypter = KeyManagement::from_jwk(&Rsaes::Oaep256.into(), &key("rsa-2048")?)?;

    let inner = JsonWebToken::sign(&claims(), &Header::new(), &signer)?;
    let outer = JsonWebToken::nest(
        &inner,
        &Header::new(),
        &encrypter,
        ContentEncryption::AesGcm(AesGcm::Aes256),
        None,
    )?;

    let decoded: JsonWebToken = outer.to_string().parse()?;
    assert!(decoded.is_encrypted());
    let peeked = decoded.header();
    let header = peeked.insecure_peek();
    assert_eq!(header.key_id().map(|kid| kid.into_inner()), Some("rsa-2048"));

    let context = ValidationContext::new()
        .with_reference_time(NOW)
        .require("aud", "api")
        .require("iat", NOW);
    assert_eq!(decoded.claims(&keys, &context)?, claims());

    let later = context.with_reference_time(NOW + 300);
    assert!(matches!(
        decoded.claims(&keys, &later),
        Err(Error::Validation(err)) if err.reason() == &ValidationFailure::Expired
    ));
    Ok(())
}

#[test]
fn encrypted_claims() -> TestResult {
    let mut keys = JsonWebKeySet::new();
    keys.push(key("oct-256")?);

    let encrypter =
        KeyManagement::from_jwk(&JsonWebEncryptionAlgorithm::Direct, &key("oct-256")?)?;
    let content = ContentEncryption::AesCbcHs(AesCbcHs::Aes128CbcHs256);
    let token = JsonWebToken::encrypt(&claims(), &Header::new(), &encrypter, content, None)?;

    let decoded: JsonWebToken = token.to_string().parse()?;
    let claims = decoded.claims(&keys, &ValidationContext::new().with_reference_time(NOW))?;
    assert_eq!(claims.issuer(), Some("https://issuer.example"));
    Ok(())
}

#[test]
fn key_restrictions_are_enforced() -> TestResult {
    let token = {
        let signer = SignatureAlgorithm::from_jwk(&EcDSA::Es256.into(), &key("ec-p256")?)?;
        JsonWebToken::sign(&claims(), &Header::new(), &signer)?.to_string()
    };
    let token: JsonWebToken = token.parse()?;

    // the key only allows another algorithm
    let mut pinned = JsonWebKeySet::new();
    pinned.push(key("ec-p256")?.with_algorithm(JsonWebSigningAlgorithm::from(EcDSA::Es384)));
    assert!(matches!(
        token.payload(&pinned),
        Err(Error::Configuration(ConfigurationError::AlgorithmMismatch { declared, supplied }))
            if declared == "ES384" && supplied == "ES256"
    ));

    // the key is meant for encryption only
    let mut encryption_only = JsonWebKeySet::new();
    encryption_only.push(key("ec-p256")?.with_key_use(KeyUsage::Encryption));
    assert!(matches!(
        token.payload(&encryption_only),
        Err(Error::Configuration(ConfigurationError::KeyUsage(_)))
    ));

    // `kid` names a key of another type
    let hmac = SignatureAlgorithm::from_jwk(&Hmac::Hs256.into(), &key("oct-256")?)?;
    let mismatched = JsonWebToken::sign(&claims(), &Header::new(), &hmac)?;
    let mut renamed = JsonWebKeySet::new();
    renamed.push(key("ec-p256")?.with_key_id("gcmkw"));
    assert!(matches!(
        mismatched.payload(&renamed),
        Err(Error::Configuration(ConfigurationError::KeyType { .. }))
    ));
    Ok(())
}

#[test]
fn token_without_key_id_needs_a_single_key() -> TestResult {
    let vectors = Vectors::load()?;
    // the PBES2 token carries no `kid`
    let token: JsonWebToken = vectors.token("PBES2-HS256+A128KW")?.parse()?;

    assert!(matches!(
        token.payload(&key_set()?),
        Err(Error::Configuration(ConfigurationError::KeyNotFound(None)))
    ));
    Ok(())
}
