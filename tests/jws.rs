mod common;

use common::{key, TestResult, Vectors};
use jwx::{
    format::{Compact, JsonFlattened},
    header::Parameter,
    jwa::{EcDSA, JsonWebSigningAlgorithm, RsassaPkcs1V1_5},
    jws::SignatureAlgorithm,
    AuthenticationError, ConfigurationError, Error, Header, JsonWebSignature, Unverified,
};

fn algorithm(alg: impl Into<JsonWebSigningAlgorithm>, key_name: &str) -> TestResult<SignatureAlgorithm> {
    Ok(SignatureAlgorithm::from_jwk(&alg.into(), &key(key_name)?)?)
}

#[test]
fn verifies_foreign_signatures() -> TestResult {
    let vectors = Vectors::load()?;

    for (name, alg, key_name) in [
        ("ES256", JsonWebSigningAlgorithm::from(EcDSA::Es256), "ec-p256"),
        ("ES384", EcDSA::Es384.into(), "ec-p384"),
        ("ES512", EcDSA::Es512.into(), "ec-p521"),
        ("RS256", RsassaPkcs1V1_5::Rs256.into(), "rsa-2048"),
    ] {
        let algorithm = algorithm(alg, key_name)?;
        let jws = JsonWebSignature::decode(vectors.token(name)?)?.verify(&algorithm)?;

        assert_eq!(jws.payload(), vectors.payload.as_bytes(), "{name}");
        assert_eq!(
            jws.header().key_id().map(|kid| kid.into_inner()),
            Some(key_name)
        );
    }
    Ok(())
}

#[test]
fn asymmetric_roundtrip() -> TestResult {
    for (alg, key_name) in [
        (JsonWebSigningAlgorithm::from(EcDSA::Es256), "ec-p256"),
        (EcDSA::Es384.into(), "ec-p384"),
        (EcDSA::Es512.into(), "ec-p521"),
        (RsassaPkcs1V1_5::Rs384.into(), "rsa-2048"),
        (RsassaPkcs1V1_5::Rs512.into(), "rsa-2048"),
    ] {
        let signer = algorithm(alg.clone(), key_name)?;
        let jws = JsonWebSignature::sign(b"round trip", &Header::new(), &signer)?;
        let compact: Compact = jws.encode()?;

        // only the public half is needed to verify
        let public = key(key_name)?.to_public().ok_or("public key")?;
        let verifier = SignatureAlgorithm::from_jwk(&alg, &public)?;

        let decoded = JsonWebSignature::decode(&compact.to_string())?;
        assert_eq!(decoded.insecure_peek(), &jws);
        let verified = decoded.verify(&verifier)?;
        assert_eq!(verified.payload(), b"round trip");

        assert!(matches!(
            JsonWebSignature::sign(b"x", &Header::new(), &verifier),
            Err(Error::Configuration(ConfigurationError::MissingPrivateKey))
        ));
    }
    Ok(())
}

#[test]
fn tampered_signature_is_rejected() -> TestResult {
    let vectors = Vectors::load()?;
    let algorithm = algorithm(EcDSA::Es256, "ec-p256")?;

    let token = vectors.token("ES256")?;
    let (rest, signature) = token.rsplit_once('.').ok_or("signature")?;
    let mut signature = signature.parse::<jwx::Base64UrlString>()?.decode()?;
    signature[10] ^= 1;
    let tampered = format!("{rest}.{}", jwx::Base64UrlString::encode(&signature));

    assert!(matches!(
        JsonWebSignature::decode(&tampered)?.verify(&algorithm),
        Err(Error::Authentication(AuthenticationError::InvalidSignature))
    ));
    Ok(())
}

#[test]
fn algorithm_is_chosen_by_the_verifier() -> TestResult {
    let vectors = Vectors::load()?;
    let es384 = algorithm(EcDSA::Es384, "ec-p384")?;

    assert!(matches!(
        JsonWebSignature::decode(vectors.token("ES256")?)?.verify(&es384),
        Err(Error::Configuration(ConfigurationError::AlgorithmMismatch { .. }))
    ));
    Ok(())
}

#[test]
fn detached_payload() -> TestResult {
    let signer = algorithm(EcDSA::Es256, "ec-p256")?;
    let jws = JsonWebSignature::sign(b"sent elsewhere", &Header::new(), &signer)?;

    let detached = jws.encode_detached()?.to_string();
    let parts = detached.split('.').collect::<Vec<_>>();
    assert_eq!(parts.len(), 3);
    assert!(parts[1].is_empty());

    let verified = JsonWebSignature::decode_detached(&detached, "sent elsewhere")?.verify(&signer)?;
    assert_eq!(verified.payload(), b"sent elsewhere");

    assert!(JsonWebSignature::decode_detached(&detached, "other")?
        .verify(&signer)
        .is_err());
    Ok(())
}

#[test]
fn flattened_json() -> TestResult {
    let signer = algorithm(RsassaPkcs1V1_5::Rs256, "rsa-2048")?;
    let header = Header::new().with_parameter(Parameter::typ("JWT")?);
    let jws = JsonWebSignature::sign(b"{}", &header, &signer)?
        .with_unprotected_header(Header::new().with_parameter(Parameter::Other {
            name: "note".into(),
            value: "not covered".into(),
        }))?;

    assert!(jws.encode::<Compact>().is_err());

    let json: JsonFlattened = jws.encode()?;
    let parsed: JsonFlattened = json.to_string().parse()?;
    let verified = Unverified::<JsonWebSignature>::decode(parsed)?.verify(&signer)?;
    assert_eq!(verified.payload(), b"{}");

    let note = verified.header().get("note").ok_or("note")?;
    assert!(!note.is_protected());
    Ok(())
}

#[test]
fn unknown_critical_parameter_is_rejected() -> TestResult {
    let signer = algorithm(EcDSA::Es256, "ec-p256")?;
    let header = Header::new()
        .with_parameter(Parameter::Other {
            name: "exp".into(),
            value: 1.into(),
        })
        .with_parameter(Parameter::Critical(vec!["exp".into()]));

    assert!(matches!(
        JsonWebSignature::sign(b"", &header, &signer),
        Err(Error::Parse(_))
    ));
    Ok(())
}
