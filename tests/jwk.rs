mod common;

use common::{key, key_set, read_jwk, TestResult};
use jwx::{
    jwa::{EcDSA, Hmac, JsonWebAlgorithm, JsonWebSigningAlgorithm},
    jwk::{KeyOperation, KeyUsage},
    jws::SignatureAlgorithm,
    Base64UrlString, ConfigurationError, Error, JsonWebKey, JsonWebKeySet,
};
use serde_json::json;

#[test]
fn ec_keys_roundtrip() -> TestResult {
    for name in ["ec-p256", "ec-p384", "ec-p521"] {
        let json = read_jwk(name)?;
        let key: JsonWebKey = serde_json::from_value(json.clone())?;

        assert_eq!(key.key_type().name(), "EC");
        assert_eq!(key.key_id(), Some(name));
        assert!(!key.is_public());
        assert_eq!(serde_json::to_value(&key)?, json, "{name}");
    }
    Ok(())
}

#[test]
fn rsa_public_members_roundtrip() -> TestResult {
    let json = read_jwk("rsa-2048")?;
    let key: JsonWebKey = serde_json::from_value(json.clone())?;
    let serialized = serde_json::to_value(&key)?;

    assert_eq!(serialized["n"], json["n"]);
    assert_eq!(serialized["e"], json["e"]);
    assert!(serialized.get("d").is_some());
    Ok(())
}

#[test]
fn public_part_drops_private_members() -> TestResult {
    for name in ["ec-p256", "ec-p521", "rsa-2048"] {
        let public = key(name)?.to_public().ok_or("public key")?;
        assert!(public.is_public());
        assert_eq!(public.key_id(), Some(name));

        let json = serde_json::to_value(&public)?;
        for private in ["d", "p", "q", "dp", "dq", "qi"] {
            assert!(json.get(private).is_none(), "{name} leaks {private}");
        }
    }

    assert!(key("oct-256")?.to_public().is_none());
    Ok(())
}

#[test]
fn thumbprints() -> TestResult {
    // computed independently over the canonical JSON of the required members
    for (name, expected) in [
        ("ec-p256", "ynOGHWHI2L7uPp85R5aZ_Tc02hY6p3Q3iLCvbCxydxU"),
        ("rsa-2048", "EnpJHZdrqY2yDxkX4U-PwsgIXKVwLUGB4DQLpZiuRVk"),
        ("oct-256", "27A9fd09D1pzQTEHaZn4hPXBo-fXuy2yvPJHAqQJfKU"),
    ] {
        let key = key(name)?;
        let thumbprint = Base64UrlString::encode(key.thumbprint_sha256()?);
        assert_eq!(thumbprint.into_inner(), expected, "{name}");

        // the private half does not change the thumbprint
        if let Some(public) = key.to_public() {
            assert_eq!(public.thumbprint_sha256()?, key.thumbprint_sha256()?);
        }
    }
    Ok(())
}

#[test]
fn invalid_keys_are_rejected() -> TestResult {
    let mut off_curve = read_jwk("ec-p256")?;
    off_curve["y"] = read_jwk("ec-p384")?["x"].clone();
    assert!(serde_json::from_value::<JsonWebKey>(off_curve).is_err());

    let mut unknown_curve = read_jwk("ec-p256")?;
    unknown_curve["crv"] = json!("secp256k1");
    assert!(serde_json::from_value::<JsonWebKey>(unknown_curve).is_err());

    let mut missing_prime = read_jwk("rsa-2048")?;
    missing_prime.as_object_mut().ok_or("object")?.remove("q");
    assert!(serde_json::from_value::<JsonWebKey>(missing_prime).is_err());

    let mut not_base64 = read_jwk("oct-256")?;
    not_base64["k"] = json!("not base64!");
    assert!(serde_json::from_value::<JsonWebKey>(not_base64).is_err());
    Ok(())
}

#[test]
fn metadata_is_kept() -> TestResult {
    let mut json = read_jwk("oct-256")?;
    json["alg"] = json!("HS256");
    json["key_ops"] = json!(["sign", "verify"]);
    json["x5u"] = json!("https://keys.example/oct");

    let key: JsonWebKey = serde_json::from_value(json.clone())?;
    assert_eq!(
        key.algorithm(),
        Some(&JsonWebAlgorithm::Signing(Hmac::Hs256.into()))
    );
    assert_eq!(
        key.key_operations(),
        Some(&[KeyOperation::Sign, KeyOperation::Verify][..])
    );
    assert_eq!(key.additional()["x5u"], "https://keys.example/oct");
    assert_eq!(serde_json::to_value(&key)?, json);
    Ok(())
}

#[test]
fn use_and_key_ops_must_agree() -> TestResult {
    let mut json = read_jwk("oct-256")?;
    json["use"] = json!("enc");
    json["key_ops"] = json!(["sign"]);

    // an inconsistent key parses, but can not be used for signatures
    let key: JsonWebKey = serde_json::from_value(json)?;
    assert_eq!(key.key_use(), Some(&KeyUsage::Encryption));
    assert!(matches!(
        SignatureAlgorithm::from_jwk(&Hmac::Hs256.into(), &key),
        Err(Error::Configuration(ConfigurationError::KeyUsage(_)))
    ));
    Ok(())
}

#[test]
fn key_set_lookup() -> TestResult {
    let set = key_set()?;
    assert_eq!(set.len(), 5);
    assert!(set.find_by_key_id("ec-p384").is_some());
    assert!(set.find_by_key_id("missing").is_none());

    let json = serde_json::to_value(&set)?;
    let keys = json["keys"].as_array().ok_or("keys")?;
    assert_eq!(keys.len(), 5);

    let parsed: JsonWebKeySet = serde_json::from_value(json)?;
    let signer = SignatureAlgorithm::from_jwk(
        &JsonWebSigningAlgorithm::from(EcDSA::Es384),
        parsed.find_by_key_id("ec-p384").ok_or("ec-p384")?,
    )?;
    assert_eq!(signer.key_id(), Some("ec-p384"));
    Ok(())
}
