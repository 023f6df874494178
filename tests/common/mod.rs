//! Common test helpers.
#![allow(dead_code)]

use jwx::{JsonWebKey, JsonWebKeySet};
use serde_json::Value;

pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

fn read_vector(path: &str) -> TestResult<Value> {
    let json = std::fs::read_to_string(format!(
        "{}/tests/vectors/{path}.json",
        env!("CARGO_MANIFEST_DIR"),
    ))?;
    Ok(serde_json::from_str(&json)?)
}

/// Reads a key file from the `tests/vectors/jwk` directory.
pub fn read_jwk(name: &str) -> TestResult<Value> {
    read_vector(&format!("jwk/{name}"))
}

/// Reads and parses a key file from the `tests/vectors/jwk` directory.
pub fn key(name: &str) -> TestResult<JsonWebKey> {
    Ok(serde_json::from_value(read_jwk(name)?)?)
}

/// Every fixture key in one set.
pub fn key_set() -> TestResult<JsonWebKeySet> {
    let mut set = JsonWebKeySet::new();
    for name in ["ec-p256", "ec-p384", "ec-p521", "rsa-2048", "oct-256"] {
        set.push(key(name)?);
    }
    Ok(set)
}

/// Tokens produced by an independent implementation, see
/// `tests/vectors/tokens.json`.
pub struct Vectors {
    pub password: String,
    pub payload: String,
    tokens: Value,
}

impl Vectors {
    pub fn load() -> TestResult<Self> {
        let value = read_vector("tokens")?;
        Ok(Self {
            password: value["password"].as_str().ok_or("password")?.to_owned(),
            payload: value["payload"].as_str().ok_or("payload")?.to_owned(),
            tokens: value["tokens"].clone(),
        })
    }

    pub fn token(&self, alg: &str) -> TestResult<&str> {
        Ok(self.tokens[alg].as_str().ok_or_else(|| format!("no token for {alg}"))?)
    }
}

/// Deterministic filler bytes.
pub fn bytes(len: usize) -> Vec<u8> {
    let mut state = 0x2545_f491_u32;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state as u8
        })
        .collect()
}
