//! Processing of the `crit` header parameter, [section 4.1.11 of RFC 7515].
//!
//! [section 4.1.11 of RFC 7515]: <https://datatracker.ietf.org/doc/html/rfc7515#section-4.1.11>

use alloc::{borrow::ToOwned, collections::BTreeSet};

use super::{Error, JoseHeader};

/// The kind of token a header belongs to, which decides the set of registered
/// parameter names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Jws,
    Jwe,
}

/// Registered names which may never appear in `crit`.
const REGISTERED: &[&str] = &[
    "alg", "jku", "jwk", "kid", "x5u", "x5c", "x5t", "x5t#S256", "typ", "cty", "crit", "epk",
    "apu", "apv", "iv", "tag", "p2s", "p2c",
];

/// Registered for JWE only, in addition to [`REGISTERED`].
const REGISTERED_JWE: &[&str] = &["enc", "zip"];

/// The extensions this implementation understands.
const UNDERSTOOD_JWS: &[&str] = &["b64"];

impl TokenKind {
    fn is_registered(self, name: &str) -> bool {
        REGISTERED.contains(&name) || (self == Self::Jwe && REGISTERED_JWE.contains(&name))
    }

    fn understands(self, name: &str) -> bool {
        self == Self::Jws && UNDERSTOOD_JWS.contains(&name)
    }
}

/// Checks `crit` and `b64` in `header`.
pub(crate) fn check(header: &JoseHeader, kind: TokenKind) -> Result<(), Error> {
    for unprotected in header.unprotected() {
        for name in ["crit", "b64"] {
            if unprotected.contains(name) {
                return Err(Error::ExpectedProtected(name.to_owned()));
            }
        }
    }

    let protected = header.protected();
    let critical = protected.critical();

    if kind == TokenKind::Jws
        && protected.contains("b64")
        && !critical.is_some_and(|names| names.iter().any(|n| n == "b64"))
    {
        return Err(Error::Base64PayloadNotCritical);
    }

    let Some(critical) = critical else {
        return Ok(());
    };

    if critical.is_empty() {
        return Err(Error::EmptyCriticalHeaders);
    }

    let mut seen = BTreeSet::new();
    for name in critical {
        if !seen.insert(name.as_str()) {
            return Err(Error::DuplicateCriticalHeader(name.clone()));
        }
        if kind.is_registered(name) {
            return Err(Error::ForbiddenHeader(name.clone()));
        }
        if !header.contains(name) {
            return Err(Error::MissingHeader(name.clone()));
        }
        if !kind.understands(name) {
            return Err(Error::UnsupportedCriticalHeader(name.clone()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use alloc::{string::ToString, vec};

    use serde_json::json;

    use super::*;
    use crate::header::{Header, Parameter};

    fn protected(value: serde_json::Value) -> JoseHeader {
        let header: Header = serde_json::from_value(value).unwrap();
        JoseHeader::new(header, vec![]).unwrap()
    }

    #[test]
    fn b64_must_be_critical() {
        let header = protected(json!({"alg": "HS256", "b64": false}));
        assert!(matches!(
            check(&header, TokenKind::Jws),
            Err(Error::Base64PayloadNotCritical)
        ));

        let header = protected(json!({"alg": "HS256", "b64": false, "crit": ["b64"]}));
        check(&header, TokenKind::Jws).unwrap();
        // only JWS understands `b64`
        assert!(matches!(
            check(&header, TokenKind::Jwe),
            Err(Error::UnsupportedCriticalHeader(name)) if name == "b64"
        ));
    }

    #[test]
    fn crit_rules() {
        let cases = [
            (json!({"crit": []}), "empty"),
            (json!({"b64": true, "crit": ["b64", "b64"]}), "duplicate"),
            (json!({"crit": ["alg"], "alg": "HS256"}), "forbidden"),
            (json!({"crit": ["exp"]}), "missing"),
            (json!({"crit": ["exp"], "exp": 1}), "unsupported"),
        ];

        for (header, case) in cases {
            let err = check(&protected(header), TokenKind::Jws).unwrap_err();
            let matched = match case {
                "empty" => matches!(err, Error::EmptyCriticalHeaders),
                "duplicate" => matches!(err, Error::DuplicateCriticalHeader(_)),
                "forbidden" => matches!(err, Error::ForbiddenHeader(_)),
                "missing" => matches!(err, Error::MissingHeader(_)),
                _ => matches!(err, Error::UnsupportedCriticalHeader(_)),
            };
            assert!(matched, "{case}: {err}");
        }
    }

    #[test]
    fn enc_is_registered_for_jwe_only() {
        let header = protected(json!({"crit": ["enc"], "enc": "A128GCM"}));
        assert!(matches!(
            check(&header, TokenKind::Jwe),
            Err(Error::ForbiddenHeader(_))
        ));
        assert!(matches!(
            check(&header, TokenKind::Jws),
            Err(Error::UnsupportedCriticalHeader(_))
        ));
    }

    #[test]
    fn crit_must_be_protected() {
        let unprotected = Header::new().with_parameter(Parameter::Critical(vec!["x".to_string()]));
        let header = JoseHeader::new(Header::new(), vec![unprotected]).unwrap();
        assert!(matches!(
            check(&header, TokenKind::Jws),
            Err(Error::ExpectedProtected(name)) if name == "crit"
        ));
    }
}
