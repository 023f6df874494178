//! The error taxonomy shared by every operation of this crate.

use alloc::string::String;

use thiserror::Error;

use crate::{base64_url::NoBase64UrlString, claims::Validator, crypto::ec::Curve, header};

/// The result type used throughout this crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Every error this crate can produce, grouped into four categories.
///
/// When errors are reported back to an untrusted party, consider collapsing
/// [`Error::Parse`] and [`Error::Authentication`] into a single "invalid
/// token" message (see [`Error::is_invalid_token`]), otherwise the difference
/// between the two can be used as an oracle.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The input was malformed.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The algorithms, keys or header parameters do not fit together.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    /// An integrity check failed.
    #[error(transparent)]
    Authentication(#[from] AuthenticationError),
    /// A claim did not satisfy its constraint.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl Error {
    /// Returns `true` if this error should be reported as "invalid token" to
    /// an untrusted party.
    pub const fn is_invalid_token(&self) -> bool {
        matches!(self, Self::Parse(_) | Self::Authentication(_))
    }
}

impl From<header::Error> for Error {
    fn from(x: header::Error) -> Self {
        Self::Parse(ParseError::Header(x))
    }
}

impl From<NoBase64UrlString> for Error {
    fn from(x: NoBase64UrlString) -> Self {
        Self::Parse(ParseError::Base64(x))
    }
}

impl From<crate::crypto::Error> for Error {
    fn from(x: crate::crypto::Error) -> Self {
        Self::Configuration(ConfigurationError::Crypto(x))
    }
}

/// Malformed serialized input.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The compact representation had the wrong number of `.` separated
    /// segments.
    #[error("expected {expected} segments in compact serialization, found {actual}")]
    SegmentCount {
        /// The number of segments this kind of token consists of.
        expected: usize,
        /// The number of segments found.
        actual: usize,
    },
    /// A token was neither JWS (3 segments) nor JWE (5 segments) shaped.
    #[error("a token must consist of 3 (JWS) or 5 (JWE) segments, found {0}")]
    UnknownTokenShape(usize),
    /// A segment or member was not valid Base64Url.
    #[error(transparent)]
    Base64(#[from] NoBase64UrlString),
    /// Invalid JSON or JSON of the wrong shape.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The header violates the JOSE header rules.
    #[error(transparent)]
    Header(#[from] header::Error),
    /// A member of a JSON serialized token is missing or has the wrong type.
    #[error("missing or invalid member `{0}`")]
    InvalidMember(&'static str),
    /// A detached JWS was expected, but the payload segment was not empty.
    #[error("expected an empty payload segment for a detached payload")]
    NotDetached,
    /// The `dir` algorithm was used, but the encrypted key was not empty.
    #[error("the encrypted key must be empty when using direct encryption")]
    UnexpectedEncryptedKey,
    /// The payload was expected to be text but is not UTF-8.
    #[error("payload is not valid UTF-8")]
    Utf8,
    /// The unencoded payload of a compact JWS contains a `.`.
    #[error("an unencoded payload must not contain `.` in compact serialization")]
    UnencodedPayloadWithDot,
    /// Inflating a `zip: DEF` payload failed or exceeded the size limit.
    #[error("failed to decompress payload")]
    Decompression,
    /// A JSON Web Key member is missing or invalid.
    #[error("missing or invalid JSON Web Key member `{0}`")]
    InvalidKey(&'static str),
}

/// The caller supplied algorithms, keys or headers do not fit together.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// The algorithm name is unknown or not implemented.
    #[error("unsupported algorithm `{0}`")]
    UnsupportedAlgorithm(String),
    /// The header declares another algorithm than the one supplied.
    #[error("header declares `{declared}` but `{supplied}` was supplied")]
    AlgorithmMismatch {
        /// The algorithm found in the header.
        declared: String,
        /// The algorithm that was supplied by the caller.
        supplied: String,
    },
    /// A header parameter required by the algorithm is missing.
    #[error("missing required header parameter `{0}`")]
    MissingParameter(&'static str),
    /// A header parameter is out of the accepted range.
    #[error("header parameter `{0}` is out of range")]
    ParameterOutOfRange(&'static str),
    /// The key has the wrong length for the algorithm.
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength {
        /// The length required by the algorithm.
        expected: usize,
        /// The length of the supplied key.
        actual: usize,
    },
    /// The initialization vector has the wrong length for the algorithm.
    #[error("invalid initialization vector length: expected {expected} bytes, got {actual}")]
    InvalidIvLength {
        /// The length required by the algorithm.
        expected: usize,
        /// The length of the supplied IV.
        actual: usize,
    },
    /// An EC key is on another curve than the algorithm requires.
    #[error("the algorithm requires curve {expected} but the key uses {actual}")]
    CurveMismatch {
        /// The curve of the algorithm.
        expected: Curve,
        /// The curve of the key.
        actual: Curve,
    },
    /// The operation requires a private key, but a public key was supplied.
    #[error("the operation requires a private key")]
    MissingPrivateKey,
    /// The key type cannot be used with the algorithm.
    #[error("a `{key_type}` key cannot be used with `{algorithm}`")]
    KeyType {
        /// The `kty` of the key.
        key_type: &'static str,
        /// The algorithm the key was supposed to be used for.
        algorithm: String,
    },
    /// The `use` or `key_ops` of a JSON Web Key forbid the operation.
    #[error("the key is not allowed to be used for `{0}`")]
    KeyUsage(&'static str),
    /// No key could be selected for the token.
    #[error("no key found for key id {0:?}")]
    KeyNotFound(Option<String>),
    /// The compact serialization was requested for a token with unprotected
    /// header parameters.
    #[error("the compact serialization cannot carry unprotected header parameters")]
    UnprotectedHeader,
    /// The compact serialization has no place for a JWE `aad` member.
    #[error("the compact serialization cannot carry additional authenticated data")]
    CompactAad,
    /// Compressing the plaintext failed.
    #[error("failed to compress the payload")]
    Compression,
    /// The payload is too large for the algorithm.
    #[error("the input is too large for the algorithm")]
    InputTooLarge,
    /// The cryptographic backend rejected the operation.
    #[error(transparent)]
    Crypto(#[from] crate::crypto::Error),
}

/// An integrity check failed. No plaintext is ever released alongside this
/// error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum AuthenticationError {
    /// The authentication tag of the content did not match.
    #[error("authentication tag mismatch")]
    TagMismatch,
    /// The signature did not match the signing input.
    #[error("invalid signature")]
    InvalidSignature,
    /// The integrity check of an AES key unwrap failed.
    #[error("key unwrap integrity check failed")]
    KeyUnwrap,
}

/// A named claim failed its constraint.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("claim `{claim}` is invalid: {reason}")]
pub struct ValidationError {
    pub(crate) claim: String,
    pub(crate) reason: ValidationFailure,
}

impl ValidationError {
    pub(crate) fn new(claim: impl Into<String>, reason: ValidationFailure) -> Self {
        Self {
            claim: claim.into(),
            reason,
        }
    }

    /// The name of the claim that failed.
    pub fn claim(&self) -> &str {
        &self.claim
    }

    /// Why the claim failed.
    pub const fn reason(&self) -> &ValidationFailure {
        &self.reason
    }
}

/// The reason a claim failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ValidationFailure {
    /// The `exp` claim is in the past.
    #[error("the token has expired")]
    Expired,
    /// The `nbf` claim is in the future.
    #[error("the token is not yet valid")]
    NotYetValid,
    /// A time claim is not a number.
    #[error("expected a NumericDate")]
    NotANumericDate,
    /// A claim that must be present is missing.
    #[error("the claim is required but missing")]
    Missing,
    /// The validator rejected the value.
    #[error("the value does not satisfy `{0:?}`")]
    Constraint(Validator),
}
