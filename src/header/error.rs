use alloc::string::String;

use thiserror::Error;

/// Errors that may occur while parsing a [`Header`](super::Header) or merging
/// a [`JoseHeader`](super::JoseHeader).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The header is valid JSON, but not an object.
    #[error("a header must be a JSON object")]
    NotAnObject,
    /// The same member name appears twice in one header.
    #[error("duplicate header parameter `{0}`")]
    DuplicateParameter(String),
    /// A registered header parameter has a value of the wrong shape.
    #[error("header parameter `{0}` has an invalid value")]
    InvalidParameter(String),
    /// The protected and unprotected headers share members with the same
    /// name.
    #[error("header parameter `{0}` appears in more than one header")]
    NotDisjoint(String),
    /// Found a header parameter that must be protected in an unprotected
    /// header.
    #[error("header parameter `{0}` must be integrity protected")]
    ExpectedProtected(String),
    /// The `crit` header is present but an empty list (`[]`)
    #[error("the `crit` header parameter must not be empty")]
    EmptyCriticalHeaders,
    /// A name is listed twice in `crit`.
    #[error("`{0}` is listed more than once in `crit`")]
    DuplicateCriticalHeader(String),
    /// Found a header parameter name in `crit` that is forbidden as per
    /// [section 4.1.11 of RFC 7515]
    ///
    /// [section 4.1.11 of RFC 7515]: <https://www.rfc-editor.org/rfc/rfc7515.html#section-4.1.11>
    #[error("`{0}` must not be listed in `crit`")]
    ForbiddenHeader(String),
    /// A name listed in `crit` is not present in the header.
    #[error("`{0}` is listed in `crit` but missing from the header")]
    MissingHeader(String),
    /// A name listed in `crit` is not understood by this implementation.
    #[error("critical header parameter `{0}` is not supported")]
    UnsupportedCriticalHeader(String),
    /// `b64` was used without being listed in `crit`.
    #[error("the `b64` header parameter must be listed in `crit`")]
    Base64PayloadNotCritical,
    /// A JSON deserialization error, see [`serde_json::Error`] for details.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
