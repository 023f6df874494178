//! An implementation of the JOSE family of standards.
//!
//! - [JSON Web Signature (JWS)](jws), [RFC 7515]
//! - [JSON Web Encryption (JWE)](jwe), [RFC 7516]
//! - [JSON Web Key (JWK)](jwk), [RFC 7517]
//! - [JSON Web Algorithms (JWA)](jwa), [RFC 7518]
//! - [JSON Web Token (JWT)](jwt) and [claims] validation, [RFC 7519]
//!
//! Every algorithm family is a closed set of variants. A [`Header`] is an
//! immutable value, extending it always yields a new header.
//!
//! ```
//! # use jwx::{jwa::Hmac, jws::SignatureAlgorithm, crypto::SymmetricKey, Header, JsonWebSignature, Unverified, format::Compact};
//! # fn main() -> Result<(), jwx::Error> {
//! let key = SymmetricKey::new([7u8; 32]);
//! let alg = SignatureAlgorithm::hmac(Hmac::Hs256, key)?;
//!
//! let jws = JsonWebSignature::sign(b"hello", &Header::new(), &alg)?;
//! let compact: Compact = jws.encode()?;
//!
//! let verified = Unverified::<JsonWebSignature>::decode(compact)?.verify(&alg)?;
//! assert_eq!(verified.payload(), b"hello");
//! # Ok(())
//! # }
//! ```
//!
//! [RFC 7515]: <https://datatracker.ietf.org/doc/html/rfc7515>
//! [RFC 7516]: <https://datatracker.ietf.org/doc/html/rfc7516>
//! [RFC 7517]: <https://datatracker.ietf.org/doc/html/rfc7517>
//! [RFC 7518]: <https://datatracker.ietf.org/doc/html/rfc7518>
//! [RFC 7519]: <https://datatracker.ietf.org/doc/html/rfc7519>
#![warn(
    missing_docs,
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    explicit_outlives_requirements,
    clippy::missing_errors_doc
)]
#![deny(
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    macro_use_extern_crate,
    non_ascii_idents,
    elided_lifetimes_in_paths
)]
#![forbid(unsafe_code)]
#![cfg_attr(not(test), no_std)]

extern crate alloc;
#[cfg(all(feature = "std", not(test)))]
extern crate std;

#[macro_use]
mod macros;

mod base64_url;
mod error;
mod sealed;
mod verify;

pub mod claims;
pub mod crypto;
pub mod format;
pub mod header;
pub mod jwa;
pub mod jwe;
pub mod jwk;
pub mod jws;
pub mod jwt;

#[doc(inline)]
pub use self::{
    base64_url::{Base64UrlString, NoBase64UrlString},
    claims::{Claims, ValidationContext},
    error::{
        AuthenticationError, ConfigurationError, Error, ParseError, Result, ValidationError,
        ValidationFailure,
    },
    header::{Header, JoseHeader},
    jwe::JsonWebEncryption,
    jwk::{JsonWebKey, JsonWebKeySet},
    jws::JsonWebSignature,
    jwt::JsonWebToken,
    verify::{Unverified, Verified},
};

/// Type alias to make `JsonWebSignature` easier to access.
pub type JWS = JsonWebSignature;

/// Type alias to make `JsonWebEncryption` easier to access.
pub type JWE = JsonWebEncryption;

/// Type alias to make `JsonWebToken` easier to access.
pub type JWT = JsonWebToken;
