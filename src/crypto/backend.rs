//! The actual implementations for the cryptographic backends.
//!
//! There is only the RustCrypto backend, everything above this module talks to
//! it through the traits in [`interface`].

pub(crate) mod interface;

mod rust;
pub(crate) use rust::*;
