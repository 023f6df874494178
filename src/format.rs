//! The serialization formats a token can be encoded to and decoded from.
//!
//! There are two formats: [`Compact`], the `.` separated representation that
//! is used almost everywhere, and [`JsonFlattened`], the flattened JSON
//! serialization of RFC 7515 §7.2.2 and RFC 7516 §7.2.2.

mod compact;
mod json_flattened;

pub use self::{compact::Compact, json_flattened::JsonFlattened};
use crate::{sealed::Sealed, Result};

/// Encodes a token into the format `F`.
pub trait IntoFormat<F>: Sealed {
    /// Serializes `self` into `F`.
    ///
    /// # Errors
    ///
    /// Returns an error if the token can not be represented in `F`, e.g. an
    /// unencoded payload that contains a `.` in the compact format.
    fn into_format(&self) -> Result<F>;
}

/// Decodes a token from the format `F`.
pub trait FromFormat<F>: Sized + Sealed {
    /// Parses `input` into `Self`.
    ///
    /// Decoding never verifies or decrypts anything, it only checks the
    /// structure of the input.
    ///
    /// # Errors
    ///
    /// Returns an error if `input` is not a valid representation of `Self`.
    fn from_format(input: F) -> Result<Self>;
}

impl Sealed for Compact {}
impl Sealed for JsonFlattened {}
