use core::ops::Deref;

use crate::{format::FromFormat, Result};

/// This wrapper type represents any type that was parsed from user input,
/// but the data integrity was not verified, thus it might contain corrupted or
/// malicious data.
///
/// An [`Unverified`] JWS can be verified using
/// [`Unverified::<JsonWebSignature>::verify`](Unverified::verify).
#[derive(Debug, Clone)]
pub struct Unverified<T> {
    pub(crate) value: T,
}

impl<T> Unverified<T> {
    /// Parse the input format to an unverified representation of `T`.
    ///
    /// # Errors
    ///
    /// Returns an error if the input format has an invalid representation for
    /// the `T` type.
    pub fn decode<F>(input: F) -> Result<Self>
    where
        Self: FromFormat<F>,
    {
        Self::from_format(input)
    }

    /// Gives access to the unverified value.
    ///
    /// Nothing in it can be trusted, it is only meant for picking the key the
    /// value should be verified with.
    pub fn insecure_peek(&self) -> &T {
        &self.value
    }
}

impl<T> crate::sealed::Sealed for Unverified<T> {}

/// Wrapper type around a value whose integrity was checked.
#[derive(Debug, Clone)]
pub struct Verified<T>(pub(crate) T);

impl<T> Verified<T> {
    /// Turns self into it's inner `T`.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Verified<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
