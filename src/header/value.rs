use core::ops::Deref;

/// A header parameter together with the part of the JOSE header it was found
/// in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderValue<T> {
    /// The value is integrity protected.
    Protected(T),
    /// The value came from an unprotected header.
    Unprotected(T),
}

impl<T> HeaderValue<T> {
    /// Converts from `&HeaderValue<T>` to `HeaderValue<&T>`.
    pub fn as_ref(&self) -> HeaderValue<&'_ T> {
        match self {
            HeaderValue::Protected(v) => HeaderValue::Protected(v),
            HeaderValue::Unprotected(v) => HeaderValue::Unprotected(v),
        }
    }

    /// Converts from `&HeaderValue<T>` to `HeaderValue<&T::Target>`.
    pub fn as_deref(&self) -> HeaderValue<&T::Target>
    where
        T: Deref,
    {
        self.as_ref().map(|v| v.deref())
    }

    /// Maps the inner value, keeping where it came from.
    pub fn map<U, F>(self, f: F) -> HeaderValue<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            HeaderValue::Protected(t) => HeaderValue::Protected(f(t)),
            HeaderValue::Unprotected(t) => HeaderValue::Unprotected(f(t)),
        }
    }

    /// Returns `true` if the value is integrity protected.
    pub const fn is_protected(&self) -> bool {
        matches!(self, Self::Protected(_))
    }

    /// The value, if it is protected.
    pub fn protected(self) -> Option<T> {
        match self {
            Self::Protected(p) => Some(p),
            Self::Unprotected(_) => None,
        }
    }

    /// The value, regardless of where it came from.
    pub fn into_inner(self) -> T {
        match self {
            Self::Protected(v) | Self::Unprotected(v) => v,
        }
    }
}

impl<T> HeaderValue<Option<T>> {
    /// Transpose a [`HeaderValue<Option<T>>`] into [`Option<HeaderValue<T>>`]
    pub fn transpose(self) -> Option<HeaderValue<T>> {
        Some(match self {
            HeaderValue::Protected(p) => HeaderValue::Protected(p?),
            HeaderValue::Unprotected(u) => HeaderValue::Unprotected(u?),
        })
    }
}
