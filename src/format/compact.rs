use alloc::{
    borrow::ToOwned,
    string::{String, ToString},
    vec::Vec,
};
use core::{convert::Infallible, fmt, str::FromStr};

use crate::{
    base64_url::{self, NoBase64UrlString},
    error::ParseError,
    Base64UrlString,
};

/// The compact representation is essentially a list of Base64Url
/// strings that are separated by `.`.
///
/// The parts are kept exactly as they appeared on the wire, because the
/// protected header segment is part of the signing input and the AAD, and an
/// unencoded JWS payload is no Base64Url at all. A part is only decoded when it
/// is accessed via [`Compact::decode_part`].
///
/// # Examples
///
/// ```
/// # use jwx::format::Compact;
/// let compact: Compact = "abc.def.ghi".parse().unwrap();
///
/// assert_eq!(compact.len(), 3);
/// assert_eq!(compact.part(1), Some("def"));
/// assert_eq!(compact.to_string(), "abc.def.ghi");
/// ```
#[derive(Default, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Compact {
    parts: Vec<String>,
}

impl Compact {
    /// Creates an empty compact representation.
    pub const fn new() -> Self {
        Self { parts: Vec::new() }
    }

    pub(crate) fn with_capacity(cap: usize) -> Self {
        Compact {
            parts: Vec::with_capacity(cap),
        }
    }

    /// Encodes `part` as Base64Url and appends it.
    pub(crate) fn push(&mut self, part: impl AsRef<[u8]>) {
        self.parts.push(Base64UrlString::encode(part).into_inner());
    }

    /// Appends a part that is already in its wire representation.
    pub(crate) fn push_raw(&mut self, part: impl Into<String>) {
        self.parts.push(part.into());
    }

    /// Returns the part at `idx` as it appears on the wire.
    pub fn part(&self, idx: usize) -> Option<&str> {
        self.parts.get(idx).map(String::as_str)
    }

    /// Decodes the part at `idx` from Base64Url. A part that does not exist
    /// decodes to nothing.
    pub(crate) fn decode_part(&self, idx: usize) -> Result<Vec<u8>, NoBase64UrlString> {
        self.part(idx).map_or(Ok(Vec::new()), base64_url::decode)
    }

    /// Fails unless there are exactly `expected` parts.
    pub(crate) fn expect_len(&self, expected: usize) -> Result<(), ParseError> {
        match self.len() {
            actual if actual == expected => Ok(()),
            actual => Err(ParseError::SegmentCount { expected, actual }),
        }
    }

    /// The number of parts.
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Returns `true` if there are no parts at all.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl From<&str> for Compact {
    fn from(s: &str) -> Self {
        let parts = s.split('.').map(ToOwned::to_owned).collect();
        Self { parts }
    }
}

impl FromStr for Compact {
    type Err = Infallible;

    /// Splits the string at every `.`, the parts themselves are validated
    /// when they are decoded.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for Compact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, part) in self.parts.iter().enumerate() {
            if idx != 0 {
                f.write_str(".")?;
            }
            f.write_str(part)?;
        }

        Ok(())
    }
}

impl From<Compact> for String {
    fn from(compact: Compact) -> Self {
        compact.to_string()
    }
}
