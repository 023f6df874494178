//! Compression of the JWE plaintext (`zip`).

use alloc::vec::Vec;

#[cfg(feature = "deflate")]
use crate::error::ParseError;
use crate::{error::ConfigurationError, jwa::JsonWebCompressionAlgorithm, Result};

/// The largest plaintext a compressed payload may inflate to.
pub const MAX_DECOMPRESSED_SIZE: usize = 4 * 1024 * 1024;

/// A compression algorithm that is applied before encryption.
///
/// Without the `deflate` feature this enum has no variants and every `zip`
/// value is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Compression {
    /// DEFLATE ([RFC 1951](https://datatracker.ietf.org/doc/html/rfc1951)).
    #[cfg(feature = "deflate")]
    Deflate,
}

impl Compression {
    /// The identifier of the `zip` parameter.
    pub fn algorithm(self) -> JsonWebCompressionAlgorithm {
        match self {
            #[cfg(feature = "deflate")]
            Self::Deflate => JsonWebCompressionAlgorithm::Deflate,
        }
    }

    #[cfg_attr(not(feature = "deflate"), allow(unused_variables))]
    pub(crate) fn compress(self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            #[cfg(feature = "deflate")]
            Self::Deflate => deflate::compress(data)
                .map_err(|_| ConfigurationError::Compression.into()),
        }
    }

    /// Inflates `data`, failing if the result would exceed
    /// [`MAX_DECOMPRESSED_SIZE`].
    #[cfg_attr(not(feature = "deflate"), allow(unused_variables))]
    pub(crate) fn decompress(self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            #[cfg(feature = "deflate")]
            Self::Deflate => deflate::decompress(data, MAX_DECOMPRESSED_SIZE)
                .map_err(|_| ParseError::Decompression.into()),
        }
    }
}

impl TryFrom<&JsonWebCompressionAlgorithm> for Compression {
    type Error = ConfigurationError;

    fn try_from(value: &JsonWebCompressionAlgorithm) -> Result<Self, Self::Error> {
        match value {
            #[cfg(feature = "deflate")]
            JsonWebCompressionAlgorithm::Deflate => Ok(Self::Deflate),
            other => Err(ConfigurationError::UnsupportedAlgorithm(
                alloc::string::ToString::to_string(other.name()),
            )),
        }
    }
}

#[cfg(feature = "deflate")]
mod deflate {
    use alloc::vec::Vec;
    use std::io::{self, Read as _, Write as _};

    use flate2::{read::DeflateDecoder, write::DeflateEncoder};

    pub(super) fn compress(data: &[u8]) -> io::Result<Vec<u8>> {
        let mut encoder = DeflateEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(data)?;
        encoder.finish()
    }

    pub(super) fn decompress(data: &[u8], limit: usize) -> io::Result<Vec<u8>> {
        let mut output = Vec::new();
        // one byte more than allowed tells a payload at the limit apart from
        // one that exceeds it
        DeflateDecoder::new(data)
            .take(limit as u64 + 1)
            .read_to_end(&mut output)?;

        if output.len() > limit {
            return Err(io::Error::other("decompressed payload exceeds the limit"));
        }
        Ok(output)
    }
}

#[cfg(all(test, feature = "deflate"))]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn roundtrip() {
        let data = b"hello hello hello hello hello hello".repeat(20);
        let compressed = Compression::Deflate.compress(&data).unwrap();
        assert!(compressed.len() < data.len());
        assert_eq!(Compression::Deflate.decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn limit() {
        let data = alloc::vec![0u8; MAX_DECOMPRESSED_SIZE + 1];
        let bomb = Compression::Deflate.compress(&data).unwrap();
        assert!(matches!(
            Compression::Deflate.decompress(&bomb),
            Err(Error::Parse(ParseError::Decompression))
        ));

        let data = alloc::vec![0u8; MAX_DECOMPRESSED_SIZE];
        let compressed = Compression::Deflate.compress(&data).unwrap();
        assert_eq!(
            Compression::Deflate.decompress(&compressed).unwrap().len(),
            MAX_DECOMPRESSED_SIZE
        );
    }

    #[test]
    fn unknown_algorithm() {
        let zip = JsonWebCompressionAlgorithm::Other("GZIP".into());
        assert!(Compression::try_from(&zip).is_err());
    }
}
