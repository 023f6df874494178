/// Authenticated encryption algorithms built using a composition of AES in
/// Cipher Block Chaining (CBC) mode and HMAC as defined in [section 5.2 of RFC
/// 7518]
///
/// [section 5.2 of RFC 7518]: <https://datatracker.ietf.org/doc/html/rfc7518#section-5.2>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AesCbcHs {
    /// AES_128_CBC_HMAC_SHA_256 authenticated encryption as defined in [section
    /// 5.2.3]
    ///
    /// [section 5.2.3]: <https://datatracker.ietf.org/doc/html/rfc7518#section-5.2.3>
    Aes128CbcHs256,
    /// AES_192_CBC_HMAC_SHA_384 authenticated encryption algorithm as defined
    /// in [section 5.2.4]
    ///
    /// [section 5.2.4]: <https://datatracker.ietf.org/doc/html/rfc7518#section-5.2.4>
    Aes192CbcHs384,
    /// AES_256_CBC_HMAC_SHA_512 authenticated encryption algorithm as defined
    /// in [section 5.2.5]
    ///
    /// [section 5.2.5]: <https://datatracker.ietf.org/doc/html/rfc7518#section-5.2.5>
    Aes256CbcHs512,
}

impl AesCbcHs {
    /// The size of the combined MAC and encryption key in bytes.
    pub const fn key_size(self) -> usize {
        match self {
            Self::Aes128CbcHs256 => 32,
            Self::Aes192CbcHs384 => 48,
            Self::Aes256CbcHs512 => 64,
        }
    }

    /// The HMAC used for the authentication tag.
    pub const fn hmac(self) -> super::Hmac {
        match self {
            Self::Aes128CbcHs256 => super::Hmac::Hs256,
            Self::Aes192CbcHs384 => super::Hmac::Hs384,
            Self::Aes256CbcHs512 => super::Hmac::Hs512,
        }
    }
}
