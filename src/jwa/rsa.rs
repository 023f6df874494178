/// Digital Signature with RSASSA-PKCS1-v1_5 as defined in [section 3.3 of RFC
/// 7518]
///
/// [section 3.3 of RFC 7518]: <https://datatracker.ietf.org/doc/html/rfc7518#section-3.3>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RsassaPkcs1V1_5 {
    /// RSASSA-PKCS1-v1_5 using SHA-256
    Rs256,
    /// RSASSA-PKCS1-v1_5 using SHA-384
    Rs384,
    /// RSASSA-PKCS1-v1_5 using SHA-512
    Rs512,
}

impl From<RsassaPkcs1V1_5> for super::JsonWebSigningAlgorithm {
    fn from(x: RsassaPkcs1V1_5) -> Self {
        Self::RsassaPkcs1V1_5(x)
    }
}

/// Key Encryption with RSA as defined in [section 4.2] and [section 4.3] of
/// RFC 7518.
///
/// [section 4.2]: <https://datatracker.ietf.org/doc/html/rfc7518#section-4.2>
/// [section 4.3]: <https://datatracker.ietf.org/doc/html/rfc7518#section-4.3>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rsaes {
    /// RSAES-PKCS1-v1_5 (`RSA1_5`)
    Pkcs1V1_5,
    /// RSAES OAEP using default parameters (SHA-1, `RSA-OAEP`)
    Oaep,
    /// RSAES OAEP using SHA-256 and MGF1 with SHA-256 (`RSA-OAEP-256`)
    Oaep256,
}

impl From<Rsaes> for super::JsonWebEncryptionAlgorithm {
    fn from(x: Rsaes) -> Self {
        Self::Rsaes(x)
    }
}
