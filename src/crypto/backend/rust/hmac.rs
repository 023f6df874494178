use alloc::vec::Vec;

use ::hmac::{Hmac, Mac as _};
use sha2::{Sha256, Sha384, Sha512};

use crate::{
    crypto::{backend::interface::hmac, Result},
    jwa,
};

/// One variant per hash, as the RustCrypto types are generic over it.
pub(crate) enum Mac {
    Sha256(Hmac<Sha256>),
    Sha384(Hmac<Sha384>),
    Sha512(Hmac<Sha512>),
}

impl hmac::Mac for Mac {
    fn new(variant: jwa::Hmac, key: &[u8]) -> Result<Self> {
        Ok(match variant {
            jwa::Hmac::Hs256 => Self::Sha256(Hmac::<Sha256>::new_from_slice(key)?),
            jwa::Hmac::Hs384 => Self::Sha384(Hmac::<Sha384>::new_from_slice(key)?),
            jwa::Hmac::Hs512 => Self::Sha512(Hmac::<Sha512>::new_from_slice(key)?),
        })
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Sha256(mac) => mac.update(data),
            Self::Sha384(mac) => mac.update(data),
            Self::Sha512(mac) => mac.update(data),
        }
    }

    fn finalize(self) -> Vec<u8> {
        match self {
            Self::Sha256(mac) => mac.finalize().into_bytes().to_vec(),
            Self::Sha384(mac) => mac.finalize().into_bytes().to_vec(),
            Self::Sha512(mac) => mac.finalize().into_bytes().to_vec(),
        }
    }
}
