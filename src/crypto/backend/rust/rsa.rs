use alloc::vec::Vec;

use ::rsa::{
    traits::{PrivateKeyParts as _, PublicKeyParts as _},
    BigUint, Oaep, Pkcs1v15Encrypt, Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey,
};
use rand_core::OsRng;
use secrecy::{ExposeSecret as _, SecretSlice};
use sha2::Digest as _;
use zeroize::Zeroizing;

use super::BackendError;
use crate::{
    crypto::{backend::interface::rsa, Result},
    jwa::{Rsaes, RsassaPkcs1V1_5},
};

fn hash_for(alg: RsassaPkcs1V1_5, data: &[u8]) -> (Pkcs1v15Sign, Vec<u8>) {
    match alg {
        RsassaPkcs1V1_5::Rs256 => (
            Pkcs1v15Sign::new::<sha2::Sha256>(),
            sha2::Sha256::digest(data).to_vec(),
        ),
        RsassaPkcs1V1_5::Rs384 => (
            Pkcs1v15Sign::new::<sha2::Sha384>(),
            sha2::Sha384::digest(data).to_vec(),
        ),
        RsassaPkcs1V1_5::Rs512 => (
            Pkcs1v15Sign::new::<sha2::Sha512>(),
            sha2::Sha512::digest(data).to_vec(),
        ),
    }
}

fn secret_uint(x: Option<&BigUint>) -> Result<SecretSlice<u8>> {
    x.map(|x| SecretSlice::from(x.to_bytes_be()))
        .ok_or_else(|| BackendError::RsaNotPrecomputed.into())
}

/// A low level private RSA key.
#[derive(Clone)]
#[repr(transparent)]
pub(crate) struct PrivateKey {
    // WARN: It is important that the `inner` key always contains it's precomupted values.
    // It must be ensured that on each construction of this type, `precomputed` method is called
    inner: RsaPrivateKey,
}

impl rsa::PrivateKey for PrivateKey {
    type PublicKey = PublicKey;

    fn generate(bits: usize) -> Result<Self> {
        let mut key = RsaPrivateKey::new(&mut OsRng, bits)?;
        key.precompute()?;
        Ok(Self { inner: key })
    }

    fn from_components(
        pri: rsa::PrivateKeyComponents,
        pu: rsa::PublicKeyComponents,
    ) -> Result<Self> {
        let n = BigUint::from_bytes_be(&pu.n);
        let e = BigUint::from_bytes_be(&pu.e);
        let d = BigUint::from_bytes_be(pri.d.expose_secret());
        let p = BigUint::from_bytes_be(pri.prime.p.expose_secret());
        let q = BigUint::from_bytes_be(pri.prime.q.expose_secret());

        let mut key = RsaPrivateKey::from_components(n, e, d, alloc::vec![p, q])?;
        key.validate()?;
        key.precompute()?;
        Ok(Self { inner: key })
    }

    fn to_public_key(&self) -> Self::PublicKey {
        PublicKey {
            inner: self.inner.to_public_key(),
        }
    }

    fn private_components(
        &self,
    ) -> Result<(rsa::PrivateKeyComponents, rsa::PrivateKeyCrtComponents)> {
        let [p, q] = self.inner.primes() else {
            return Err(BackendError::RsaTwoPrimes.into());
        };

        let qi = self.inner.crt_coefficient().map(Zeroizing::new);

        Ok((
            rsa::PrivateKeyComponents {
                d: SecretSlice::from(self.inner.d().to_bytes_be()),
                prime: rsa::PrivateKeyPrimeComponents {
                    p: SecretSlice::from(p.to_bytes_be()),
                    q: SecretSlice::from(q.to_bytes_be()),
                },
            },
            rsa::PrivateKeyCrtComponents {
                dp: secret_uint(self.inner.dp())?,
                dq: secret_uint(self.inner.dq())?,
                qi: secret_uint(qi.as_deref())?,
            },
        ))
    }

    fn public_components(&self) -> rsa::PublicKeyComponents {
        rsa::PublicKeyComponents {
            n: self.inner.n().to_bytes_be(),
            e: self.inner.e().to_bytes_be(),
        }
    }

    fn sign(&self, alg: RsassaPkcs1V1_5, data: &[u8]) -> Result<Vec<u8>> {
        let (pad, hashed) = hash_for(alg, data);
        Ok(self.inner.sign_with_rng(&mut OsRng, pad, &hashed)?)
    }

    fn decrypt(&self, alg: Rsaes, data: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let mut rng = OsRng;

        let plain = match alg {
            Rsaes::Pkcs1V1_5 => self.inner.decrypt_blinded(&mut rng, Pkcs1v15Encrypt, data),
            Rsaes::Oaep => {
                self.inner
                    .decrypt_blinded(&mut rng, Oaep::new::<sha1::Sha1>(), data)
            }
            Rsaes::Oaep256 => {
                self.inner
                    .decrypt_blinded(&mut rng, Oaep::new::<sha2::Sha256>(), data)
            }
        };

        Ok(Zeroizing::new(plain?))
    }
}

/// A low level public RSA key.
#[derive(Clone)]
#[repr(transparent)]
pub(crate) struct PublicKey {
    inner: RsaPublicKey,
}

impl rsa::PublicKey for PublicKey {
    fn from_components(c: rsa::PublicKeyComponents) -> Result<Self> {
        let n = BigUint::from_bytes_be(&c.n);
        let e = BigUint::from_bytes_be(&c.e);
        let key = RsaPublicKey::new(n, e)?;

        Ok(Self { inner: key })
    }

    fn components(&self) -> rsa::PublicKeyComponents {
        rsa::PublicKeyComponents {
            n: self.inner.n().to_bytes_be(),
            e: self.inner.e().to_bytes_be(),
        }
    }

    fn verify(&self, alg: RsassaPkcs1V1_5, msg: &[u8], signature: &[u8]) -> bool {
        let (pad, hashed) = hash_for(alg, msg);
        self.inner.verify(pad, &hashed, signature).is_ok()
    }

    fn encrypt(&self, alg: Rsaes, data: &[u8]) -> Result<Vec<u8>> {
        let mut rng = OsRng;

        let res = match alg {
            Rsaes::Pkcs1V1_5 => self.inner.encrypt(&mut rng, Pkcs1v15Encrypt, data),
            Rsaes::Oaep => self
                .inner
                .encrypt(&mut rng, Oaep::new::<sha1::Sha1>(), data),
            Rsaes::Oaep256 => self
                .inner
                .encrypt(&mut rng, Oaep::new::<sha2::Sha256>(), data),
        };

        Ok(res?)
    }
}
