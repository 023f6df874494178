use alloc::vec::Vec;

use elliptic_curve::{
    generic_array::typenum::Unsigned as _,
    sec1::{EncodedPoint, FromEncodedPoint, ModulusSize, ToEncodedPoint},
    AffinePoint, CurveArithmetic, FieldBytes, FieldBytesSize, SecretKey,
};
use p256::NistP256;
use p384::NistP384;
use p521::NistP521;
use rand_core::OsRng;
use signature::{Signer as _, Verifier as _};
use zeroize::Zeroizing;

use super::BackendError;
use crate::crypto::{backend::interface::ec, ec::Curve, Result};

#[derive(Clone)]
enum ErasedPrivateKey {
    P256(SecretKey<NistP256>),
    P384(SecretKey<NistP384>),
    P521(SecretKey<NistP521>),
}

#[derive(Clone)]
enum ErasedPublicKey {
    P256(elliptic_curve::PublicKey<NistP256>),
    P384(elliptic_curve::PublicKey<NistP384>),
    P521(elliptic_curve::PublicKey<NistP521>),
}

fn to_field_bytes<C: elliptic_curve::Curve>(
    bytes: &[u8],
) -> Result<&FieldBytes<C>, BackendError> {
    if bytes.len() != C::FieldBytesSize::USIZE {
        return Err(BackendError::InvalidEcPoint {
            expected: C::FieldBytesSize::USIZE,
            actual: bytes.len(),
        });
    }

    Ok(FieldBytes::<C>::from_slice(bytes))
}

fn public_key_typed<C>(x: &[u8], y: &[u8]) -> Result<elliptic_curve::PublicKey<C>>
where
    C: CurveArithmetic,
    FieldBytesSize<C>: ModulusSize,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
{
    let x = to_field_bytes::<C>(x)?;
    let y = to_field_bytes::<C>(y)?;

    let point = EncodedPoint::<C>::from_affine_coordinates(x, y, false);
    let key: Option<_> = elliptic_curve::PublicKey::<C>::from_encoded_point(&point).into();
    Ok(key.ok_or(BackendError::InvalidEcKey)?)
}

fn private_key_typed<C>(x: &[u8], y: &[u8], d: &[u8]) -> Result<SecretKey<C>>
where
    C: CurveArithmetic,
    FieldBytesSize<C>: ModulusSize,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
{
    let public = public_key_typed::<C>(x, y)?;
    let secret = SecretKey::<C>::from_bytes(to_field_bytes::<C>(d)?)?;

    // the private scalar must belong to the public point that was given
    if secret.public_key().to_encoded_point(false) != public.to_encoded_point(false) {
        return Err(BackendError::InvalidEcKey.into());
    }

    Ok(secret)
}

fn point_of<C>(key: &elliptic_curve::PublicKey<C>) -> Result<(Vec<u8>, Vec<u8>)>
where
    C: CurveArithmetic,
    FieldBytesSize<C>: ModulusSize,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
{
    let point = key.to_encoded_point(false);
    match (point.x(), point.y()) {
        (Some(x), Some(y)) => Ok((x.to_vec(), y.to_vec())),
        _ => Err(BackendError::InvalidEcKey.into()),
    }
}

/// A low level private EC key.
#[derive(Clone)]
#[repr(transparent)]
pub(crate) struct PrivateKey {
    inner: ErasedPrivateKey,
}

impl ec::PrivateKey for PrivateKey {
    type PublicKey = PublicKey;

    fn new(curve: Curve, x: &[u8], y: &[u8], d: &[u8]) -> Result<Self> {
        let inner = match curve {
            Curve::P256 => ErasedPrivateKey::P256(private_key_typed::<NistP256>(x, y, d)?),
            Curve::P384 => ErasedPrivateKey::P384(private_key_typed::<NistP384>(x, y, d)?),
            Curve::P521 => ErasedPrivateKey::P521(private_key_typed::<NistP521>(x, y, d)?),
        };

        Ok(Self { inner })
    }

    fn generate(curve: Curve) -> Result<Self> {
        let mut rng = OsRng;

        let inner = match curve {
            Curve::P256 => ErasedPrivateKey::P256(SecretKey::random(&mut rng)),
            Curve::P384 => ErasedPrivateKey::P384(SecretKey::random(&mut rng)),
            Curve::P521 => ErasedPrivateKey::P521(SecretKey::random(&mut rng)),
        };

        Ok(Self { inner })
    }

    fn private_material(&self) -> Zeroizing<Vec<u8>> {
        let d = match &self.inner {
            ErasedPrivateKey::P256(key) => key.to_bytes().to_vec(),
            ErasedPrivateKey::P384(key) => key.to_bytes().to_vec(),
            ErasedPrivateKey::P521(key) => key.to_bytes().to_vec(),
        };
        Zeroizing::new(d)
    }

    fn to_public_key(&self) -> Self::PublicKey {
        let inner = match &self.inner {
            ErasedPrivateKey::P256(key) => ErasedPublicKey::P256(key.public_key()),
            ErasedPrivateKey::P384(key) => ErasedPublicKey::P384(key.public_key()),
            ErasedPrivateKey::P521(key) => ErasedPublicKey::P521(key.public_key()),
        };

        PublicKey { inner }
    }

    fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        let der = match &self.inner {
            ErasedPrivateKey::P256(key) => {
                let key = ecdsa::SigningKey::<NistP256>::from(key);
                let sig: ecdsa::Signature<NistP256> = key.try_sign(data)?;
                sig.to_der().as_bytes().to_vec()
            }
            ErasedPrivateKey::P384(key) => {
                let key = ecdsa::SigningKey::<NistP384>::from(key);
                let sig: ecdsa::Signature<NistP384> = key.try_sign(data)?;
                sig.to_der().as_bytes().to_vec()
            }
            ErasedPrivateKey::P521(key) => {
                // P-521 signs through its own newtype, which pins SHA-512
                let d = Zeroizing::new(key.to_bytes());
                let key = p521::ecdsa::SigningKey::from_bytes(&d)?;
                let sig: p521::ecdsa::Signature = key.try_sign(data)?;
                sig.to_der().as_bytes().to_vec()
            }
        };

        Ok(der)
    }
}

/// A low level public EC key.
#[derive(Clone)]
#[repr(transparent)]
pub(crate) struct PublicKey {
    inner: ErasedPublicKey,
}

impl ec::PublicKey for PublicKey {
    fn new(curve: Curve, x: &[u8], y: &[u8]) -> Result<Self> {
        let inner = match curve {
            Curve::P256 => ErasedPublicKey::P256(public_key_typed::<NistP256>(x, y)?),
            Curve::P384 => ErasedPublicKey::P384(public_key_typed::<NistP384>(x, y)?),
            Curve::P521 => ErasedPublicKey::P521(public_key_typed::<NistP521>(x, y)?),
        };

        Ok(Self { inner })
    }

    fn to_point(&self) -> Result<(Vec<u8>, Vec<u8>)> {
        match &self.inner {
            ErasedPublicKey::P256(key) => point_of(key),
            ErasedPublicKey::P384(key) => point_of(key),
            ErasedPublicKey::P521(key) => point_of(key),
        }
    }

    fn verify(&self, msg: &[u8], signature: &[u8]) -> bool {
        match &self.inner {
            ErasedPublicKey::P256(key) => {
                let Ok(sig) = ecdsa::Signature::<NistP256>::from_der(signature) else {
                    return false;
                };
                let key = ecdsa::VerifyingKey::<NistP256>::from(key);
                key.verify(msg, &sig).is_ok()
            }
            ErasedPublicKey::P384(key) => {
                let Ok(sig) = ecdsa::Signature::<NistP384>::from_der(signature) else {
                    return false;
                };
                let key = ecdsa::VerifyingKey::<NistP384>::from(key);
                key.verify(msg, &sig).is_ok()
            }
            ErasedPublicKey::P521(key) => {
                let Ok(sig) = p521::ecdsa::Signature::from_der(signature) else {
                    return false;
                };
                let Ok(key) = p521::ecdsa::VerifyingKey::from_affine(*key.as_affine()) else {
                    return false;
                };
                key.verify(msg, &sig).is_ok()
            }
        }
    }
}
