//! The interfaces for EC keys.

use alloc::vec::Vec;

use zeroize::Zeroizing;

use crate::crypto::{ec::Curve, Result};

/// The common operations for a curve-generic EC public key.
pub(crate) trait PublicKey: Sized + Clone {
    /// Creates a new public key from the given affine coordinates.
    fn new(curve: Curve, x: &[u8], y: &[u8]) -> Result<Self>;

    /// Returns the (x, y) coordinates of the public key, each as wide as the
    /// field of the curve.
    fn to_point(&self) -> Result<(Vec<u8>, Vec<u8>)>;

    /// Verifies an ASN.1 DER encoded ECDSA signature over `msg`.
    ///
    /// Returns `true` if the signature is valid, `false` otherwise.
    fn verify(&self, msg: &[u8], signature: &[u8]) -> bool;
}

/// The common operations for a curve-generic EC private key.
pub(crate) trait PrivateKey: Sized + Clone {
    /// The public key type.
    type PublicKey: PublicKey;

    /// Creates a new private key from the given data, checking that `d`
    /// belongs to the point `(x, y)`.
    fn new(curve: Curve, x: &[u8], y: &[u8], d: &[u8]) -> Result<Self>;

    /// Generates a new secure random private key.
    fn generate(curve: Curve) -> Result<Self>;

    /// Returns the private scalar of this key.
    fn private_material(&self) -> Zeroizing<Vec<u8>>;

    /// Returns the public key of this private key.
    fn to_public_key(&self) -> Self::PublicKey;

    /// Signs the given data using deterministic ECDSA ([RFC 6979]) and the
    /// hash of the curve, returning the ASN.1 DER encoded signature.
    ///
    /// [RFC 6979]: <https://www.rfc-editor.org/rfc/rfc6979>
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>>;
}
