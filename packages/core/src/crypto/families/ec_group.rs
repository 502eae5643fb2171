//! Named elliptic-curve groups and the shared default-group policy.
//!
//! [`EcScalar`] and [`EcPoint`] wrap the per-curve RustCrypto types, so
//! ECDSA and ECDH are written once for every group listed here.

use crate::config::Config;
use crate::error::{CryptoError, Result};
use der::asn1::ObjectIdentifier;
use der::{Decode, Encode};
use p256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use rand_core::CryptoRngCore;
use zeroize::Zeroizing;

const SECP256R1_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7");
const SECP384R1_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.34");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcGroup {
    Secp256r1,
    Secp384r1,
}

impl EcGroup {
    pub const ALL: [EcGroup; 2] = [EcGroup::Secp256r1, EcGroup::Secp384r1];

    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "secp256r1" | "P-256" | "prime256v1" => Ok(EcGroup::Secp256r1),
            "secp384r1" | "P-384" => Ok(EcGroup::Secp384r1),
            _ => Err(CryptoError::InvalidArgument(format!(
                "Unknown or unsupported EC group '{}'",
                name
            ))),
        }
    }

    /// Group selection shared by every EC algorithm: explicit parameters
    /// win, otherwise the configured default applies.
    pub fn resolve(alg_name: &str, params: &str) -> Result<Self> {
        let group_id = if params.is_empty() {
            Config::global().default_ec_group.as_str()
        } else {
            params
        };

        tracing::debug!(
            target: "pubkey::registry",
            algorithm = %alg_name,
            group = %group_id,
            "Resolved EC group"
        );

        Self::from_name(group_id)
    }

    /// Decode the named-curve OID carried in an algorithm identifier.
    pub fn from_parameters(params: &[u8]) -> Result<Self> {
        let oid = ObjectIdentifier::from_der(params)?;
        Self::ALL
            .into_iter()
            .find(|group| group.oid() == oid)
            .ok_or_else(|| CryptoError::Decoding(format!("Unknown EC group OID {}", oid)))
    }

    fn oid(&self) -> ObjectIdentifier {
        match self {
            EcGroup::Secp256r1 => SECP256R1_OID,
            EcGroup::Secp384r1 => SECP384R1_OID,
        }
    }

    /// DER-encoded named-curve OID.
    pub fn parameters(&self) -> Vec<u8> {
        // OID encoding into a Vec cannot fail
        self.oid().to_der().unwrap_or_default()
    }

    pub fn name(&self) -> &'static str {
        match self {
            EcGroup::Secp256r1 => "secp256r1",
            EcGroup::Secp384r1 => "secp384r1",
        }
    }

    pub fn order_bits(&self) -> usize {
        match self {
            EcGroup::Secp256r1 => 256,
            EcGroup::Secp384r1 => 384,
        }
    }

    pub fn order_bytes(&self) -> usize {
        (self.order_bits() + 7) / 8
    }
}

// ============================================================================
// Scalars and points shared by ECDSA and ECDH
// ============================================================================

/// Private scalar in `[1, n)`.
pub enum EcScalar {
    P256(p256::SecretKey),
    P384(p384::SecretKey),
}

/// Public point, never the identity.
#[derive(Debug, Clone)]
pub enum EcPoint {
    P256(p256::PublicKey),
    P384(p384::PublicKey),
}

impl EcScalar {
    pub fn random(group: EcGroup, rng: &mut dyn CryptoRngCore) -> Self {
        let mut rng = rng;
        match group {
            EcGroup::Secp256r1 => EcScalar::P256(p256::SecretKey::random(&mut rng)),
            EcGroup::Secp384r1 => EcScalar::P384(p384::SecretKey::random(&mut rng)),
        }
    }

    /// Fixed-width big-endian encoding, exactly `order_bytes` long.
    pub fn from_bytes(group: EcGroup, bits: &[u8]) -> Result<Self> {
        if bits.len() != group.order_bytes() {
            return Err(CryptoError::Decoding(format!(
                "{} private key must be {} bytes, got {}",
                group.name(),
                group.order_bytes(),
                bits.len()
            )));
        }
        let invalid = |_: p256::elliptic_curve::Error| {
            CryptoError::Decoding(format!("Invalid {} private scalar", group.name()))
        };
        match group {
            EcGroup::Secp256r1 => p256::SecretKey::from_slice(bits)
                .map(EcScalar::P256)
                .map_err(invalid),
            EcGroup::Secp384r1 => p384::SecretKey::from_slice(bits)
                .map(EcScalar::P384)
                .map_err(invalid),
        }
    }

    pub fn group(&self) -> EcGroup {
        match self {
            EcScalar::P256(_) => EcGroup::Secp256r1,
            EcScalar::P384(_) => EcGroup::Secp384r1,
        }
    }

    pub fn to_bytes(&self) -> Zeroizing<Vec<u8>> {
        match self {
            EcScalar::P256(secret) => Zeroizing::new(secret.to_bytes().to_vec()),
            EcScalar::P384(secret) => Zeroizing::new(secret.to_bytes().to_vec()),
        }
    }

    pub fn public_point(&self) -> EcPoint {
        match self {
            EcScalar::P256(secret) => EcPoint::P256(secret.public_key()),
            EcScalar::P384(secret) => EcPoint::P384(secret.public_key()),
        }
    }

    /// Affine x-coordinate of `self * peer`.
    pub fn diffie_hellman(&self, peer: &EcPoint) -> Result<Zeroizing<Vec<u8>>> {
        match (self, peer) {
            (EcScalar::P256(secret), EcPoint::P256(point)) => {
                let shared =
                    p256::ecdh::diffie_hellman(secret.to_nonzero_scalar(), point.as_affine());
                Ok(Zeroizing::new(shared.raw_secret_bytes().to_vec()))
            }
            (EcScalar::P384(secret), EcPoint::P384(point)) => {
                let shared =
                    p384::ecdh::diffie_hellman(secret.to_nonzero_scalar(), point.as_affine());
                Ok(Zeroizing::new(shared.raw_secret_bytes().to_vec()))
            }
            _ => Err(CryptoError::Decoding(format!(
                "Peer point is on {}, expected {}",
                peer.group().name(),
                self.group().name()
            ))),
        }
    }

    /// ECDSA `r || s` over an already computed digest. The nonce follows
    /// RFC 6979.
    pub fn sign_prehash(&self, digest: &[u8]) -> Result<Vec<u8>> {
        let signing_error =
            |e: p256::ecdsa::Error| CryptoError::Internal(format!("ECDSA signing: {}", e));
        match self {
            EcScalar::P256(secret) => {
                let sig: p256::ecdsa::Signature = p256::ecdsa::SigningKey::from(secret)
                    .sign_prehash(digest)
                    .map_err(signing_error)?;
                Ok(sig.to_bytes().to_vec())
            }
            EcScalar::P384(secret) => {
                let sig: p384::ecdsa::Signature = p384::ecdsa::SigningKey::from(secret)
                    .sign_prehash(digest)
                    .map_err(signing_error)?;
                Ok(sig.to_bytes().to_vec())
            }
        }
    }
}

impl EcPoint {
    /// SEC1 point, compressed or uncompressed.
    pub fn from_sec1(group: EcGroup, bits: &[u8]) -> Result<Self> {
        let invalid = |_: p256::elliptic_curve::Error| {
            CryptoError::Decoding(format!("Invalid {} public point", group.name()))
        };
        match group {
            EcGroup::Secp256r1 => p256::PublicKey::from_sec1_bytes(bits)
                .map(EcPoint::P256)
                .map_err(invalid),
            EcGroup::Secp384r1 => p384::PublicKey::from_sec1_bytes(bits)
                .map(EcPoint::P384)
                .map_err(invalid),
        }
    }

    /// Uncompressed SEC1 encoding.
    pub fn to_sec1(&self) -> Vec<u8> {
        match self {
            EcPoint::P256(point) => point.to_encoded_point(false).as_bytes().to_vec(),
            EcPoint::P384(point) => point.to_encoded_point(false).as_bytes().to_vec(),
        }
    }

    pub fn group(&self) -> EcGroup {
        match self {
            EcPoint::P256(_) => EcGroup::Secp256r1,
            EcPoint::P384(_) => EcGroup::Secp384r1,
        }
    }

    /// Check an `r || s` signature over `digest`. Malformed signatures are
    /// simply invalid.
    pub fn verify_prehash(&self, digest: &[u8], sig: &[u8]) -> bool {
        match self {
            EcPoint::P256(point) => {
                let Ok(sig) = p256::ecdsa::Signature::from_slice(sig) else {
                    return false;
                };
                p256::ecdsa::VerifyingKey::from(point)
                    .verify_prehash(digest, &sig)
                    .is_ok()
            }
            EcPoint::P384(point) => {
                let Ok(sig) = p384::ecdsa::Signature::from_slice(sig) else {
                    return false;
                };
                p384::ecdsa::VerifyingKey::from(point)
                    .verify_prehash(digest, &sig)
                    .is_ok()
            }
        }
    }
}
