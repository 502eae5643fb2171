//! Key traits and capability dispatch.
//!
//! Every algorithm family implements [`PublicKey`] and [`PrivateKey`]. The
//! `create_*_op` factories return `Ok(None)` by default, so a family only
//! overrides the capabilities that make sense for it. A facade that gets
//! `None` back refuses to be constructed.

use crate::crypto::alg_id::AlgorithmIdentifier;
use crate::crypto::pk_ops::{
    DecryptionOp, EncryptionOp, KemDecryptionOp, KemEncryptionOp, KeyAgreementOp, SignatureOp,
    VerificationOp,
};
use crate::error::{CryptoError, Result};
use rand_core::CryptoRngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Backends accepted by every family.
pub const SUPPORTED_PROVIDERS: &[&str] = &["base"];

/// Result of a capability factory: `Ok(None)` means "not supported".
pub type OpResult<T> = Result<Option<Box<T>>>;

/// Wire format of a multi-part signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignatureFormat {
    /// Parts concatenated as fixed-width big-endian integers.
    Standard,
    /// ASN.1 `SEQUENCE OF INTEGER`, one element per part.
    DerSequence,
}

pub trait PublicKey: Send + Sync {
    /// Family name used by the registry, e.g. `"ECDSA"`.
    fn algorithm_name(&self) -> &'static str;

    fn algorithm_identifier(&self) -> AlgorithmIdentifier;

    fn public_key_bits(&self) -> Vec<u8>;

    /// Size of the key in bits (modulus, group order, or parameter set).
    fn key_length(&self) -> usize;

    /// Approximate security level in bits.
    fn estimated_strength(&self) -> usize;

    /// Number of integers a signature is made of; ECDSA has two (r, s).
    fn message_parts(&self) -> usize {
        1
    }

    /// Byte width of each signature part.
    fn message_part_size(&self) -> usize {
        0
    }

    fn default_x509_signature_format(&self) -> SignatureFormat {
        if self.message_parts() >= 2 {
            SignatureFormat::DerSequence
        } else {
            SignatureFormat::Standard
        }
    }

    fn create_encryption_op<'k>(
        &'k self,
        _rng: &mut dyn CryptoRngCore,
        _padding: &str,
        _provider: &str,
    ) -> OpResult<dyn EncryptionOp + 'k> {
        Ok(None)
    }

    fn create_verification_op<'k>(
        &'k self,
        _params: &str,
        _provider: &str,
    ) -> OpResult<dyn VerificationOp + 'k> {
        Ok(None)
    }

    /// Verification op for a signature algorithm named in a certificate,
    /// e.g. `ECDSA/SHA-256`.
    fn create_x509_verification_op<'k>(
        &'k self,
        signature_algorithm: &AlgorithmIdentifier,
        provider: &str,
    ) -> OpResult<dyn VerificationOp + 'k> {
        if signature_algorithm.algorithm_name() != self.algorithm_name() {
            return Err(CryptoError::Decoding(format!(
                "Unexpected AlgorithmIdentifier '{}' for {} signature",
                signature_algorithm,
                self.algorithm_name()
            )));
        }
        self.create_verification_op(signature_algorithm.scheme().unwrap_or(""), provider)
    }

    fn create_kem_encryption_op<'k>(
        &'k self,
        _kdf: &str,
        _provider: &str,
    ) -> OpResult<dyn KemEncryptionOp + 'k> {
        Ok(None)
    }
}

pub trait PrivateKey: PublicKey {
    fn private_key_bits(&self) -> Zeroizing<Vec<u8>>;

    fn public_key(&self) -> Box<dyn PublicKey>;

    fn create_decryption_op<'k>(
        &'k self,
        _rng: &mut dyn CryptoRngCore,
        _padding: &str,
        _provider: &str,
    ) -> OpResult<dyn DecryptionOp + 'k> {
        Ok(None)
    }

    fn create_signature_op<'k>(
        &'k self,
        _rng: &mut dyn CryptoRngCore,
        _params: &str,
        _provider: &str,
    ) -> OpResult<dyn SignatureOp + 'k> {
        Ok(None)
    }

    fn create_key_agreement_op<'k>(
        &'k self,
        _rng: &mut dyn CryptoRngCore,
        _kdf: &str,
        _provider: &str,
    ) -> OpResult<dyn KeyAgreementOp + 'k> {
        Ok(None)
    }

    fn create_kem_decryption_op<'k>(
        &'k self,
        _rng: &mut dyn CryptoRngCore,
        _kdf: &str,
        _provider: &str,
    ) -> OpResult<dyn KemDecryptionOp + 'k> {
        Ok(None)
    }
}

/// Reject providers other than the built-in one.
pub(crate) fn check_provider(algorithm: &str, provider: &str) -> Result<()> {
    if provider.is_empty() || SUPPORTED_PROVIDERS.contains(&provider) {
        Ok(())
    } else {
        Err(CryptoError::ProviderNotFound(format!(
            "{} has no provider '{}'",
            algorithm, provider
        )))
    }
}
