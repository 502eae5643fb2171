//! Signature facades.
//!
//! A [`Signer`] or [`Verifier`] digests a message through any number of
//! `update` calls and is finalized by producing or checking one signature.
//! Multi-part signatures (ECDSA `r, s`) can be exchanged either as the raw
//! concatenation or as a DER sequence; the verifier only accepts the DER
//! form when it is the canonical encoding of the parts it carries.

use crate::crypto::alg_id::AlgorithmIdentifier;
use crate::crypto::pk_keys::{PrivateKey, PublicKey, SignatureFormat};
use crate::crypto::pk_ops::{SignatureOp, VerificationOp};
use crate::crypto::pubkey::der_sig::{decode_der_signature, der_encode_signature};
use crate::error::{CryptoError, Result};
use rand_core::CryptoRngCore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FacadeState {
    Updating,
    Finalized,
}

fn check_format(alg_name: &str, format: SignatureFormat, parts: usize) -> Result<()> {
    if format == SignatureFormat::DerSequence && parts == 1 {
        return Err(CryptoError::InvalidArgument(format!(
            "{} signatures are a single part and cannot use the DER sequence format",
            alg_name
        )));
    }
    Ok(())
}

fn finalized() -> CryptoError {
    CryptoError::InvalidState("Signature facade already finalized".to_string())
}

pub struct Signer<'k> {
    op: Box<dyn SignatureOp + 'k>,
    format: SignatureFormat,
    parts: usize,
    part_size: usize,
    state: FacadeState,
}

impl<'k> Signer<'k> {
    pub fn new<K: PrivateKey + ?Sized>(
        key: &'k K,
        rng: &mut dyn CryptoRngCore,
        scheme: &str,
        format: SignatureFormat,
        provider: &str,
    ) -> Result<Self> {
        use tracing::debug;

        let alg_name = key.algorithm_name();
        let parts = key.message_parts();
        check_format(alg_name, format, parts)?;

        let op = key
            .create_signature_op(rng, scheme, provider)?
            .ok_or_else(|| CryptoError::unsupported(alg_name, "signature generation"))?;

        debug!(
            target: "pubkey::sign",
            algorithm = %alg_name,
            scheme = %scheme,
            format = ?format,
            "Created signer"
        );

        Ok(Self {
            op,
            format,
            parts,
            part_size: key.message_part_size(),
            state: FacadeState::Updating,
        })
    }

    pub fn update(&mut self, msg: &[u8]) -> Result<()> {
        if self.state == FacadeState::Finalized {
            return Err(finalized());
        }
        self.op.update(msg);
        Ok(())
    }

    /// Sign everything passed to `update`. The signer cannot be reused.
    pub fn signature(&mut self, rng: &mut dyn CryptoRngCore) -> Result<Vec<u8>> {
        if self.state == FacadeState::Finalized {
            return Err(finalized());
        }
        self.state = FacadeState::Finalized;

        let sig = self.op.sign(rng)?;
        match self.format {
            SignatureFormat::Standard => Ok(sig),
            SignatureFormat::DerSequence => {
                der_encode_signature(&sig, self.parts, self.part_size)
            }
        }
    }

    pub fn sign_message(&mut self, msg: &[u8], rng: &mut dyn CryptoRngCore) -> Result<Vec<u8>> {
        self.update(msg)?;
        self.signature(rng)
    }

    /// Exact for the standard format, an upper bound for DER.
    pub fn signature_length(&self) -> usize {
        let sig_len = self.op.signature_length();
        match self.format {
            SignatureFormat::Standard => sig_len,
            // tag + length per integer, sign padding, and the outer header
            SignatureFormat::DerSequence => sig_len + 8 + 4 * self.parts,
        }
    }

    pub fn hash_function(&self) -> String {
        self.op.hash_function()
    }

    pub fn algorithm_identifier(&self) -> AlgorithmIdentifier {
        self.op.algorithm_identifier()
    }
}

pub struct Verifier<'k> {
    op: Box<dyn VerificationOp + 'k>,
    alg_name: &'static str,
    format: SignatureFormat,
    parts: usize,
    part_size: usize,
    state: FacadeState,
}

impl<'k> Verifier<'k> {
    pub fn new<K: PublicKey + ?Sized>(
        key: &'k K,
        scheme: &str,
        format: SignatureFormat,
        provider: &str,
    ) -> Result<Self> {
        let op = key
            .create_verification_op(scheme, provider)?
            .ok_or_else(|| CryptoError::unsupported(key.algorithm_name(), "verification"))?;
        Self::with_op(key, op, scheme, format)
    }

    /// Verifier for a certificate signature, in the key's X.509 format.
    pub fn new_x509<K: PublicKey + ?Sized>(
        key: &'k K,
        signature_algorithm: &AlgorithmIdentifier,
        provider: &str,
    ) -> Result<Self> {
        let op = key
            .create_x509_verification_op(signature_algorithm, provider)?
            .ok_or_else(|| CryptoError::unsupported(key.algorithm_name(), "X.509 verification"))?;
        Self::with_op(
            key,
            op,
            signature_algorithm.to_formatted_string(),
            key.default_x509_signature_format(),
        )
    }

    fn with_op<K: PublicKey + ?Sized>(
        key: &K,
        op: Box<dyn VerificationOp + 'k>,
        scheme: &str,
        format: SignatureFormat,
    ) -> Result<Self> {
        use tracing::debug;

        let alg_name = key.algorithm_name();
        let parts = key.message_parts();
        check_format(alg_name, format, parts)?;

        debug!(
            target: "pubkey::sign",
            algorithm = %alg_name,
            scheme = %scheme,
            format = ?format,
            "Created verifier"
        );

        Ok(Self {
            op,
            alg_name,
            format,
            parts,
            part_size: key.message_part_size(),
            state: FacadeState::Updating,
        })
    }

    pub fn set_input_format(&mut self, format: SignatureFormat) -> Result<()> {
        check_format(self.alg_name, format, self.parts)?;
        self.format = format;
        Ok(())
    }

    pub fn update(&mut self, msg: &[u8]) -> Result<()> {
        if self.state == FacadeState::Finalized {
            return Err(finalized());
        }
        self.op.update(msg);
        Ok(())
    }

    /// Check `sig` over everything passed to `update`.
    ///
    /// Never fails: malformed signatures, encoding errors and reuse after
    /// finalization all read as `false`.
    pub fn check_signature(&mut self, sig: &[u8]) -> bool {
        if self.state == FacadeState::Finalized {
            return false;
        }
        self.state = FacadeState::Finalized;
        self.check(sig).unwrap_or(false)
    }

    pub fn verify_message(&mut self, msg: &[u8], sig: &[u8]) -> bool {
        self.update(msg).is_ok() && self.check_signature(sig)
    }

    pub fn hash_function(&self) -> String {
        self.op.hash_function()
    }

    fn check(&mut self, sig: &[u8]) -> Result<bool> {
        match self.format {
            SignatureFormat::Standard => self.op.is_valid_signature(sig),
            SignatureFormat::DerSequence => {
                let decoded = decode_der_signature(sig, self.parts, self.part_size)?;
                let valid = self.op.is_valid_signature(&decoded.raw)?;
                Ok(bool::from(decoded.canonical) && valid)
            }
        }
    }
}
