//! Ed25519 (pure EdDSA). The message is buffered until signing since the
//! scheme hashes it twice.

use crate::crypto::alg_id::AlgorithmIdentifier;
use crate::crypto::pk_keys::{check_provider, OpResult, PrivateKey, PublicKey};
use crate::crypto::pk_ops::{SignatureOp, VerificationOp};
use crate::error::{CryptoError, Result};
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey, SIGNATURE_LENGTH};
use rand_core::CryptoRngCore;
use zeroize::Zeroizing;

pub const ALGORITHM_NAME: &str = "Ed25519";

const KEY_LENGTH: usize = 32;

fn check_scheme(params: &str) -> Result<()> {
    match params {
        "" | "Pure" => Ok(()),
        _ => Err(CryptoError::unknown_scheme(ALGORITHM_NAME, params)),
    }
}

pub struct Ed25519Public {
    key: VerifyingKey,
}

impl Ed25519Public {
    pub fn from_bits(_alg_id: &AlgorithmIdentifier, key_bits: &[u8]) -> Result<Self> {
        let bytes: &[u8; KEY_LENGTH] = key_bits.try_into().map_err(|_| {
            CryptoError::Decoding(format!("Invalid Ed25519 public key length {}", key_bits.len()))
        })?;
        let key = VerifyingKey::from_bytes(bytes)
            .map_err(|e| CryptoError::Decoding(format!("Invalid Ed25519 public key: {}", e)))?;
        Ok(Self { key })
    }
}

pub struct Ed25519Private {
    key: SigningKey,
}

impl Ed25519Private {
    pub fn generate(rng: &mut dyn CryptoRngCore) -> Self {
        Self {
            key: SigningKey::generate(rng),
        }
    }

    pub fn from_bits(_alg_id: &AlgorithmIdentifier, key_bits: &[u8]) -> Result<Self> {
        let bytes: Zeroizing<[u8; KEY_LENGTH]> =
            Zeroizing::new(key_bits.try_into().map_err(|_| {
                CryptoError::Decoding(format!(
                    "Invalid Ed25519 private key length {}",
                    key_bits.len()
                ))
            })?);
        Ok(Self {
            key: SigningKey::from_bytes(&bytes),
        })
    }
}

trait Ed25519Verifying {
    fn verifying(&self) -> &VerifyingKey;
}

impl Ed25519Verifying for Ed25519Public {
    fn verifying(&self) -> &VerifyingKey {
        &self.key
    }
}

impl Ed25519Verifying for Ed25519Private {
    fn verifying(&self) -> &VerifyingKey {
        self.key.as_ref()
    }
}

macro_rules! ed25519_public_common {
    () => {
        fn algorithm_name(&self) -> &'static str {
            ALGORITHM_NAME
        }

        fn algorithm_identifier(&self) -> AlgorithmIdentifier {
            AlgorithmIdentifier::from_name(ALGORITHM_NAME)
        }

        fn public_key_bits(&self) -> Vec<u8> {
            self.verifying().to_bytes().to_vec()
        }

        fn key_length(&self) -> usize {
            255
        }

        fn estimated_strength(&self) -> usize {
            128
        }

        fn create_verification_op<'k>(
            &'k self,
            params: &str,
            provider: &str,
        ) -> OpResult<dyn VerificationOp + 'k> {
            check_provider(ALGORITHM_NAME, provider)?;
            check_scheme(params)?;
            Ok(Some(Box::new(Ed25519VerificationOp {
                key: self.verifying(),
                msg: Zeroizing::new(Vec::new()),
            })))
        }
    };
}

impl PublicKey for Ed25519Public {
    ed25519_public_common!();
}

impl PublicKey for Ed25519Private {
    ed25519_public_common!();
}

impl PrivateKey for Ed25519Private {
    fn private_key_bits(&self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(self.key.to_bytes().to_vec())
    }

    fn public_key(&self) -> Box<dyn PublicKey> {
        Box::new(Ed25519Public {
            key: self.key.verifying_key(),
        })
    }

    fn create_signature_op<'k>(
        &'k self,
        _rng: &mut dyn CryptoRngCore,
        params: &str,
        provider: &str,
    ) -> OpResult<dyn SignatureOp + 'k> {
        check_provider(ALGORITHM_NAME, provider)?;
        check_scheme(params)?;
        Ok(Some(Box::new(Ed25519SignatureOp {
            key: &self.key,
            msg: Zeroizing::new(Vec::new()),
        })))
    }
}

struct Ed25519SignatureOp<'k> {
    key: &'k SigningKey,
    msg: Zeroizing<Vec<u8>>,
}

impl SignatureOp for Ed25519SignatureOp<'_> {
    fn update(&mut self, msg: &[u8]) {
        self.msg.extend_from_slice(msg);
    }

    fn sign(&mut self, _rng: &mut dyn CryptoRngCore) -> Result<Vec<u8>> {
        let sig = self.key.sign(&self.msg);
        self.msg.clear();
        Ok(sig.to_bytes().to_vec())
    }

    fn signature_length(&self) -> usize {
        SIGNATURE_LENGTH
    }

    fn hash_function(&self) -> String {
        "SHA-512".to_string()
    }

    fn algorithm_identifier(&self) -> AlgorithmIdentifier {
        AlgorithmIdentifier::from_name(ALGORITHM_NAME)
    }
}

struct Ed25519VerificationOp<'k> {
    key: &'k VerifyingKey,
    msg: Zeroizing<Vec<u8>>,
}

impl VerificationOp for Ed25519VerificationOp<'_> {
    fn update(&mut self, msg: &[u8]) {
        self.msg.extend_from_slice(msg);
    }

    fn is_valid_signature(&mut self, sig: &[u8]) -> Result<bool> {
        let valid = match Signature::from_slice(sig) {
            Ok(sig) => self.key.verify_strict(&self.msg, &sig).is_ok(),
            Err(_) => false,
        };
        self.msg.clear();
        Ok(valid)
    }

    fn hash_function(&self) -> String {
        "SHA-512".to_string()
    }
}
