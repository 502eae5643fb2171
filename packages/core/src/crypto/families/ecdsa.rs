//! ECDSA over the prime-order groups in [`EcGroup`].
//!
//! Signatures are `r || s`, two fixed-width parts; the DER wrapping is the
//! facade's business. The nonce is derived per RFC 6979, so the signing
//! rng goes unused.

use crate::crypto::alg_id::AlgorithmIdentifier;
use crate::crypto::families::ec_group::{EcGroup, EcPoint, EcScalar};
use crate::crypto::hash::{emsa1_hash, HashFunction, Hasher};
use crate::crypto::pk_keys::{check_provider, OpResult, PrivateKey, PublicKey};
use crate::crypto::pk_ops::{SignatureOp, VerificationOp};
use crate::error::Result;
use rand_core::CryptoRngCore;
use zeroize::Zeroizing;

pub const ALGORITHM_NAME: &str = "ECDSA";

pub struct EcdsaPublic {
    point: EcPoint,
}

impl EcdsaPublic {
    pub fn from_bits(alg_id: &AlgorithmIdentifier, key_bits: &[u8]) -> Result<Self> {
        let group = EcGroup::from_parameters(alg_id.parameters())?;
        Ok(Self {
            point: EcPoint::from_sec1(group, key_bits)?,
        })
    }
}

pub struct EcdsaPrivate {
    secret: EcScalar,
    point: EcPoint,
}

impl EcdsaPrivate {
    pub fn generate(rng: &mut dyn CryptoRngCore, group: EcGroup) -> Self {
        Self::from_secret(EcScalar::random(group, rng))
    }

    pub fn from_bits(alg_id: &AlgorithmIdentifier, key_bits: &[u8]) -> Result<Self> {
        let group = EcGroup::from_parameters(alg_id.parameters())?;
        Ok(Self::from_secret(EcScalar::from_bytes(group, key_bits)?))
    }

    fn from_secret(secret: EcScalar) -> Self {
        let point = secret.public_point();
        Self { secret, point }
    }
}

macro_rules! ecdsa_public_common {
    () => {
        fn algorithm_name(&self) -> &'static str {
            ALGORITHM_NAME
        }

        fn algorithm_identifier(&self) -> AlgorithmIdentifier {
            AlgorithmIdentifier::new(ALGORITHM_NAME, self.point.group().parameters())
        }

        fn public_key_bits(&self) -> Vec<u8> {
            self.point.to_sec1()
        }

        fn key_length(&self) -> usize {
            self.point.group().order_bits()
        }

        fn estimated_strength(&self) -> usize {
            self.point.group().order_bits() / 2
        }

        fn message_parts(&self) -> usize {
            2
        }

        fn message_part_size(&self) -> usize {
            self.point.group().order_bytes()
        }

        fn create_verification_op<'k>(
            &'k self,
            params: &str,
            provider: &str,
        ) -> OpResult<dyn VerificationOp + 'k> {
            check_provider(ALGORITHM_NAME, provider)?;
            let hash = emsa1_hash(ALGORITHM_NAME, params)?;
            Ok(Some(Box::new(EcdsaVerificationOp {
                key: &self.point,
                hash,
                hasher: hash.hasher(),
            })))
        }
    };
}

impl PublicKey for EcdsaPublic {
    ecdsa_public_common!();
}

impl PublicKey for EcdsaPrivate {
    ecdsa_public_common!();
}

impl PrivateKey for EcdsaPrivate {
    fn private_key_bits(&self) -> Zeroizing<Vec<u8>> {
        self.secret.to_bytes()
    }

    fn public_key(&self) -> Box<dyn PublicKey> {
        Box::new(EcdsaPublic {
            point: self.point.clone(),
        })
    }

    fn create_signature_op<'k>(
        &'k self,
        _rng: &mut dyn CryptoRngCore,
        params: &str,
        provider: &str,
    ) -> OpResult<dyn SignatureOp + 'k> {
        check_provider(ALGORITHM_NAME, provider)?;
        let hash = emsa1_hash(ALGORITHM_NAME, params)?;
        Ok(Some(Box::new(EcdsaSignatureOp {
            key: &self.secret,
            hash,
            hasher: hash.hasher(),
        })))
    }
}

struct EcdsaSignatureOp<'k> {
    key: &'k EcScalar,
    hash: HashFunction,
    hasher: Hasher,
}

impl SignatureOp for EcdsaSignatureOp<'_> {
    fn update(&mut self, msg: &[u8]) {
        self.hasher.update(msg);
    }

    fn sign(&mut self, _rng: &mut dyn CryptoRngCore) -> Result<Vec<u8>> {
        let digest = self.hasher.finalize_reset();
        self.key.sign_prehash(&digest)
    }

    fn signature_length(&self) -> usize {
        2 * self.key.group().order_bytes()
    }

    fn hash_function(&self) -> String {
        self.hash.name().to_string()
    }

    fn algorithm_identifier(&self) -> AlgorithmIdentifier {
        AlgorithmIdentifier::from_name(format!("{}/{}", ALGORITHM_NAME, self.hash.name()))
    }
}

struct EcdsaVerificationOp<'k> {
    key: &'k EcPoint,
    hash: HashFunction,
    hasher: Hasher,
}

impl VerificationOp for EcdsaVerificationOp<'_> {
    fn update(&mut self, msg: &[u8]) {
        self.hasher.update(msg);
    }

    fn is_valid_signature(&mut self, sig: &[u8]) -> Result<bool> {
        let digest = self.hasher.finalize_reset();
        Ok(self.key.verify_prehash(&digest, sig))
    }

    fn hash_function(&self) -> String {
        self.hash.name().to_string()
    }
}
