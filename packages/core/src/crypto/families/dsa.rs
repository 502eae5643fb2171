//! DSA over the groups in [`DlGroup`].
//!
//! The algorithm identifier carries the domain parameters; key bits are the
//! bare DER integers `y` and `x`. Like ECDSA, signatures are two fixed-width
//! parts `r || s` with an RFC 6979 nonce.

use crate::crypto::alg_id::AlgorithmIdentifier;
use crate::crypto::families::dl_group::{
    decode_integer, decode_parameters, encode_integer, encode_parameters, DlGroup,
};
use crate::crypto::hash::{emsa1_hash, HashFunction, Hasher};
use crate::crypto::pk_keys::{check_provider, OpResult, PrivateKey, PublicKey};
use crate::crypto::pk_ops::{SignatureOp, VerificationOp};
use crate::crypto::pubkey::der_sig::der_encode_signature;
use crate::error::{CryptoError, Result};
use ::dsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use ::dsa::{BigUint, Signature, SigningKey, VerifyingKey};
use rand_core::CryptoRngCore;
use zeroize::Zeroizing;

pub const ALGORITHM_NAME: &str = "DSA";

pub struct DsaPublic {
    key: VerifyingKey,
}

impl DsaPublic {
    pub fn from_bits(alg_id: &AlgorithmIdentifier, key_bits: &[u8]) -> Result<Self> {
        let components = decode_parameters(alg_id.parameters())?;
        let y = decode_integer(key_bits)?;
        let key = VerifyingKey::from_components(components, y)
            .map_err(|_| CryptoError::Decoding("Invalid DSA public key".to_string()))?;
        Ok(Self { key })
    }
}

pub struct DsaPrivate {
    key: SigningKey,
}

impl DsaPrivate {
    pub fn generate(rng: &mut dyn CryptoRngCore, group: DlGroup) -> Self {
        let components = group.components(rng);
        let mut rng = rng;
        Self {
            key: SigningKey::generate(&mut rng, components),
        }
    }

    pub fn from_bits(alg_id: &AlgorithmIdentifier, key_bits: &[u8]) -> Result<Self> {
        let components = decode_parameters(alg_id.parameters())?;
        let x = Zeroizing::new(decode_integer(key_bits)?);
        let y = components.g().modpow(&x, components.p());
        let public = VerifyingKey::from_components(components, y)
            .map_err(|_| CryptoError::Decoding("Invalid DSA key".to_string()))?;
        let key = SigningKey::from_components(public, (*x).clone())
            .map_err(|_| CryptoError::Decoding("Invalid DSA private key".to_string()))?;
        Ok(Self { key })
    }
}

/// Big-endian `n` left-padded to `width` bytes.
fn to_fixed(n: &BigUint, width: usize) -> Vec<u8> {
    let bytes = n.to_bytes_be();
    let mut out = vec![0u8; width.saturating_sub(bytes.len())];
    out.extend_from_slice(&bytes);
    out
}

/// Leftmost `q` bytes of the digest.
fn truncate_digest(digest: &[u8], q_bytes: usize) -> &[u8] {
    &digest[..digest.len().min(q_bytes)]
}

fn q_bytes(key: &VerifyingKey) -> usize {
    (key.components().q().bits() + 7) / 8
}

/// NIST SP 800-57 comparable strengths for `p`, capped by half of `q`.
fn dl_work_factor(p_bits: usize, q_bits: usize) -> usize {
    let p_strength = match p_bits {
        b if b >= 15360 => 256,
        b if b >= 7680 => 192,
        b if b >= 3072 => 128,
        b if b >= 2048 => 112,
        b if b >= 1024 => 80,
        _ => 0,
    };
    p_strength.min(q_bits / 2)
}

/// Access to the public half, shared by both key types.
trait DsaPublicParts {
    fn dsa_public(&self) -> &VerifyingKey;
}

impl DsaPublicParts for DsaPublic {
    fn dsa_public(&self) -> &VerifyingKey {
        &self.key
    }
}

impl DsaPublicParts for DsaPrivate {
    fn dsa_public(&self) -> &VerifyingKey {
        self.key.verifying_key()
    }
}

macro_rules! dsa_public_common {
    () => {
        fn algorithm_name(&self) -> &'static str {
            ALGORITHM_NAME
        }

        fn algorithm_identifier(&self) -> AlgorithmIdentifier {
            AlgorithmIdentifier::new(
                ALGORITHM_NAME,
                encode_parameters(self.dsa_public().components()),
            )
        }

        fn public_key_bits(&self) -> Vec<u8> {
            encode_integer(self.dsa_public().y())
        }

        fn key_length(&self) -> usize {
            self.dsa_public().components().p().bits()
        }

        fn estimated_strength(&self) -> usize {
            let components = self.dsa_public().components();
            dl_work_factor(components.p().bits(), components.q().bits())
        }

        fn message_parts(&self) -> usize {
            2
        }

        fn message_part_size(&self) -> usize {
            q_bytes(self.dsa_public())
        }

        fn create_verification_op<'k>(
            &'k self,
            params: &str,
            provider: &str,
        ) -> OpResult<dyn VerificationOp + 'k> {
            check_provider(ALGORITHM_NAME, provider)?;
            let hash = emsa1_hash(ALGORITHM_NAME, params)?;
            Ok(Some(Box::new(DsaVerificationOp {
                key: self.dsa_public(),
                hash,
                hasher: hash.hasher(),
            })))
        }
    };
}

impl PublicKey for DsaPublic {
    dsa_public_common!();
}

impl PublicKey for DsaPrivate {
    dsa_public_common!();
}

impl PrivateKey for DsaPrivate {
    fn private_key_bits(&self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(encode_integer(self.key.x()))
    }

    fn public_key(&self) -> Box<dyn PublicKey> {
        Box::new(DsaPublic {
            key: self.key.verifying_key().clone(),
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
        Ok(Some(Box::new(DsaSignatureOp {
            key: &self.key,
            hash,
            hasher: hash.hasher(),
        })))
    }
}

struct DsaSignatureOp<'k> {
    key: &'k SigningKey,
    hash: HashFunction,
    hasher: Hasher,
}

impl SignatureOp for DsaSignatureOp<'_> {
    fn update(&mut self, msg: &[u8]) {
        self.hasher.update(msg);
    }

    fn sign(&mut self, _rng: &mut dyn CryptoRngCore) -> Result<Vec<u8>> {
        let digest = self.hasher.finalize_reset();
        let width = q_bytes(self.key.verifying_key());
        let sig: Signature = self
            .key
            .sign_prehash(truncate_digest(&digest, width))
            .map_err(|e| CryptoError::Internal(format!("DSA signing failed: {}", e)))?;

        let mut out = to_fixed(sig.r(), width);
        out.extend_from_slice(&to_fixed(sig.s(), width));
        Ok(out)
    }

    fn signature_length(&self) -> usize {
        2 * q_bytes(self.key.verifying_key())
    }

    fn hash_function(&self) -> String {
        self.hash.name().to_string()
    }

    fn algorithm_identifier(&self) -> AlgorithmIdentifier {
        AlgorithmIdentifier::from_name(format!("{}/{}", ALGORITHM_NAME, self.hash.name()))
    }
}

struct DsaVerificationOp<'k> {
    key: &'k VerifyingKey,
    hash: HashFunction,
    hasher: Hasher,
}

impl VerificationOp for DsaVerificationOp<'_> {
    fn update(&mut self, msg: &[u8]) {
        self.hasher.update(msg);
    }

    fn is_valid_signature(&mut self, sig: &[u8]) -> Result<bool> {
        let digest = self.hasher.finalize_reset();
        let width = q_bytes(self.key);
        if sig.len() != 2 * width {
            return Ok(false);
        }

        let Ok(sig) = der_encode_signature(sig, 2, width)
            .map_err(|_| ())
            .and_then(|der| Signature::try_from(der.as_slice()).map_err(|_| ()))
        else {
            return Ok(false);
        };
        Ok(self
            .key
            .verify_prehash(truncate_digest(&digest, width), &sig)
            .is_ok())
    }

    fn hash_function(&self) -> String {
        self.hash.name().to_string()
    }
}
