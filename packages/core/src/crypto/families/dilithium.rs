//! CRYSTALS-Dilithium (round 3) signatures.
//!
//! Like Kyber, the parameter set is part of the algorithm name
//! (`Dilithium-6x5-r3`). Signing is over the whole message, so it is
//! buffered until `sign`.

use crate::crypto::alg_id::AlgorithmIdentifier;
use crate::crypto::pk_keys::{check_provider, OpResult, PrivateKey, PublicKey};
use crate::crypto::pk_ops::{SignatureOp, VerificationOp};
use crate::error::{CryptoError, Result};
use pqcrypto_dilithium::{dilithium2, dilithium3, dilithium5};
use pqcrypto_traits::sign::{DetachedSignature as _, PublicKey as _, SecretKey as _};
use rand_core::CryptoRngCore;
use zeroize::Zeroizing;

pub const ALGORITHM_NAME: &str = "Dilithium";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DilithiumMode {
    Dilithium4x4R3,
    Dilithium6x5R3,
    Dilithium8x7R3,
}

macro_rules! with_dilithium_mode {
    ($mode:expr, $m:ident => $body:expr) => {
        match $mode {
            DilithiumMode::Dilithium4x4R3 => {
                use dilithium2 as $m;
                $body
            }
            DilithiumMode::Dilithium6x5R3 => {
                use dilithium3 as $m;
                $body
            }
            DilithiumMode::Dilithium8x7R3 => {
                use dilithium5 as $m;
                $body
            }
        }
    };
}

impl DilithiumMode {
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "Dilithium-4x4-r3" => Ok(DilithiumMode::Dilithium4x4R3),
            "Dilithium-6x5-r3" => Ok(DilithiumMode::Dilithium6x5R3),
            "Dilithium-8x7-r3" => Ok(DilithiumMode::Dilithium8x7R3),
            _ => Err(CryptoError::InvalidArgument(format!(
                "Unknown Dilithium mode '{}'",
                name
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DilithiumMode::Dilithium4x4R3 => "Dilithium-4x4-r3",
            DilithiumMode::Dilithium6x5R3 => "Dilithium-6x5-r3",
            DilithiumMode::Dilithium8x7R3 => "Dilithium-8x7-r3",
        }
    }

    /// NIST security categories 2, 3 and 5.
    fn strength(&self) -> usize {
        match self {
            DilithiumMode::Dilithium4x4R3 => 128,
            DilithiumMode::Dilithium6x5R3 => 192,
            DilithiumMode::Dilithium8x7R3 => 256,
        }
    }

    fn public_key_bytes(&self) -> usize {
        with_dilithium_mode!(self, m => m::public_key_bytes())
    }

    fn secret_key_bytes(&self) -> usize {
        with_dilithium_mode!(self, m => m::secret_key_bytes())
    }

    fn signature_bytes(&self) -> usize {
        with_dilithium_mode!(self, m => m::signature_bytes())
    }
}

fn check_scheme(params: &str) -> Result<()> {
    match params {
        "" | "Deterministic" => Ok(()),
        _ => Err(CryptoError::unknown_scheme(ALGORITHM_NAME, params)),
    }
}

fn mode_of(alg_id: &AlgorithmIdentifier) -> Result<DilithiumMode> {
    DilithiumMode::from_name(alg_id.algorithm_name())
        .map_err(|e| CryptoError::Decoding(e.to_string()))
}

pub struct DilithiumPublic {
    mode: DilithiumMode,
    public: Vec<u8>,
}

impl DilithiumPublic {
    pub fn from_bits(alg_id: &AlgorithmIdentifier, key_bits: &[u8]) -> Result<Self> {
        let mode = mode_of(alg_id)?;
        if key_bits.len() != mode.public_key_bytes() {
            return Err(CryptoError::Decoding(format!(
                "Invalid {} public key length {}",
                mode.name(),
                key_bits.len()
            )));
        }
        Ok(Self {
            mode,
            public: key_bits.to_vec(),
        })
    }
}

pub struct DilithiumPrivate {
    mode: DilithiumMode,
    public: Vec<u8>,
    secret: Zeroizing<Vec<u8>>,
}

impl DilithiumPrivate {
    pub fn generate(mode: DilithiumMode) -> Self {
        let (public, secret) = with_dilithium_mode!(mode, m => {
            let (pk, sk) = m::keypair();
            (pk.as_bytes().to_vec(), Zeroizing::new(sk.as_bytes().to_vec()))
        });
        Self {
            mode,
            public,
            secret,
        }
    }

    /// Private key bits are `sk || pk`.
    pub fn from_bits(alg_id: &AlgorithmIdentifier, key_bits: &[u8]) -> Result<Self> {
        let mode = mode_of(alg_id)?;
        let sk_len = mode.secret_key_bytes();
        if key_bits.len() != sk_len + mode.public_key_bytes() {
            return Err(CryptoError::Decoding(format!(
                "Invalid {} private key length {}",
                mode.name(),
                key_bits.len()
            )));
        }
        let (secret, public) = key_bits.split_at(sk_len);
        Ok(Self {
            mode,
            public: public.to_vec(),
            secret: Zeroizing::new(secret.to_vec()),
        })
    }
}

macro_rules! dilithium_public_common {
    () => {
        fn algorithm_name(&self) -> &'static str {
            ALGORITHM_NAME
        }

        fn algorithm_identifier(&self) -> AlgorithmIdentifier {
            AlgorithmIdentifier::from_name(self.mode.name())
        }

        fn public_key_bits(&self) -> Vec<u8> {
            self.public.clone()
        }

        fn key_length(&self) -> usize {
            8 * self.mode.public_key_bytes()
        }

        fn estimated_strength(&self) -> usize {
            self.mode.strength()
        }

        fn create_verification_op<'k>(
            &'k self,
            params: &str,
            provider: &str,
        ) -> OpResult<dyn VerificationOp + 'k> {
            check_provider(ALGORITHM_NAME, provider)?;
            check_scheme(params)?;
            Ok(Some(Box::new(DilithiumVerificationOp {
                mode: self.mode,
                public: &self.public,
                msg: Vec::new(),
            })))
        }
    };
}

impl PublicKey for DilithiumPublic {
    dilithium_public_common!();
}

impl PublicKey for DilithiumPrivate {
    dilithium_public_common!();
}

impl PrivateKey for DilithiumPrivate {
    fn private_key_bits(&self) -> Zeroizing<Vec<u8>> {
        let mut bits = Zeroizing::new(Vec::with_capacity(self.secret.len() + self.public.len()));
        bits.extend_from_slice(&self.secret);
        bits.extend_from_slice(&self.public);
        bits
    }

    fn public_key(&self) -> Box<dyn PublicKey> {
        Box::new(DilithiumPublic {
            mode: self.mode,
            public: self.public.clone(),
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
        Ok(Some(Box::new(DilithiumSignatureOp {
            mode: self.mode,
            secret: &self.secret,
            msg: Zeroizing::new(Vec::new()),
        })))
    }
}

struct DilithiumSignatureOp<'k> {
    mode: DilithiumMode,
    secret: &'k [u8],
    msg: Zeroizing<Vec<u8>>,
}

impl SignatureOp for DilithiumSignatureOp<'_> {
    fn update(&mut self, msg: &[u8]) {
        self.msg.extend_from_slice(msg);
    }

    fn sign(&mut self, _rng: &mut dyn CryptoRngCore) -> Result<Vec<u8>> {
        let sig = with_dilithium_mode!(self.mode, m => {
            let sk = m::SecretKey::from_bytes(self.secret).map_err(|_| {
                CryptoError::Internal(format!("Invalid {} private key", self.mode.name()))
            })?;
            m::detached_sign(&self.msg, &sk).as_bytes().to_vec()
        });
        self.msg.clear();
        Ok(sig)
    }

    fn signature_length(&self) -> usize {
        self.mode.signature_bytes()
    }

    fn hash_function(&self) -> String {
        "SHAKE-256".to_string()
    }

    fn algorithm_identifier(&self) -> AlgorithmIdentifier {
        AlgorithmIdentifier::from_name(self.mode.name())
    }
}

struct DilithiumVerificationOp<'k> {
    mode: DilithiumMode,
    public: &'k [u8],
    msg: Vec<u8>,
}

impl VerificationOp for DilithiumVerificationOp<'_> {
    fn update(&mut self, msg: &[u8]) {
        self.msg.extend_from_slice(msg);
    }

    fn is_valid_signature(&mut self, sig: &[u8]) -> Result<bool> {
        let valid = with_dilithium_mode!(self.mode, m => {
            match (
                m::PublicKey::from_bytes(self.public),
                m::DetachedSignature::from_bytes(sig),
            ) {
                (Ok(pk), Ok(sig)) => m::verify_detached_signature(&sig, &self.msg, &pk).is_ok(),
                _ => false,
            }
        });
        self.msg.clear();
        Ok(valid)
    }

    fn hash_function(&self) -> String {
        "SHAKE-256".to_string()
    }
}
