//! CRYSTALS-Kyber (round 3) KEM.
//!
//! The parameter set travels in the algorithm name (`Kyber-768-r3`); the
//! registry name `Kyber` resolves to the configured default mode.

use crate::crypto::alg_id::AlgorithmIdentifier;
use crate::crypto::kdf::Kdf;
use crate::crypto::pk_keys::{check_provider, OpResult, PrivateKey, PublicKey};
use crate::crypto::pk_ops::{KemDecryptionOp, KemEncryptionOp};
use crate::error::{CryptoError, Result};
use pqcrypto_kyber::{kyber1024, kyber512, kyber768};
use pqcrypto_traits::kem::{
    Ciphertext as _, PublicKey as _, SecretKey as _, SharedSecret as _,
};
use rand_core::CryptoRngCore;
use zeroize::Zeroizing;

pub const ALGORITHM_NAME: &str = "Kyber";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KyberMode {
    Kyber512R3,
    Kyber768R3,
    Kyber1024R3,
}

/// Run `$body` with `$m` bound to the pqcrypto module for `$mode`.
macro_rules! with_kyber_mode {
    ($mode:expr, $m:ident => $body:expr) => {
        match $mode {
            KyberMode::Kyber512R3 => {
                use kyber512 as $m;
                $body
            }
            KyberMode::Kyber768R3 => {
                use kyber768 as $m;
                $body
            }
            KyberMode::Kyber1024R3 => {
                use kyber1024 as $m;
                $body
            }
        }
    };
}

impl KyberMode {
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "Kyber-512-r3" => Ok(KyberMode::Kyber512R3),
            "Kyber-768-r3" => Ok(KyberMode::Kyber768R3),
            "Kyber-1024-r3" => Ok(KyberMode::Kyber1024R3),
            _ => Err(CryptoError::InvalidArgument(format!(
                "Unknown Kyber mode '{}'",
                name
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            KyberMode::Kyber512R3 => "Kyber-512-r3",
            KyberMode::Kyber768R3 => "Kyber-768-r3",
            KyberMode::Kyber1024R3 => "Kyber-1024-r3",
        }
    }

    fn k(&self) -> usize {
        match self {
            KyberMode::Kyber512R3 => 2,
            KyberMode::Kyber768R3 => 3,
            KyberMode::Kyber1024R3 => 4,
        }
    }

    fn public_key_bytes(&self) -> usize {
        with_kyber_mode!(self, m => m::public_key_bytes())
    }

    fn ciphertext_bytes(&self) -> usize {
        with_kyber_mode!(self, m => m::ciphertext_bytes())
    }

    fn shared_secret_bytes(&self) -> usize {
        with_kyber_mode!(self, m => m::shared_secret_bytes())
    }
}

pub struct KyberPublic {
    mode: KyberMode,
    public: Vec<u8>,
}

impl KyberPublic {
    pub fn from_bits(alg_id: &AlgorithmIdentifier, key_bits: &[u8]) -> Result<Self> {
        let mode = KyberMode::from_name(alg_id.algorithm_name())
            .map_err(|e| CryptoError::Decoding(e.to_string()))?;
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

pub struct KyberPrivate {
    mode: KyberMode,
    public: Vec<u8>,
    secret: Zeroizing<Vec<u8>>,
}

impl KyberPrivate {
    /// pqcrypto draws key material from the operating system.
    pub fn generate(mode: KyberMode) -> Self {
        let (public, secret) = with_kyber_mode!(mode, m => {
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
        let mode = KyberMode::from_name(alg_id.algorithm_name())
            .map_err(|e| CryptoError::Decoding(e.to_string()))?;
        let sk_len = with_kyber_mode!(mode, m => m::secret_key_bytes());
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

macro_rules! kyber_public_common {
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
            256 * self.mode.k()
        }

        fn estimated_strength(&self) -> usize {
            64 * self.mode.k()
        }

        fn create_kem_encryption_op<'k>(
            &'k self,
            kdf: &str,
            provider: &str,
        ) -> OpResult<dyn KemEncryptionOp + 'k> {
            check_provider(ALGORITHM_NAME, provider)?;
            Ok(Some(Box::new(KyberEncryptionOp {
                mode: self.mode,
                public: &self.public,
                kdf: Kdf::from_name(kdf)?,
            })))
        }
    };
}

impl PublicKey for KyberPublic {
    kyber_public_common!();
}

impl PublicKey for KyberPrivate {
    kyber_public_common!();
}

impl PrivateKey for KyberPrivate {
    fn private_key_bits(&self) -> Zeroizing<Vec<u8>> {
        let mut bits = Zeroizing::new(Vec::with_capacity(self.secret.len() + self.public.len()));
        bits.extend_from_slice(&self.secret);
        bits.extend_from_slice(&self.public);
        bits
    }

    fn public_key(&self) -> Box<dyn PublicKey> {
        Box::new(KyberPublic {
            mode: self.mode,
            public: self.public.clone(),
        })
    }

    fn create_kem_decryption_op<'k>(
        &'k self,
        _rng: &mut dyn CryptoRngCore,
        kdf: &str,
        provider: &str,
    ) -> OpResult<dyn KemDecryptionOp + 'k> {
        check_provider(ALGORITHM_NAME, provider)?;
        Ok(Some(Box::new(KyberDecryptionOp {
            mode: self.mode,
            secret: &self.secret,
            kdf: Kdf::from_name(kdf)?,
        })))
    }
}

fn backend_error(mode: KyberMode, what: &str) -> CryptoError {
    CryptoError::Decoding(format!("Invalid {} {}", mode.name(), what))
}

struct KyberEncryptionOp<'k> {
    mode: KyberMode,
    public: &'k [u8],
    kdf: Kdf,
}

impl KemEncryptionOp for KyberEncryptionOp<'_> {
    fn kem_encrypt(
        &self,
        desired_shared_key_len: usize,
        _rng: &mut dyn CryptoRngCore,
        salt: &[u8],
    ) -> Result<(Vec<u8>, Zeroizing<Vec<u8>>)> {
        let (encapsulated, raw) = with_kyber_mode!(self.mode, m => {
            let pk = m::PublicKey::from_bytes(self.public)
                .map_err(|_| backend_error(self.mode, "public key"))?;
            let (ss, ct) = m::encapsulate(&pk);
            (ct.as_bytes().to_vec(), Zeroizing::new(ss.as_bytes().to_vec()))
        });
        let shared = self.kdf.derive(desired_shared_key_len, &raw, salt)?;
        Ok((encapsulated, shared))
    }

    fn shared_key_length(&self, desired_shared_key_len: usize) -> usize {
        self.kdf
            .output_length(desired_shared_key_len, self.mode.shared_secret_bytes())
    }

    fn encapsulated_key_length(&self) -> usize {
        self.mode.ciphertext_bytes()
    }
}

struct KyberDecryptionOp<'k> {
    mode: KyberMode,
    secret: &'k [u8],
    kdf: Kdf,
}

impl KemDecryptionOp for KyberDecryptionOp<'_> {
    fn kem_decrypt(
        &self,
        encapsulated_key: &[u8],
        desired_shared_key_len: usize,
        salt: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>> {
        let raw = with_kyber_mode!(self.mode, m => {
            let sk = m::SecretKey::from_bytes(self.secret)
                .map_err(|_| backend_error(self.mode, "private key"))?;
            let ct = m::Ciphertext::from_bytes(encapsulated_key)
                .map_err(|_| backend_error(self.mode, "encapsulated key"))?;
            Zeroizing::new(m::decapsulate(&ct, &sk).as_bytes().to_vec())
        });
        self.kdf.derive(desired_shared_key_len, &raw, salt)
    }

    fn shared_key_length(&self, desired_shared_key_len: usize) -> usize {
        self.kdf
            .output_length(desired_shared_key_len, self.mode.shared_secret_bytes())
    }
}
