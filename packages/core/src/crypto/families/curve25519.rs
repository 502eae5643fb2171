//! X25519 key agreement, also usable as a KEM through an ephemeral
//! Diffie-Hellman exchange (the encapsulated key is the ephemeral public
//! value).

use crate::crypto::alg_id::AlgorithmIdentifier;
use crate::crypto::kdf::Kdf;
use crate::crypto::pk_keys::{check_provider, OpResult, PrivateKey, PublicKey};
use crate::crypto::pk_ops::{KemDecryptionOp, KemEncryptionOp, KeyAgreementOp};
use crate::error::{CryptoError, Result};
use rand_core::CryptoRngCore;
use x25519_dalek::{EphemeralSecret, PublicKey as X25519Public, SharedSecret, StaticSecret};
use zeroize::Zeroizing;

pub const ALGORITHM_NAME: &str = "Curve25519";

const KEY_LENGTH: usize = 32;

fn to_array(bits: &[u8], what: &str) -> Result<[u8; KEY_LENGTH]> {
    bits.try_into().map_err(|_| {
        CryptoError::Decoding(format!(
            "Invalid {} {} length: expected {}, got {}",
            ALGORITHM_NAME,
            what,
            KEY_LENGTH,
            bits.len()
        ))
    })
}

/// Reject all-zero outputs from small-order peer points.
fn contributory(shared: SharedSecret) -> Result<Zeroizing<[u8; KEY_LENGTH]>> {
    if !shared.was_contributory() {
        return Err(CryptoError::Decoding(format!(
            "{} peer value is of small order",
            ALGORITHM_NAME
        )));
    }
    Ok(Zeroizing::new(shared.to_bytes()))
}

pub struct Curve25519Public {
    public: X25519Public,
}

impl Curve25519Public {
    pub fn from_bits(_alg_id: &AlgorithmIdentifier, key_bits: &[u8]) -> Result<Self> {
        Ok(Self {
            public: X25519Public::from(to_array(key_bits, "public key")?),
        })
    }
}

pub struct Curve25519Private {
    secret: StaticSecret,
    public: X25519Public,
}

impl Curve25519Private {
    pub fn generate(rng: &mut dyn CryptoRngCore) -> Self {
        let secret = StaticSecret::random_from_rng(rng);
        let public = X25519Public::from(&secret);
        Self { secret, public }
    }

    pub fn from_bits(_alg_id: &AlgorithmIdentifier, key_bits: &[u8]) -> Result<Self> {
        let bytes = Zeroizing::new(to_array(key_bits, "private key")?);
        let secret = StaticSecret::from(*bytes);
        let public = X25519Public::from(&secret);
        Ok(Self { secret, public })
    }
}

macro_rules! curve25519_public_common {
    () => {
        fn algorithm_name(&self) -> &'static str {
            ALGORITHM_NAME
        }

        fn algorithm_identifier(&self) -> AlgorithmIdentifier {
            AlgorithmIdentifier::from_name(ALGORITHM_NAME)
        }

        fn public_key_bits(&self) -> Vec<u8> {
            self.public.as_bytes().to_vec()
        }

        fn key_length(&self) -> usize {
            255
        }

        fn estimated_strength(&self) -> usize {
            128
        }

        fn create_kem_encryption_op<'k>(
            &'k self,
            kdf: &str,
            provider: &str,
        ) -> OpResult<dyn KemEncryptionOp + 'k> {
            check_provider(ALGORITHM_NAME, provider)?;
            Ok(Some(Box::new(Curve25519KemEncryptionOp {
                public: &self.public,
                kdf: Kdf::from_name(kdf)?,
            })))
        }
    };
}

impl PublicKey for Curve25519Public {
    curve25519_public_common!();
}

impl PublicKey for Curve25519Private {
    curve25519_public_common!();
}

impl PrivateKey for Curve25519Private {
    fn private_key_bits(&self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(self.secret.to_bytes().to_vec())
    }

    fn public_key(&self) -> Box<dyn PublicKey> {
        Box::new(Curve25519Public {
            public: self.public,
        })
    }

    fn create_key_agreement_op<'k>(
        &'k self,
        _rng: &mut dyn CryptoRngCore,
        kdf: &str,
        provider: &str,
    ) -> OpResult<dyn KeyAgreementOp + 'k> {
        check_provider(ALGORITHM_NAME, provider)?;
        Ok(Some(Box::new(Curve25519AgreementOp {
            secret: &self.secret,
            kdf: Kdf::from_name(kdf)?,
        })))
    }

    fn create_kem_decryption_op<'k>(
        &'k self,
        _rng: &mut dyn CryptoRngCore,
        kdf: &str,
        provider: &str,
    ) -> OpResult<dyn KemDecryptionOp + 'k> {
        check_provider(ALGORITHM_NAME, provider)?;
        Ok(Some(Box::new(Curve25519AgreementOp {
            secret: &self.secret,
            kdf: Kdf::from_name(kdf)?,
        })))
    }
}

/// Static-key side, shared by agreement and KEM decapsulation.
struct Curve25519AgreementOp<'k> {
    secret: &'k StaticSecret,
    kdf: Kdf,
}

impl Curve25519AgreementOp<'_> {
    fn exchange(&self, key_len: usize, peer: &[u8], salt: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let peer = X25519Public::from(to_array(peer, "peer value")?);
        let raw = contributory(self.secret.diffie_hellman(&peer))?;
        self.kdf.derive(key_len, &raw[..], salt)
    }
}

impl KeyAgreementOp for Curve25519AgreementOp<'_> {
    fn agree(
        &self,
        key_len: usize,
        peer_public_value: &[u8],
        salt: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>> {
        self.exchange(key_len, peer_public_value, salt)
    }

    fn agreed_value_size(&self) -> usize {
        KEY_LENGTH
    }
}

impl KemDecryptionOp for Curve25519AgreementOp<'_> {
    fn kem_decrypt(
        &self,
        encapsulated_key: &[u8],
        desired_shared_key_len: usize,
        salt: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>> {
        self.exchange(desired_shared_key_len, encapsulated_key, salt)
    }

    fn shared_key_length(&self, desired_shared_key_len: usize) -> usize {
        self.kdf.output_length(desired_shared_key_len, KEY_LENGTH)
    }
}

struct Curve25519KemEncryptionOp<'k> {
    public: &'k X25519Public,
    kdf: Kdf,
}

impl KemEncryptionOp for Curve25519KemEncryptionOp<'_> {
    fn kem_encrypt(
        &self,
        desired_shared_key_len: usize,
        rng: &mut dyn CryptoRngCore,
        salt: &[u8],
    ) -> Result<(Vec<u8>, Zeroizing<Vec<u8>>)> {
        let ephemeral = EphemeralSecret::random_from_rng(rng);
        let encapsulated = X25519Public::from(&ephemeral);
        let raw = contributory(ephemeral.diffie_hellman(self.public))?;
        let shared = self.kdf.derive(desired_shared_key_len, &raw[..], salt)?;
        Ok((encapsulated.as_bytes().to_vec(), shared))
    }

    fn shared_key_length(&self, desired_shared_key_len: usize) -> usize {
        self.kdf.output_length(desired_shared_key_len, KEY_LENGTH)
    }

    fn encapsulated_key_length(&self) -> usize {
        KEY_LENGTH
    }
}
