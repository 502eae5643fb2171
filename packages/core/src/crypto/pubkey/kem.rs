//! KEM facades.

use crate::crypto::pk_keys::{PrivateKey, PublicKey};
use crate::crypto::pk_ops::{KemDecryptionOp, KemEncryptionOp};
use crate::crypto::pubkey::agreement::SymmetricKey;
use crate::error::{CryptoError, Result};
use rand_core::CryptoRngCore;

fn check_shared_key_length(got: usize, expected: usize) -> Result<()> {
    if got != expected {
        return Err(CryptoError::Internal(format!(
            "KEM produced a {} byte shared key, expected {}",
            got, expected
        )));
    }
    Ok(())
}

pub struct KemEncryptor<'k> {
    op: Box<dyn KemEncryptionOp + 'k>,
}

impl<'k> KemEncryptor<'k> {
    pub fn new<K: PublicKey + ?Sized>(key: &'k K, kdf: &str, provider: &str) -> Result<Self> {
        use tracing::debug;

        let op = key
            .create_kem_encryption_op(kdf, provider)?
            .ok_or_else(|| CryptoError::unsupported(key.algorithm_name(), "KEM encryption"))?;

        debug!(
            target: "pubkey::kem",
            algorithm = %key.algorithm_name(),
            kdf = %kdf,
            "Created KEM encryptor"
        );

        Ok(Self { op })
    }

    /// Returns `(encapsulated_key, shared_key)`.
    pub fn encrypt(
        &self,
        rng: &mut dyn CryptoRngCore,
        desired_shared_key_len: usize,
        salt: &[u8],
    ) -> Result<(Vec<u8>, SymmetricKey)> {
        let (encapsulated, shared) = self.op.kem_encrypt(desired_shared_key_len, rng, salt)?;

        if encapsulated.len() != self.encapsulated_key_length() {
            return Err(CryptoError::Internal(format!(
                "KEM produced a {} byte encapsulated key, expected {}",
                encapsulated.len(),
                self.encapsulated_key_length()
            )));
        }
        check_shared_key_length(shared.len(), self.shared_key_length(desired_shared_key_len))?;

        Ok((encapsulated, SymmetricKey::from(shared)))
    }

    pub fn shared_key_length(&self, desired_shared_key_len: usize) -> usize {
        self.op.shared_key_length(desired_shared_key_len)
    }

    pub fn encapsulated_key_length(&self) -> usize {
        self.op.encapsulated_key_length()
    }
}

pub struct KemDecryptor<'k> {
    op: Box<dyn KemDecryptionOp + 'k>,
}

impl<'k> KemDecryptor<'k> {
    pub fn new<K: PrivateKey + ?Sized>(
        key: &'k K,
        rng: &mut dyn CryptoRngCore,
        kdf: &str,
        provider: &str,
    ) -> Result<Self> {
        use tracing::debug;

        let op = key
            .create_kem_decryption_op(rng, kdf, provider)?
            .ok_or_else(|| CryptoError::unsupported(key.algorithm_name(), "KEM decryption"))?;

        debug!(
            target: "pubkey::kem",
            algorithm = %key.algorithm_name(),
            kdf = %kdf,
            "Created KEM decryptor"
        );

        Ok(Self { op })
    }

    pub fn decrypt(
        &self,
        encapsulated_key: &[u8],
        desired_shared_key_len: usize,
        salt: &[u8],
    ) -> Result<SymmetricKey> {
        let shared = self
            .op
            .kem_decrypt(encapsulated_key, desired_shared_key_len, salt)?;
        check_shared_key_length(shared.len(), self.shared_key_length(desired_shared_key_len))?;
        Ok(SymmetricKey::from(shared))
    }

    pub fn shared_key_length(&self, desired_shared_key_len: usize) -> usize {
        self.op.shared_key_length(desired_shared_key_len)
    }
}
