//! Key agreement facade and the symmetric key it produces.

use crate::crypto::pk_keys::PrivateKey;
use crate::crypto::pk_ops::KeyAgreementOp;
use crate::error::{CryptoError, Result};
use rand_core::CryptoRngCore;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Derived key material, wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey(Vec<u8>);

impl SymmetricKey {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Zeroizing<Vec<u8>>> for SymmetricKey {
    fn from(bytes: Zeroizing<Vec<u8>>) -> Self {
        Self(bytes.to_vec())
    }
}

impl PartialEq for SymmetricKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for SymmetricKey {}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SymmetricKey([REDACTED; {}])", self.0.len())
    }
}

pub struct KeyAgreement<'k> {
    op: Box<dyn KeyAgreementOp + 'k>,
}

impl<'k> KeyAgreement<'k> {
    pub fn new<K: PrivateKey + ?Sized>(
        key: &'k K,
        rng: &mut dyn CryptoRngCore,
        kdf: &str,
        provider: &str,
    ) -> Result<Self> {
        use tracing::debug;

        let op = key
            .create_key_agreement_op(rng, kdf, provider)?
            .ok_or_else(|| CryptoError::unsupported(key.algorithm_name(), "key agreement"))?;

        debug!(
            target: "pubkey::agreement",
            algorithm = %key.algorithm_name(),
            kdf = %kdf,
            "Created key agreement"
        );

        Ok(Self { op })
    }

    /// Agree with `peer_public_value` and run the KDF. With the `Raw` KDF
    /// `key_len` is ignored and the shared secret comes back as is.
    pub fn derive_key(
        &self,
        key_len: usize,
        peer_public_value: &[u8],
        salt: &[u8],
    ) -> Result<SymmetricKey> {
        self.op
            .agree(key_len, peer_public_value, salt)
            .map(SymmetricKey::from)
    }

    /// Size of the raw shared secret before key derivation.
    pub fn agreed_value_size(&self) -> usize {
        self.op.agreed_value_size()
    }
}
