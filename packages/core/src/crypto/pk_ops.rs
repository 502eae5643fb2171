//! Operation traits.
//!
//! An operation is bound to one key (borrowed for `'k`) and one scheme. The
//! facades in [`crate::crypto::pubkey`] own exactly one operation each and
//! add the protocol-level behaviour on top.

use crate::crypto::alg_id::AlgorithmIdentifier;
use crate::error::Result;
use rand_core::CryptoRngCore;
use zeroize::Zeroizing;

pub trait EncryptionOp: Send {
    fn encrypt(&self, msg: &[u8], rng: &mut dyn CryptoRngCore) -> Result<Vec<u8>>;

    /// Largest plaintext the scheme accepts, in bits.
    fn max_input_bits(&self) -> usize;

    fn ciphertext_length(&self, ptext_len: usize) -> usize;
}

pub trait DecryptionOp: Send {
    /// Decrypt and report validity as a byte mask: `0xFF` valid, `0x00` not.
    ///
    /// Padding failures must NOT surface as `Err` and must not be computed
    /// with branches on the decoded data. `Err` is reserved for structural
    /// problems visible to anyone holding the public key, such as a
    /// ciphertext that is not smaller than the modulus.
    fn decrypt(&mut self, ctext: &[u8]) -> Result<(Zeroizing<Vec<u8>>, u8)>;

    fn plaintext_length(&self, ctext_len: usize) -> usize;
}

pub trait SignatureOp: Send {
    fn update(&mut self, msg: &[u8]);

    /// Produce a signature in the key's standard (raw) format and reset
    /// the message state.
    fn sign(&mut self, rng: &mut dyn CryptoRngCore) -> Result<Vec<u8>>;

    /// Exact length of the standard-format signature.
    fn signature_length(&self) -> usize;

    fn hash_function(&self) -> String;

    fn algorithm_identifier(&self) -> AlgorithmIdentifier;
}

pub trait VerificationOp: Send {
    fn update(&mut self, msg: &[u8]);

    /// Check a standard-format signature over everything passed to
    /// `update` and reset the message state.
    fn is_valid_signature(&mut self, sig: &[u8]) -> Result<bool>;

    fn hash_function(&self) -> String;
}

pub trait KeyAgreementOp: Send {
    fn agree(
        &self,
        key_len: usize,
        peer_public_value: &[u8],
        salt: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>>;

    /// Size of the raw (pre-KDF) shared secret.
    fn agreed_value_size(&self) -> usize;
}

pub trait KemEncryptionOp: Send {
    /// Returns `(encapsulated_key, shared_key)`.
    fn kem_encrypt(
        &self,
        desired_shared_key_len: usize,
        rng: &mut dyn CryptoRngCore,
        salt: &[u8],
    ) -> Result<(Vec<u8>, Zeroizing<Vec<u8>>)>;

    fn shared_key_length(&self, desired_shared_key_len: usize) -> usize;

    fn encapsulated_key_length(&self) -> usize;
}

pub trait KemDecryptionOp: Send {
    fn kem_decrypt(
        &self,
        encapsulated_key: &[u8],
        desired_shared_key_len: usize,
        salt: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>>;

    fn shared_key_length(&self, desired_shared_key_len: usize) -> usize;
}
