//! Caller-facing facades over the per-algorithm operations.
//!
//! Each facade is built from a borrowed key and a scheme name, owns the
//! single operation it needs, and fails at construction when the key
//! lacks that capability.

pub mod agreement;
pub mod der_sig;
pub mod encrypt;
pub mod kem;
pub mod sign;

pub use agreement::{KeyAgreement, SymmetricKey};
pub use encrypt::{Decryptor, Encryptor};
pub use kem::{KemDecryptor, KemEncryptor};
pub use sign::{Signer, Verifier};
