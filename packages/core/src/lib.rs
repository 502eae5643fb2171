// Construct Public-Key Core
// Algorithm registry, capability dispatch and constant-time facades

#![warn(clippy::all)]
#![allow(clippy::too_many_arguments)]

// Модули
pub mod config;
pub mod crypto;
pub mod error;
pub mod utils;

// Re-exports для удобства
pub use config::Config;
pub use crypto::pubkey::{
    Decryptor, Encryptor, KemDecryptor, KemEncryptor, KeyAgreement, Signer, SymmetricKey,
    Verifier,
};
pub use crypto::{
    create_private_key, load_private_key, load_public_key, AlgorithmIdentifier, PrivateKey,
    PublicKey, SignatureFormat,
};
pub use error::{CryptoError, Result};
