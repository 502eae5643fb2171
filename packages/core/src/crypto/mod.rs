//! Криптографический модуль
//!
//! # Архитектура
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Facades (pubkey)                         │
//! │  - Encryptor / Decryptor (constant-time decrypt_or_random)  │
//! │  - Signer / Verifier (Standard или DER SEQUENCE)            │
//! │  - KeyAgreement / KemEncryptor / KemDecryptor               │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │              Capability Dispatch (pk_keys, pk_ops)          │
//! │  - PublicKey / PrivateKey traits                            │
//! │  - create_*_op → Ok(None), если возможность отсутствует     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Algorithm Registry (pk_algs)                │
//! │  - load_public_key / load_private_key                       │
//! │  - create_private_key (параметры по умолчанию из Config)    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                ┌─────────────┴─────────────┐
//!                ▼                           ▼
//! ┌───────────────────────────┐  ┌──────────────────────────┐
//! │   Classic (families)      │  │  Post-Quantum (families) │
//! │  - RSA, DSA               │  │  - Kyber (KEM)           │
//! │  - ECDSA, ECDH            │  │  - Dilithium (подписи)   │
//! │  - Curve25519, Ed25519    │  │                          │
//! └───────────────────────────┘  └──────────────────────────┘
//! ```
//!
//! ## Модули
//!
//! ### Core Traits
//! - [`pk_keys`]: PublicKey / PrivateKey и фабрики операций
//! - [`pk_ops`]: трейты операций (encrypt, sign, agree, KEM)
//!
//! ### Implementations
//! - [`families`]: реализации семейств алгоритмов
//! - [`pk_algs`]: реестр алгоритмов
//!
//! ### High-Level APIs
//! - [`pubkey`]: фасады для приложения
//!
//! ### Utilities
//! - [`alg_id`]: AlgorithmIdentifier и таблица OID
//! - [`hash`], [`kdf`]: хеш-функции и KDF для схем

// ============================================================================
// Core Traits
// ============================================================================

/// Ключи и диспетчеризация возможностей
pub mod pk_keys;

/// Операции, привязанные к одному ключу
pub mod pk_ops;

// ============================================================================
// Implementations
// ============================================================================

/// Семейства алгоритмов (RSA, EC, Curve25519, Ed25519, Kyber, Dilithium)
pub mod families;

/// Реестр алгоритмов
pub mod pk_algs;

// ============================================================================
// High-Level APIs
// ============================================================================

pub mod pubkey;

// ============================================================================
// Utilities
// ============================================================================

pub mod alg_id;

pub mod hash;

pub mod kdf;

// ============================================================================
// Re-exports для удобства
// ============================================================================

pub use alg_id::AlgorithmIdentifier;
pub use pk_algs::{
    create_private_key, load_private_key, load_public_key, probe_provider_private_key, Algorithm,
};
pub use pk_keys::{PrivateKey, PublicKey, SignatureFormat};

#[cfg(feature = "ecc")]
pub use families::ec_group::EcGroup;
#[cfg(feature = "ecc")]
pub use pk_algs::create_ec_private_key;
#[cfg(feature = "dl")]
pub use families::dl_group::DlGroup;
