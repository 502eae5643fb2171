//! Algorithm families.
//!
//! Каждое семейство реализует [`PublicKey`](crate::crypto::pk_keys::PublicKey)
//! и [`PrivateKey`](crate::crypto::pk_keys::PrivateKey) и переопределяет только
//! те фабрики операций, которые оно поддерживает.

pub mod curve25519;
pub mod ed25519;

#[cfg(feature = "ecc")]
pub mod ec_group;
#[cfg(feature = "ecc")]
pub mod ecdh;
#[cfg(feature = "ecc")]
pub mod ecdsa;

#[cfg(feature = "dl")]
pub mod dl_group;
#[cfg(feature = "dl")]
pub mod dsa;

#[cfg(feature = "rsa")]
pub mod eme_pkcs1;
#[cfg(feature = "rsa")]
pub mod rsa;

#[cfg(feature = "post-quantum")]
pub mod dilithium;
#[cfg(feature = "post-quantum")]
pub mod kyber;
