//! Key derivation applied to raw agreed / encapsulated secrets.
//!
//! `Raw` (or an empty name) hands back the shared secret untouched;
//! `HKDF(<hash>)` runs HKDF-Extract with the caller's salt and expands to the
//! requested length.

use crate::crypto::hash::HashFunction;
use crate::error::{CryptoError, Result};
use crate::utils::parsing::SchemeName;
use hkdf::Hkdf;
use sha2::{Sha256, Sha384, Sha512};
use zeroize::Zeroizing;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kdf {
    Raw,
    Hkdf(HashFunction),
}

impl Kdf {
    pub fn from_name(name: &str) -> Result<Self> {
        if name.is_empty() || name == "Raw" {
            return Ok(Kdf::Raw);
        }

        let scheme = SchemeName::parse(name)?;
        match (scheme.name.as_str(), scheme.args.as_slice()) {
            ("HKDF", [hash]) => Ok(Kdf::Hkdf(HashFunction::from_name(hash)?)),
            _ => Err(CryptoError::InvalidArgument(format!(
                "Unknown KDF '{}'",
                name
            ))),
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Kdf::Raw)
    }

    /// Output length for a caller asking for `desired` bytes given a
    /// `raw_len`-byte shared secret.
    pub fn output_length(&self, desired: usize, raw_len: usize) -> usize {
        match self {
            Kdf::Raw => raw_len,
            Kdf::Hkdf(_) => desired,
        }
    }

    pub fn derive(
        &self,
        desired: usize,
        secret: &[u8],
        salt: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>> {
        match self {
            Kdf::Raw => {
                if !salt.is_empty() {
                    return Err(CryptoError::InvalidArgument(
                        "A salt requires a KDF, but Raw was selected".to_string(),
                    ));
                }
                Ok(Zeroizing::new(secret.to_vec()))
            }
            Kdf::Hkdf(hash) => {
                let mut okm = Zeroizing::new(vec![0u8; desired]);
                let expanded = match hash {
                    HashFunction::Sha256 => {
                        Hkdf::<Sha256>::new(Some(salt), secret).expand(&[], &mut okm)
                    }
                    HashFunction::Sha384 => {
                        Hkdf::<Sha384>::new(Some(salt), secret).expand(&[], &mut okm)
                    }
                    HashFunction::Sha512 => {
                        Hkdf::<Sha512>::new(Some(salt), secret).expand(&[], &mut okm)
                    }
                };
                expanded.map_err(|e| {
                    CryptoError::InvalidArgument(format!("HKDF output length {}: {}", desired, e))
                })?;
                Ok(okm)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kdf_names() {
        assert_eq!(Kdf::from_name("").unwrap(), Kdf::Raw);
        assert_eq!(Kdf::from_name("Raw").unwrap(), Kdf::Raw);
        assert_eq!(
            Kdf::from_name("HKDF(SHA-512)").unwrap(),
            Kdf::Hkdf(HashFunction::Sha512)
        );
        assert!(Kdf::from_name("KDF2(SHA-256)").is_err());
        assert!(Kdf::from_name("HKDF(SHA-256,SHA-512)").is_err());
    }

    #[test]
    fn test_raw_ignores_length_and_rejects_salt() {
        let out = Kdf::Raw.derive(16, &[7u8; 32], b"").unwrap();
        assert_eq!(out.len(), 32);
        assert!(Kdf::Raw.derive(16, &[7u8; 32], b"salt").is_err());
        assert_eq!(Kdf::Raw.output_length(16, 32), 32);
    }

    #[test]
    fn test_hkdf_length_and_salt_dependence() {
        let kdf = Kdf::Hkdf(HashFunction::Sha256);
        let a = kdf.derive(42, &[1u8; 32], b"salt-a").unwrap();
        let b = kdf.derive(42, &[1u8; 32], b"salt-b").unwrap();
        assert_eq!(a.len(), 42);
        assert_ne!(&a[..], &b[..]);
        assert_eq!(kdf.output_length(42, 32), 42);
    }
}
