//! Streaming hash functions used by signature schemes and KDFs.

use crate::error::{CryptoError, Result};
use crate::utils::parsing::SchemeName;
use sha2::{Digest, Sha256, Sha384, Sha512};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashFunction {
    Sha256,
    Sha384,
    Sha512,
}

impl HashFunction {
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "SHA-256" | "SHA-2(256)" => Ok(HashFunction::Sha256),
            "SHA-384" | "SHA-2(384)" => Ok(HashFunction::Sha384),
            "SHA-512" | "SHA-2(512)" => Ok(HashFunction::Sha512),
            _ => Err(CryptoError::InvalidArgument(format!(
                "Unknown hash function '{}'",
                name
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            HashFunction::Sha256 => "SHA-256",
            HashFunction::Sha384 => "SHA-384",
            HashFunction::Sha512 => "SHA-512",
        }
    }

    pub fn output_length(&self) -> usize {
        match self {
            HashFunction::Sha256 => 32,
            HashFunction::Sha384 => 48,
            HashFunction::Sha512 => 64,
        }
    }

    pub fn hasher(&self) -> Hasher {
        match self {
            HashFunction::Sha256 => Hasher::Sha256(Sha256::new()),
            HashFunction::Sha384 => Hasher::Sha384(Sha384::new()),
            HashFunction::Sha512 => Hasher::Sha512(Sha512::new()),
        }
    }
}

/// Hash for the DSA-style schemes, named either `H` or `EMSA1(H)`.
pub fn emsa1_hash(alg_name: &str, params: &str) -> Result<HashFunction> {
    let scheme =
        SchemeName::parse(params).map_err(|_| CryptoError::unknown_scheme(alg_name, params))?;
    let hash = match (scheme.name.as_str(), scheme.args.as_slice()) {
        ("EMSA1", [hash]) => hash.as_str(),
        (_, []) => params,
        _ => return Err(CryptoError::unknown_scheme(alg_name, params)),
    };
    HashFunction::from_name(hash).map_err(|_| CryptoError::unknown_scheme(alg_name, params))
}

/// Running hash state.
#[derive(Clone)]
pub enum Hasher {
    Sha256(Sha256),
    Sha384(Sha384),
    Sha512(Sha512),
}

impl Hasher {
    pub fn update(&mut self, data: &[u8]) {
        match self {
            Hasher::Sha256(h) => h.update(data),
            Hasher::Sha384(h) => h.update(data),
            Hasher::Sha512(h) => h.update(data),
        }
    }

    /// Return the digest and reset the state for the next message.
    pub fn finalize_reset(&mut self) -> Vec<u8> {
        match self {
            Hasher::Sha256(h) => h.finalize_reset().to_vec(),
            Hasher::Sha384(h) => h.finalize_reset().to_vec(),
            Hasher::Sha512(h) => h.finalize_reset().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_lookup() {
        assert_eq!(HashFunction::from_name("SHA-256").unwrap(), HashFunction::Sha256);
        assert_eq!(HashFunction::from_name("SHA-2(512)").unwrap(), HashFunction::Sha512);
        assert!(HashFunction::from_name("MD5").is_err());
        assert!(HashFunction::from_name("sha-256").is_err());
    }

    #[test]
    fn test_emsa1_hash_names() {
        assert_eq!(emsa1_hash("ECDSA", "SHA-256").unwrap(), HashFunction::Sha256);
        assert_eq!(emsa1_hash("DSA", "EMSA1(SHA-384)").unwrap(), HashFunction::Sha384);
        assert!(matches!(
            emsa1_hash("ECDSA", "EMSA3(SHA-256)"),
            Err(CryptoError::InvalidArgument(_))
        ));
        assert!(emsa1_hash("DSA", "EMSA1(SHA-256,SHA-512)").is_err());
        assert!(emsa1_hash("DSA", "").is_err());
    }

    #[test]
    fn test_streaming_matches_one_shot() {
        let mut h = HashFunction::Sha256.hasher();
        h.update(b"abc");
        h.update(b"def");
        let streamed = h.finalize_reset();

        assert_eq!(streamed, Sha256::digest(b"abcdef").to_vec());
        assert_eq!(streamed.len(), HashFunction::Sha256.output_length());

        // state was reset
        assert_eq!(h.finalize_reset(), Sha256::digest(b"").to_vec());
    }
}
