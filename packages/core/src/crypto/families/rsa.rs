//! RSA: encryption (EME-PKCS1-v1_5, Raw) and signatures (EMSA-PKCS1-v1_5).
//!
//! Keys are exchanged as PKCS#1 DER. Decryption goes through the raw RSA
//! primitive (with blinding) and strips the padding in constant time, so
//! the padding check is reported as a mask instead of an error.

use crate::crypto::alg_id::AlgorithmIdentifier;
use crate::crypto::families::eme_pkcs1;
use crate::crypto::hash::{HashFunction, Hasher};
use crate::crypto::pk_keys::{check_provider, OpResult, PrivateKey, PublicKey};
use crate::crypto::pk_ops::{DecryptionOp, EncryptionOp, SignatureOp, VerificationOp};
use crate::error::{CryptoError, Result};
use crate::utils::parsing::SchemeName;
use ::rsa::hazmat::{rsa_decrypt_and_check, rsa_encrypt};
use ::rsa::pkcs1::{
    DecodeRsaPrivateKey, DecodeRsaPublicKey, EncodeRsaPrivateKey, EncodeRsaPublicKey,
};
use ::rsa::traits::PublicKeyParts;
use ::rsa::{BigUint, Pkcs1v15Encrypt, Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use rand_chacha::ChaCha20Rng;
use rand_core::{CryptoRngCore, SeedableRng};
use sha2::{Sha256, Sha384, Sha512};
use zeroize::Zeroizing;

pub const ALGORITHM_NAME: &str = "RSA";

/// ASN.1 NULL, the parameters RSA identifiers carry.
const NULL_PARAMS: [u8; 2] = [0x05, 0x00];

/// Bytes of framing EME-PKCS1-v1_5 adds around the message.
const PKCS1_OVERHEAD: usize = 11;

// ============================================================================
// Keys
// ============================================================================

pub struct RsaPublic {
    key: RsaPublicKey,
}

impl RsaPublic {
    pub fn from_bits(_alg_id: &AlgorithmIdentifier, key_bits: &[u8]) -> Result<Self> {
        let key = RsaPublicKey::from_pkcs1_der(key_bits)
            .map_err(|e| CryptoError::Decoding(format!("Invalid RSA public key: {}", e)))?;
        Ok(Self { key })
    }
}

pub struct RsaPrivate {
    key: RsaPrivateKey,
}

impl RsaPrivate {
    pub fn generate(rng: &mut dyn CryptoRngCore, bits: usize) -> Result<Self> {
        let mut rng = rng;
        let key = RsaPrivateKey::new(&mut rng, bits)
            .map_err(|e| CryptoError::KeyGeneration(format!("RSA-{}: {}", bits, e)))?;
        Ok(Self { key })
    }

    pub fn from_bits(_alg_id: &AlgorithmIdentifier, key_bits: &[u8]) -> Result<Self> {
        let key = RsaPrivateKey::from_pkcs1_der(key_bits)
            .map_err(|e| CryptoError::Decoding(format!("Invalid RSA private key: {}", e)))?;
        key.validate()
            .map_err(|e| CryptoError::Decoding(format!("Inconsistent RSA private key: {}", e)))?;
        Ok(Self { key })
    }
}

fn modulus_bits(key: &RsaPublicKey) -> usize {
    key.n().bits()
}

/// NIST SP 800-57 comparable strengths.
fn if_work_factor(bits: usize) -> usize {
    match bits {
        b if b >= 15360 => 256,
        b if b >= 7680 => 192,
        b if b >= 3072 => 128,
        b if b >= 2048 => 112,
        b if b >= 1024 => 80,
        _ => 0,
    }
}

/// Access to the public half, shared by both key types.
trait RsaPublicParts {
    fn rsa_public(&self) -> &RsaPublicKey;
}

impl RsaPublicParts for RsaPublic {
    fn rsa_public(&self) -> &RsaPublicKey {
        &self.key
    }
}

impl RsaPublicParts for RsaPrivate {
    fn rsa_public(&self) -> &RsaPublicKey {
        self.key.as_ref()
    }
}

macro_rules! rsa_public_common {
    () => {
        fn algorithm_name(&self) -> &'static str {
            ALGORITHM_NAME
        }

        fn algorithm_identifier(&self) -> AlgorithmIdentifier {
            AlgorithmIdentifier::new(ALGORITHM_NAME, NULL_PARAMS.to_vec())
        }

        fn public_key_bits(&self) -> Vec<u8> {
            self.rsa_public()
                .to_pkcs1_der()
                .map(|doc| doc.as_bytes().to_vec())
                .unwrap_or_default()
        }

        fn key_length(&self) -> usize {
            modulus_bits(self.rsa_public())
        }

        fn estimated_strength(&self) -> usize {
            if_work_factor(self.key_length())
        }

        fn create_encryption_op<'k>(
            &'k self,
            _rng: &mut dyn CryptoRngCore,
            padding: &str,
            provider: &str,
        ) -> OpResult<dyn EncryptionOp + 'k> {
            check_provider(ALGORITHM_NAME, provider)?;
            Ok(Some(Box::new(RsaEncryptionOp {
                key: self.rsa_public(),
                eme: Eme::from_name(padding)?,
            })))
        }

        fn create_verification_op<'k>(
            &'k self,
            params: &str,
            provider: &str,
        ) -> OpResult<dyn VerificationOp + 'k> {
            check_provider(ALGORITHM_NAME, provider)?;
            let hash = emsa_hash(params)?;
            Ok(Some(Box::new(RsaVerificationOp {
                key: self.rsa_public(),
                hash,
                hasher: hash.hasher(),
            })))
        }
    };
}

impl PublicKey for RsaPublic {
    rsa_public_common!();
}

impl PublicKey for RsaPrivate {
    rsa_public_common!();
}

impl PrivateKey for RsaPrivate {
    fn private_key_bits(&self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(
            self.key
                .to_pkcs1_der()
                .map(|doc| doc.as_bytes().to_vec())
                .unwrap_or_default(),
        )
    }

    fn public_key(&self) -> Box<dyn PublicKey> {
        Box::new(RsaPublic {
            key: self.key.to_public_key(),
        })
    }

    fn create_decryption_op<'k>(
        &'k self,
        rng: &mut dyn CryptoRngCore,
        padding: &str,
        provider: &str,
    ) -> OpResult<dyn DecryptionOp + 'k> {
        check_provider(ALGORITHM_NAME, provider)?;
        let eme = Eme::from_name(padding)?;
        let blinding = ChaCha20Rng::from_rng(rng)
            .map_err(|e| CryptoError::Internal(format!("Blinding RNG seeding failed: {}", e)))?;
        Ok(Some(Box::new(RsaDecryptionOp {
            key: &self.key,
            eme,
            blinding,
        })))
    }

    fn create_signature_op<'k>(
        &'k self,
        _rng: &mut dyn CryptoRngCore,
        params: &str,
        provider: &str,
    ) -> OpResult<dyn SignatureOp + 'k> {
        check_provider(ALGORITHM_NAME, provider)?;
        let hash = emsa_hash(params)?;
        Ok(Some(Box::new(RsaSignatureOp {
            key: &self.key,
            hash,
            hasher: hash.hasher(),
        })))
    }
}

// ============================================================================
// Schemes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Eme {
    Pkcs1v15,
    Raw,
}

impl Eme {
    fn from_name(name: &str) -> Result<Self> {
        match name {
            "EME-PKCS1-v1_5" | "PKCS1v15" => Ok(Eme::Pkcs1v15),
            "Raw" => Ok(Eme::Raw),
            _ => Err(CryptoError::unknown_scheme(ALGORITHM_NAME, name)),
        }
    }
}

/// Hash named by `EMSA3(H)`, `EMSA_PKCS1(H)` or `PKCS1v15(H)`.
fn emsa_hash(params: &str) -> Result<HashFunction> {
    let scheme = SchemeName::parse(params)
        .map_err(|_| CryptoError::unknown_scheme(ALGORITHM_NAME, params))?;
    match (scheme.name.as_str(), scheme.args.as_slice()) {
        ("EMSA3" | "EMSA_PKCS1" | "PKCS1v15" | "EMSA-PKCS1-v1_5", [hash]) => {
            HashFunction::from_name(hash)
        }
        _ => Err(CryptoError::unknown_scheme(ALGORITHM_NAME, params)),
    }
}

fn pkcs1v15_sign_scheme(hash: HashFunction) -> Pkcs1v15Sign {
    match hash {
        HashFunction::Sha256 => Pkcs1v15Sign::new::<Sha256>(),
        HashFunction::Sha384 => Pkcs1v15Sign::new::<Sha384>(),
        HashFunction::Sha512 => Pkcs1v15Sign::new::<Sha512>(),
    }
}

/// Big-endian bytes of `n`, left-padded to `width`.
fn encode_fixed(n: &BigUint, width: usize) -> Zeroizing<Vec<u8>> {
    let raw = Zeroizing::new(n.to_bytes_be());
    let mut out = Zeroizing::new(vec![0u8; width.max(raw.len())]);
    let offset = out.len() - raw.len();
    out[offset..].copy_from_slice(&raw);
    out
}

// ============================================================================
// Operations
// ============================================================================

struct RsaEncryptionOp<'k> {
    key: &'k RsaPublicKey,
    eme: Eme,
}

impl EncryptionOp for RsaEncryptionOp<'_> {
    fn encrypt(&self, msg: &[u8], rng: &mut dyn CryptoRngCore) -> Result<Vec<u8>> {
        match self.eme {
            Eme::Pkcs1v15 => {
                let mut rng = rng;
                self.key
                    .encrypt(&mut rng, Pkcs1v15Encrypt, msg)
                    .map_err(|e| CryptoError::InvalidArgument(format!("RSA encryption: {}", e)))
            }
            Eme::Raw => {
                let m = BigUint::from_bytes_be(msg);
                if &m >= self.key.n() {
                    return Err(CryptoError::InvalidArgument(
                        "RSA raw input too large".to_string(),
                    ));
                }
                let c = rsa_encrypt(self.key, &m)
                    .map_err(|e| CryptoError::InvalidArgument(format!("RSA encryption: {}", e)))?;
                Ok(encode_fixed(&c, self.key.size()).to_vec())
            }
        }
    }

    fn max_input_bits(&self) -> usize {
        match self.eme {
            Eme::Pkcs1v15 => 8 * self.key.size().saturating_sub(PKCS1_OVERHEAD),
            Eme::Raw => modulus_bits(self.key).saturating_sub(1),
        }
    }

    fn ciphertext_length(&self, _ptext_len: usize) -> usize {
        self.key.size()
    }
}

struct RsaDecryptionOp<'k> {
    key: &'k RsaPrivateKey,
    eme: Eme,
    blinding: ChaCha20Rng,
}

impl DecryptionOp for RsaDecryptionOp<'_> {
    fn decrypt(&mut self, ctext: &[u8]) -> Result<(Zeroizing<Vec<u8>>, u8)> {
        let k = self.key.size();
        if ctext.len() > k {
            return Err(CryptoError::Decoding(
                "RSA ciphertext longer than the modulus".to_string(),
            ));
        }

        let c = BigUint::from_bytes_be(ctext);
        let m = rsa_decrypt_and_check(self.key, Some(&mut self.blinding), &c)
            .map_err(|e| CryptoError::Decoding(format!("RSA decryption: {}", e)))?;
        let em = encode_fixed(&m, k);

        match self.eme {
            Eme::Raw => Ok((em, 0xFF)),
            Eme::Pkcs1v15 => Ok(eme_pkcs1::unpad(&em)),
        }
    }

    fn plaintext_length(&self, ctext_len: usize) -> usize {
        match self.eme {
            Eme::Pkcs1v15 => ctext_len.saturating_sub(PKCS1_OVERHEAD),
            Eme::Raw => ctext_len,
        }
    }
}

struct RsaSignatureOp<'k> {
    key: &'k RsaPrivateKey,
    hash: HashFunction,
    hasher: Hasher,
}

impl SignatureOp for RsaSignatureOp<'_> {
    fn update(&mut self, msg: &[u8]) {
        self.hasher.update(msg);
    }

    fn sign(&mut self, rng: &mut dyn CryptoRngCore) -> Result<Vec<u8>> {
        let digest = self.hasher.finalize_reset();
        let mut rng = rng;
        self.key
            .sign_with_rng(&mut rng, pkcs1v15_sign_scheme(self.hash), &digest)
            .map_err(|e| CryptoError::Internal(format!("RSA signing: {}", e)))
    }

    fn signature_length(&self) -> usize {
        self.key.size()
    }

    fn hash_function(&self) -> String {
        self.hash.name().to_string()
    }

    fn algorithm_identifier(&self) -> AlgorithmIdentifier {
        AlgorithmIdentifier::new(
            format!("{}/EMSA3({})", ALGORITHM_NAME, self.hash.name()),
            NULL_PARAMS.to_vec(),
        )
    }
}

struct RsaVerificationOp<'k> {
    key: &'k RsaPublicKey,
    hash: HashFunction,
    hasher: Hasher,
}

impl VerificationOp for RsaVerificationOp<'_> {
    fn update(&mut self, msg: &[u8]) {
        self.hasher.update(msg);
    }

    fn is_valid_signature(&mut self, sig: &[u8]) -> Result<bool> {
        let digest = self.hasher.finalize_reset();
        Ok(self
            .key
            .verify(pkcs1v15_sign_scheme(self.hash), &digest, sig)
            .is_ok())
    }

    fn hash_function(&self) -> String {
        self.hash.name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::pk_keys::SignatureFormat;
    use rand::rngs::OsRng;

    fn test_key() -> RsaPrivate {
        RsaPrivate::generate(&mut OsRng, 1024).unwrap()
    }

    #[test]
    fn test_scheme_names() {
        assert_eq!(Eme::from_name("EME-PKCS1-v1_5").unwrap(), Eme::Pkcs1v15);
        assert_eq!(Eme::from_name("Raw").unwrap(), Eme::Raw);
        assert!(Eme::from_name("OAEP(SHA-1)").is_err());

        assert_eq!(emsa_hash("EMSA3(SHA-256)").unwrap(), HashFunction::Sha256);
        assert_eq!(emsa_hash("PKCS1v15(SHA-512)").unwrap(), HashFunction::Sha512);
        assert!(emsa_hash("PSS(SHA-256)").is_err());
        assert!(emsa_hash("SHA-256").is_err());
    }

    #[test]
    fn test_work_factor() {
        assert_eq!(if_work_factor(3072), 128);
        assert_eq!(if_work_factor(2048), 112);
        assert_eq!(if_work_factor(512), 0);
    }

    #[test]
    fn test_raw_roundtrip_and_lengths() {
        let key = test_key();
        let enc = key.create_encryption_op(&mut OsRng, "Raw", "base").unwrap().unwrap();
        let mut dec = key.create_decryption_op(&mut OsRng, "Raw", "").unwrap().unwrap();

        assert_eq!(enc.max_input_bits(), 1023);
        assert_eq!(enc.ciphertext_length(5), 128);

        let ct = enc.encrypt(b"\x01\x02\x03", &mut OsRng).unwrap();
        let (pt, mask) = dec.decrypt(&ct).unwrap();
        assert_eq!(mask, 0xFF);
        assert_eq!(pt.len(), 128);
        assert_eq!(&pt[125..], &[1, 2, 3]);
    }

    /// Подпись RSA состоит из одной части без фиксированной ширины
    #[test]
    fn test_single_part_signature_shape() {
        let key = test_key();
        assert_eq!(key.message_parts(), 1);
        assert_eq!(key.message_part_size(), 0);
        assert_eq!(key.public_key().message_part_size(), 0);
        assert_eq!(key.default_x509_signature_format(), SignatureFormat::Standard);
    }

    #[test]
    fn test_decrypt_rejects_oversized_ciphertext() {
        let key = test_key();
        let mut dec = key
            .create_decryption_op(&mut OsRng, "PKCS1v15", "")
            .unwrap()
            .unwrap();
        assert!(matches!(dec.decrypt(&[0xFF; 129]), Err(CryptoError::Decoding(_))));
        assert!(dec.decrypt(&[0xFF; 128]).is_err());
    }

    #[test]
    fn test_pkcs1_bad_padding_is_a_mask_not_an_error() {
        let key = test_key();
        let raw = key.create_encryption_op(&mut OsRng, "Raw", "").unwrap().unwrap();
        let mut dec = key
            .create_decryption_op(&mut OsRng, "EME-PKCS1-v1_5", "")
            .unwrap()
            .unwrap();

        // block type 01 instead of 02
        let mut em = vec![0x00, 0x01];
        em.extend(std::iter::repeat(0xFF).take(100));
        em.push(0x00);
        em.extend_from_slice(&[0x33; 25]);
        let ct = raw.encrypt(&em, &mut OsRng).unwrap();

        let (_, mask) = dec.decrypt(&ct).unwrap();
        assert_eq!(mask, 0x00);
    }

    #[test]
    fn test_unknown_provider() {
        let key = test_key();
        assert!(matches!(
            key.create_signature_op(&mut OsRng, "EMSA3(SHA-256)", "pkcs11"),
            Err(CryptoError::ProviderNotFound(_))
        ));
    }
}
