//! Encryption facades and the constant-time decryption-failure protocol.
//!
//! [`Decryptor::decrypt_or_random`] is the building block for protocols
//! that must not reveal whether a ciphertext was well formed (TLS RSA key
//! exchange): it always returns a value of the expected length, either the
//! real plaintext or random bytes, and decides between them without
//! branching.

use crate::crypto::pk_keys::{PrivateKey, PublicKey};
use crate::crypto::pk_ops::{DecryptionOp, EncryptionOp};
use crate::error::{CryptoError, Result};
use crate::utils::ct;
use rand_core::CryptoRngCore;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

pub struct Encryptor<'k> {
    op: Box<dyn EncryptionOp + 'k>,
}

impl<'k> Encryptor<'k> {
    pub fn new<K: PublicKey + ?Sized>(
        key: &'k K,
        rng: &mut dyn CryptoRngCore,
        padding: &str,
        provider: &str,
    ) -> Result<Self> {
        use tracing::debug;

        let op = key
            .create_encryption_op(rng, padding, provider)?
            .ok_or_else(|| CryptoError::unsupported(key.algorithm_name(), "encryption"))?;

        debug!(
            target: "pubkey::encrypt",
            algorithm = %key.algorithm_name(),
            padding = %padding,
            "Created encryptor"
        );

        Ok(Self { op })
    }

    pub fn encrypt(&self, ptext: &[u8], rng: &mut dyn CryptoRngCore) -> Result<Vec<u8>> {
        self.op.encrypt(ptext, rng)
    }

    /// Largest plaintext accepted, in bytes.
    pub fn maximum_input_size(&self) -> usize {
        self.op.max_input_bits() / 8
    }

    pub fn ciphertext_length(&self, ptext_len: usize) -> usize {
        self.op.ciphertext_length(ptext_len)
    }
}

pub struct Decryptor<'k> {
    op: Box<dyn DecryptionOp + 'k>,
}

impl<'k> Decryptor<'k> {
    pub fn new<K: PrivateKey + ?Sized>(
        key: &'k K,
        rng: &mut dyn CryptoRngCore,
        padding: &str,
        provider: &str,
    ) -> Result<Self> {
        use tracing::debug;

        let op = key
            .create_decryption_op(rng, padding, provider)?
            .ok_or_else(|| CryptoError::unsupported(key.algorithm_name(), "decryption"))?;

        debug!(
            target: "pubkey::encrypt",
            algorithm = %key.algorithm_name(),
            padding = %padding,
            "Created decryptor"
        );

        Ok(Self { op })
    }

    pub fn plaintext_length(&self, ctext_len: usize) -> usize {
        self.op.plaintext_length(ctext_len)
    }

    /// Decrypt, failing with a Decoding error on invalid ciphertexts.
    ///
    /// The error reveals that decryption failed; protocols that must hide
    /// this use [`decrypt_or_random`](Self::decrypt_or_random).
    pub fn decrypt(&mut self, ctext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let (ptext, valid_mask) = self.op.decrypt(ctext)?;
        if valid_mask != 0xFF {
            return Err(CryptoError::Decoding(
                "Invalid public key ciphertext, cannot decrypt".to_string(),
            ));
        }
        Ok(ptext)
    }

    /// Decrypt `ctext`, or return random bytes if it does not decrypt to
    /// `expected_len` bytes with each `(offset, value)` of
    /// `required_content` in place.
    ///
    /// Offsets are protocol constants; one at or past `expected_len` is an
    /// Invalid-Argument error, raised before anything is decrypted. Apart
    /// from that this never fails.
    pub fn decrypt_or_random(
        &mut self,
        ctext: &[u8],
        expected_len: usize,
        rng: &mut dyn CryptoRngCore,
        required_content: &[(usize, u8)],
    ) -> Result<Zeroizing<Vec<u8>>> {
        if let Some((offset, _)) = required_content
            .iter()
            .find(|(offset, _)| *offset >= expected_len)
        {
            return Err(CryptoError::InvalidArgument(format!(
                "Required content offset {} outside a {} byte plaintext",
                offset, expected_len
            )));
        }

        let mut fake = Zeroizing::new(vec![0u8; expected_len]);
        rng.fill_bytes(&mut fake);

        // structural failures count as invalid
        let (mut decoded, valid_mask) = self
            .op
            .decrypt(ctext)
            .unwrap_or_else(|_| (Zeroizing::new(Vec::new()), 0x00));

        let mut valid = ct::choice_from_mask(valid_mask);
        valid &= (decoded.len() as u64).ct_eq(&(expected_len as u64));

        decoded.resize(expected_len, 0);
        for &(offset, value) in required_content {
            valid &= decoded[offset].ct_eq(&value);
        }

        let mut out = Zeroizing::new(vec![0u8; expected_len]);
        ct::select_n(valid, &mut out, &decoded, &fake);
        Ok(out)
    }

    pub fn decrypt_or_random_simple(
        &mut self,
        ctext: &[u8],
        expected_len: usize,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<Zeroizing<Vec<u8>>> {
        self.decrypt_or_random(ctext, expected_len, rng, &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::families::ed25519::Ed25519Private;
    use rand::rngs::OsRng;

    #[test]
    fn test_unsupported_capability() {
        let key = Ed25519Private::generate(&mut OsRng);
        let err = Encryptor::new(&key, &mut OsRng, "Raw", "").err().unwrap();
        assert_eq!(
            err,
            CryptoError::InvalidArgument("Key type Ed25519 does not support encryption".into())
        );
        assert!(Decryptor::new(&key, &mut OsRng, "Raw", "").is_err());
    }

    #[cfg(feature = "rsa")]
    mod rsa {
        use super::*;
        use crate::crypto::families::rsa::RsaPrivate;

        fn key() -> RsaPrivate {
            RsaPrivate::generate(&mut OsRng, 1024).unwrap()
        }

        #[test]
        fn test_decrypt_roundtrip_and_failure() {
            let key = key();
            let enc = Encryptor::new(&key, &mut OsRng, "EME-PKCS1-v1_5", "").unwrap();
            let mut dec = Decryptor::new(&key, &mut OsRng, "EME-PKCS1-v1_5", "").unwrap();
            assert_eq!(enc.maximum_input_size(), 117);

            let ct = enc.encrypt(b"secret", &mut OsRng).unwrap();
            assert_eq!(&dec.decrypt(&ct).unwrap()[..], b"secret");

            let mut bad = ct.clone();
            bad[0] ^= 0x01;
            assert!(dec.decrypt(&bad).is_err());
        }

        #[test]
        fn test_decrypt_or_random_lengths() {
            let key = key();
            let enc = Encryptor::new(&key, &mut OsRng, "PKCS1v15", "").unwrap();
            let mut dec = Decryptor::new(&key, &mut OsRng, "PKCS1v15", "").unwrap();

            let mut pms = [0x11u8; 48];
            pms[0] = 0x03;
            pms[1] = 0x03;
            let ct = enc.encrypt(&pms, &mut OsRng).unwrap();
            let required = [(0usize, 0x03u8), (1, 0x03)];

            let out = dec.decrypt_or_random(&ct, 48, &mut OsRng, &required).unwrap();
            assert_eq!(&out[..], &pms[..]);

            // wrong version bytes: random output of the same size
            let out = dec
                .decrypt_or_random(&ct, 48, &mut OsRng, &[(0, 0x03), (1, 0x01)])
                .unwrap();
            assert_eq!(out.len(), 48);
            assert_ne!(&out[..], &pms[..]);

            // wrong length, garbage, empty, oversized
            for ctext in [&ct[..], &[0u8; 7][..], &[][..], &[0xFF; 200][..]] {
                let out = dec.decrypt_or_random_simple(ctext, 32, &mut OsRng).unwrap();
                assert_eq!(out.len(), 32);
            }
        }

        #[test]
        fn test_required_offset_out_of_range() {
            let key = key();
            let mut dec = Decryptor::new(&key, &mut OsRng, "PKCS1v15", "").unwrap();
            assert!(matches!(
                dec.decrypt_or_random(&[0u8; 128], 48, &mut OsRng, &[(48, 0x03)]),
                Err(CryptoError::InvalidArgument(_))
            ));
        }
    }
}
