//! Elliptic-curve Diffie-Hellman over the groups in [`EcGroup`].

use crate::crypto::alg_id::AlgorithmIdentifier;
use crate::crypto::families::ec_group::{EcGroup, EcPoint, EcScalar};
use crate::crypto::kdf::Kdf;
use crate::crypto::pk_keys::{check_provider, OpResult, PrivateKey, PublicKey};
use crate::crypto::pk_ops::KeyAgreementOp;
use crate::error::Result;
use rand_core::CryptoRngCore;
use zeroize::Zeroizing;

pub const ALGORITHM_NAME: &str = "ECDH";

pub struct EcdhPublic {
    point: EcPoint,
}

impl EcdhPublic {
    pub fn from_bits(alg_id: &AlgorithmIdentifier, key_bits: &[u8]) -> Result<Self> {
        let group = EcGroup::from_parameters(alg_id.parameters())?;
        Ok(Self {
            point: EcPoint::from_sec1(group, key_bits)?,
        })
    }
}

pub struct EcdhPrivate {
    secret: EcScalar,
    point: EcPoint,
}

impl EcdhPrivate {
    pub fn generate(rng: &mut dyn CryptoRngCore, group: EcGroup) -> Self {
        let secret = EcScalar::random(group, rng);
        let point = secret.public_point();
        Self { secret, point }
    }

    pub fn from_bits(alg_id: &AlgorithmIdentifier, key_bits: &[u8]) -> Result<Self> {
        let group = EcGroup::from_parameters(alg_id.parameters())?;
        let secret = EcScalar::from_bytes(group, key_bits)?;
        let point = secret.public_point();
        Ok(Self { secret, point })
    }
}

macro_rules! ecdh_public_common {
    () => {
        fn algorithm_name(&self) -> &'static str {
            ALGORITHM_NAME
        }

        fn algorithm_identifier(&self) -> AlgorithmIdentifier {
            AlgorithmIdentifier::new(ALGORITHM_NAME, self.point.group().parameters())
        }

        fn public_key_bits(&self) -> Vec<u8> {
            self.point.to_sec1()
        }

        fn key_length(&self) -> usize {
            self.point.group().order_bits()
        }

        fn estimated_strength(&self) -> usize {
            self.point.group().order_bits() / 2
        }
    };
}

impl PublicKey for EcdhPublic {
    ecdh_public_common!();
}

impl PublicKey for EcdhPrivate {
    ecdh_public_common!();
}

impl PrivateKey for EcdhPrivate {
    fn private_key_bits(&self) -> Zeroizing<Vec<u8>> {
        self.secret.to_bytes()
    }

    fn public_key(&self) -> Box<dyn PublicKey> {
        Box::new(EcdhPublic {
            point: self.point.clone(),
        })
    }

    fn create_key_agreement_op<'k>(
        &'k self,
        _rng: &mut dyn CryptoRngCore,
        kdf: &str,
        provider: &str,
    ) -> OpResult<dyn KeyAgreementOp + 'k> {
        check_provider(ALGORITHM_NAME, provider)?;
        Ok(Some(Box::new(EcdhAgreementOp {
            key: self,
            kdf: Kdf::from_name(kdf)?,
        })))
    }
}

struct EcdhAgreementOp<'k> {
    key: &'k EcdhPrivate,
    kdf: Kdf,
}

impl KeyAgreementOp for EcdhAgreementOp<'_> {
    fn agree(
        &self,
        key_len: usize,
        peer_public_value: &[u8],
        salt: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>> {
        let peer = EcPoint::from_sec1(self.key.secret.group(), peer_public_value)?;
        let shared = self.key.secret.diffie_hellman(&peer)?;
        self.kdf.derive(key_len, &shared, salt)
    }

    fn agreed_value_size(&self) -> usize {
        self.key.secret.group().order_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CryptoError;
    use rand::rngs::OsRng;

    #[test]
    fn test_agreement_is_symmetric() {
        let alice = EcdhPrivate::generate(&mut OsRng, EcGroup::Secp256r1);
        let bob = EcdhPrivate::generate(&mut OsRng, EcGroup::Secp256r1);

        let ka = alice.create_key_agreement_op(&mut OsRng, "Raw", "").unwrap().unwrap();
        let kb = bob.create_key_agreement_op(&mut OsRng, "Raw", "").unwrap().unwrap();

        let a = ka.agree(0, &bob.public_key_bits(), b"").unwrap();
        let b = kb.agree(0, &alice.public_key_bits(), b"").unwrap();
        assert_eq!(&a[..], &b[..]);
        assert_eq!(a.len(), ka.agreed_value_size());
    }

    #[test]
    fn test_p384_agreement() {
        let alice = EcdhPrivate::generate(&mut OsRng, EcGroup::Secp384r1);
        let bob = EcdhPrivate::generate(&mut OsRng, EcGroup::Secp384r1);
        assert_eq!(alice.key_length(), 384);

        let ka = alice
            .create_key_agreement_op(&mut OsRng, "HKDF(SHA-384)", "")
            .unwrap()
            .unwrap();
        let kb = bob
            .create_key_agreement_op(&mut OsRng, "HKDF(SHA-384)", "")
            .unwrap()
            .unwrap();
        assert_eq!(ka.agreed_value_size(), 48);

        let a = ka.agree(48, &bob.public_key_bits(), b"salt").unwrap();
        let b = kb.agree(48, &alice.public_key_bits(), b"salt").unwrap();
        assert_eq!(&a[..], &b[..]);

        // a P-256 point is not a valid P-384 peer
        let other = EcdhPrivate::generate(&mut OsRng, EcGroup::Secp256r1);
        assert!(matches!(
            ka.agree(48, &other.public_key_bits(), b"salt"),
            Err(CryptoError::Decoding(_))
        ));
    }

    #[test]
    fn test_bad_peer_point() {
        let alice = EcdhPrivate::generate(&mut OsRng, EcGroup::Secp256r1);
        let ka = alice
            .create_key_agreement_op(&mut OsRng, "HKDF(SHA-256)", "")
            .unwrap()
            .unwrap();
        assert!(matches!(
            ka.agree(32, &[0x04; 65], b""),
            Err(CryptoError::Decoding(_))
        ));
    }

    #[test]
    fn test_no_signatures() {
        let key = EcdhPrivate::generate(&mut OsRng, EcGroup::Secp256r1);
        assert!(key.create_signature_op(&mut OsRng, "SHA-256", "").unwrap().is_none());
    }
}
