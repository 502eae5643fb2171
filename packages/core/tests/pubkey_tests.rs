//! Integration tests for the public-key layer
//!
//! This test suite covers:
//! - Algorithm registry (load / create / provider lookup)
//! - Signer / Verifier in both signature formats
//! - Constant-time decryption fallback
//! - Key agreement and KEM facades
//! - Error handling

use construct_pubkey::crypto::pk_algs::{probe_provider_private_key, Algorithm};
use construct_pubkey::{
    create_private_key, load_private_key, load_public_key, AlgorithmIdentifier, CryptoError,
    KemDecryptor, KemEncryptor, KeyAgreement, PrivateKey, SignatureFormat, Signer, Verifier,
};
use rand::rngs::OsRng;

/// Generation parameters that keep the suite fast.
fn test_params(alg: Algorithm) -> &'static str {
    match alg.name() {
        "RSA" => "1024",
        _ => "",
    }
}

fn generate(alg: Algorithm) -> Box<dyn PrivateKey> {
    create_private_key(alg.name(), &mut OsRng, test_params(alg), "")
        .expect("key generation failed")
        .expect("enabled algorithm must be creatable")
}

/// Default signing scheme per family
fn signing_scheme(alg_name: &str) -> Option<&'static str> {
    match alg_name {
        "RSA" => Some("EMSA3(SHA-256)"),
        "ECDSA" | "DSA" => Some("SHA-256"),
        "Ed25519" | "Dilithium" => Some(""),
        _ => None,
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Every enabled family survives a private and public key round trip
#[test]
fn test_registry_roundtrip_all_families() {
    for &alg in Algorithm::enabled() {
        let key = generate(alg);
        let alg_id = key.algorithm_identifier();

        let public = load_public_key(&alg_id, &key.public_key_bits())
            .unwrap_or_else(|e| panic!("{}: public load failed: {}", alg.name(), e));
        assert_eq!(public.algorithm_name(), key.algorithm_name());
        assert_eq!(public.message_parts(), key.message_parts());
        assert_eq!(public.message_part_size(), key.message_part_size());
        assert_eq!(public.public_key_bits(), key.public_key_bits());

        let private = load_private_key(&alg_id, &key.private_key_bits())
            .unwrap_or_else(|e| panic!("{}: private load failed: {}", alg.name(), e));
        assert_eq!(private.algorithm_name(), key.algorithm_name());
        assert_eq!(private.public_key_bits(), key.public_key_bits());
        assert_eq!(private.key_length(), key.key_length());
    }
}

/// Unknown algorithms: Decoding error on load, None on create
#[test]
fn test_unknown_algorithm() {
    let alg_id = AlgorithmIdentifier::from_name("McEliece");
    let err = load_public_key(&alg_id, &[0u8; 32]).err().unwrap();
    assert_eq!(
        err,
        CryptoError::Decoding("Unknown or unavailable public key algorithm 'McEliece'".into())
    );
    assert!(load_private_key(&alg_id, &[0u8; 32]).is_err());

    let created = create_private_key("McEliece", &mut OsRng, "", "").unwrap();
    assert!(created.is_none(), "Unknown algorithm should not create a key");

    // unknown OIDs keep their dotted form
    let alg_id = AlgorithmIdentifier::from_oid("1.2.3.4", Vec::new());
    assert!(matches!(
        load_public_key(&alg_id, &[]),
        Err(CryptoError::Decoding(_))
    ));
}

/// Defaults, aliases and provider handling
#[test]
fn test_create_defaults_and_providers() {
    let key = create_private_key("X25519", &mut OsRng, "", "base")
        .unwrap()
        .unwrap();
    assert_eq!(key.algorithm_name(), "Curve25519");

    // провайдер проверяется только при создании операций
    let key = create_private_key("Ed25519", &mut OsRng, "", "openssl")
        .unwrap()
        .unwrap();
    assert!(matches!(
        Signer::new(key.as_ref(), &mut OsRng, "", SignatureFormat::Standard, "openssl"),
        Err(CryptoError::ProviderNotFound(_))
    ));
    assert!(Signer::new(key.as_ref(), &mut OsRng, "", SignatureFormat::Standard, "base").is_ok());

    assert_eq!(
        probe_provider_private_key("Ed25519", &["openssl", "base"]),
        vec!["base".to_string()]
    );
    assert_eq!(
        probe_provider_private_key("McEliece", &["base", "tpm"]),
        vec!["base".to_string()]
    );
}

#[cfg(feature = "ecc")]
#[test]
fn test_ec_default_group() {
    let key = create_private_key("ECDSA", &mut OsRng, "", "").unwrap().unwrap();
    assert_eq!(key.key_length(), 256);
    assert_eq!(key.message_parts(), 2);
    assert_eq!(key.message_part_size(), 32);

    assert!(matches!(
        create_private_key("ECDH", &mut OsRng, "brainpool512r1", ""),
        Err(CryptoError::InvalidArgument(_))
    ));
}

/// P-384 keys through the registry and both signature formats
#[cfg(feature = "ecc")]
#[test]
fn test_p384_roundtrip() {
    let key = create_private_key("ECDSA", &mut OsRng, "secp384r1", "")
        .unwrap()
        .unwrap();
    assert_eq!(key.key_length(), 384);
    assert_eq!(key.message_part_size(), 48);

    let alg_id = key.algorithm_identifier();
    let public = load_public_key(&alg_id, &key.public_key_bits()).unwrap();
    let private = load_private_key(&alg_id, &key.private_key_bits()).unwrap();
    assert_eq!(private.public_key_bits(), key.public_key_bits());

    for format in [SignatureFormat::Standard, SignatureFormat::DerSequence] {
        let mut signer = Signer::new(private.as_ref(), &mut OsRng, "SHA-384", format, "").unwrap();
        let sig = signer.sign_message(b"p384 message", &mut OsRng).unwrap();
        let mut verifier = Verifier::new(public.as_ref(), "SHA-384", format, "").unwrap();
        assert!(verifier.verify_message(b"p384 message", &sig), "{:?}", format);
    }

    let ecdh = create_private_key("ECDH", &mut OsRng, "P-384", "").unwrap().unwrap();
    assert_eq!(ecdh.public_key_bits().len(), 97);
}

/// DSA defaults to a 2048-bit group and signs in both formats
#[cfg(feature = "dl")]
#[test]
fn test_dsa_default_group_roundtrip() {
    let key = create_private_key("DSA", &mut OsRng, "", "").unwrap().unwrap();
    assert_eq!(key.algorithm_name(), "DSA");
    assert_eq!(key.key_length(), 2048);
    assert_eq!(key.message_parts(), 2);
    assert_eq!(key.message_part_size(), 32);

    let alg_id = key.algorithm_identifier();
    assert_eq!(alg_id.oid(), Some("1.2.840.10040.4.1"));
    let public = load_public_key(&alg_id, &key.public_key_bits()).unwrap();

    for format in [SignatureFormat::Standard, SignatureFormat::DerSequence] {
        let mut signer = Signer::new(key.as_ref(), &mut OsRng, "SHA-256", format, "").unwrap();
        let sig = signer.sign_message(b"dsa message", &mut OsRng).unwrap();
        let mut verifier = Verifier::new(public.as_ref(), "SHA-256", format, "").unwrap();
        assert!(verifier.verify_message(b"dsa message", &sig), "{:?}", format);
        assert!(!verifier.verify_message(b"other message", &sig));
    }

    let mut signer =
        Signer::new(key.as_ref(), &mut OsRng, "SHA-256", SignatureFormat::Standard, "").unwrap();
    signer.sign_message(b"x509", &mut OsRng).unwrap();
    assert_eq!(signer.algorithm_identifier().oid(), Some("2.16.840.1.101.3.4.3.2"));

    assert!(matches!(
        create_private_key("DSA", &mut OsRng, "1024,160", ""),
        Err(CryptoError::InvalidArgument(_))
    ));
}

#[cfg(feature = "post-quantum")]
#[test]
fn test_pq_default_modes() {
    let kyber = create_private_key("Kyber", &mut OsRng, "", "").unwrap().unwrap();
    assert_eq!(kyber.algorithm_identifier().to_formatted_string(), "Kyber-1024-r3");

    let dilithium = create_private_key("Dilithium-4x4-r3", &mut OsRng, "", "")
        .unwrap()
        .unwrap();
    assert_eq!(
        dilithium.algorithm_identifier().to_formatted_string(),
        "Dilithium-4x4-r3"
    );
    assert_eq!(dilithium.estimated_strength(), 128);
}

// ============================================================================
// Signatures
// ============================================================================

/// Sign/verify round trip for every signing family, in every valid format
#[test]
fn test_sign_verify_all_families() {
    for &alg in Algorithm::enabled() {
        let Some(scheme) = signing_scheme(alg.name()) else {
            continue;
        };
        let key = generate(alg);
        let public = key.public_key();

        let mut formats = vec![SignatureFormat::Standard];
        if key.message_parts() > 1 {
            formats.push(SignatureFormat::DerSequence);
        }

        for format in formats {
            let mut signer = Signer::new(key.as_ref(), &mut OsRng, scheme, format, "").unwrap();
            signer.update(b"The quick brown fox ").unwrap();
            signer.update(b"jumps over the lazy dog").unwrap();
            let sig = signer.signature(&mut OsRng).unwrap();
            if format == SignatureFormat::Standard {
                assert_eq!(sig.len(), signer.signature_length(), "{}", alg.name());
            } else {
                assert!(sig.len() <= signer.signature_length(), "{}", alg.name());
            }

            let mut verifier = Verifier::new(public.as_ref(), scheme, format, "").unwrap();
            assert!(
                verifier.verify_message(b"The quick brown fox jumps over the lazy dog", &sig),
                "{} {:?} signature should verify",
                alg.name(),
                format
            );

            let mut verifier = Verifier::new(public.as_ref(), scheme, format, "").unwrap();
            assert!(
                !verifier.verify_message(b"The quick brown fox jumps over the lazy cat", &sig),
                "{} {:?} signature should not verify a different message",
                alg.name(),
                format
            );
        }
    }
}

/// Standard signature length is stable across signing
#[test]
fn test_signature_length_stable() {
    for &alg in Algorithm::enabled() {
        let Some(scheme) = signing_scheme(alg.name()) else {
            continue;
        };
        let key = generate(alg);
        let mut signer =
            Signer::new(key.as_ref(), &mut OsRng, scheme, SignatureFormat::Standard, "").unwrap();
        let before = signer.signature_length();
        let sig = signer.sign_message(b"length", &mut OsRng).unwrap();
        assert_eq!(before, signer.signature_length());
        assert_eq!(sig.len(), before, "{}", alg.name());
    }
}

/// check_signature is total over garbage input
#[test]
fn test_check_signature_never_errors() {
    let garbage: [&[u8]; 5] = [&[], &[0x30], &[0x30, 0x00], &[0xFF; 7], &[0x30; 300]];

    for &alg in Algorithm::enabled() {
        let Some(scheme) = signing_scheme(alg.name()) else {
            continue;
        };
        let key = generate(alg);
        let mut formats = vec![SignatureFormat::Standard];
        if key.message_parts() > 1 {
            formats.push(SignatureFormat::DerSequence);
        }

        for format in formats {
            for sig in garbage {
                let mut verifier = Verifier::new(key.as_ref(), scheme, format, "").unwrap();
                assert!(!verifier.verify_message(b"msg", sig), "{}", alg.name());
            }
        }
    }
}

/// A finalized signer or verifier cannot be reused
#[test]
fn test_finalized_facades() {
    let key = create_private_key("Ed25519", &mut OsRng, "", "").unwrap().unwrap();
    let mut signer =
        Signer::new(key.as_ref(), &mut OsRng, "", SignatureFormat::Standard, "").unwrap();
    let sig = signer.sign_message(b"once", &mut OsRng).unwrap();

    assert!(matches!(signer.update(b"twice"), Err(CryptoError::InvalidState(_))));
    assert!(matches!(
        signer.signature(&mut OsRng),
        Err(CryptoError::InvalidState(_))
    ));

    let mut verifier = Verifier::new(key.as_ref(), "", SignatureFormat::Standard, "").unwrap();
    assert!(verifier.verify_message(b"once", &sig));
    assert!(!verifier.check_signature(&sig), "Finalized verifier should reject");
    assert!(matches!(verifier.update(b"once"), Err(CryptoError::InvalidState(_))));
}

/// DER sequence is invalid for single-part keys
#[test]
fn test_der_sequence_single_part_key() {
    let key = create_private_key("Ed25519", &mut OsRng, "", "").unwrap().unwrap();
    let result = Signer::new(key.as_ref(), &mut OsRng, "", SignatureFormat::DerSequence, "");
    assert!(matches!(result, Err(CryptoError::InvalidArgument(_))));

    let result = Verifier::new(key.as_ref(), "", SignatureFormat::DerSequence, "");
    assert!(matches!(result, Err(CryptoError::InvalidArgument(_))));
}

/// Non-minimal DER integers are not accepted even if the values are right
#[cfg(feature = "ecc")]
#[test]
fn test_non_canonical_der_rejected() {
    use construct_pubkey::crypto::pubkey::der_sig::der_encode_signature;

    let key = create_private_key("ECDSA", &mut OsRng, "", "").unwrap().unwrap();
    let mut signer =
        Signer::new(key.as_ref(), &mut OsRng, "SHA-256", SignatureFormat::Standard, "").unwrap();
    let raw = signer.sign_message(b"canonical", &mut OsRng).unwrap();

    let der = der_encode_signature(&raw, 2, 32).unwrap();
    let mut verifier =
        Verifier::new(key.as_ref(), "SHA-256", SignatureFormat::DerSequence, "").unwrap();
    assert!(verifier.verify_message(b"canonical", &der));

    // Pad r with a redundant leading zero: 02 len r  ->  02 len+1 00 r
    let r_len = der[3] as usize;
    let mut padded = vec![0x30, der[1] + 1, 0x02, (r_len + 1) as u8, 0x00];
    padded.extend_from_slice(&der[4..]);
    assert_eq!(padded.len(), der.len() + 1);

    let mut verifier =
        Verifier::new(key.as_ref(), "SHA-256", SignatureFormat::DerSequence, "").unwrap();
    assert!(!verifier.verify_message(b"canonical", &padded));
}

/// X.509 verification derives the scheme from the signature algorithm
#[cfg(feature = "ecc")]
#[test]
fn test_x509_verifier() {
    let key = create_private_key("ECDSA", &mut OsRng, "", "").unwrap().unwrap();
    let mut signer = Signer::new(
        key.as_ref(),
        &mut OsRng,
        "SHA-256",
        SignatureFormat::DerSequence,
        "",
    )
    .unwrap();
    let sig = signer.sign_message(b"tbsCertificate", &mut OsRng).unwrap();
    let sig_alg = signer.algorithm_identifier();
    assert_eq!(sig_alg.oid(), Some("1.2.840.10045.4.3.2"));

    let public = key.public_key();
    let mut verifier = Verifier::new_x509(public.as_ref(), &sig_alg, "").unwrap();
    assert_eq!(verifier.hash_function(), "SHA-256");
    assert!(verifier.verify_message(b"tbsCertificate", &sig));

    let rsa_alg = AlgorithmIdentifier::from_oid("1.2.840.113549.1.1.11", vec![0x05, 0x00]);
    assert!(matches!(
        Verifier::new_x509(public.as_ref(), &rsa_alg, ""),
        Err(CryptoError::Decoding(_))
    ));
}

/// Ed25519 known-answer test (RFC 8032, test 1)
#[test]
fn test_ed25519_rfc8032_vector() {
    let alg_id = AlgorithmIdentifier::from_oid("1.3.101.112", Vec::new());
    let public_bits =
        hex::decode("d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a").unwrap();
    let sig = hex::decode(concat!(
        "e5564300c360ac729086e2cc806e828a84877f1eb8e5d974d873e06522490155",
        "5fb8821590a33bacc61e39701cf9b46bd25bf5f0595bbe24655141438e7a100b",
    ))
    .unwrap();

    let public = load_public_key(&alg_id, &public_bits).unwrap();
    let mut verifier = Verifier::new(public.as_ref(), "", SignatureFormat::Standard, "").unwrap();
    assert!(verifier.verify_message(b"", &sig));

    let private_bits =
        hex::decode("9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60").unwrap();
    let private = load_private_key(&alg_id, &private_bits).unwrap();
    assert_eq!(private.public_key_bits(), public_bits);

    let mut signer =
        Signer::new(private.as_ref(), &mut OsRng, "Pure", SignatureFormat::Standard, "").unwrap();
    assert_eq!(signer.sign_message(b"", &mut OsRng).unwrap(), sig);
}

// ============================================================================
// Encryption
// ============================================================================

#[cfg(feature = "rsa")]
mod rsa_encryption {
    use super::*;
    use construct_pubkey::{Decryptor, Encryptor};

    /// decrypt_or_random returns expected_length bytes for anything
    #[test]
    fn test_decrypt_or_random_total() {
        let key = create_private_key("RSA", &mut OsRng, "1024", "").unwrap().unwrap();
        let public = key.public_key();
        let enc = Encryptor::new(public.as_ref(), &mut OsRng, "EME-PKCS1-v1_5", "").unwrap();
        let mut dec = Decryptor::new(key.as_ref(), &mut OsRng, "EME-PKCS1-v1_5", "").unwrap();
        assert_eq!(enc.ciphertext_length(48), 128);
        assert_eq!(dec.plaintext_length(128), 117);

        let valid = enc.encrypt(&[0x42; 48], &mut OsRng).unwrap();
        let short = enc.encrypt(&[0x42; 20], &mut OsRng).unwrap();
        let mut flipped = valid.clone();
        flipped[64] ^= 0x80;

        let inputs: [&[u8]; 6] = [&valid, &short, &flipped, &[], &[0xFF; 128], &[0x01; 300]];
        for ctext in inputs {
            let out = dec.decrypt_or_random(ctext, 48, &mut OsRng, &[]).unwrap();
            assert_eq!(out.len(), 48);
        }

        let out = dec.decrypt_or_random_simple(&valid, 48, &mut OsRng).unwrap();
        assert_eq!(&out[..], &[0x42; 48][..]);
    }

    /// RSA PKCS#1 v1.5 signatures through the registry
    #[test]
    fn test_rsa_signature_schemes() {
        let key = create_private_key("RSA", &mut OsRng, "1024", "").unwrap().unwrap();
        for scheme in ["EMSA3(SHA-256)", "EMSA_PKCS1(SHA-384)", "PKCS1v15(SHA-512)"] {
            let mut signer =
                Signer::new(key.as_ref(), &mut OsRng, scheme, SignatureFormat::Standard, "")
                    .unwrap();
            let sig = signer.sign_message(b"rsa", &mut OsRng).unwrap();
            assert_eq!(sig.len(), 128);

            let mut verifier =
                Verifier::new(key.as_ref(), scheme, SignatureFormat::Standard, "").unwrap();
            assert!(verifier.verify_message(b"rsa", &sig), "{}", scheme);
        }

        assert!(matches!(
            Signer::new(key.as_ref(), &mut OsRng, "PSS(SHA-256)", SignatureFormat::Standard, ""),
            Err(CryptoError::InvalidArgument(_))
        ));
    }
}

// ============================================================================
// Key agreement / KEM
// ============================================================================

/// Key agreement is symmetric for every family that supports it
#[test]
fn test_key_agreement_symmetric() {
    for &alg in Algorithm::enabled() {
        let alice = generate(alg);
        let bob = generate(alg);

        let Ok(ka) = KeyAgreement::new(alice.as_ref(), &mut OsRng, "HKDF(SHA-256)", "") else {
            continue;
        };
        let kb = KeyAgreement::new(bob.as_ref(), &mut OsRng, "HKDF(SHA-256)", "").unwrap();

        let a = ka.derive_key(32, &bob.public_key_bits(), b"salt").unwrap();
        let b = kb.derive_key(32, &alice.public_key_bits(), b"salt").unwrap();
        assert_eq!(a, b, "{}", alg.name());
        assert_eq!(a.len(), 32);
    }
}

/// KEM encrypt/decrypt agree for every family that supports it
#[test]
fn test_kem_roundtrip() {
    for &alg in Algorithm::enabled() {
        let key = generate(alg);
        let public = key.public_key();

        let Ok(enc) = KemEncryptor::new(public.as_ref(), "Raw", "") else {
            continue;
        };
        let dec = KemDecryptor::new(key.as_ref(), &mut OsRng, "Raw", "").unwrap();

        let (encap, shared) = enc.encrypt(&mut OsRng, 32, b"").unwrap();
        assert_eq!(encap.len(), enc.encapsulated_key_length(), "{}", alg.name());
        assert_eq!(shared.len(), enc.shared_key_length(32));
        assert_eq!(dec.decrypt(&encap, 32, b"").unwrap(), shared, "{}", alg.name());
    }
}
