//! Реестр алгоритмов
//!
//! Maps algorithm names to family constructors: loading serialized keys,
//! generating fresh private keys, and listing which families this build
//! was compiled with. Families disabled through cargo features take the
//! same path as names nobody has heard of.

#[cfg(any(feature = "rsa", feature = "post-quantum"))]
use crate::config::Config;
use crate::crypto::alg_id::AlgorithmIdentifier;
use crate::crypto::families::curve25519::{Curve25519Private, Curve25519Public};
use crate::crypto::families::ed25519::{Ed25519Private, Ed25519Public};
use crate::crypto::pk_keys::{PrivateKey, PublicKey, SUPPORTED_PROVIDERS};
use crate::error::{CryptoError, Result};
use rand_core::CryptoRngCore;

#[cfg(feature = "ecc")]
use crate::crypto::families::{
    ec_group::EcGroup,
    ecdh::{EcdhPrivate, EcdhPublic},
    ecdsa::{EcdsaPrivate, EcdsaPublic},
};
#[cfg(feature = "dl")]
use crate::crypto::families::{
    dl_group::DlGroup,
    dsa::{DsaPrivate, DsaPublic},
};
#[cfg(feature = "post-quantum")]
use crate::crypto::families::{
    dilithium::{DilithiumMode, DilithiumPrivate, DilithiumPublic},
    kyber::{KyberMode, KyberPrivate, KyberPublic},
};
#[cfg(feature = "rsa")]
use crate::crypto::families::rsa::{RsaPrivate, RsaPublic};
#[cfg(feature = "rsa")]
use crate::utils::parsing::to_u32bit;

/// Algorithm families known to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    #[cfg(feature = "rsa")]
    Rsa,
    #[cfg(feature = "ecc")]
    Ecdsa,
    #[cfg(feature = "ecc")]
    Ecdh,
    #[cfg(feature = "dl")]
    Dsa,
    Curve25519,
    Ed25519,
    #[cfg(feature = "post-quantum")]
    Kyber,
    #[cfg(feature = "post-quantum")]
    Dilithium,
}

impl Algorithm {
    /// Families compiled into this build, in registry order.
    pub fn enabled() -> &'static [Algorithm] {
        &[
            #[cfg(feature = "rsa")]
            Algorithm::Rsa,
            #[cfg(feature = "ecc")]
            Algorithm::Ecdsa,
            #[cfg(feature = "ecc")]
            Algorithm::Ecdh,
            #[cfg(feature = "dl")]
            Algorithm::Dsa,
            Algorithm::Curve25519,
            Algorithm::Ed25519,
            #[cfg(feature = "post-quantum")]
            Algorithm::Kyber,
            #[cfg(feature = "post-quantum")]
            Algorithm::Dilithium,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            #[cfg(feature = "rsa")]
            Algorithm::Rsa => "RSA",
            #[cfg(feature = "ecc")]
            Algorithm::Ecdsa => "ECDSA",
            #[cfg(feature = "ecc")]
            Algorithm::Ecdh => "ECDH",
            #[cfg(feature = "dl")]
            Algorithm::Dsa => "DSA",
            Algorithm::Curve25519 => "Curve25519",
            Algorithm::Ed25519 => "Ed25519",
            #[cfg(feature = "post-quantum")]
            Algorithm::Kyber => "Kyber",
            #[cfg(feature = "post-quantum")]
            Algorithm::Dilithium => "Dilithium",
        }
    }

    /// Exact, case-sensitive lookup. Kyber and Dilithium also match their
    /// mode names (`Kyber-768-r3`), and `X25519` is accepted for Curve25519.
    pub fn from_name(name: &str) -> Option<Self> {
        if name == "X25519" {
            return Some(Algorithm::Curve25519);
        }
        #[cfg(feature = "post-quantum")]
        {
            if name.starts_with("Kyber-") {
                return Some(Algorithm::Kyber);
            }
            if name.starts_with("Dilithium-") {
                return Some(Algorithm::Dilithium);
            }
        }
        Self::enabled().iter().copied().find(|alg| alg.name() == name)
    }
}

fn unavailable(alg_name: &str) -> CryptoError {
    CryptoError::Decoding(format!(
        "Unknown or unavailable public key algorithm '{}'",
        alg_name
    ))
}

/// Decode a public key from its identifier and subject-public-key bits.
pub fn load_public_key(
    alg_id: &AlgorithmIdentifier,
    key_bits: &[u8],
) -> Result<Box<dyn PublicKey>> {
    use tracing::debug;

    let alg_name = alg_id.algorithm_name();
    let algorithm = Algorithm::from_name(alg_name).ok_or_else(|| unavailable(alg_name))?;

    debug!(
        target: "pubkey::registry",
        algorithm = %alg_name,
        "Loading public key"
    );

    let key: Box<dyn PublicKey> = match algorithm {
        #[cfg(feature = "rsa")]
        Algorithm::Rsa => Box::new(RsaPublic::from_bits(alg_id, key_bits)?),
        #[cfg(feature = "ecc")]
        Algorithm::Ecdsa => Box::new(EcdsaPublic::from_bits(alg_id, key_bits)?),
        #[cfg(feature = "ecc")]
        Algorithm::Ecdh => Box::new(EcdhPublic::from_bits(alg_id, key_bits)?),
        #[cfg(feature = "dl")]
        Algorithm::Dsa => Box::new(DsaPublic::from_bits(alg_id, key_bits)?),
        Algorithm::Curve25519 => Box::new(Curve25519Public::from_bits(alg_id, key_bits)?),
        Algorithm::Ed25519 => Box::new(Ed25519Public::from_bits(alg_id, key_bits)?),
        #[cfg(feature = "post-quantum")]
        Algorithm::Kyber => Box::new(KyberPublic::from_bits(alg_id, key_bits)?),
        #[cfg(feature = "post-quantum")]
        Algorithm::Dilithium => Box::new(DilithiumPublic::from_bits(alg_id, key_bits)?),
    };
    Ok(key)
}

/// Decode a private key from its identifier and private-key bits.
pub fn load_private_key(
    alg_id: &AlgorithmIdentifier,
    key_bits: &[u8],
) -> Result<Box<dyn PrivateKey>> {
    use tracing::debug;

    let alg_name = alg_id.algorithm_name();
    let algorithm = Algorithm::from_name(alg_name).ok_or_else(|| unavailable(alg_name))?;

    debug!(
        target: "pubkey::registry",
        algorithm = %alg_name,
        "Loading private key"
    );

    let key: Box<dyn PrivateKey> = match algorithm {
        #[cfg(feature = "rsa")]
        Algorithm::Rsa => Box::new(RsaPrivate::from_bits(alg_id, key_bits)?),
        #[cfg(feature = "ecc")]
        Algorithm::Ecdsa => Box::new(EcdsaPrivate::from_bits(alg_id, key_bits)?),
        #[cfg(feature = "ecc")]
        Algorithm::Ecdh => Box::new(EcdhPrivate::from_bits(alg_id, key_bits)?),
        #[cfg(feature = "dl")]
        Algorithm::Dsa => Box::new(DsaPrivate::from_bits(alg_id, key_bits)?),
        Algorithm::Curve25519 => Box::new(Curve25519Private::from_bits(alg_id, key_bits)?),
        Algorithm::Ed25519 => Box::new(Ed25519Private::from_bits(alg_id, key_bits)?),
        #[cfg(feature = "post-quantum")]
        Algorithm::Kyber => Box::new(KyberPrivate::from_bits(alg_id, key_bits)?),
        #[cfg(feature = "post-quantum")]
        Algorithm::Dilithium => Box::new(DilithiumPrivate::from_bits(alg_id, key_bits)?),
    };
    Ok(key)
}

/// Generate a new EC private key on `group`.
///
/// Returns `Ok(None)` for algorithms that are not EC based.
#[cfg(feature = "ecc")]
pub fn create_ec_private_key(
    alg_name: &str,
    group: EcGroup,
    rng: &mut dyn CryptoRngCore,
) -> Result<Option<Box<dyn PrivateKey>>> {
    match alg_name {
        "ECDSA" => Ok(Some(Box::new(EcdsaPrivate::generate(rng, group)))),
        "ECDH" => Ok(Some(Box::new(EcdhPrivate::generate(rng, group)))),
        _ => Ok(None),
    }
}

/// Generate a new private key.
///
/// `params` selects the key size, group or parameter set; empty means the
/// configured default. Unknown algorithms yield `Ok(None)`. The provider
/// only matters once operations are created, so it is not checked here.
pub fn create_private_key(
    alg_name: &str,
    rng: &mut dyn CryptoRngCore,
    params: &str,
    provider: &str,
) -> Result<Option<Box<dyn PrivateKey>>> {
    use tracing::{debug, info};

    let Some(algorithm) = Algorithm::from_name(alg_name) else {
        debug!(
            target: "pubkey::registry",
            algorithm = %alg_name,
            "No such algorithm, nothing created"
        );
        return Ok(None);
    };

    let key: Box<dyn PrivateKey> = match algorithm {
        #[cfg(feature = "rsa")]
        Algorithm::Rsa => Box::new(RsaPrivate::generate(rng, rsa_bits(params)?)?),
        #[cfg(feature = "ecc")]
        Algorithm::Ecdsa | Algorithm::Ecdh => {
            let group = EcGroup::resolve(alg_name, params)?;
            return create_ec_private_key(alg_name, group, rng);
        }
        #[cfg(feature = "dl")]
        Algorithm::Dsa => Box::new(DsaPrivate::generate(rng, DlGroup::resolve(alg_name, params)?)),
        Algorithm::Curve25519 => {
            expect_no_params(alg_name, params, &["Curve25519", "X25519"])?;
            Box::new(Curve25519Private::generate(rng))
        }
        Algorithm::Ed25519 => {
            expect_no_params(alg_name, params, &["Ed25519"])?;
            Box::new(Ed25519Private::generate(rng))
        }
        #[cfg(feature = "post-quantum")]
        Algorithm::Kyber => Box::new(KyberPrivate::generate(kyber_mode(alg_name, params)?)),
        #[cfg(feature = "post-quantum")]
        Algorithm::Dilithium => {
            Box::new(DilithiumPrivate::generate(dilithium_mode(alg_name, params)?))
        }
    };

    info!(
        target: "pubkey::registry",
        algorithm = %key.algorithm_name(),
        key_length = key.key_length(),
        provider = %provider,
        "Generated private key"
    );

    Ok(Some(key))
}

/// Providers from `candidates` that can create private keys. Only `base`
/// exists, whatever the algorithm.
pub fn probe_provider_private_key(_alg_name: &str, candidates: &[&str]) -> Vec<String> {
    candidates
        .iter()
        .filter(|p| SUPPORTED_PROVIDERS.contains(*p))
        .map(|p| p.to_string())
        .collect()
}

fn expect_no_params(alg_name: &str, params: &str, accepted: &[&str]) -> Result<()> {
    if params.is_empty() || accepted.contains(&params) {
        Ok(())
    } else {
        Err(CryptoError::InvalidArgument(format!(
            "{} does not take parameters '{}'",
            alg_name, params
        )))
    }
}

#[cfg(feature = "rsa")]
fn rsa_bits(params: &str) -> Result<usize> {
    let config = Config::global();
    let bits = if params.is_empty() {
        config.default_rsa_bits
    } else {
        to_u32bit(params)? as usize
    };

    if bits < config.min_rsa_bits || bits > config.max_rsa_bits {
        return Err(CryptoError::InvalidArgument(format!(
            "RSA key size {} outside [{}, {}]",
            bits, config.min_rsa_bits, config.max_rsa_bits
        )));
    }
    Ok(bits)
}

/// Mode from a `Kyber-...` name, or from params when the name is bare.
#[cfg(feature = "post-quantum")]
fn kyber_mode(alg_name: &str, params: &str) -> Result<KyberMode> {
    if alg_name != "Kyber" {
        expect_no_params(alg_name, params, &[alg_name])?;
        return KyberMode::from_name(alg_name);
    }
    if params.is_empty() {
        KyberMode::from_name(&Config::global().default_kyber_mode)
    } else {
        KyberMode::from_name(params)
    }
}

#[cfg(feature = "post-quantum")]
fn dilithium_mode(alg_name: &str, params: &str) -> Result<DilithiumMode> {
    if alg_name != "Dilithium" {
        expect_no_params(alg_name, params, &[alg_name])?;
        return DilithiumMode::from_name(alg_name);
    }
    let mode = match params {
        "" => Config::global().default_dilithium_mode.as_str(),
        "dilithium2" => "Dilithium-4x4-r3",
        "dilithium3" => "Dilithium-6x5-r3",
        "dilithium5" => "Dilithium-8x7-r3",
        other => other,
    };
    DilithiumMode::from_name(mode)
}
