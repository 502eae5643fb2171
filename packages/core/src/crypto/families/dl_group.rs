//! Discrete-logarithm groups: named DSA parameter sizes and the DER codec
//! for `Dss-Parms ::= SEQUENCE { p, q, g }`.
//!
//! A named group is generated once per process and then shared by every key
//! created under that name, so keys of one group can be mixed freely.

use crate::config::Config;
use crate::error::{CryptoError, Result};
use crate::utils::parsing::{split_on, to_u32bit};
use ::dsa::{BigUint, Components, KeySize};
use der::asn1::UintRef;
use der::{Decode, Encode};
use rand_core::CryptoRngCore;
use std::sync::OnceLock;

/// Parameter sizes `(L, N)`: bit lengths of `p` and `q`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DlGroup {
    Dsa2048_224,
    Dsa2048_256,
    Dsa3072_256,
}

impl DlGroup {
    /// Accepts `dsa/botan/2048`, `dsa/botan/3072`, or an explicit `L,N` pair.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "dsa/botan/2048" => return Ok(DlGroup::Dsa2048_256),
            "dsa/botan/3072" => return Ok(DlGroup::Dsa3072_256),
            _ => {}
        }

        let sizes = split_on(name, ',');
        if sizes.len() != 2 {
            return Err(unknown_group(name));
        }
        let p_bits = to_u32bit(sizes[0]).map_err(|_| unknown_group(name))?;
        let q_bits = to_u32bit(sizes[1]).map_err(|_| unknown_group(name))?;
        match (p_bits, q_bits) {
            (2048, 224) => Ok(DlGroup::Dsa2048_224),
            (2048, 256) => Ok(DlGroup::Dsa2048_256),
            (3072, 256) => Ok(DlGroup::Dsa3072_256),
            _ => Err(unknown_group(name)),
        }
    }

    /// Same policy as the EC groups: explicit parameters win, otherwise the
    /// configured default applies.
    pub fn resolve(alg_name: &str, params: &str) -> Result<Self> {
        let group_id = if params.is_empty() {
            Config::global().default_dl_group.as_str()
        } else {
            params
        };

        tracing::debug!(
            target: "pubkey::registry",
            algorithm = %alg_name,
            group = %group_id,
            "Resolved DL group"
        );

        Self::from_name(group_id)
    }

    pub fn p_bits(&self) -> usize {
        match self {
            DlGroup::Dsa2048_224 | DlGroup::Dsa2048_256 => 2048,
            DlGroup::Dsa3072_256 => 3072,
        }
    }

    pub fn q_bits(&self) -> usize {
        match self {
            DlGroup::Dsa2048_224 => 224,
            DlGroup::Dsa2048_256 | DlGroup::Dsa3072_256 => 256,
        }
    }

    fn key_size(&self) -> KeySize {
        match self {
            DlGroup::Dsa2048_224 => KeySize::DSA_2048_224,
            DlGroup::Dsa2048_256 => KeySize::DSA_2048_256,
            DlGroup::Dsa3072_256 => KeySize::DSA_3072_256,
        }
    }

    fn cache(&self) -> &'static OnceLock<Components> {
        static DSA_2048_224: OnceLock<Components> = OnceLock::new();
        static DSA_2048_256: OnceLock<Components> = OnceLock::new();
        static DSA_3072_256: OnceLock<Components> = OnceLock::new();
        match self {
            DlGroup::Dsa2048_224 => &DSA_2048_224,
            DlGroup::Dsa2048_256 => &DSA_2048_256,
            DlGroup::Dsa3072_256 => &DSA_3072_256,
        }
    }

    /// Domain parameters `(p, q, g)`. Generated with `rng` on first use.
    pub fn components(&self, rng: &mut dyn CryptoRngCore) -> Components {
        self.cache()
            .get_or_init(|| {
                tracing::debug!(
                    target: "pubkey::dl_group",
                    p_bits = self.p_bits(),
                    q_bits = self.q_bits(),
                    "Generating DL domain parameters"
                );
                let mut rng = rng;
                Components::generate(&mut rng, self.key_size())
            })
            .clone()
    }
}

fn unknown_group(name: &str) -> CryptoError {
    CryptoError::InvalidArgument(format!("Unknown or unsupported DL group '{}'", name))
}

// ============================================================================
// DER
// ============================================================================

/// DER `INTEGER`.
pub fn encode_integer(n: &BigUint) -> Vec<u8> {
    let bytes = n.to_bytes_be();
    // encoding into a Vec cannot fail
    UintRef::new(&bytes)
        .and_then(|int| int.to_der())
        .unwrap_or_default()
}

pub fn decode_integer(bits: &[u8]) -> Result<BigUint> {
    let int = UintRef::from_der(bits)?;
    Ok(BigUint::from_bytes_be(int.as_bytes()))
}

/// DER `Dss-Parms`.
pub fn encode_parameters(components: &Components) -> Vec<u8> {
    let p = components.p().to_bytes_be();
    let q = components.q().to_bytes_be();
    let g = components.g().to_bytes_be();
    [p.as_slice(), q.as_slice(), g.as_slice()]
        .into_iter()
        .map(UintRef::new)
        .collect::<der::Result<Vec<_>>>()
        .and_then(|ints| ints.to_der())
        .unwrap_or_default()
}

pub fn decode_parameters(params: &[u8]) -> Result<Components> {
    let ints = Vec::<UintRef>::from_der(params)?;
    let [p, q, g] = ints.as_slice() else {
        return Err(CryptoError::Decoding(format!(
            "DSA parameters must hold 3 integers, got {}",
            ints.len()
        )));
    };
    Components::from_components(
        BigUint::from_bytes_be(p.as_bytes()),
        BigUint::from_bytes_be(q.as_bytes()),
        BigUint::from_bytes_be(g.as_bytes()),
    )
    .map_err(|_| CryptoError::Decoding("Invalid DSA domain parameters".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn test_group_names() {
        assert_eq!(DlGroup::from_name("dsa/botan/2048").unwrap(), DlGroup::Dsa2048_256);
        assert_eq!(DlGroup::from_name("dsa/botan/3072").unwrap(), DlGroup::Dsa3072_256);
        assert_eq!(DlGroup::from_name("2048,224").unwrap(), DlGroup::Dsa2048_224);
        assert_eq!(DlGroup::from_name("3072, 256").unwrap(), DlGroup::Dsa3072_256);

        for bad in ["modp/ietf/2048", "1024,160", "2048", "2048,256,1", "L,N", ""] {
            assert!(
                matches!(DlGroup::from_name(bad), Err(CryptoError::InvalidArgument(_))),
                "'{}' should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_resolve_default_group() {
        let group = DlGroup::resolve("DSA", "").unwrap();
        assert_eq!(group, DlGroup::Dsa2048_256);
        assert_eq!(group.p_bits(), 2048);
        assert_eq!(group.q_bits(), 256);

        assert_eq!(DlGroup::resolve("DSA", "2048,224").unwrap(), DlGroup::Dsa2048_224);
        assert!(DlGroup::resolve("DSA", "secp256r1").is_err());
    }

    /// Один раз сгенерированная группа переиспользуется
    #[test]
    fn test_components_are_shared() {
        let group = DlGroup::Dsa2048_256;
        let a = group.components(&mut OsRng);
        let b = group.components(&mut OsRng);
        assert_eq!((a.p(), a.q(), a.g()), (b.p(), b.q(), b.g()));
        assert_eq!(a.p().bits(), 2048);
        assert_eq!(a.q().bits(), 256);
    }

    #[test]
    fn test_parameters_codec() {
        let components = DlGroup::Dsa2048_256.components(&mut OsRng);
        let encoded = encode_parameters(&components);
        assert_eq!(encoded[0], 0x30, "Dss-Parms is a SEQUENCE");
        let decoded = decode_parameters(&encoded).unwrap();
        assert_eq!(decoded.p(), components.p());
        assert_eq!(decoded.q(), components.q());
        assert_eq!(decoded.g(), components.g());

        let two_ints = [components.p().to_bytes_be(), components.q().to_bytes_be()];
        let short = two_ints
            .iter()
            .map(|b| UintRef::new(b).unwrap())
            .collect::<Vec<_>>()
            .to_der()
            .unwrap();
        assert!(matches!(decode_parameters(&short), Err(CryptoError::Decoding(_))));
        assert!(decode_parameters(&[0x05, 0x00]).is_err());
    }

    #[test]
    fn test_integer_codec() {
        let n = BigUint::from_bytes_be(&[0x80, 0x01]);
        let encoded = encode_integer(&n);
        assert_eq!(encoded, vec![0x02, 0x03, 0x00, 0x80, 0x01]);
        assert_eq!(decode_integer(&encoded).unwrap(), n);
        assert!(decode_integer(&[0x04, 0x01, 0x01]).is_err());
    }
}
