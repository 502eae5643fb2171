//! Algorithm identifiers.
//!
//! An identifier is a canonical name (`"RSA"`, `"ECDSA/SHA-256"`,
//! `"Kyber-1024-r3"`) plus opaque algorithm parameters. Identifiers read
//! from certificates arrive as object identifiers and are resolved through
//! a static table; unknown OIDs keep their dotted form as the name so that
//! the registry reports them as unavailable.

use serde::{Deserialize, Serialize};

/// Known object identifiers and their canonical names.
const OID_TABLE: &[(&str, &str)] = &[
    ("1.2.840.113549.1.1.1", "RSA"),
    ("1.2.840.113549.1.1.11", "RSA/EMSA3(SHA-256)"),
    ("1.2.840.113549.1.1.12", "RSA/EMSA3(SHA-384)"),
    ("1.2.840.113549.1.1.13", "RSA/EMSA3(SHA-512)"),
    ("1.2.840.10045.2.1", "ECDSA"),
    ("1.2.840.10045.4.3.2", "ECDSA/SHA-256"),
    ("1.2.840.10045.4.3.3", "ECDSA/SHA-384"),
    ("1.2.840.10045.4.3.4", "ECDSA/SHA-512"),
    ("1.3.132.1.12", "ECDH"),
    ("1.2.840.10040.4.1", "DSA"),
    ("2.16.840.1.101.3.4.3.2", "DSA/SHA-256"),
    ("2.16.840.1.101.3.4.3.3", "DSA/SHA-384"),
    ("2.16.840.1.101.3.4.3.4", "DSA/SHA-512"),
    ("1.3.101.110", "Curve25519"),
    ("1.3.101.112", "Ed25519"),
];

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlgorithmIdentifier {
    name: String,
    #[serde(with = "serde_bytes")]
    parameters: Vec<u8>,
}

impl AlgorithmIdentifier {
    pub fn new(name: impl Into<String>, parameters: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            parameters,
        }
    }

    /// Identifier with no parameters.
    pub fn from_name(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    /// Resolve a dotted object identifier. Unknown OIDs are kept verbatim.
    pub fn from_oid(oid: &str, parameters: Vec<u8>) -> Self {
        let name = OID_TABLE
            .iter()
            .find(|(o, _)| *o == oid)
            .map(|(_, n)| n.to_string())
            .unwrap_or_else(|| oid.to_string());
        Self::new(name, parameters)
    }

    /// Dotted OID for this identifier, if it has a registered one.
    pub fn oid(&self) -> Option<&'static str> {
        OID_TABLE
            .iter()
            .find(|(_, n)| *n == self.name)
            .map(|(o, _)| *o)
    }

    /// Canonical string form, e.g. `ECDSA/SHA-256`.
    pub fn to_formatted_string(&self) -> &str {
        &self.name
    }

    /// First `/`-delimited token: the algorithm family used for dispatch.
    pub fn algorithm_name(&self) -> &str {
        self.name.split('/').next().unwrap_or("")
    }

    /// Everything after the first `/`: the padding or hash scheme, if any.
    pub fn scheme(&self) -> Option<&str> {
        self.name.split_once('/').map(|(_, rest)| rest)
    }

    pub fn parameters(&self) -> &[u8] {
        &self.parameters
    }
}

impl std::fmt::Display for AlgorithmIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
