//! DER `SEQUENCE OF INTEGER` wrapping for multi-part signatures.
//!
//! ```text
//! Standard:     r (part_size bytes) || s (part_size bytes)
//! DerSequence:  30 len | 02 len r' | 02 len s'
//! ```
//!
//! where `r'`/`s'` are the minimal two's-complement encodings of the
//! unsigned parts.

use crate::error::{CryptoError, Result};
use der::asn1::UintRef;
use der::{Decode, Encode};
use subtle::Choice;

use crate::utils::ct;

/// Wrap a raw signature of exactly `parts * part_size` bytes.
pub fn der_encode_signature(sig: &[u8], parts: usize, part_size: usize) -> Result<Vec<u8>> {
    if parts == 0 || part_size == 0 || sig.len() != parts * part_size {
        return Err(CryptoError::Encoding(format!(
            "Unexpected signature length {} for {} parts of {} bytes",
            sig.len(),
            parts,
            part_size
        )));
    }

    let ints = sig
        .chunks(part_size)
        .map(UintRef::new)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| CryptoError::Encoding(format!("Signature part: {}", e)))?;

    ints.to_der()
        .map_err(|e| CryptoError::Encoding(format!("Signature sequence: {}", e)))
}

/// A decoded DER signature.
pub struct DecodedSignature {
    /// Fixed-width concatenation of the parts.
    pub raw: Vec<u8>,
    /// Set when re-encoding `raw` reproduces the input byte for byte.
    pub canonical: Choice,
}

/// Unwrap a DER signature into the standard format.
///
/// Fails when the input is not a SEQUENCE of exactly `parts` non-negative
/// INTEGERs that each fit in `part_size` bytes. Encoding quirks that the
/// parser tolerates are reported through `canonical` rather than as errors.
pub fn decode_der_signature(
    der_sig: &[u8],
    parts: usize,
    part_size: usize,
) -> Result<DecodedSignature> {
    let ints: Vec<UintRef<'_>> = Vec::from_der(der_sig)?;
    if part_size == 0 || ints.len() != parts {
        return Err(CryptoError::Decoding(format!(
            "Signature has {} parts, expected {}",
            ints.len(),
            parts
        )));
    }

    let mut raw = vec![0u8; parts * part_size];
    for (int, out) in ints.iter().zip(raw.chunks_mut(part_size)) {
        let bytes = int.as_bytes();
        if bytes.len() > part_size {
            return Err(CryptoError::Decoding(format!(
                "Signature part of {} bytes exceeds {}",
                bytes.len(),
                part_size
            )));
        }
        out[part_size - bytes.len()..].copy_from_slice(bytes);
    }

    let reencoded = der_encode_signature(&raw, parts, part_size)?;
    let canonical = ct::bytes_eq(&reencoded, der_sig);

    Ok(DecodedSignature { raw, canonical })
}
