//! EME-PKCS1-v1_5 decoding without secret-dependent branches.
//!
//! Layout: `00 || 02 || PS (>= 8 non-zero bytes) || 00 || M`.

use crate::utils::ct;
use subtle::{Choice, ConstantTimeEq};
use zeroize::Zeroizing;

/// Minimum padding string length.
const MIN_PS_LEN: usize = 8;

/// Strip the padding from an encoded message of the full modulus width.
///
/// Returns the recovered message and a validity mask (`0xFF`/`0x00`). On
/// failure the returned buffer is empty; the only thing that depends on
/// validity is the final length of the output.
pub fn unpad(em: &[u8]) -> (Zeroizing<Vec<u8>>, u8) {
    let len = em.len();
    if len < MIN_PS_LEN + 3 {
        return (Zeroizing::new(Vec::new()), 0x00);
    }

    let mut bad = !em[0].ct_eq(&0x00) | !em[1].ct_eq(&0x02);

    let mut seen_zero = Choice::from(0);
    let mut delim_idx = 0usize;
    for (i, b) in em.iter().enumerate().skip(2) {
        let is_zero = b.ct_eq(&0x00);
        let first_zero = is_zero & !seen_zero;
        delim_idx = ct::select_index(first_zero, i, delim_idx);
        seen_zero |= is_zero;
    }

    bad |= !seen_zero;
    bad |= ct::lt(delim_idx, 2 + MIN_PS_LEN);

    let valid = !bad;
    let start = ct::select_index(valid, delim_idx + 1, len);

    let mut out = ct::shift_left(em, start);
    out.truncate(len - start);

    (out, ct::mask_from_choice(valid))
}
