//! Constant-time building blocks.
//!
//! Nothing in here branches on secret data: validity is carried as a
//! [`Choice`] or as a byte mask (`0xFF` valid, `0x00` invalid) and values are
//! combined with [`ConditionallySelectable`].

use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, ConstantTimeLess};
use zeroize::Zeroizing;

/// Byte mask for a choice: `0xFF` when set, `0x00` otherwise.
pub fn mask_from_choice(choice: Choice) -> u8 {
    0u8.wrapping_sub(choice.unwrap_u8())
}

/// Interpret a byte mask. Only `0xFF` counts as valid.
pub fn choice_from_mask(mask: u8) -> Choice {
    mask.ct_eq(&0xFF)
}

/// `out[i] = if choice { if_set[i] } else { if_unset[i] }` for every byte.
///
/// All three slices must have the same length; the length is public.
pub fn select_n(choice: Choice, out: &mut [u8], if_set: &[u8], if_unset: &[u8]) {
    debug_assert!(out.len() == if_set.len() && out.len() == if_unset.len());
    for ((o, s), u) in out.iter_mut().zip(if_set).zip(if_unset) {
        *o = u8::conditional_select(u, s, choice);
    }
}

/// Equality of two public-length byte strings.
pub fn bytes_eq(a: &[u8], b: &[u8]) -> Choice {
    a.ct_eq(b)
}

/// `a < b` without branching.
pub fn lt(a: usize, b: usize) -> Choice {
    (a as u64).ct_lt(&(b as u64))
}

/// Choose between two indices without branching.
pub fn select_index(choice: Choice, if_set: usize, if_unset: usize) -> usize {
    u64::conditional_select(&(if_unset as u64), &(if_set as u64), choice) as usize
}

/// Move `input` left by a secret `shift` (`shift <= input.len()`), zero filling
/// the tail. Runs a barrel shifter over every bit of the length, so the access
/// pattern only depends on `input.len()`.
pub fn shift_left(input: &[u8], shift: usize) -> Zeroizing<Vec<u8>> {
    let mut buf = Zeroizing::new(input.to_vec());
    let n = buf.len();

    let mut bit = 0u32;
    while bit < usize::BITS && (1usize << bit) <= n {
        let step = 1usize << bit;
        let apply = Choice::from(((shift >> bit) & 1) as u8);
        for i in 0..n {
            let src = if i + step < n { buf[i + step] } else { 0 };
            buf[i] = u8::conditional_select(&buf[i], &src, apply);
        }
        bit += 1;
    }

    buf
}
