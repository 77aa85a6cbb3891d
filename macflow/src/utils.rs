//! Utilities.

use arrayvec::ArrayVec;
use static_assertions::const_assert;

/// Widest word a signal can carry.
pub const MAX_WORD_WIDTH: usize = u64::BITS as usize;

const_assert!(MAX_WORD_WIDTH == 64);

/// Returns ceiling log2.
pub const fn clog2(value: usize) -> usize {
    if value == 0 {
        0
    } else {
        (::std::mem::size_of::<usize>() * 8) - (value - 1).leading_zeros() as usize
    }
}

/// Returns the all-ones mask of a `width`-bit word.
///
/// # Panics
///
/// Panics if `width` exceeds [`MAX_WORD_WIDTH`].
pub const fn mask(width: usize) -> u64 {
    assert!(width <= MAX_WORD_WIDTH, "word width exceeds 64 bits");
    if width == MAX_WORD_WIDTH {
        u64::MAX
    } else {
        (1 << width) - 1
    }
}

/// Truncates `value` to its low `width` bits.
pub const fn truncate(value: u64, width: usize) -> u64 { value & mask(width) }

/// Returns bit-represented value of an integer, least significant bit first.
pub fn usize_to_bitvec(n: usize, value: usize) -> Vec<bool> {
    assert!(n >= clog2(value + 1), "Width ({}) is too small to be converted from the value '{}'", n, value);
    let size_of_usize = ::std::mem::size_of::<usize>();
    (0..n).map(|i| if i >= size_of_usize * 8 { false } else { (value & (1 << i)) != 0 }).collect::<Vec<_>>()
}

/// Returns the integer represented by `bits`, least significant bit first.
pub fn bitvec_to_usize(bits: &[bool]) -> usize {
    bits.iter().enumerate().filter(|(_, b)| **b).fold(0, |acc, (i, _)| acc | (1 << i))
}

/// Returns the low `N` bits of `bits`, zero-extended when `bits` is narrower.
pub fn low_bits<const N: usize>(bits: &[bool]) -> [bool; N] {
    (0..N)
        .map(|i| bits.get(i).copied().unwrap_or(false))
        .collect::<ArrayVec<bool, N>>()
        .into_inner()
        .expect("exactly N bits were collected")
}
