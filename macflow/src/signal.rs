//! Bit-vector signals.

use std::fmt;

use itertools::Itertools;
use thiserror::Error;

use crate::*;

#[allow(missing_docs)]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignalError {
    #[error("position {position} is out of range for a {width}-bit one-hot vector")]
    OneHotOutOfRange { position: usize, width: usize },
    #[error("value {value} does not fit in {width} bits")]
    ValueTooWide { value: usize, width: usize },
}

/// Fixed-width bit vector, least significant bit first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Bits {
    inner: Vec<bool>,
}

impl Bits {
    /// Creates an all-zero vector.
    pub fn zero(width: usize) -> Self { Self { inner: vec![false; width] } }

    /// Creates a vector with exactly bit `position` set.
    pub fn one_hot(width: usize, position: usize) -> Result<Self, SignalError> {
        if position >= width {
            return Err(SignalError::OneHotOutOfRange { position, width });
        }
        let mut bits = Self::zero(width);
        bits.inner[position] = true;
        Ok(bits)
    }

    /// Creates the binary representation of `value`.
    pub fn from_usize(width: usize, value: usize) -> Result<Self, SignalError> {
        if width < clog2(value + 1) {
            return Err(SignalError::ValueTooWide { value, width });
        }
        Ok(Self { inner: usize_to_bitvec(width, value) })
    }

    /// Returns the width.
    pub fn width(&self) -> usize { self.inner.len() }

    /// Returns bit `i`, or `false` past the end.
    pub fn get(&self, i: usize) -> bool { self.inner.get(i).copied().unwrap_or(false) }

    /// Returns the most significant bit.
    pub fn msb(&self) -> bool { self.inner.last().copied().unwrap_or(false) }

    /// Returns the binary value.
    pub fn to_usize(&self) -> usize { bitvec_to_usize(&self.inner) }

    /// Returns `true` if exactly one bit is set.
    pub fn is_one_hot(&self) -> bool { self.inner.iter().filter(|b| **b).count() == 1 }

    /// Returns the index of the set bit of a one-hot vector.
    pub fn position(&self) -> Option<usize> {
        if !self.is_one_hot() {
            return None;
        }
        self.inner.iter().position(|b| *b)
    }

    /// Ands every bit with `gate`.
    pub fn gate(&self, gate: bool) -> Self { Self { inner: self.inner.iter().map(|b| *b && gate).collect() } }

    /// Returns the low 8 bits as a byte.
    pub fn low_byte(&self) -> u8 {
        low_bits::<8>(&self.inner).iter().enumerate().fold(0, |acc, (i, b)| acc | (u8::from(*b) << i))
    }

    /// Iterates the bits, least significant first.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ { self.inner.iter().copied() }
}

impl From<Vec<bool>> for Bits {
    fn from(inner: Vec<bool>) -> Self { Self { inner } }
}

impl fmt::Display for Bits {
    /// Formats most significant bit first, like a Verilog literal.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}'b{}", self.width(), self.inner.iter().rev().map(|b| if *b { '1' } else { '0' }).join(""))
    }
}
