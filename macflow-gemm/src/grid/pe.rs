//! Processing element.

use macflow::*;

/// PE state registers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PeState {
    /// Row operand, travelling east.
    pub a: Valid<u64>,

    /// Column operand, travelling south.
    pub b: Valid<u64>,

    /// Accumulated sum of products, modulo `2^W`.
    pub acc: u64,
}

impl PeState {
    /// Returns `true` if a row operand and a column operand meet in this PE.
    ///
    /// This is the PE's internal valid signal; the accumulator consumes the pair in the same cycle.
    pub fn fires(&self) -> bool { self.a.valid && self.b.valid }

    /// Egress interface towards the right neighbor.
    pub fn east(&self) -> Valid<u64> { self.a }

    /// Egress interface towards the bottom neighbor.
    pub fn south(&self) -> Valid<u64> { self.b }
}

/// Processing element with a 1-cycle delay register on each operand path.
///
/// Returns the next state. The accumulator consumes the operands registered in the previous cycle, so the MAC happens
/// one cycle after a pair meets.
pub fn pe<const W: usize>(in_left: Valid<u64>, in_top: Valid<u64>, state: &PeState) -> PeState {
    let acc = if state.fires() {
        truncate(state.acc.wrapping_add(state.a.inner.wrapping_mul(state.b.inner)), W)
    } else {
        state.acc
    };

    PeState { a: in_left, b: in_top, acc }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_when_operands_meet() {
        let s = pe::<8>(Valid::valid(3), Valid::valid(5), &PeState::default());
        assert!(s.fires());
        assert_eq!(s.acc, 0);
        let s = pe::<8>(Valid::invalid(), Valid::invalid(), &s);
        assert_eq!(s.acc, 15);
        assert!(!s.fires());
    }

    #[test]
    fn lone_operand_passes_through() {
        let s = pe::<8>(Valid::valid(3), Valid::invalid(), &PeState::default());
        assert_eq!(s.east(), Valid::valid(3));
        let s = pe::<8>(Valid::invalid(), Valid::invalid(), &s);
        assert_eq!(s.acc, 0);
    }

    #[test]
    fn wraps_at_element_width() {
        let s = PeState { a: Valid::valid(16), b: Valid::valid(17), acc: 250 };
        assert_eq!(pe::<8>(Valid::invalid(), Valid::invalid(), &s).acc, (250 + 16 * 17) % 256);
        let s = PeState { a: Valid::valid(u64::MAX), b: Valid::valid(u64::MAX), acc: 0 };
        assert_eq!(pe::<64>(Valid::invalid(), Valid::invalid(), &s).acc, 1);
    }
}
