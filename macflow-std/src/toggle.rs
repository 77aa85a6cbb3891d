//! Toggle register.

/// Toggle control signals. `set` has priority over `flip`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ToggleInput {
    /// Inverts the register.
    pub flip: bool,

    /// Forces the register high.
    pub set: bool,
}

/// Single-bit register that inverts on every enabled cycle.
///
/// Gating an enable with it halves the rate of the enabled logic.
#[derive(Debug, Default, Clone, Copy)]
pub struct Toggle;

impl Toggle {
    /// Computes the next register value.
    pub fn next(input: &ToggleInput, bit: bool) -> bool {
        if input.set {
            true
        } else {
            bit ^ input.flip
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn halves_the_rate() {
        let flip = ToggleInput { flip: true, set: false };
        let mut bit = false;
        let highs = (0..8)
            .filter(|_| {
                let high = bit;
                bit = Toggle::next(&flip, bit);
                high
            })
            .count();
        assert_eq!(highs, 4);
    }

    #[test]
    fn set_wins_over_flip() {
        assert!(Toggle::next(&ToggleInput { flip: true, set: true }, true));
        assert!(Toggle::next(&ToggleInput { flip: false, set: true }, false));
        assert!(!Toggle::next(&ToggleInput { flip: false, set: false }, false));
    }
}
