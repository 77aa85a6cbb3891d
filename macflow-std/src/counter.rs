//! Counter modules.

use std::fmt;
use std::marker::PhantomData;

use log::trace;

use crate::*;

/// Counter control signals. `clear` has priority over `enable`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CounterInput {
    /// Advances the counter by one.
    pub enable: bool,

    /// Returns the counter to zero.
    pub clear: bool,
}

impl CounterInput {
    /// Creates a new input.
    pub fn new(enable: bool, clear: bool) -> Self { Self { enable, clear } }
}

fn next_index<N: Num>(input: &CounterInput, index: usize) -> usize {
    if input.clear {
        0
    } else if input.enable {
        let next = index + 1;
        if next >= N::WIDTH {
            trace!("counter wraps after {} positions", N::WIDTH);
            0
        } else {
            next
        }
    } else {
        index
    }
}

/// Circular binary counter over `N` positions.
///
/// Its register is `IndexWidth<N>` bits wide; the value wraps to zero after `N - 1`.
pub struct Counter<N: Num> {
    _marker: PhantomData<N>,
}

impl<N: Num> Counter<N> {
    /// Register width.
    pub const WIDTH: usize = IndexWidth::<N>::WIDTH;

    /// Last value before wrapping.
    pub const LAST: usize = N::WIDTH - 1;

    /// Creates a new counter.
    pub fn new() -> Self { Self { _marker: PhantomData } }

    /// Returns the register bits of `value`.
    pub fn bits(value: usize) -> Bits {
        Bits::from_usize(Self::WIDTH, value).expect("counter value fits its register")
    }
}

impl<N: Num> Default for Counter<N> {
    fn default() -> Self { Self::new() }
}

impl<N: Num> fmt::Debug for Counter<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Counter").field("positions", &N::WIDTH).field("width", &Self::WIDTH).finish()
    }
}

impl<N: Num> Fsm for Counter<N> {
    type Input = CounterInput;
    type Output = usize;
    type State = usize;

    fn init(&self) -> usize { 0 }

    fn comb(&self, input: &CounterInput, index: &usize) -> (usize, usize) { (*index, next_index::<N>(input, *index)) }
}

impl<N: Num> Registered for Counter<N> {
    type Q = usize;

    fn q(&self, index: &usize) -> usize { *index }
}

/// One-hot counter over `N` positions.
///
/// Holds an index register and exposes it as an `N`-bit vector with exactly the bit at the current index set. Position
/// 0 after reset; advances one position per enabled cycle, wrapping after the last position.
pub struct OneHotCounter<N: Num> {
    _marker: PhantomData<N>,
}

impl<N: Num> OneHotCounter<N> {
    /// Vector width.
    pub const WIDTH: usize = N::WIDTH;

    /// Creates a new one-hot counter.
    ///
    /// # Panics
    ///
    /// Panics if `N` is zero.
    pub fn new() -> Self {
        assert!(N::WIDTH > 0, "one-hot counter needs at least one position");
        Self { _marker: PhantomData }
    }

    /// Returns the one-hot vector of `index`.
    pub fn vector(index: usize) -> Bits { Bits::one_hot(N::WIDTH, index).expect("one-hot index is in range") }
}

impl<N: Num> Default for OneHotCounter<N> {
    fn default() -> Self { Self::new() }
}

impl<N: Num> fmt::Debug for OneHotCounter<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OneHotCounter").field("width", &N::WIDTH).finish()
    }
}

impl<N: Num> Fsm for OneHotCounter<N> {
    type Input = CounterInput;
    type Output = Bits;
    type State = usize;

    fn init(&self) -> usize { 0 }

    fn comb(&self, input: &CounterInput, index: &usize) -> (Bits, usize) {
        (Self::vector(*index), next_index::<N>(input, *index))
    }
}

impl<N: Num> Registered for OneHotCounter<N> {
    type Q = Bits;

    fn q(&self, index: &usize) -> Bits { Self::vector(*index) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run<M: Fsm<Input = CounterInput>>(reg: &mut Reg<M>, inputs: &[CounterInput]) {
        for input in inputs {
            reg.eval(input);
            reg.commit();
        }
    }

    #[test]
    fn counter_wraps_after_last_slot() {
        let mut counter = Reg::new(Counter::<U<3>>::new());
        assert_eq!(Counter::<U<3>>::WIDTH, 2);
        let up = CounterInput::new(true, false);
        run(&mut counter, &[up, up]);
        assert_eq!(counter.q(), Counter::<U<3>>::LAST);
        run(&mut counter, &[up]);
        assert_eq!(counter.q(), 0);
    }

    #[test]
    fn clear_has_priority() {
        let mut counter = Reg::new(Counter::<U<4>>::new());
        run(&mut counter, &[CounterInput::new(true, false), CounterInput::new(false, false)]);
        assert_eq!(counter.q(), 1);
        run(&mut counter, &[CounterInput::new(true, true)]);
        assert_eq!(counter.q(), 0);
        assert_eq!(Counter::<U<4>>::bits(3).to_string(), "2'b11");
    }

    #[test]
    fn one_hot_counter_visits_every_position() {
        let mut seq = Reg::new(OneHotCounter::<Sum<U<2>, U<3>>>::new());
        let up = CounterInput::new(true, false);
        let mut seen = vec![];
        for _ in 0..5 {
            let vector = seq.q();
            assert!(vector.is_one_hot());
            assert_eq!(vector.width(), 5);
            seen.push(vector.position().unwrap());
            run(&mut seq, &[up]);
        }
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
        assert_eq!(seq.q().position(), Some(0));
    }

    #[test]
    fn one_hot_counter_resets_to_first_position() {
        let mut seq = Reg::new(OneHotCounter::<U<4>>::new());
        run(&mut seq, &[CounterInput::new(true, false), CounterInput::new(true, false)]);
        assert_eq!(seq.q(), OneHotCounter::<U<4>>::vector(2));
        run(&mut seq, &[CounterInput::new(false, true)]);
        assert_eq!(seq.q(), OneHotCounter::<U<4>>::vector(0));
    }
}
