//! Finite state machine (Mealy machine).

use std::fmt;

/// Finite state machine (Mealy machine).
///
/// `comb` describes the circuit for (1) the current-cycle output and (2) the next-cycle state, both computed from the
/// current-cycle input and the committed state. It must not mutate anything: the caller decides whether the next
/// state is committed.
pub trait Fsm: fmt::Debug {
    /// Input signals.
    type Input;

    /// Output signals.
    type Output;

    /// Registers.
    type State: Clone + fmt::Debug;

    /// Initial value of registers in the FSM.
    fn init(&self) -> Self::State;

    /// Computes the output and the next state.
    fn comb(&self, input: &Self::Input, state: &Self::State) -> (Self::Output, Self::State);
}

/// FSM whose register outputs can be observed before its input is known.
///
/// Downstream logic of a register output must be evaluated before the register's own input, e.g. a counter value
/// drives the logic that decides whether the counter is enabled.
pub trait Registered: Fsm {
    /// Register output.
    type Q;

    /// Returns the register output for the committed state.
    fn q(&self, state: &Self::State) -> Self::Q;
}

/// FSM instance with its committed registers.
pub struct Reg<M: Fsm> {
    module: M,
    state: M::State,
    pending: Option<M::State>,
}

impl<M: Fsm> Reg<M> {
    /// Creates a new instance in its initial state.
    pub fn new(module: M) -> Self {
        let state = module.init();
        Self { module, state, pending: None }
    }

    /// Returns the module.
    pub fn module(&self) -> &M { &self.module }

    /// Returns the committed state.
    pub fn state(&self) -> &M::State { &self.state }

    /// Settles the combinational logic for this cycle and stages the next state.
    ///
    /// Evaluating twice in the same cycle replaces the staged state.
    pub fn eval(&mut self, input: &M::Input) -> M::Output {
        let (output, next) = self.module.comb(input, &self.state);
        self.pending = Some(next);
        output
    }

    /// Commits the staged state. Does nothing if no state is staged.
    pub fn commit(&mut self) {
        if let Some(next) = self.pending.take() {
            self.state = next;
        }
    }

    /// Drops the staged state, keeping the registers frozen.
    pub fn hold(&mut self) { self.pending = None; }

    /// Returns the registers to their initial value.
    pub fn reset(&mut self) {
        self.state = self.module.init();
        self.pending = None;
    }
}

impl<M: Registered> Reg<M> {
    /// Returns the register output.
    pub fn q(&self) -> M::Q { self.module.q(&self.state) }
}

impl<M: Fsm> fmt::Debug for Reg<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reg").field("module", &self.module).field("state", &self.state).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Accumulates its input; outputs the previous sum.
    #[derive(Debug)]
    struct Acc;

    impl Fsm for Acc {
        type Input = u32;
        type Output = u32;
        type State = u32;

        fn init(&self) -> u32 { 0 }

        fn comb(&self, input: &u32, state: &u32) -> (u32, u32) { (*state, state + input) }
    }

    impl Registered for Acc {
        type Q = u32;

        fn q(&self, state: &u32) -> u32 { *state }
    }

    #[test]
    fn settle_then_commit() {
        let mut reg = Reg::new(Acc);
        assert_eq!(reg.eval(&3), 0);
        assert_eq!(reg.q(), 0);
        reg.commit();
        assert_eq!(reg.q(), 3);
        assert_eq!(reg.eval(&4), 3);
        reg.commit();
        assert_eq!(*reg.state(), 7);
    }

    #[test]
    fn hold_freezes_registers() {
        let mut reg = Reg::new(Acc);
        reg.eval(&5);
        reg.hold();
        reg.commit();
        assert_eq!(reg.q(), 0);
        reg.eval(&5);
        reg.commit();
        reg.reset();
        assert_eq!(reg.q(), 0);
    }
}
