//! Sequencing controller.
//!
//! Meters the operand stream into the grid one lane at a time, hands control to the grid until every lane is ready
//! again, and drains the accumulators one slot per cycle on request.
//!
//! | From             | Condition                                   | To               |
//! |------------------|---------------------------------------------|------------------|
//! | `AcceptingIdle`  | input valid                                 | `AcceptingInput` |
//! | `AcceptingIdle`  | no input valid, flush requested             | `Draining`       |
//! | `AcceptingInput` | last lane accepted                          | `Computing`      |
//! | `Computing`      | all grid lanes ready                        | `AcceptingIdle`  |
//! | `Draining`       | last slot drained                           | `DrainDone`      |
//! | `DrainDone`      | always                                      | `AcceptingIdle`  |
//!
//! Any other combination holds the phase.

use std::fmt;

use macflow::*;
use macflow_std::*;
use serde::Deserialize;

/// Controller phase.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Waiting for the first operand of a round or for a flush request.
    #[default]
    AcceptingIdle,

    /// Injecting operands, one lane per transfer.
    AcceptingInput,

    /// Every lane has been offered its operand; waiting for the grid.
    Computing,

    /// Emitting one accumulator slot per cycle.
    Draining,

    /// Clearing the grid for one cycle.
    DrainDone,
}

/// Conditions evaluated by the transition function.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Events {
    /// The producer offers an operand.
    pub input_valid: bool,

    /// A drain round is requested.
    pub flush: bool,

    /// The operand for the last lane is transferred in this cycle.
    pub last_lane_accepted: bool,

    /// Every row and column lane of the grid is ready.
    pub grid_ready: bool,

    /// The last accumulator slot is drained in this cycle.
    pub last_slot_drained: bool,
}

impl Phase {
    /// Upstream ready.
    pub fn accepting_input(self) -> bool { matches!(self, Phase::AcceptingIdle | Phase::AcceptingInput) }

    /// Downstream valid.
    pub fn draining_output(self) -> bool { self == Phase::Draining }

    /// Grid reset pulse.
    pub fn grid_reset(self) -> bool { self == Phase::DrainDone }

    /// Debug-only busy flag.
    pub fn busy(self) -> bool { self == Phase::Computing }

    /// Debug-only idle flag.
    pub fn idle(self) -> bool { self == Phase::AcceptingIdle }

    /// Transition function.
    ///
    /// In `AcceptingIdle`, a new operand wins over a simultaneous flush request; the flush is dropped.
    pub fn next(self, events: &Events) -> Phase {
        match self {
            Phase::AcceptingIdle if events.input_valid => Phase::AcceptingInput,
            Phase::AcceptingIdle if events.flush => Phase::Draining,
            Phase::AcceptingInput if events.last_lane_accepted => Phase::Computing,
            Phase::Computing if events.grid_ready => Phase::AcceptingIdle,
            Phase::Draining if events.last_slot_drained => Phase::DrainDone,
            Phase::DrainDone => Phase::AcceptingIdle,
            _ => self,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::AcceptingIdle => "ACCEPTING_IDLE",
            Phase::AcceptingInput => "ACCEPTING_INPUT",
            Phase::Computing => "COMPUTING",
            Phase::Draining => "DRAINING",
            Phase::DrainDone => "DRAIN_DONE",
        };
        f.write_str(name)
    }
}

/// Flow control on the drain path.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrainFlow {
    /// One slot per cycle regardless of `consume`; words the consumer does not take are lost.
    #[default]
    Lossy,

    /// The drain advances only in cycles where the consumer asserts `consume`.
    Backpressured,
}

/// Controller input signals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerInput {
    /// Operand from the producer.
    pub operand: Valid<u64>,

    /// Drain request.
    pub flush: bool,

    /// Acknowledgement from the consumer.
    pub consume: Consume,

    /// AND of every grid lane's ready signal.
    pub grid_ready: bool,

    /// Sequencer position.
    pub one_hot: Bits,

    /// Drain counter value.
    pub drain_index: usize,
}

/// Controller output signals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerOutput {
    /// Phase in this cycle.
    pub phase: Phase,

    /// Upstream ready (`accepting_input`).
    pub ready: Ready,

    /// The operand is transferred to a lane in this cycle.
    pub fire: bool,

    /// Per-lane operand, valid only on the lane selected by the sequencer in a transfer cycle.
    pub lanes: Vec<Valid<u64>>,

    /// Downstream valid (`draining_output`).
    pub output_valid: bool,

    /// Sequencer control. `clear` is the sequencer reset pulse.
    pub sequencer: CounterInput,

    /// Drain counter control. `clear` is the drain round start.
    pub drain: CounterInput,

    /// Grid reset pulse.
    pub grid_reset: bool,
}

/// Controller registers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ControllerState {
    /// Phase.
    pub phase: Phase,

    /// Rate-halving toggle. The sequencer advances only in valid input cycles where it is high.
    pub toggle: bool,
}

/// Sequencing controller for an `R x C` grid.
#[derive(Clone, Copy, Default)]
pub struct Controller<const R: usize, const C: usize> {
    flow: DrainFlow,
}

impl<const R: usize, const C: usize> Controller<R, C> {
    /// Number of lanes visited per injection round.
    pub const LANES: usize = R + C;

    /// Number of accumulator slots visited per drain round.
    pub const SLOTS: usize = R * C;

    /// Creates a new controller.
    pub fn new(flow: DrainFlow) -> Self { Self { flow } }

    /// Returns the drain flow control.
    pub fn flow(&self) -> DrainFlow { self.flow }
}

impl<const R: usize, const C: usize> fmt::Debug for Controller<R, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller").field("lanes", &Self::LANES).field("slots", &Self::SLOTS).field("flow", &self.flow).finish()
    }
}

impl<const R: usize, const C: usize> Fsm for Controller<R, C> {
    type Input = ControllerInput;
    type Output = ControllerOutput;
    type State = ControllerState;

    fn init(&self) -> ControllerState { ControllerState::default() }

    fn comb(&self, input: &ControllerInput, state: &ControllerState) -> (ControllerOutput, ControllerState) {
        let phase = state.phase;
        let input_valid = input.operand.valid;

        // Injection.
        let ready = Ready::new(phase.accepting_input());
        let sequencer_reset = phase == Phase::AcceptingIdle && input_valid;
        let fire = phase == Phase::AcceptingInput && input.operand.fire(ready) && state.toggle;
        let lanes = input.operand.gate(fire).demux_one_hot(&input.one_hot);
        let toggle = Toggle::next(&ToggleInput { flip: input.operand.fire(ready), set: sequencer_reset }, state.toggle);

        // Drain. Only the flush that starts a round clears the drain counter, so a flush while draining cannot rewind
        // it.
        let drain_start = phase == Phase::AcceptingIdle && input.flush && !input_valid;
        let advance = match self.flow {
            DrainFlow::Lossy => true,
            DrainFlow::Backpressured => input.consume.consume,
        };
        let drain_enable = phase.draining_output() && advance;

        let events = Events {
            input_valid,
            flush: input.flush,
            last_lane_accepted: fire && input.one_hot.msb(),
            grid_ready: input.grid_ready,
            last_slot_drained: drain_enable && input.drain_index == Self::SLOTS - 1,
        };

        let output = ControllerOutput {
            phase,
            ready,
            fire,
            lanes,
            output_valid: phase.draining_output(),
            sequencer: CounterInput::new(fire, sequencer_reset),
            drain: CounterInput::new(drain_enable, drain_start),
            grid_reset: phase.grid_reset(),
        };

        (output, ControllerState { phase: phase.next(&events), toggle })
    }
}

impl<const R: usize, const C: usize> Registered for Controller<R, C> {
    type Q = Phase;

    fn q(&self, state: &ControllerState) -> Phase { state.phase }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(valid: bool, flush: bool, position: usize, drain_index: usize) -> ControllerInput {
        ControllerInput {
            operand: Valid::new(valid, 7),
            flush,
            consume: Consume::new(false),
            grid_ready: false,
            one_hot: Bits::one_hot(4, position).unwrap(),
            drain_index,
        }
    }

    fn state(phase: Phase, toggle: bool) -> ControllerState { ControllerState { phase, toggle } }

    #[test]
    fn transition_table() {
        use Phase::*;
        let on = |f: fn(&mut Events)| {
            let mut events = Events::default();
            f(&mut events);
            events
        };

        assert_eq!(AcceptingIdle.next(&on(|e| e.input_valid = true)), AcceptingInput);
        assert_eq!(AcceptingIdle.next(&on(|e| e.flush = true)), Draining);
        assert_eq!(AcceptingIdle.next(&Events::default()), AcceptingIdle);
        assert_eq!(AcceptingInput.next(&on(|e| e.input_valid = true)), AcceptingInput);
        assert_eq!(AcceptingInput.next(&on(|e| e.last_lane_accepted = true)), Computing);
        assert_eq!(Computing.next(&on(|e| e.input_valid = true)), Computing);
        assert_eq!(Computing.next(&on(|e| e.grid_ready = true)), AcceptingIdle);
        assert_eq!(Draining.next(&on(|e| e.flush = true)), Draining);
        assert_eq!(Draining.next(&on(|e| e.last_slot_drained = true)), DrainDone);
        assert_eq!(DrainDone.next(&Events::default()), AcceptingIdle);
    }

    #[test]
    fn injection_wins_over_flush() {
        let ctrl = Controller::<2, 2>::new(DrainFlow::Lossy);
        let (out, next) = ctrl.comb(&input(true, true, 0, 0), &state(Phase::AcceptingIdle, false));
        assert_eq!(next.phase, Phase::AcceptingInput);
        assert!(out.sequencer.clear);
        assert!(!out.drain.clear);
        assert!(!out.fire);
    }

    #[test]
    fn derived_signals() {
        assert!(Phase::AcceptingIdle.accepting_input());
        assert!(Phase::AcceptingInput.accepting_input());
        assert!(!Phase::Computing.accepting_input());
        assert!(Phase::Draining.draining_output());
        assert!(Phase::DrainDone.grid_reset());
        assert!(Phase::Computing.busy());
        assert!(Phase::AcceptingIdle.idle());
        assert_eq!(Phase::DrainDone.to_string(), "DRAIN_DONE");
    }

    #[test]
    fn transfers_only_on_toggle_cycles() {
        let ctrl = Controller::<2, 2>::new(DrainFlow::Lossy);

        let (out, next) = ctrl.comb(&input(true, false, 1, 0), &state(Phase::AcceptingInput, false));
        assert!(!out.fire);
        assert!(out.lanes.iter().all(|l| !l.valid));
        assert!(next.toggle);

        let (out, next) = ctrl.comb(&input(true, false, 1, 0), &state(Phase::AcceptingInput, true));
        assert!(out.fire);
        assert!(out.sequencer.enable);
        assert_eq!(out.lanes[1], Valid::valid(7));
        assert_eq!(out.lanes.iter().filter(|l| l.valid).count(), 1);
        assert!(!next.toggle);
        assert_eq!(next.phase, Phase::AcceptingInput);
    }

    #[test]
    fn last_lane_completes_injection() {
        let ctrl = Controller::<2, 2>::new(DrainFlow::Lossy);
        let (_, next) = ctrl.comb(&input(true, false, 3, 0), &state(Phase::AcceptingInput, false));
        assert_eq!(next.phase, Phase::AcceptingInput);
        let (out, next) = ctrl.comb(&input(true, false, 3, 0), &state(Phase::AcceptingInput, true));
        assert_eq!(out.lanes[3], Valid::valid(7));
        assert_eq!(next.phase, Phase::Computing);
    }

    #[test]
    fn flush_while_draining_does_not_clear_the_counter() {
        let ctrl = Controller::<2, 2>::new(DrainFlow::Lossy);
        let (out, next) = ctrl.comb(&input(false, true, 0, 1), &state(Phase::Draining, false));
        assert!(!out.drain.clear);
        assert!(out.drain.enable);
        assert_eq!(next.phase, Phase::Draining);
    }

    #[test]
    fn backpressured_drain_waits_for_consume() {
        let ctrl = Controller::<2, 2>::new(DrainFlow::Backpressured);
        let (out, next) = ctrl.comb(&input(false, false, 0, 3), &state(Phase::Draining, false));
        assert!(out.output_valid);
        assert!(!out.drain.enable);
        assert_eq!(next.phase, Phase::Draining);

        let mut consumed = input(false, false, 0, 3);
        consumed.consume = Consume::new(true);
        let (out, next) = ctrl.comb(&consumed, &state(Phase::Draining, false));
        assert!(out.drain.enable);
        assert_eq!(next.phase, Phase::DrainDone);
    }
}
