//! Top-level accelerator.
//!
//! Wires the sequencing controller to the one-hot sequencer, the drain counter, the drain selector and the compute
//! grid, and steps them together one clock tick at a time.

use std::fmt;

use log::{debug, trace};
use macflow::*;
use macflow_std::*;

use crate::controller::*;
use crate::grid::*;

/// Accelerator input signals for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceleratorInput {
    /// Global enable. While deasserted every register freezes and no boundary transfer happens.
    pub enable: bool,

    /// Operand from the producer.
    pub operand: Valid<u64>,

    /// Drain request.
    pub flush: bool,

    /// Acknowledgement from the consumer.
    pub consume: Consume,
}

impl AcceleratorInput {
    /// An enabled tick with every request deasserted.
    pub fn idle() -> Self { Self { enable: true, operand: Valid::invalid(), flush: false, consume: Consume::default() } }

    /// An enabled tick offering `operand`.
    pub fn offer(operand: u64) -> Self { Self { operand: Valid::valid(operand), ..Self::idle() } }

    /// An enabled tick requesting a drain round.
    pub fn flush() -> Self { Self { flush: true, ..Self::idle() } }

    /// Returns `self` with the consumer acknowledgement set to `consume`.
    pub fn consume(self, consume: bool) -> Self { Self { consume: Consume::new(consume), ..self } }

    /// Returns `self` with the global enable set to `enable`.
    pub fn enable(self, enable: bool) -> Self { Self { enable, ..self } }
}

impl Default for AcceleratorInput {
    fn default() -> Self { Self::idle() }
}

/// Accelerator output signals for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceleratorOutput {
    /// Controller phase in this tick.
    pub phase: Phase,

    /// Upstream ready.
    pub ready: Ready,

    /// The operand is transferred in this tick.
    pub fire: bool,

    /// Drain output port: the accumulator slot at `drain_index`, valid while draining.
    pub output: Valid<u64>,

    /// Drain counter value.
    pub drain_index: usize,

    /// Grid reset pulse. Low on paused ticks, since the grid holds its registers.
    pub grid_reset: bool,

    /// Debug: the grid is computing.
    pub busy: bool,

    /// Debug: the controller is idle.
    pub idle: bool,

    /// Debug: low 8 bits of the sequencer's one-hot vector.
    pub one_hot: u8,
}

/// Sequencing controller and compute grid of `R x C` MAC units over `W`-bit words.
pub struct Accelerator<const R: usize, const C: usize, const W: usize> {
    controller: Reg<Controller<R, C>>,
    sequencer: Reg<OneHotCounter<Sum<U<R>, U<C>>>>,
    drain: Reg<Counter<Prod<U<R>, U<C>>>>,
    grid: Reg<Grid<R, C, W>>,
    cycle: u64,
}

impl<const R: usize, const C: usize, const W: usize> Accelerator<R, C, W> {
    /// Number of lanes.
    pub const LANES: usize = R + C;

    /// Number of accumulator slots.
    pub const SLOTS: usize = R * C;

    /// Operand width.
    pub const WIDTH: usize = W;

    /// Creates a new accelerator in its reset state.
    pub fn new(flow: DrainFlow) -> Self {
        Self {
            controller: Reg::new(Controller::new(flow)),
            sequencer: Reg::new(OneHotCounter::new()),
            drain: Reg::new(Counter::new()),
            grid: Reg::new(Grid::new()),
            cycle: 0,
        }
    }

    /// Global reset.
    pub fn reset(&mut self) {
        self.controller.reset();
        self.sequencer.reset();
        self.drain.reset();
        self.grid.reset();
        self.cycle = 0;
        debug!("accelerator {}x{}: reset", R, C);
    }

    /// Returns the drain flow control.
    pub fn flow(&self) -> DrainFlow { self.controller.module().flow() }

    /// Returns the committed controller phase.
    pub fn phase(&self) -> Phase { self.controller.q() }

    /// Returns the committed toggle register.
    pub fn toggle(&self) -> bool { self.controller.state().toggle }

    /// Returns the committed sequencer position.
    pub fn one_hot_position(&self) -> usize { *self.sequencer.state() }

    /// Returns the committed drain counter value.
    pub fn drain_index(&self) -> usize { self.drain.q() }

    /// Returns the grid's accumulators, flattened row-major.
    pub fn result_bus(&self) -> Vec<u64> { self.grid.q().result }

    /// Returns the grid's per-PE valid signals, flattened row-major.
    pub fn pe_valid(&self) -> Vec<bool> { self.grid.q().pe_valid }

    /// Returns the number of enabled ticks since the last reset.
    pub fn cycle(&self) -> u64 { self.cycle }

    /// Advances the design by one clock tick.
    pub fn tick(&mut self, input: &AcceleratorInput) -> AcceleratorOutput {
        // Settle: register outputs first, then the controller, then the blocks it drives.
        let one_hot = self.sequencer.q();
        let drain_index = self.drain.q();
        let grid_view = self.grid.q();

        let ctrl = self.controller.eval(&ControllerInput {
            operand: input.operand.gate(input.enable),
            flush: input.flush && input.enable,
            consume: Consume::new(input.consume.consume && input.enable),
            grid_ready: grid_view.all_ready(),
            one_hot: one_hot.clone(),
            drain_index,
        });
        self.sequencer.eval(&ctrl.sequencer);
        self.drain.eval(&ctrl.drain);
        self.grid.eval(&GridInput::from_lanes(&ctrl.lanes, ctrl.grid_reset));

        let output = AcceleratorOutput {
            phase: ctrl.phase,
            ready: Ready::new(ctrl.ready.ready && input.enable),
            fire: ctrl.fire && input.enable,
            output: Valid::new(ctrl.output_valid && input.enable, grid_view.result.mux(drain_index)),
            drain_index,
            grid_reset: ctrl.grid_reset && input.enable,
            busy: ctrl.phase.busy(),
            idle: ctrl.phase.idle(),
            one_hot: one_hot.low_byte(),
        };

        // Commit.
        if !input.enable {
            trace!("cycle {}: paused in {}", self.cycle, ctrl.phase);
            self.hold();
            return output;
        }

        trace!(
            "cycle {}: {} one_hot={} drain={} fire={} output={:?}",
            self.cycle,
            ctrl.phase,
            one_hot,
            Counter::<Prod<U<R>, U<C>>>::bits(drain_index),
            output.fire,
            output.output.into_option()
        );
        self.controller.commit();
        self.sequencer.commit();
        self.drain.commit();
        self.grid.commit();
        self.cycle += 1;

        let next = self.phase();
        if next != ctrl.phase {
            debug!("cycle {}: {} -> {}", self.cycle, ctrl.phase, next);
        }

        output
    }

    fn hold(&mut self) {
        self.controller.hold();
        self.sequencer.hold();
        self.drain.hold();
        self.grid.hold();
    }
}

impl<const R: usize, const C: usize, const W: usize> fmt::Debug for Accelerator<R, C, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accelerator")
            .field("rows", &R)
            .field("cols", &C)
            .field("width", &W)
            .field("phase", &self.phase())
            .field("one_hot_position", &self.one_hot_position())
            .field("drain_index", &self.drain_index())
            .field("cycle", &self.cycle)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_state() {
        let mut accel = Accelerator::<2, 2, 8>::new(DrainFlow::Lossy);
        assert_eq!(accel.phase(), Phase::AcceptingIdle);
        assert_eq!(accel.one_hot_position(), 0);
        assert_eq!(accel.drain_index(), 0);

        accel.tick(&AcceleratorInput::offer(1));
        accel.tick(&AcceleratorInput::offer(1));
        assert_eq!(accel.one_hot_position(), 1);
        accel.reset();
        assert_eq!(accel.phase(), Phase::AcceptingIdle);
        assert_eq!(accel.one_hot_position(), 0);
        assert_eq!(accel.drain_index(), 0);
        assert!(!accel.toggle());
        assert_eq!(accel.cycle(), 0);
        assert_eq!(accel.result_bus(), vec![0; 4]);
    }

    fn run_until<const R: usize, const C: usize, const W: usize>(
        accel: &mut Accelerator<R, C, W>, phase: Phase, input: AcceleratorInput,
    ) {
        for _ in 0..64 {
            if accel.phase() == phase {
                return;
            }
            accel.tick(&input);
        }
        panic!("never reached {phase}");
    }

    /// Injects `[1, 2, 3, 4]`, computes, and starts a drain round.
    fn start_drain(accel: &mut Accelerator<2, 2, 8>) {
        let mut operands = [1, 2, 3, 4].into_iter().peekable();
        while accel.phase() != Phase::Computing {
            let operand = *operands.peek().expect("injection ends after the last operand");
            if accel.tick(&AcceleratorInput::offer(operand)).fire {
                operands.next();
            }
        }
        run_until(accel, Phase::AcceptingIdle, AcceleratorInput::idle());
        accel.tick(&AcceleratorInput::flush());
        assert_eq!(accel.phase(), Phase::Draining);
    }

    #[test]
    fn reset_while_draining() {
        let mut accel = Accelerator::<2, 2, 8>::new(DrainFlow::Lossy);
        start_drain(&mut accel);
        accel.tick(&AcceleratorInput::idle());
        accel.tick(&AcceleratorInput::idle());
        assert_eq!(accel.phase(), Phase::Draining);
        assert_eq!(accel.drain_index(), 2);
        assert_eq!(accel.result_bus(), vec![3, 4, 6, 8]);

        accel.reset();
        assert_eq!(accel.phase(), Phase::AcceptingIdle);
        assert_eq!(accel.one_hot_position(), 0);
        assert_eq!(accel.drain_index(), 0);
        assert!(!accel.toggle());
        assert_eq!(accel.result_bus(), vec![0; 4]);
        assert_eq!(accel.cycle(), 0);
    }

    #[test]
    fn paused_drain_done_reports_one_grid_reset() {
        let mut accel = Accelerator::<2, 2, 8>::new(DrainFlow::Lossy);
        start_drain(&mut accel);
        run_until(&mut accel, Phase::DrainDone, AcceleratorInput::idle());

        let out = accel.tick(&AcceleratorInput::idle().enable(false));
        assert_eq!(out.phase, Phase::DrainDone);
        assert!(!out.grid_reset);
        assert_eq!(accel.phase(), Phase::DrainDone);
        assert_eq!(accel.result_bus(), vec![3, 4, 6, 8]);

        let out = accel.tick(&AcceleratorInput::idle());
        assert!(out.grid_reset);
        assert_eq!(accel.phase(), Phase::AcceptingIdle);
        assert_eq!(accel.result_bus(), vec![0; 4]);
    }

    #[test]
    fn disabled_tick_freezes_everything() {
        let mut accel = Accelerator::<2, 2, 8>::new(DrainFlow::Lossy);
        accel.tick(&AcceleratorInput::offer(1));
        assert_eq!(accel.phase(), Phase::AcceptingInput);
        assert!(accel.toggle());

        let out = accel.tick(&AcceleratorInput::offer(1).enable(false));
        assert!(!out.ready.ready);
        assert!(!out.fire);
        assert_eq!(accel.phase(), Phase::AcceptingInput);
        assert!(accel.toggle());
        assert_eq!(accel.one_hot_position(), 0);
        assert_eq!(accel.cycle(), 1);

        let out = accel.tick(&AcceleratorInput::offer(1));
        assert!(out.fire);
        assert_eq!(accel.one_hot_position(), 1);
    }

    #[test]
    fn debug_outputs() {
        let mut accel = Accelerator::<2, 2, 8>::new(DrainFlow::Lossy);
        let out = accel.tick(&AcceleratorInput::idle());
        assert!(out.idle);
        assert!(!out.busy);
        assert_eq!(out.one_hot, 0b0001);
        assert!(!out.output.valid);
    }
}
