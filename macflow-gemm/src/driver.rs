//! Matrix multiply driver.
//!
//! Plays the producer and the consumer around an [`Accelerator`]: streams `K` injection rounds for an `R x K` by
//! `K x C` product, requests one drain round once the last round has been computed, and collects the drained words.

use std::collections::VecDeque;

use log::{debug, info, warn};
use macflow::*;
use thiserror::Error;

use crate::accelerator::*;
use crate::controller::{DrainFlow, Phase};
use crate::matrix::Matrix;

/// Driver errors.
#[allow(missing_docs)]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DriverError {
    #[error("cannot compute a {a_rows}x{a_cols} by {b_rows}x{b_cols} product on a {rows}x{cols} grid")]
    ShapeMismatch { a_rows: usize, a_cols: usize, b_rows: usize, b_cols: usize, rows: usize, cols: usize },
    #[error("inner dimension is zero")]
    EmptyInner,
    #[error("operand {value} does not fit in {width} bits")]
    OperandTooWide { value: u64, width: usize },
    #[error("no result after {ticks} ticks (controller in {phase})")]
    Timeout { ticks: u64, phase: Phase },
}

/// Stimulus pattern applied around the accelerator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stimulus {
    /// Deasserts the global enable on every `n`-th tick. `0` never pauses; `1` never lets the design run.
    pub pause_every: usize,

    /// Deasserts `consume` on every `n`-th drain tick. `0` always consumes; `1` never does, which stalls a
    /// backpressured drain forever.
    pub consume_stall_every: usize,

    /// Tick budget for one run.
    pub max_ticks: u64,
}

impl Default for Stimulus {
    fn default() -> Self { Self { pause_every: 0, consume_stall_every: 0, max_ticks: crate::constants::DEFAULT_MAX_TICKS } }
}

fn every(n: usize, count: u64) -> bool { n > 0 && count % n as u64 == n as u64 - 1 }

/// Outcome of a matrix multiply run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatmulRun {
    /// Drained result. Slots whose word was not consumed stay zero.
    pub result: Matrix,

    /// Raw ticks, including paused ones.
    pub ticks: u64,

    /// Operand transfers.
    pub transfers: usize,

    /// Injection rounds.
    pub rounds: usize,

    /// Words taken by the consumer.
    pub drained: usize,

    /// Slots whose word was presented but not consumed.
    pub dropped: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Inject,
    Flush,
    Drain,
}

/// Drives one accelerator through a matrix multiply.
#[derive(Debug)]
pub struct MatmulDriver<'a, const R: usize, const C: usize, const W: usize> {
    accel: &'a mut Accelerator<R, C, W>,
    stimulus: Stimulus,
}

impl<'a, const R: usize, const C: usize, const W: usize> MatmulDriver<'a, R, C, W> {
    /// Creates a new driver.
    pub fn new(accel: &'a mut Accelerator<R, C, W>, stimulus: Stimulus) -> Self { Self { accel, stimulus } }

    /// Operands of every injection round, in sequencing order: column `k` of `a` into the row lanes, then row `k` of
    /// `b` into the column lanes.
    fn operands(a: &Matrix, b: &Matrix) -> VecDeque<u64> {
        (0..a.cols()).flat_map(|k| (0..R).map(move |i| a.get(i, k)).chain((0..C).map(move |j| b.get(k, j)))).collect()
    }

    fn check(a: &Matrix, b: &Matrix) -> Result<(), DriverError> {
        if a.rows() != R || b.cols() != C || a.cols() != b.rows() {
            return Err(DriverError::ShapeMismatch {
                a_rows: a.rows(),
                a_cols: a.cols(),
                b_rows: b.rows(),
                b_cols: b.cols(),
                rows: R,
                cols: C,
            });
        }
        if a.cols() == 0 {
            return Err(DriverError::EmptyInner);
        }
        let value = a.max_value().max(b.max_value());
        if value > mask(W) {
            return Err(DriverError::OperandTooWide { value, width: W });
        }
        Ok(())
    }

    /// Resets the accelerator and computes `a * b` on it.
    pub fn run(&mut self, a: &Matrix, b: &Matrix) -> Result<MatmulRun, DriverError> {
        Self::check(a, b)?;
        self.accel.reset();

        let rounds = a.cols();
        let mut operands = Self::operands(a, b);
        let mut run = MatmulRun {
            result: Matrix::zeros(R, C),
            ticks: 0,
            transfers: 0,
            rounds,
            drained: 0,
            dropped: vec![],
        };
        let mut stage = Stage::Inject;
        let mut drain_ticks = 0u64;

        loop {
            if run.ticks >= self.stimulus.max_ticks {
                return Err(DriverError::Timeout { ticks: run.ticks, phase: self.accel.phase() });
            }
            let enable = !every(self.stimulus.pause_every, run.ticks);
            run.ticks += 1;

            let input = match stage {
                Stage::Inject => match operands.front() {
                    Some(operand) => AcceleratorInput::offer(*operand),
                    None if self.accel.phase() == Phase::AcceptingIdle => {
                        debug!("all {rounds} rounds computed, requesting drain");
                        stage = Stage::Flush;
                        AcceleratorInput::flush()
                    }
                    None => AcceleratorInput::idle(),
                },
                Stage::Flush => AcceleratorInput::flush(),
                Stage::Drain => {
                    AcceleratorInput::idle().consume(!every(self.stimulus.consume_stall_every, drain_ticks))
                }
            }
            .enable(enable);

            let out = self.accel.tick(&input);
            if !enable {
                continue;
            }

            if out.fire {
                operands.pop_front();
                run.transfers += 1;
            }

            match stage {
                Stage::Inject => {}
                Stage::Flush => stage = Stage::Drain,
                Stage::Drain => {
                    drain_ticks += 1;
                    if input.consume.takes(&out.output) {
                        run.result.set_slot(out.drain_index, out.output.inner);
                        run.drained += 1;
                    } else if out.output.valid && self.accel.flow() == DrainFlow::Lossy {
                        warn!("slot {} presented without consume, word {} lost", out.drain_index, out.output.inner);
                        run.dropped.push(out.drain_index);
                    }
                    if out.grid_reset {
                        break;
                    }
                }
            }
        }

        info!(
            "{}x{} product: {} rounds, {} transfers, {} words drained, {} dropped, {} ticks",
            R,
            C,
            run.rounds,
            run.transfers,
            run.drained,
            run.dropped.len(),
            run.ticks
        );
        Ok(run)
    }
}
