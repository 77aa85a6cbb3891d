//! Compute grid.
//!
//! An output-stationary systolic array of `R x C` MAC units behind `R` row lanes and `C` column lanes. Each lane is a
//! valid/ready channel that latches one operand per round. Once every lane holds its operand, the grid releases them
//! into the mesh with a diagonal skew (row `i` and column `j` leave their lane at launch step `i` and `j`), so `a_i`
//! and `b_j` meet in PE `(i, j)` and accumulate `a_i * b_j` there. Lanes stay not-ready until the mesh is empty again.

mod mesh;
mod pe;

use std::fmt;

use log::trace;
use macflow::*;

pub use mesh::*;
pub use pe::*;

/// A row or column lane of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lane {
    /// Row lane, feeding the left edge of a mesh row.
    Row(usize),

    /// Column lane, feeding the top edge of a mesh column.
    Col(usize),
}

impl Lane {
    /// Returns the lane at sequencing position `position`: the `rows` row lanes first, then the column lanes.
    pub fn from_position(position: usize, rows: usize) -> Self {
        if position < rows {
            Lane::Row(position)
        } else {
            Lane::Col(position - rows)
        }
    }
}

/// Grid input signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridInput<const R: usize, const C: usize> {
    /// Row lanes.
    pub rows: [Valid<u64>; R],

    /// Column lanes.
    pub cols: [Valid<u64>; C],

    /// Clears the accumulators, the lanes and the mesh.
    pub reset: bool,
}

impl<const R: usize, const C: usize> GridInput<R, C> {
    /// Splits `R + C` lane signals, ordered by sequencing position, into row and column lanes.
    ///
    /// # Panics
    ///
    /// Panics if `lanes` does not hold exactly `R + C` signals.
    pub fn from_lanes(lanes: &[Valid<u64>], reset: bool) -> Self {
        assert_eq!(lanes.len(), R + C, "grid has {} lanes", R + C);
        let mut input = Self { rows: [Valid::invalid(); R], cols: [Valid::invalid(); C], reset };
        for (position, lane) in lanes.iter().enumerate() {
            match Lane::from_position(position, R) {
                Lane::Row(i) => input.rows[i] = *lane,
                Lane::Col(j) => input.cols[j] = *lane,
            }
        }
        input
    }
}

/// Grid registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridState<const R: usize, const C: usize> {
    /// Operands latched by the row lanes.
    pub rows: [Valid<u64>; R],

    /// Operands latched by the column lanes.
    pub cols: [Valid<u64>; C],

    /// Next launch step, while lanes are being released into the mesh.
    pub launch: Option<usize>,

    /// Processing elements.
    pub mesh: MeshState<R, C>,
}

impl<const R: usize, const C: usize> GridState<R, C> {
    fn loaded(&self) -> bool { self.rows.iter().chain(self.cols.iter()).all(|lane| lane.valid) }

    fn busy(&self) -> bool { self.launch.is_some() || mesh_busy(&self.mesh) }
}

/// Grid output signals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridView {
    /// Ready signal of each row lane.
    pub row_ready: Vec<Ready>,

    /// Ready signal of each column lane.
    pub col_ready: Vec<Ready>,

    /// Accumulators, flattened row-major.
    pub result: Vec<u64>,

    /// Internal valid signal of each PE, flattened row-major.
    pub pe_valid: Vec<bool>,
}

impl GridView {
    /// Returns `true` if every row and column lane is ready.
    pub fn all_ready(&self) -> bool { self.row_ready.iter().chain(self.col_ready.iter()).all(|r| r.ready) }
}

/// Compute grid of `R x C` MAC units over `W`-bit unsigned words.
pub struct Grid<const R: usize, const C: usize, const W: usize>;

impl<const R: usize, const C: usize, const W: usize> Grid<R, C, W> {
    /// Number of lanes.
    pub const LANES: usize = R + C;

    /// Number of accumulator slots.
    pub const SLOTS: usize = R * C;

    /// Number of launch steps needed to release every lane.
    const SKEW: usize = if R > C { R } else { C };

    const CHECK: () = assert!(R > 0 && C > 0 && W > 0 && W <= MAX_WORD_WIDTH, "invalid grid geometry");

    /// Creates a new grid.
    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::CHECK;
        Self
    }
}

impl<const R: usize, const C: usize, const W: usize> Default for Grid<R, C, W> {
    fn default() -> Self { Self::new() }
}

impl<const R: usize, const C: usize, const W: usize> fmt::Debug for Grid<R, C, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grid").field("rows", &R).field("cols", &C).field("width", &W).finish()
    }
}

impl<const R: usize, const C: usize, const W: usize> Fsm for Grid<R, C, W> {
    type Input = GridInput<R, C>;
    type Output = GridView;
    type State = GridState<R, C>;

    fn init(&self) -> GridState<R, C> {
        GridState { rows: [Valid::invalid(); R], cols: [Valid::invalid(); C], launch: None, mesh: mesh_init() }
    }

    fn comb(&self, input: &GridInput<R, C>, state: &GridState<R, C>) -> (GridView, GridState<R, C>) {
        let view = self.q(state);
        if input.reset {
            return (view, self.init());
        }

        let mut next = *state;

        // Releases lanes into the mesh, one skew step per cycle.
        let step = match state.launch {
            Some(step) => Some(step),
            None if state.loaded() => {
                trace!("grid: all {} lanes loaded, launching", Self::LANES);
                Some(0)
            }
            None => None,
        };
        let mut west = [Valid::invalid(); R];
        let mut north = [Valid::invalid(); C];
        if let Some(step) = step {
            if step < R {
                west[step] = state.rows[step];
                next.rows[step] = Valid::invalid();
            }
            if step < C {
                north[step] = state.cols[step];
                next.cols[step] = Valid::invalid();
            }
        }
        next.launch = step.map(|step| step + 1).filter(|step| *step < Self::SKEW);
        next.mesh = mesh::<R, C, W>(&west, &north, &state.mesh);

        // Latches operands offered to ready lanes.
        for (i, lane) in input.rows.iter().enumerate() {
            if lane.fire(view.row_ready[i]) {
                next.rows[i] = Valid::valid(truncate(lane.inner, W));
            }
        }
        for (j, lane) in input.cols.iter().enumerate() {
            if lane.fire(view.col_ready[j]) {
                next.cols[j] = Valid::valid(truncate(lane.inner, W));
            }
        }

        (view, next)
    }
}

impl<const R: usize, const C: usize, const W: usize> Registered for Grid<R, C, W> {
    type Q = GridView;

    fn q(&self, state: &GridState<R, C>) -> GridView {
        let busy = state.busy();
        GridView {
            row_ready: state.rows.iter().map(|lane| Ready::new(!lane.valid && !busy)).collect(),
            col_ready: state.cols.iter().map(|lane| Ready::new(!lane.valid && !busy)).collect(),
            result: state.mesh.iter().flatten().map(|pe| pe.acc).collect(),
            pe_valid: state.mesh.iter().flatten().map(PeState::fires).collect(),
        }
    }
}
