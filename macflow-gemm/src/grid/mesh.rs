//! Mesh.

use itertools::iproduct;
use macflow::*;

use super::pe::*;

/// Mesh registers: `R` rows of `C` PEs.
pub type MeshState<const R: usize, const C: usize> = [[PeState; C]; R];

/// Returns an empty mesh with cleared accumulators.
pub fn mesh_init<const R: usize, const C: usize>() -> MeshState<R, C> { [[PeState::default(); C]; R] }

/// Advances the mesh by one cycle.
///
/// `west[i]` enters row `i` from the left edge and `north[j]` enters column `j` from the top edge. Operands leaving
/// the right and bottom edges are dropped.
pub fn mesh<const R: usize, const C: usize, const W: usize>(
    west: &[Valid<u64>; R], north: &[Valid<u64>; C], state: &MeshState<R, C>,
) -> MeshState<R, C> {
    let mut next = *state;
    for (i, j) in iproduct!(0..R, 0..C) {
        let in_left = if j == 0 { west[i] } else { state[i][j - 1].east() };
        let in_top = if i == 0 { north[j] } else { state[i - 1][j].south() };
        next[i][j] = pe::<W>(in_left, in_top, &state[i][j]);
    }
    next
}

/// Returns `true` if any operand is still travelling through the mesh.
pub fn mesh_busy<const R: usize, const C: usize>(state: &MeshState<R, C>) -> bool {
    state.iter().flatten().any(|pe| pe.a.valid || pe.b.valid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skewed_operands_meet_on_the_diagonal() {
        // Row i enters at step i and column j at step j, so (a_i, b_j) meet in PE (i, j) at step i + j.
        let a = [2u64, 3];
        let b = [5u64, 7];
        let mut state = mesh_init::<2, 2>();
        for step in 0..6 {
            let west = [0, 1].map(|i| if step == i { Valid::valid(a[i]) } else { Valid::invalid() });
            let north = [0, 1].map(|j| if step == j { Valid::valid(b[j]) } else { Valid::invalid() });
            state = mesh::<2, 2, 8>(&west, &north, &state);
        }
        assert!(!mesh_busy(&state));
        let acc = state.map(|row| row.map(|pe| pe.acc));
        assert_eq!(acc, [[10, 14], [15, 21]]);
    }
}
