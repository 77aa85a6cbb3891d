//! Constants for the shipped grid geometries.

// Smallest grid; the reference scenario runs on it.
pub mod grid_2x2 {
    use macflow::*;
    use static_assertions::*;

    pub const ROWS: usize = 2;
    pub const COLS: usize = 2;
    pub const WIDTH: usize = 8;
    pub const DRAIN_INDEX_WIDTH: usize = clog2(ROWS * COLS);

    const_assert!(ROWS + COLS <= 8);
    const_assert!(WIDTH <= MAX_WORD_WIDTH);
    const_assert_eq!(DRAIN_INDEX_WIDTH, 2);
}

// Non-square grid; the drain round has a non-power-of-two slot count.
pub mod grid_3x2 {
    use macflow::*;
    use static_assertions::*;

    pub const ROWS: usize = 3;
    pub const COLS: usize = 2;
    pub const WIDTH: usize = 16;
    pub const DRAIN_INDEX_WIDTH: usize = clog2(ROWS * COLS);

    const_assert!(WIDTH <= MAX_WORD_WIDTH);
    const_assert_eq!(DRAIN_INDEX_WIDTH, 3);
}

pub mod grid_4x4 {
    use macflow::*;
    use static_assertions::*;

    pub const ROWS: usize = 4;
    pub const COLS: usize = 4;
    pub const WIDTH: usize = 32;
    pub const DRAIN_INDEX_WIDTH: usize = clog2(ROWS * COLS);

    const_assert!(ROWS + COLS <= 8);
    const_assert!(WIDTH <= MAX_WORD_WIDTH);
    const_assert_eq!(DRAIN_INDEX_WIDTH, 4);
}

/// Tick budget of a run when none is configured.
pub const DEFAULT_MAX_TICKS: u64 = 100_000;

/// Preset used when none is configured.
pub const DEFAULT_PRESET: &str = "grid_2x2";
