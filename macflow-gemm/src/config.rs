//! Run-time simulation settings.
//!
//! Loaded from a TOML file:
//!
//! ```toml
//! preset = "grid_2x2"
//! a = [[1, 2], [3, 4]]
//! b = [[5, 6], [7, 8]]
//! max_ticks = 10000
//! drain_flow = "backpressured"
//! consume_stall_every = 3
//! pause_every = 5
//! ```

use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use crate::constants;
use crate::controller::DrainFlow;
use crate::driver::Stimulus;
use crate::matrix::*;
use crate::preset::Preset;

/// Configuration errors.
#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Fs(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("unknown preset `{0}`")]
    UnknownPreset(String),
    #[error("unknown drain flow `{0}`, expected `lossy` or `backpressured`")]
    UnknownDrainFlow(String),
    #[error("invalid matrix: {0}")]
    Matrix(#[from] MatrixError),
    #[error("`a` and `b` must be given together")]
    HalfMatrices,
}

/// Simulation settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    /// Grid geometry preset name.
    pub preset: String,

    /// Left operand, `rows x K`.
    pub a: Option<Vec<Vec<u64>>>,

    /// Right operand, `K x cols`.
    pub b: Option<Vec<Vec<u64>>>,

    /// Tick budget.
    pub max_ticks: u64,

    /// Drain flow control.
    pub drain_flow: DrainFlow,

    /// Deasserts `consume` on every `n`-th drain tick. `0` always consumes.
    pub consume_stall_every: usize,

    /// Deasserts the global enable on every `n`-th tick. `0` never pauses.
    pub pause_every: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            preset: constants::DEFAULT_PRESET.to_string(),
            a: None,
            b: None,
            max_ticks: constants::DEFAULT_MAX_TICKS,
            drain_flow: DrainFlow::default(),
            consume_stall_every: 0,
            pause_every: 0,
        }
    }
}

impl SimConfig {
    /// Parses settings from TOML text.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> { Ok(toml::from_str(s)?) }

    /// Loads settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    /// Returns the selected preset.
    pub fn preset(&self) -> Result<Preset, ConfigError> { self.preset.parse() }

    /// Returns the stimulus pattern.
    pub fn stimulus(&self) -> Stimulus {
        Stimulus {
            pause_every: self.pause_every,
            consume_stall_every: self.consume_stall_every,
            max_ticks: self.max_ticks,
        }
    }

    /// Returns the operands. Without configured matrices, `a` counts up from 1 and `b` holds ones on and below its
    /// diagonal, both shaped for `preset` with `K = rows`.
    pub fn matrices(&self, preset: Preset) -> Result<(Matrix, Matrix), ConfigError> {
        match (&self.a, &self.b) {
            (Some(a), Some(b)) => Ok((Matrix::from_rows(a.clone())?, Matrix::from_rows(b.clone())?)),
            (None, None) => {
                let (rows, cols, _) = preset.geometry();
                let a = (0..rows).map(|i| (0..rows).map(|k| (i * rows + k + 1) as u64).collect()).collect();
                let b = (0..rows).map(|k| (0..cols).map(|j| u64::from(k >= j)).collect()).collect();
                Ok((Matrix::from_rows(a)?, Matrix::from_rows(b)?))
            }
            _ => Err(ConfigError::HalfMatrices),
        }
    }
}

impl FromStr for DrainFlow {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lossy" => Ok(DrainFlow::Lossy),
            "backpressured" => Ok(DrainFlow::Backpressured),
            _ => Err(ConfigError::UnknownDrainFlow(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SimConfig::from_toml_str("").unwrap();
        assert_eq!(config, SimConfig::default());
        assert_eq!(config.preset().unwrap(), Preset::Grid2x2);
        assert_eq!(config.drain_flow, DrainFlow::Lossy);
        let (a, b) = config.matrices(Preset::Grid3x2).unwrap();
        assert_eq!((a.rows(), a.cols(), b.rows(), b.cols()), (3, 3, 3, 2));
        assert_eq!(b.as_slice(), &[1, 0, 1, 1, 1, 1]);
    }

    #[test]
    fn full_file() {
        let config = SimConfig::from_toml_str(
            r#"
            preset = "grid_4x4"
            a = [[1, 2], [3, 4], [5, 6], [7, 8]]
            b = [[1, 0, 0, 1], [0, 1, 1, 0]]
            max_ticks = 500
            drain_flow = "backpressured"
            consume_stall_every = 3
            pause_every = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.preset().unwrap(), Preset::Grid4x4);
        assert_eq!(config.drain_flow, DrainFlow::Backpressured);
        assert_eq!(config.stimulus(), Stimulus { pause_every: 5, consume_stall_every: 3, max_ticks: 500 });
        let (a, b) = config.matrices(Preset::Grid4x4).unwrap();
        assert_eq!((a.rows(), a.cols(), b.cols()), (4, 2, 4));
    }

    #[test]
    fn rejects_bad_files() {
        assert!(matches!(SimConfig::from_toml_str("rows = 3"), Err(ConfigError::Parse(_))));
        assert!(matches!(SimConfig::from_toml_str("drain_flow = \"fifo\""), Err(ConfigError::Parse(_))));
        let half = SimConfig::from_toml_str("a = [[1]]").unwrap();
        assert!(matches!(half.matrices(Preset::Grid2x2), Err(ConfigError::HalfMatrices)));
        assert!(matches!("fifo".parse::<DrainFlow>(), Err(ConfigError::UnknownDrainFlow(_))));
    }
}
