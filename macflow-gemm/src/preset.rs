//! Grid geometries compiled into the binary.

use std::fmt;
use std::str::FromStr;

use crate::accelerator::Accelerator;
use crate::config::ConfigError;
use crate::constants;
use crate::controller::DrainFlow;
use crate::driver::*;
use crate::matrix::Matrix;

macro_rules! presets {
    ($($module:ident),* $(,)?) => {
        ::paste::paste! {
            /// Grid geometry preset.
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
            pub enum Preset {
                $(
                    #[doc = concat!("Geometry of [`constants::", stringify!($module), "`].")]
                    [<$module:camel>],
                )*
            }

            impl Preset {
                /// Every preset.
                pub const ALL: &'static [Preset] = &[$(Preset::[<$module:camel>],)*];

                /// Returns the preset name.
                pub fn name(self) -> &'static str {
                    match self {
                        $(Preset::[<$module:camel>] => stringify!($module),)*
                    }
                }

                /// Returns `(rows, cols, width)`.
                pub fn geometry(self) -> (usize, usize, usize) {
                    match self {
                        $(Preset::[<$module:camel>] => (constants::$module::ROWS, constants::$module::COLS, constants::$module::WIDTH),)*
                    }
                }

                /// Returns the drain counter width.
                pub fn drain_index_width(self) -> usize {
                    match self {
                        $(Preset::[<$module:camel>] => constants::$module::DRAIN_INDEX_WIDTH,)*
                    }
                }

                /// Computes `a * b` on a freshly reset accelerator of this geometry.
                pub fn run(self, flow: DrainFlow, stimulus: Stimulus, a: &Matrix, b: &Matrix) -> Result<MatmulRun, DriverError> {
                    match self {
                        $(Preset::[<$module:camel>] => {
                            let mut accel = Accelerator::<
                                { constants::$module::ROWS },
                                { constants::$module::COLS },
                                { constants::$module::WIDTH },
                            >::new(flow);
                            MatmulDriver::new(&mut accel, stimulus).run(a, b)
                        })*
                    }
                }
            }
        }
    };
}

presets!(grid_2x2, grid_3x2, grid_4x4);

impl Default for Preset {
    fn default() -> Self { Preset::Grid2x2 }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

impl FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL.iter().copied().find(|p| p.name() == s).ok_or_else(|| ConfigError::UnknownPreset(s.to_string()))
    }
}
