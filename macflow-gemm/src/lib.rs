//! MAC-grid matrix multiply accelerator model.
//!
//! A sequencing controller meters a serial operand stream into the row and column lanes of an `R x C` grid of MAC
//! units, waits for the grid to compute, and drains the accumulators one word per tick through a valid/consume port.
//! Every block is simulated cycle-accurately on the `macflow` kernel.

// # Tries to deny all lints (`rustc -W help`).
#![deny(absolute_paths_not_starting_with_crate)]
#![deny(anonymous_parameters)]
#![deny(explicit_outlives_requirements)]
#![deny(keyword_idents)]
#![deny(macro_use_extern_crate)]
#![deny(missing_debug_implementations)]
#![deny(non_ascii_idents)]
#![deny(rust_2018_idioms)]
#![deny(trivial_numeric_casts)]
#![deny(unused_extern_crates)]
#![deny(unused_import_braces)]
//
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::missing_crate_level_docs)]
#![deny(rustdoc::invalid_html_tags)]
#![deny(rustdoc::bare_urls)]
//
#![allow(clippy::needless_lifetimes)]
#![allow(elided_lifetimes_in_paths)]

pub mod accelerator;
pub mod config;
#[allow(missing_docs)]
pub mod constants;
pub mod controller;
pub mod driver;
pub mod grid;
pub mod matrix;
pub mod preset;

pub use accelerator::*;
pub use config::*;
pub use controller::*;
pub use driver::*;
pub use matrix::*;
pub use preset::*;
