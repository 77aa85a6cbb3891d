//! MacFlow: cycle-accurate simulation kernel for latency-insensitive hardware blocks.
//!
//! Every block is a Mealy machine ([`Fsm`]) evaluated once per clock tick. A [`Reg`] wraps a block with its
//! committed register state and implements the settle-then-commit discipline: all blocks of a design first compute
//! their outputs and next states from the previously committed registers, then all commit together.

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
#![deny(unsafe_op_in_unsafe_fn)]
#![deny(unused_extern_crates)]
#![deny(unused_import_braces)]
//
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::missing_crate_level_docs)]
#![deny(rustdoc::invalid_codeblock_attributes)]
#![deny(rustdoc::invalid_html_tags)]
#![deny(rustdoc::bare_urls)]
//
#![allow(clippy::needless_lifetimes)]
#![allow(elided_lifetimes_in_paths)]

mod channel;
mod fsm;
pub mod num;
mod signal;
pub mod utils;

pub use channel::*;
pub use fsm::*;
pub use num::*;
pub use signal::*;
pub use utils::*;
