//! Stimulus and response vectors for bf16 RTL testbenches.
//!
//! The `bf16` module converts between f32 and truncated bfloat16. The
//! `vectors` module reads and writes the hex line files that the simulator
//! consumes and produces.

pub mod bf16;
pub mod config;
pub mod error;
pub mod range;
pub mod vectors;

pub use crate::bf16::{decode, encode, Bf16, FormatError};
pub use crate::config::Config;
pub use crate::error::VectorError;
pub use crate::range::SampleRange;
pub use crate::vectors::{generate_input, parse_output};
