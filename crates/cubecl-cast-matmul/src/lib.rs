//! Mixed precision tiled matrix multiplication.
//!
//! The inputs may hold different element types. Both operands are cast to a shared computation
//! type chosen by [promotion rules](components::compute_dtype), partial products are summed in an
//! accumulator type and the result is cast to the output type when it is written back.

/// Element types, problem description and launch configuration.
pub mod components;
/// Cube kernels and their host-side launchers.
pub mod kernels;

mod base;

pub use base::*;

#[cfg(feature = "export_tests")]
pub mod tests;
