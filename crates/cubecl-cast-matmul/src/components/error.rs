use cubecl::server::LaunchError;
use thiserror::Error;

use super::DType;

/// Errors that can occur while preparing or launching a cast matmul.
#[derive(Error, Debug)]
pub enum CastMatmulError {
    /// A dtype name could not be resolved.
    #[error("Unknown element type `{0}`")]
    UnknownDType(String),

    /// Results can only be written to floating point outputs.
    #[error("Unsupported output type {0}, expected a floating point type")]
    UnsupportedOutput(DType),

    /// The tile configuration or the problem is rejected.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(InvalidConfigError),

    /// The runtime refused the kernel.
    #[error("Unable to launch the cast matmul\nCaused by:\n  {0}")]
    Launch(#[from] LaunchError),
}

/// Reasons a [tile configuration](super::TileConfig) or a problem can be rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidConfigError {
    #[error("block_{axis} = {size} must be a non-zero multiple of {multiple}")]
    BlockSize {
        axis: char,
        size: usize,
        multiple: usize,
    },

    #[error("group_m must be at least 1")]
    EmptyGroup,

    #[error("lhs is {lhs_m}x{lhs_k}, rhs is {rhs_k}x{rhs_n} and out is {out_m}x{out_n}")]
    ShapeMismatch {
        lhs_m: usize,
        lhs_k: usize,
        rhs_k: usize,
        rhs_n: usize,
        out_m: usize,
        out_n: usize,
    },

    #[error("expected rank 2 tensors, got rank {0}")]
    Rank(usize),
}

impl From<InvalidConfigError> for CastMatmulError {
    fn from(value: InvalidConfigError) -> Self {
        Self::InvalidConfig(value)
    }
}
