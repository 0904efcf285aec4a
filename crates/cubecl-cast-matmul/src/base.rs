use cubecl::prelude::*;
use cubecl_common::{e4m3, e5m2};
use half::{bf16, f16};

use crate::{
    components::{
        CastMatmulError, CastMatmulProblem, DType, TileConfig, accumulator_dtype, compute_dtype,
    },
    kernels::tiled,
};

/// Element types of the three matrices of a cast matmul.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CastMatmulDTypes {
    pub lhs: DType,
    pub rhs: DType,
    pub out: DType,
}

impl CastMatmulDTypes {
    pub fn new(lhs: DType, rhs: DType, out: DType) -> Self {
        Self { lhs, rhs, out }
    }

    /// Type both operands are cast to.
    pub fn compute(&self) -> DType {
        compute_dtype(self.lhs, self.rhs)
    }

    /// Type partial products are summed in.
    pub fn accumulator(&self) -> DType {
        accumulator_dtype(self.compute(), self.out)
    }

    /// Bytes of shared memory a cube needs with the given tiling.
    pub fn shared_memory_size(&self, config: &TileConfig) -> usize {
        config.shared_memory_size(self.compute())
    }
}

/// Binds `$ty` to the Rust element type of `$dtype` and evaluates `$body` with it.
macro_rules! with_elem {
    ($dtype: expr, $ty: ident, $body: expr) => {
        match $dtype {
            DType::BF16 => {
                type $ty = bf16;
                $body
            }
            DType::F16 => {
                type $ty = f16;
                $body
            }
            DType::F32 => {
                type $ty = f32;
                $body
            }
            DType::F64 => {
                type $ty = f64;
                $body
            }
            DType::I8 => {
                type $ty = i8;
                $body
            }
            DType::E5M2 => {
                type $ty = e5m2;
                $body
            }
            DType::E4M3 => {
                type $ty = e4m3;
                $body
            }
        }
    };
}

/// Same as `with_elem`, restricted to the types results can be written in.
macro_rules! with_output_elem {
    ($dtype: expr, $ty: ident, $body: expr) => {
        match $dtype {
            DType::BF16 => {
                type $ty = bf16;
                $body
            }
            DType::F16 => {
                type $ty = f16;
                $body
            }
            DType::F32 => {
                type $ty = f32;
                $body
            }
            other => Err(CastMatmulError::UnsupportedOutput(other)),
        }
    };
}

/// Launches the cast matmul on matrices whose element types are only known at runtime.
///
/// The handles must be rank 2 and agree on `m`, `n` and `k`. The configuration is validated
/// before anything is compiled.
#[allow(clippy::result_large_err)]
pub fn launch_ref<R: Runtime>(
    client: &ComputeClient<R>,
    lhs: &TensorHandleRef<'_, R>,
    rhs: &TensorHandleRef<'_, R>,
    out: &TensorHandleRef<'_, R>,
    dtypes: CastMatmulDTypes,
    config: TileConfig,
) -> Result<(), CastMatmulError> {
    config.validate()?;
    let problem = CastMatmulProblem::from_shapes(lhs.shape, rhs.shape, out.shape)?;

    with_elem!(dtypes.lhs, Lhs, {
        with_elem!(dtypes.rhs, Rhs, {
            with_output_elem!(dtypes.out, Out, {
                tiled::launch::<R, Lhs, Rhs, Out>(client, lhs, rhs, out, &problem, dtypes, config)
            })
        })
    })
}
