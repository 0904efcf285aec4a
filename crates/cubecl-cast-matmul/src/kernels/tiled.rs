//! Each cube computes one `block_m` by `block_n` block of the output.
//!
//! Slices of depth `block_k` of both operands are cast to the computation type while they are
//! staged in shared memory. Every unit then accumulates its register tile from the staged slices,
//! and the accumulators are cast to the output type once the whole reduction is done.
use cubecl::prelude::*;
use half::f16;

use crate::CastMatmulDTypes;
use crate::components::{
    BlockPosition, CUBE_SIDE, CastMatmulError, CastMatmulProblem, DType, TileConfig,
};

/// Maps the linear cube id to the output block it computes, grouping `group_m` block rows
/// together for L2 reuse.
#[cube]
pub fn block_position(
    cube_id: usize,
    grid_m: usize,
    grid_n: usize,
    #[comptime] group_m: usize,
) -> BlockPosition {
    let width = grid_n * group_m;
    let group_id = cube_id / width;
    let first_row = group_id * group_m;

    let mut group_size = grid_m - first_row;
    if group_size > group_m {
        group_size = group_m;
    }

    BlockPosition {
        row: first_row + cube_id % group_size,
        col: (cube_id % width) / group_size,
    }
}

/// Stages `lhs[row_offset.., k_offset..]` in shared memory.
///
/// Rows wrap around `m` so every load stays in bounds, the rows that do not exist are never
/// stored. Columns past `k` are zero filled so they do not contribute to the dot products.
#[cube]
fn load_lhs_tile<Lhs: CubePrimitive, C: Numeric>(
    lhs: &Tensor<Lhs>,
    tile: &mut SharedMemory<C>,
    row_offset: usize,
    k_offset: usize,
    #[comptime] config: TileConfig,
) {
    let m = lhs.shape(0);
    let k = lhs.shape(1);
    let tile_size = config.block_m * config.block_k;

    let mut index = UNIT_POS as usize;
    while index < tile_size {
        let row = index / config.block_k;
        let col = index % config.block_k;
        let global_k = k_offset + col;

        let mut value = C::from_int(0);
        if global_k < k {
            let global_row = (row_offset + row) % m;
            value = C::cast_from(lhs[global_row * lhs.stride(0) + global_k * lhs.stride(1)]);
        }
        tile[index] = value;

        index += CUBE_SIDE * CUBE_SIDE;
    }
}

/// Stages `rhs[k_offset.., col_offset..]` in shared memory, wrapping columns around `n`.
#[cube]
fn load_rhs_tile<Rhs: CubePrimitive, C: Numeric>(
    rhs: &Tensor<Rhs>,
    tile: &mut SharedMemory<C>,
    col_offset: usize,
    k_offset: usize,
    #[comptime] config: TileConfig,
) {
    let k = rhs.shape(0);
    let n = rhs.shape(1);
    let tile_size = config.block_k * config.block_n;

    let mut index = UNIT_POS as usize;
    while index < tile_size {
        let row = index / config.block_n;
        let col = index % config.block_n;
        let global_k = k_offset + row;

        let mut value = C::from_int(0);
        if global_k < k {
            let global_col = (col_offset + col) % n;
            value = C::cast_from(rhs[global_k * rhs.stride(0) + global_col * rhs.stride(1)]);
        }
        tile[index] = value;

        index += CUBE_SIDE * CUBE_SIDE;
    }
}

#[cube(launch_unchecked)]
fn cast_matmul_kernel<
    Lhs: CubePrimitive,
    Rhs: CubePrimitive,
    C: Numeric,
    Acc: Numeric,
    Out: Numeric,
>(
    lhs: &Tensor<Lhs>,
    rhs: &Tensor<Rhs>,
    out: &mut Tensor<Out>,
    #[comptime] config: TileConfig,
) {
    let m = lhs.shape(0);
    let k = lhs.shape(1);
    let n = rhs.shape(1);

    let grid_m = (m + config.block_m - 1) / config.block_m;
    let grid_n = (n + config.block_n - 1) / config.block_n;
    let block = block_position(CUBE_POS_X as usize, grid_m, grid_n, config.group_m);

    let row_offset = block.row * config.block_m;
    let col_offset = block.col * config.block_n;

    // Units of a row are CUBE_SIDE columns apart so neighbours hit neighbouring addresses.
    let rows_per_unit = config.block_m / CUBE_SIDE;
    let cols_per_unit = config.block_n / CUBE_SIDE;
    let unit_row = UNIT_POS_Y as usize;
    let unit_col = UNIT_POS_X as usize;

    let mut lhs_tile = SharedMemory::<C>::new(config.block_m * config.block_k);
    let mut rhs_tile = SharedMemory::<C>::new(config.block_k * config.block_n);

    let mut accumulators = Array::<Acc>::new(rows_per_unit * cols_per_unit);
    #[unroll]
    for i in 0..rows_per_unit * cols_per_unit {
        accumulators[i] = Acc::from_int(0);
    }

    let num_k_blocks = (k + config.block_k - 1) / config.block_k;
    for k_block in 0..num_k_blocks {
        let k_offset = k_block * config.block_k;

        load_lhs_tile::<Lhs, C>(lhs, &mut lhs_tile, row_offset, k_offset, config);
        load_rhs_tile::<Rhs, C>(rhs, &mut rhs_tile, col_offset, k_offset, config);
        sync_cube();

        for kk in 0..config.block_k {
            #[unroll]
            for r in 0..rows_per_unit {
                let row = unit_row + r * CUBE_SIDE;
                let a = Acc::cast_from(lhs_tile[row * config.block_k + kk]);

                #[unroll]
                for c in 0..cols_per_unit {
                    let col = unit_col + c * CUBE_SIDE;
                    let b = Acc::cast_from(rhs_tile[kk * config.block_n + col]);

                    let index = r * cols_per_unit + c;
                    accumulators[index] = accumulators[index] + a * b;
                }
            }
        }

        sync_cube();
    }

    #[unroll]
    for r in 0..rows_per_unit {
        let row = row_offset + unit_row + r * CUBE_SIDE;

        #[unroll]
        for c in 0..cols_per_unit {
            let col = col_offset + unit_col + c * CUBE_SIDE;

            if row < m && col < n {
                out[row * out.stride(0) + col * out.stride(1)] =
                    Out::cast_from(accumulators[r * cols_per_unit + c]);
            }
        }
    }
}

/// Launches the cast matmul for statically known operand and output types.
///
/// Operands only need to be loadable and castable, so fp8 and other storage-only types work.
///
/// The computation and accumulation types are resolved from the operand and output types.
#[allow(clippy::result_large_err)]
pub fn launch<R: Runtime, Lhs: CubePrimitive, Rhs: CubePrimitive, Out: Numeric>(
    client: &ComputeClient<R>,
    lhs: &TensorHandleRef<'_, R>,
    rhs: &TensorHandleRef<'_, R>,
    out: &TensorHandleRef<'_, R>,
    problem: &CastMatmulProblem,
    dtypes: CastMatmulDTypes,
    config: TileConfig,
) -> Result<(), CastMatmulError> {
    let compute = dtypes.compute();
    let accumulator = dtypes.accumulator();

    log::debug!(
        "Cast matmul m={} n={} k={}: {} x {} -> {}, computed in {compute}, accumulated in {accumulator}, config {config:?}",
        problem.m,
        problem.n,
        problem.k,
        dtypes.lhs,
        dtypes.rhs,
        dtypes.out,
    );

    match (compute, accumulator) {
        (DType::F16, DType::F16) => {
            launch_kernel::<R, Lhs, Rhs, f16, f16, Out>(client, lhs, rhs, out, problem, config)
        }
        (DType::F16, _) => {
            launch_kernel::<R, Lhs, Rhs, f16, f32, Out>(client, lhs, rhs, out, problem, config)
        }
        _ => launch_kernel::<R, Lhs, Rhs, f32, f32, Out>(client, lhs, rhs, out, problem, config),
    }
}

#[allow(clippy::result_large_err)]
fn launch_kernel<
    R: Runtime,
    Lhs: CubePrimitive,
    Rhs: CubePrimitive,
    C: Numeric,
    Acc: Numeric,
    Out: Numeric,
>(
    client: &ComputeClient<R>,
    lhs: &TensorHandleRef<'_, R>,
    rhs: &TensorHandleRef<'_, R>,
    out: &TensorHandleRef<'_, R>,
    problem: &CastMatmulProblem,
    config: TileConfig,
) -> Result<(), CastMatmulError> {
    let cube_count = config.cube_count(problem.m, problem.n);
    let cube_dim = config.cube_dim();

    log::debug!("Launching {cube_count:?} cubes of {cube_dim:?}");

    unsafe {
        cast_matmul_kernel::launch_unchecked::<Lhs, Rhs, C, Acc, Out, R>(
            client,
            cube_count,
            cube_dim,
            lhs.as_tensor_arg(1),
            rhs.as_tensor_arg(1),
            out.as_tensor_arg(1),
            config,
        )?;
    }

    Ok(())
}
