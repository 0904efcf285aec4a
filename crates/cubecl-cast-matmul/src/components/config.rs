use cubecl::prelude::*;

use super::{DType, InvalidConfigError};

/// Number of units along each side of a cube. Every unit owns a
/// `block_m / CUBE_SIDE` by `block_n / CUBE_SIDE` register tile.
pub const CUBE_SIDE: usize = 16;

/// Default height, in block rows, of the groups used to reorder cubes.
pub const DEFAULT_GROUP_M: usize = 8;

#[derive(Clone, Copy, Hash, PartialEq, Eq, Debug)]
/// Tiling parameters of the cast matmul, known at kernel compilation.
pub struct TileConfig {
    /// Rows of the output computed by one cube
    pub block_m: usize,
    /// Columns of the output computed by one cube
    pub block_n: usize,
    /// Depth of the reduction slice staged in shared memory per iteration
    pub block_k: usize,
    /// Block rows visited together before moving to the next block column
    pub group_m: usize,
}

impl Default for TileConfig {
    fn default() -> Self {
        Self::new(64, 64, 32)
    }
}

impl TileConfig {
    pub fn new(block_m: usize, block_n: usize, block_k: usize) -> Self {
        Self {
            block_m,
            block_n,
            block_k,
            group_m: DEFAULT_GROUP_M,
        }
    }

    pub fn with_group_m(mut self, group_m: usize) -> Self {
        self.group_m = group_m;
        self
    }

    /// Checks that the tile can be split evenly among the units of a cube.
    pub fn validate(&self) -> Result<(), InvalidConfigError> {
        for (axis, size, multiple) in [
            ('m', self.block_m, CUBE_SIDE),
            ('n', self.block_n, CUBE_SIDE),
            ('k', self.block_k, 1),
        ] {
            if size == 0 || !size.is_multiple_of(multiple) {
                return Err(InvalidConfigError::BlockSize {
                    axis,
                    size,
                    multiple,
                });
            }
        }

        if self.group_m == 0 {
            return Err(InvalidConfigError::EmptyGroup);
        }

        Ok(())
    }

    pub fn rows_per_unit(&self) -> usize {
        self.block_m / CUBE_SIDE
    }

    pub fn cols_per_unit(&self) -> usize {
        self.block_n / CUBE_SIDE
    }

    /// Bytes of shared memory needed to stage one lhs and one rhs slice in the compute type.
    pub fn shared_memory_size(&self, compute: DType) -> usize {
        (self.block_m + self.block_n) * self.block_k * compute.size()
    }

    /// Number of block rows and block columns covering a `m` by `n` output.
    pub fn grid(&self, m: usize, n: usize) -> (usize, usize) {
        (m.div_ceil(self.block_m), n.div_ceil(self.block_n))
    }

    pub fn cube_dim(&self) -> CubeDim {
        CubeDim::new_2d(CUBE_SIDE as u32, CUBE_SIDE as u32)
    }

    /// Cubes are laid out on a single axis, the kernel recovers their block coordinates.
    pub fn cube_count(&self, m: usize, n: usize) -> CubeCount {
        let (grid_m, grid_n) = self.grid(m, n);
        CubeCount::Static((grid_m * grid_n) as u32, 1, 1)
    }
}
