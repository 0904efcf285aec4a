use cubecl::prelude::*;

/// Position of an output block in the block grid.
#[derive(CubeType, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockPosition {
    pub row: usize,
    pub col: usize,
}

/// Maps a linear cube id to the output block it computes.
///
/// Consecutive ids walk down a group of `group_m` block rows before moving to the next block
/// column, so neighbouring cubes share lhs rows and rhs columns in L2. The last group is shorter
/// when `grid_m` is not a multiple of `group_m`.
pub fn grouped_block_position(
    cube_id: usize,
    grid_m: usize,
    grid_n: usize,
    group_m: usize,
) -> BlockPosition {
    let width = group_m * grid_n;
    let group_id = cube_id / width;
    let first_row = group_id * group_m;
    let group_size = Ord::min(grid_m - first_row, group_m);

    BlockPosition {
        row: first_row + (cube_id % group_size),
        col: (cube_id % width) / group_size,
    }
}
