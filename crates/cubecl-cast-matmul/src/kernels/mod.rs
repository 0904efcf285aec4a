/// Tiled matmul casting both operands to a shared computation type.
pub mod tiled;
