use core::fmt::Display;
use core::str::FromStr;

use super::CastMatmulError;

/// Element type of a matmul operand, named the way tensor libraries name their dtypes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DType {
    BF16,
    F16,
    F32,
    F64,
    I8,
    E5M2,
    /// Kernels only know a single e4m3 flavour, so the `fnuz` variant maps here too.
    E4M3,
}

impl DType {
    /// Every element type an operand can have.
    pub const ALL: [DType; 7] = [
        DType::BF16,
        DType::F16,
        DType::F32,
        DType::F64,
        DType::I8,
        DType::E5M2,
        DType::E4M3,
    ];

    /// Size of one element in bytes.
    pub fn size(&self) -> usize {
        match self {
            DType::F64 => 8,
            DType::F32 => 4,
            DType::BF16 | DType::F16 => 2,
            DType::I8 | DType::E5M2 | DType::E4M3 => 1,
        }
    }

    pub fn is_float(&self) -> bool {
        !matches!(self, DType::I8)
    }

    pub fn name(&self) -> &'static str {
        match self {
            DType::BF16 => "bfloat16",
            DType::F16 => "float16",
            DType::F32 => "float32",
            DType::F64 => "float64",
            DType::I8 => "int8",
            DType::E5M2 => "float8_e5m2",
            DType::E4M3 => "float8_e4m3fn",
        }
    }
}

impl Display for DType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DType {
    type Err = CastMatmulError;

    /// Parses a dtype name, ignoring a leading `torch.` namespace.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let short = name.strip_prefix("torch.").unwrap_or(name);

        match short {
            "bfloat16" => Ok(DType::BF16),
            "float16" | "half" => Ok(DType::F16),
            "float32" | "float" => Ok(DType::F32),
            "float64" | "double" => Ok(DType::F64),
            "int8" => Ok(DType::I8),
            "float8_e5m2" => Ok(DType::E5M2),
            "float8_e4m3fn" | "float8_e4m3fnuz" => Ok(DType::E4M3),
            _ => Err(CastMatmulError::UnknownDType(name.to_string())),
        }
    }
}

/// Selects the type both operands are cast to before their product is taken.
///
/// The wider operand drives the choice. 64-bit inputs are computed in `f32`, one byte inputs and
/// `f16` (unless paired with `bf16`) are computed in `f16`, everything else in `f32`.
pub fn compute_dtype(lhs: DType, rhs: DType) -> DType {
    let (wide, narrow) = if lhs.size() < rhs.size() {
        (rhs, lhs)
    } else {
        (lhs, rhs)
    };

    if wide == DType::F64 {
        return DType::F32;
    }

    if wide.size() == 1 || (wide == DType::F16 && narrow != DType::BF16) {
        DType::F16
    } else {
        DType::F32
    }
}

/// Selects the type partial products are summed in.
///
/// Half precision accumulation is only used when nothing downstream needs more.
pub fn accumulator_dtype(compute: DType, out: DType) -> DType {
    if compute == DType::F16 && out == DType::F16 {
        DType::F16
    } else {
        DType::F32
    }
}
