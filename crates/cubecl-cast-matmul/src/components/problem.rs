use super::InvalidConfigError;

/// Identifies one of the three matrices of a matmul.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Ident {
    Lhs,
    Rhs,
    Out,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Description of a cast matmul problem to solve, regardless of actual data
pub struct CastMatmulProblem {
    pub m: usize,
    pub n: usize,
    pub k: usize,
}

impl CastMatmulProblem {
    pub fn new(m: usize, k: usize, n: usize) -> Self {
        Self { m, n, k }
    }

    /// Infers the problem from the shapes of the three matrices.
    pub fn from_shapes(
        lhs: &[usize],
        rhs: &[usize],
        out: &[usize],
    ) -> Result<Self, InvalidConfigError> {
        for shape in [lhs, rhs, out] {
            if shape.len() != 2 {
                return Err(InvalidConfigError::Rank(shape.len()));
            }
        }

        let (lhs_m, lhs_k) = (lhs[0], lhs[1]);
        let (rhs_k, rhs_n) = (rhs[0], rhs[1]);
        let (out_m, out_n) = (out[0], out[1]);

        if lhs_k != rhs_k || lhs_m != out_m || rhs_n != out_n {
            return Err(InvalidConfigError::ShapeMismatch {
                lhs_m,
                lhs_k,
                rhs_k,
                rhs_n,
                out_m,
                out_n,
            });
        }

        Ok(Self::new(lhs_m, lhs_k, rhs_n))
    }

    /// Returns the shape of the identified matrix
    pub fn shape(&self, ident: Ident) -> [usize; 2] {
        match ident {
            Ident::Lhs => [self.m, self.k],
            Ident::Rhs => [self.k, self.n],
            Ident::Out => [self.m, self.n],
        }
    }

    /// Row major strides of the identified matrix
    pub fn strides(&self, ident: Ident) -> [usize; 2] {
        let [_, cols] = self.shape(ident);
        [cols, 1]
    }

    /// Returns the number of elements of the identified matrix
    pub fn num_elems(&self, ident: Ident) -> usize {
        self.shape(ident).iter().product()
    }
}
