use p3_field::Field;
use serde::{Deserialize, Serialize};

/// Point (x_1,..., x_n) in F^n for some n.
///
/// The first coordinate binds the most significant bit of a hypercube index, matching the
/// layout of [`EvaluationsList`](super::evals::EvaluationsList).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MultilinearPoint<F>(pub Vec<F>);

impl<F> MultilinearPoint<F>
where
    F: Field,
{
    #[must_use]
    pub const fn new(coords: Vec<F>) -> Self {
        Self(coords)
    }

    /// returns the number of variables.
    #[must_use]
    pub fn num_variables(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[F] {
        &self.0
    }

    /// Compute eq(coords,point), where eq is the equality polynomial and where point is not
    /// neccessarily binary.
    ///
    /// Recall that the equality polynomial eq(c, p) is defined as eq(c,p) == \prod_i c_i * p_i +
    /// (1-c_i)*(1-p_i). Note that for fixed p, viewed as a polynomial in c, it is the
    /// interpolation polynomial associated to the evaluation point p in the evaluation set {0,1}^n.
    ///
    /// # Panics
    /// Panics if the two points do not have the same number of variables.
    #[must_use]
    pub fn eq_poly(&self, point: &Self) -> F {
        assert_eq!(self.num_variables(), point.num_variables());

        let mut acc = F::ONE;

        for (&l, &r) in self.0.iter().zip(&point.0) {
            acc *= l * r + (F::ONE - l) * (F::ONE - r);
        }

        acc
    }
}

impl<F> From<Vec<F>> for MultilinearPoint<F> {
    fn from(coords: Vec<F>) -> Self {
        Self(coords)
    }
}
