use p3_field::{ExtensionField, Field};
use p3_maybe_rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::multilinear::MultilinearPoint;

const PARALLEL_THRESHOLD: usize = 4096;

/// Represents a multilinear polynomial `f` in `n` variables, stored by its evaluations
/// over the boolean hypercube `{0,1}^n`.
///
/// The inner vector stores function evaluations at points of the hypercube in lexicographic
/// order. The number of variables `n` is inferred from the length of this vector, where
/// `self.len() = 2^n`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[must_use]
pub struct EvaluationsList<F>(pub(crate) Vec<F>);

impl<F> EvaluationsList<F>
where
    F: Field,
{
    /// Constructs an `EvaluationsList` from a vector of evaluations.
    ///
    /// # Panics
    /// Panics if `evals.len()` is not a power of two.
    #[inline]
    pub fn new(evals: Vec<F>) -> Self {
        assert!(
            evals.len().is_power_of_two(),
            "Evaluation list length must be a power of two."
        );

        Self(evals)
    }

    /// Given a point `P`, computes `value * eq(P, X)` for all points `X` in the boolean
    /// hypercube.
    ///
    /// The table is built by splitting every entry in two per coordinate, so the first
    /// coordinate of `point` ends up on the most significant bit of the index.
    pub fn eq_table(point: &MultilinearPoint<F>, value: F) -> Self {
        let mut evals = Vec::with_capacity(1 << point.num_variables());
        evals.push(value);

        for &z in point.as_slice() {
            evals = evals
                .iter()
                .flat_map(|&v| {
                    let hi = v * z;
                    [v - hi, hi]
                })
                .collect();
        }

        Self(evals)
    }

    #[must_use]
    pub const fn num_evals(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub const fn num_variables(&self) -> usize {
        self.0.len().ilog2() as usize
    }

    #[must_use]
    pub fn as_slice(&self) -> &[F] {
        &self.0
    }

    /// Evaluates the multilinear extension at a point whose coordinates may live in an
    /// extension field.
    #[must_use]
    pub fn evaluate<EF: ExtensionField<F>>(&self, point: &MultilinearPoint<EF>) -> EF {
        eval_multilinear(&self.0, point)
    }

    /// Fixes the first variable to `r`, halving the table in place.
    ///
    /// ```text
    /// Before:
    /// [ p(0, 0..0), p(0, 0..1), ..., p(0, 1..1) | p(1, 0..0), p(1, 0..1), ..., p(1, 1..1) ]
    ///  └────────── Left Half (p(0, x')) ──────┘   └────────── Right Half (p(1, x')) ────┘
    ///
    /// After:
    /// [ p(r, 0..0), p(r, 0..1), ..., p(r, 1..1) ]
    /// ```
    #[inline]
    #[instrument(skip_all, level = "trace")]
    pub fn compress(&mut self, r: F) {
        assert_ne!(self.num_variables(), 0);
        let num_evals = self.num_evals();
        let mid = num_evals / 2;

        // Evaluations at `a_i` and `a_{i + n/2}` slots are folded with `r` into `a_i` slot
        let (p0, p1) = self.0.split_at_mut(mid);
        if num_evals >= PARALLEL_THRESHOLD {
            p0.par_iter_mut()
                .zip(p1.par_iter())
                .for_each(|(a0, &a1)| *a0 += r * (a1 - *a0));
        } else {
            p0.iter_mut()
                .zip(p1.iter())
                .for_each(|(a0, &a1)| *a0 += r * (a1 - *a0));
        }
        // Free higher part of the evaluations
        self.0.truncate(mid);
    }
}

/// Evaluates the multilinear extension of `evals` at `point`.
///
/// # Panics
/// Panics (in debug builds) if `evals.len() != 2^point.num_variables()`.
pub fn eval_multilinear<F, EF>(evals: &[F], point: &MultilinearPoint<EF>) -> EF
where
    F: Field,
    EF: ExtensionField<F>,
{
    debug_assert_eq!(evals.len(), 1 << point.num_variables());

    match point.as_slice() {
        // A polynomial with zero variables is just a constant.
        [] => evals[0].into(),

        // f(x) = f(0) + x * (f(1) - f(0)).
        [x] => *x * (evals[1] - evals[0]) + evals[0],

        [x0, x1] => {
            let a0 = *x1 * (evals[1] - evals[0]) + evals[0];
            let a1 = *x1 * (evals[3] - evals[2]) + evals[2];
            a0 + (a1 - a0) * *x0
        }

        // Split on the first variable and recurse on both halves.
        [x, tail @ ..] => {
            let sub_point = MultilinearPoint::new(tail.to_vec());
            let (f0, f1) = evals.split_at(evals.len() / 2);

            let (f0_eval, f1_eval) = if evals.len() >= PARALLEL_THRESHOLD {
                join(
                    || eval_multilinear(f0, &sub_point),
                    || eval_multilinear(f1, &sub_point),
                )
            } else {
                (
                    eval_multilinear(f0, &sub_point),
                    eval_multilinear(f1, &sub_point),
                )
            };
            f0_eval + (f1_eval - f0_eval) * *x
        }
    }
}
