use thiserror::Error;

use crate::fiat_shamir::errors::FiatShamirError;

/// Structural failures of a sum-check run.
///
/// Algebraic failures of the final evaluation are reported by the claim itself, through
/// [`LazyClaims::Error`](super::LazyClaims::Error).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SumcheckError {
    #[error("expected {expected} partial-sum polynomials, got {got}")]
    WrongNumberOfRounds { expected: usize, got: usize },

    #[error("partial-sum polynomial of round {round} has {got} evaluations, expected {expected}")]
    MalformedPartialSumPoly {
        round: usize,
        expected: usize,
        got: usize,
    },

    #[error(transparent)]
    FiatShamir(#[from] FiatShamirError),
}
