use thiserror::Error;

use crate::{circuit::WireId, fiat_shamir::errors::FiatShamirError, sumcheck::SumcheckError};

/// Invalid wire assignment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssignmentError {
    #[error("the assignment is empty")]
    Empty,

    #[error("number of instances must be a power of two, got {0}")]
    NotPowerOfTwo(usize),

    #[error("wire {wire} has {got} instances, expected {expected}")]
    InconsistentInstances {
        wire: WireId,
        expected: usize,
        got: usize,
    },

    #[error("no values assigned to wire {0}")]
    MissingWire(WireId),

    #[error("wire {wire} has {expected} variables but was evaluated at a point with {got}")]
    PointArity {
        wire: WireId,
        expected: usize,
        got: usize,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClaimsError {
    #[error("claims of wire {0} were already reduced")]
    AlreadyReduced(WireId),
}

/// Malformed serialized proof.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProofError {
    #[error("proof has {got} values, expected {expected}")]
    SizeMismatch { expected: usize, got: usize },

    #[error("no instance count matches a proof of {0} values")]
    UndeterminedInstances(usize),

    #[error("{0} values left after reading the proof")]
    TrailingData(usize),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifierError {
    #[error(transparent)]
    Assignment(#[from] AssignmentError),

    #[error(transparent)]
    Claims(#[from] ClaimsError),

    #[error(transparent)]
    Proof(#[from] ProofError),

    #[error(transparent)]
    Sumcheck(#[from] SumcheckError),

    #[error(transparent)]
    FiatShamir(#[from] FiatShamirError),

    #[error("proof has {got} entries, the circuit has {expected} wires")]
    ProofLength { expected: usize, got: usize },

    #[error("no proof allowed for input wire {0} with a single claim")]
    UnexpectedProof(WireId),

    #[error("input wire {wire} evaluates to {actual}, claimed {expected}")]
    InputEvaluationMismatch {
        wire: WireId,
        expected: String,
        actual: String,
    },

    #[error("final evaluation of wire {wire} is {actual}, expected {expected}")]
    FinalEvalMismatch {
        wire: WireId,
        expected: String,
        actual: String,
    },

    #[error("malformed proof: wire {wire} has {expected} distinct inputs, but {given} input evaluations given")]
    MalformedFinalEvalProof {
        wire: WireId,
        expected: usize,
        given: usize,
    },

    #[error("wire {0} has no pending claim")]
    NoPendingClaims(WireId),

    #[error("some wires still have pending claims")]
    UnverifiedClaims,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProverError {
    #[error(transparent)]
    Assignment(#[from] AssignmentError),

    #[error(transparent)]
    Claims(#[from] ClaimsError),

    #[error(transparent)]
    FiatShamir(#[from] FiatShamirError),
}
