//! Sum-check verification for batches of lazily evaluated claims.

mod errors;
pub mod lagrange;
mod proof;
pub mod verifier;

#[cfg(test)]
mod tests;

pub use errors::SumcheckError;
pub use proof::SumcheckProof;
pub use verifier::{LazyClaims, SumcheckTranscript, challenge_names, verify};
