//! Layered-circuit delegation.
//!
//! Given a circuit evaluated on `2^n` instances, the [`verifier`] checks claimed outputs
//! against claimed inputs without evaluating the circuit: claims are pushed from each wire
//! to its inputs by one sum-check per wire, all on a single Fiat-Shamir transcript. The
//! [`prover`] produces the matching proofs.

pub mod assignment;
pub mod challenges;
pub mod claims;
mod errors;
pub mod parameters;
pub mod proof;
pub mod prover;
pub mod verifier;


pub use errors::{AssignmentError, ClaimsError, ProofError, ProverError, VerifierError};
pub use parameters::TranscriptSettings;
pub use proof::{Proof, proof_size};
pub use prover::{complete_assignment, prove};
pub use verifier::{verify, verify_circuit, verify_serialized};
