//! Fiat-Shamir transcript errors.

use thiserror::Error;

/// Misuse of the named-challenge transcript.
///
/// Challenge names are derived from the circuit shape on both sides, so any of these means the
/// two sides disagree on the protocol schedule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FiatShamirError {
    #[error("unknown challenge name \"{0}\"")]
    UnknownChallenge(String),

    #[error("challenge \"{name}\" requested before \"{pending}\" was computed")]
    OutOfOrder { name: String, pending: String },

    #[error("challenge \"{0}\" has already been computed and can no longer be bound")]
    AlreadyComputed(String),
}
