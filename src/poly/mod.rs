pub mod evals;
pub mod multilinear;
