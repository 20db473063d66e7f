pub mod circuit;
pub mod fiat_shamir;
pub mod gkr;
pub mod poly;
pub mod sumcheck;
