pub mod domain_separator;
pub mod errors;
pub mod pattern;
pub mod transcript;
