pub mod diag;
pub mod discovery;
pub mod serialization;
pub mod spectrum;
