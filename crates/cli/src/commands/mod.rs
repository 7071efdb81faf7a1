//! CLI command implementations.

pub mod doctor;
pub mod knowledge;
pub mod serve;
