// Pure domain services

pub mod assembler;
pub mod normalizer;

pub use assembler::*;
pub use normalizer::*;
