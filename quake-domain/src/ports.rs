// Catalog Port Traits (Interfaces)
// Define what the domain needs from the remote catalog service

pub mod catalog;
pub mod enrichment;

pub use catalog::*;
pub use enrichment::*;
