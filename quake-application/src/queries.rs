// Application queries

pub mod enrichment_queries;
pub mod event_queries;
pub mod export_queries;

pub use enrichment_queries::*;
pub use event_queries::*;
pub use export_queries::*;
