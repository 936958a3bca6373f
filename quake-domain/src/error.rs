use chrono::{DateTime, Utc};
use thiserror::Error;

/// Rejections raised while canonicalizing raw filter input.
/// All of these surface before any remote call is made.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("bounding box and radius search are mutually exclusive")]
    ConflictingSpatialConstraint,
    #[error("minimum and maximum magnitude must be supplied together")]
    IncompleteMagnitudeRange,
    #[error("start time {start} is not before end time {end}")]
    InvalidTimeRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// Failures reported by the remote catalog adapters.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Network-level or service-side trouble that is worth retrying.
    #[error("remote catalog unavailable: {0}")]
    Unavailable(String),
    /// The service understood the request and refused it.
    #[error("catalog rejected request: {0}")]
    Rejected(String),
    /// The service answered with a body we could not interpret.
    #[error("malformed catalog response: {0}")]
    Malformed(String),
}

impl CatalogError {
    pub fn is_transient(&self) -> bool {
        matches!(self, CatalogError::Unavailable(_))
    }
}
