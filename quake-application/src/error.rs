use quake_domain::{CatalogError, EventId, FilterError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid filter: {0}")]
    Config(#[from] FilterError),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("remote catalog failed after {attempts} attempts: {source}")]
    RemoteExhausted {
        attempts: u32,
        source: CatalogError,
    },
    #[error(transparent)]
    Remote(#[from] CatalogError),
    #[error("enrichment failed for event {id}: {source}")]
    Enrichment {
        id: EventId,
        #[source]
        source: Box<AppError>,
    },
    #[error("operation cancelled")]
    Cancelled,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Whether this failure is a caller mistake rather than a runtime one.
    pub fn is_configuration(&self) -> bool {
        matches!(self, AppError::Config(_) | AppError::BadRequest(_))
    }
}
