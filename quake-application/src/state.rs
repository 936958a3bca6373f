use std::sync::Arc;

use quake_domain::ports::{CatalogClient, DetailFetcher};
use quake_domain::RuntimeConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub catalog: Arc<dyn CatalogClient>,
    pub details: Arc<dyn DetailFetcher>,
}
