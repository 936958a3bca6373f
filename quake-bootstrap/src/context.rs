use std::sync::Arc;

use anyhow::Result;

use quake_application::AppState;
use quake_infrastructure::{AppConfig, FdsnCatalogClient, FdsnDetailFetcher};

pub struct AppContext {
    pub state: AppState,
}

impl AppContext {
    pub async fn new() -> Result<Self> {
        let config = AppConfig::load().await?;
        let runtime_config = config.to_runtime_config();

        let catalog = Arc::new(FdsnCatalogClient::new(&runtime_config)?);
        let details = Arc::new(FdsnDetailFetcher::new(&runtime_config)?);

        let state = AppState {
            config: runtime_config,
            catalog,
            details,
        };

        Ok(Self { state })
    }
}
