use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::services::LookupService;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub lookup: LookupService,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let lookup = LookupService::new(&config.gateway)?;
        Ok(Self {
            config: Arc::new(config),
            lookup,
        })
    }
}
