//! Application state shared across HTTP handlers

use crate::auth::AuthorizationService;
use crate::config::Config;
use std::sync::Arc;

/// State registered as `web::Data<AppState>`; guards read the service from it
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub authz: AuthorizationService,
}

impl AppState {
    pub fn new(config: Config, authz: AuthorizationService) -> Self {
        Self {
            config: Arc::new(config),
            authz,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
