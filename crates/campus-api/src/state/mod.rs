//! Shared state for the REST API.

use std::sync::Arc;

use campus_common::AppConfig;
use campus_service::ServiceContext;

/// What every handler gets a clone of.
///
/// Both fields sit behind `Arc`s; cloning is cheap and handlers only
/// ever borrow.
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<ServiceContext>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(services: ServiceContext, config: AppConfig) -> Self {
        Self {
            services: Arc::new(services),
            config: Arc::new(config),
        }
    }
}
