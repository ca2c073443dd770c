//! Shared state threaded through every gateway route.

use std::sync::Arc;

use campus_common::AppConfig;
use campus_service::ServiceContext;

use crate::broadcast::EventDispatcher;
use crate::connection::ConnectionManager;

/// Everything a live socket needs, cloned per connection.
///
/// Each field is behind an `Arc`, so cloning the state is a few
/// refcount bumps rather than a copy of the dependency graph.
#[derive(Clone)]
pub struct GatewayState {
    pub services: Arc<ServiceContext>,
    pub connections: Arc<ConnectionManager>,
    pub dispatcher: Arc<EventDispatcher>,
    pub config: Arc<AppConfig>,
}

impl GatewayState {
    pub fn new(
        services: ServiceContext,
        connections: Arc<ConnectionManager>,
        dispatcher: Arc<EventDispatcher>,
        config: AppConfig,
    ) -> Self {
        Self {
            services: Arc::new(services),
            connections,
            dispatcher,
            config: Arc::new(config),
        }
    }
}
