//! Service Container - Centralized service access.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::{AuthService, Authenticator};
use crate::config::Config;
use crate::infra::Persistence;

/// Service container trait for dependency injection.
pub trait ServiceContainer: Send + Sync {
    /// Get authentication service
    fn auth(&self) -> Arc<dyn AuthService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    auth_service: Arc<dyn AuthService>,
}

impl Services {
    /// Create service container from database connection and config
    pub fn from_connection(db: Arc<DatabaseConnection>, config: &Config) -> Self {
        let uow = Arc::new(Persistence::new(db));
        let auth_service = Arc::new(Authenticator::new(uow, config.session_ttl_days));

        Self { auth_service }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }
}
