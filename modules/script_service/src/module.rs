//! Module assembly and lifecycle

use crate::api::native::NativeClient;
use crate::config::Config;
use crate::contract::ScriptEditApi;
use crate::domain::{EventPublisher, NoOpEventPublisher, Service};
use crate::infra::storage::repositories::SeaOrmScriptRepository;
use anyhow::Result;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Script service module
pub struct ScriptServiceModule {
    config: Config,
    db: Arc<DatabaseConnection>,
    service: Arc<Service>,
}

impl ScriptServiceModule {
    /// Build the module with events disabled at the publisher level
    pub fn init(db: Arc<DatabaseConnection>, config: Config) -> Self {
        Self::with_publisher(db, config, Arc::new(NoOpEventPublisher))
    }

    /// Build the module with a custom event publisher (e.g. a broadcast bridge)
    pub fn with_publisher(
        db: Arc<DatabaseConnection>,
        config: Config,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        let repo = Arc::new(SeaOrmScriptRepository::new(db.clone()));
        let service = Arc::new(Service::new(repo, event_publisher, config.clone()));

        tracing::info!(
            max_operations_per_batch = config.max_operations_per_batch,
            temp_id_fragment_fallback = config.temp_id_fragment_fallback,
            "Script service initialized"
        );
        Self {
            config,
            db,
            service,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    /// In-process client for other modules
    pub fn client(&self) -> Arc<dyn ScriptEditApi> {
        Arc::new(NativeClient::new(self.service.clone()))
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        use crate::infra::storage::migrations::Migrator;
        use sea_orm_migration::MigratorTrait;

        Migrator::up(&*self.db, None).await?;
        tracing::info!("Script service migrations completed");
        Ok(())
    }

    /// Mount the REST routes on a router
    pub fn register_rest(&self, router: axum::Router) -> axum::Router {
        tracing::info!("Registering script service REST routes");
        crate::api::rest::routes::register_routes(router, self.service.clone())
    }
}
