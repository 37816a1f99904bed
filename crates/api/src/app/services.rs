//! Service wiring: picks a repository adapter and builds the product services on top.

use std::sync::Arc;

use anyhow::Context;

use catalog_infra::{InMemoryProductRepository, PostgresProductRepository};
use catalog_products::{ProductQueryService, ProductRepository, ProductService};

use crate::config::AppConfig;

/// Repository handle shared by all services.
pub type DynProductRepository = Arc<dyn ProductRepository>;

#[derive(Clone)]
pub struct AppServices {
    products: ProductService<DynProductRepository>,
}

impl AppServices {
    pub fn new(repository: DynProductRepository) -> Self {
        let queries = ProductQueryService::new(repository.clone());
        Self {
            products: ProductService::new(queries, repository),
        }
    }

    /// Services over a fresh in-memory store (dev/test).
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryProductRepository::new()))
    }

    pub fn products(&self) -> &ProductService<DynProductRepository> {
        &self.products
    }

    pub fn queries(&self) -> &ProductQueryService<DynProductRepository> {
        self.products.queries()
    }
}

pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    if !config.use_persistent_stores {
        tracing::info!("using in-memory product store");
        return Ok(AppServices::in_memory());
    }

    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL is required when USE_PERSISTENT_STORES=true")?;

    let repository = PostgresProductRepository::connect(database_url, config.database_max_connections)
        .await
        .context("failed to connect to postgres")?;
    repository
        .migrate()
        .await
        .context("failed to apply product schema")?;

    tracing::info!(
        max_connections = config.database_max_connections,
        "using postgres product store"
    );
    Ok(AppServices::new(Arc::new(repository)))
}
