//! Persistence capability for products.
//!
//! Adapters live in `catalog-infra`; the domain only depends on this trait.

use std::sync::Arc;

use thiserror::Error;

use catalog_core::{Page, PageRequest};

use crate::product::{Product, ProductId};

/// Failure reported by a repository adapter.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The row addressed by a write is gone (e.g. deleted concurrently).
    #[error("product {0} is not in the store")]
    Missing(ProductId),

    /// The backing store failed.
    #[error("storage operation '{op}' failed")]
    Backend {
        op: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl RepositoryError {
    pub fn backend(op: &'static str, source: impl Into<anyhow::Error>) -> Self {
        Self::Backend {
            op,
            source: source.into(),
        }
    }
}

/// Product store.
///
/// Listing methods order by identifier using the direction carried by the
/// `PageRequest` and report totals for the whole filtered set.
#[async_trait::async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    async fn find_all(&self, page: PageRequest) -> Result<Page<Product>, RepositoryError>;

    /// Products whose category equals `category` exactly.
    async fn find_all_by_category(
        &self,
        category: &str,
        page: PageRequest,
    ) -> Result<Page<Product>, RepositoryError>;

    /// Insert a new product (assigning its id) or overwrite a stored one.
    ///
    /// Overwriting a product whose row no longer exists fails with
    /// [`RepositoryError::Missing`].
    async fn save(&self, product: Product) -> Result<Product, RepositoryError>;

    /// Hard delete. Fails with [`RepositoryError::Missing`] if nothing was removed.
    async fn delete(&self, id: ProductId) -> Result<(), RepositoryError>;

    /// Distinct category values currently stored, ascending.
    async fn find_distinct_categories(&self) -> Result<Vec<String>, RepositoryError>;
}

#[async_trait::async_trait]
impl<R> ProductRepository for Arc<R>
where
    R: ProductRepository + ?Sized,
{
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        (**self).find_by_id(id).await
    }

    async fn find_all(&self, page: PageRequest) -> Result<Page<Product>, RepositoryError> {
        (**self).find_all(page).await
    }

    async fn find_all_by_category(
        &self,
        category: &str,
        page: PageRequest,
    ) -> Result<Page<Product>, RepositoryError> {
        (**self).find_all_by_category(category, page).await
    }

    async fn save(&self, product: Product) -> Result<Product, RepositoryError> {
        (**self).save(product).await
    }

    async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        (**self).delete(id).await
    }

    async fn find_distinct_categories(&self) -> Result<Vec<String>, RepositoryError> {
        (**self).find_distinct_categories().await
    }
}
