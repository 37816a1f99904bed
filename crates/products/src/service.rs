//! Read and write use cases for products.

use tracing::instrument;

use catalog_core::{Entity, Page, PageRequest};

use crate::error::ProductError;
use crate::product::{CreateProduct, Product, ProductId, UpdateProduct};
use crate::repository::ProductRepository;

/// Read-only product queries.
#[derive(Debug, Clone)]
pub struct ProductQueryService<R> {
    repository: R,
}

impl<R: ProductRepository> ProductQueryService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: ProductId) -> Result<Product, ProductError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    /// Newest-first page of products, filtered by exact category unless the
    /// filter is absent or blank.
    #[instrument(skip(self))]
    pub async fn get_list_by_category(
        &self,
        category: Option<&str>,
        page: u32,
        size: u32,
    ) -> Result<Page<Product>, ProductError> {
        let request = PageRequest::newest_first(page, size)?;

        let page = match category.filter(|c| !c.trim().is_empty()) {
            Some(category) => self.repository.find_all_by_category(category, request).await?,
            None => self.repository.find_all(request).await?,
        };
        Ok(page)
    }
}

/// Product commands. Each call is one unit of work against the repository.
#[derive(Debug, Clone)]
pub struct ProductService<R> {
    queries: ProductQueryService<R>,
    repository: R,
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(queries: ProductQueryService<R>, repository: R) -> Self {
        Self {
            queries,
            repository,
        }
    }

    pub fn queries(&self) -> &ProductQueryService<R> {
        &self.queries
    }

    #[instrument(skip(self))]
    pub async fn create(&self, cmd: CreateProduct) -> Result<Product, ProductError> {
        let product = Product::new(cmd.category, cmd.name)?;
        let saved = self.repository.save(product).await?;

        tracing::info!(
            id = ?saved.id(),
            category = saved.category(),
            name = saved.name(),
            "product created"
        );

        Ok(saved)
    }

    /// Load, change, and write the product back explicitly.
    #[instrument(skip(self))]
    pub async fn update(&self, id: ProductId, cmd: UpdateProduct) -> Result<Product, ProductError> {
        let mut product = self.queries.get_by_id(id).await?;
        product.change(cmd.category, cmd.name)?;
        let saved = self.repository.save(product).await?;

        tracing::info!(
            %id,
            category = saved.category(),
            name = saved.name(),
            "product updated"
        );

        Ok(saved)
    }

    #[instrument(skip(self))]
    pub async fn delete_by_id(&self, id: ProductId) -> Result<(), ProductError> {
        // Missing ids fail here with the same not-found as a lookup.
        self.queries.get_by_id(id).await?;
        self.repository.delete(id).await?;

        tracing::info!(%id, "product deleted");
        Ok(())
    }

    pub async fn get_unique_categories(&self) -> Result<Vec<String>, ProductError> {
        Ok(self.repository.find_distinct_categories().await?)
    }
}
