use std::collections::{BTreeMap, BTreeSet};
use std::sync::RwLock;

use catalog_core::{Entity, Page, PageRequest, SortDirection};
use catalog_products::{Product, ProductId, ProductRepository, RepositoryError};

#[derive(Debug, Default)]
struct Rows {
    last_id: i64,
    products: BTreeMap<ProductId, Product>,
}

/// In-memory product store for tests/dev.
///
/// A single lock guards both the rows and the id sequence, so every write is
/// atomic and ids are handed out in increasing order.
#[derive(Debug, Default)]
pub struct InMemoryProductRepository {
    inner: RwLock<Rows>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned(op: &'static str) -> RepositoryError {
        RepositoryError::backend(op, anyhow::anyhow!("in-memory store lock poisoned"))
    }

    fn page_where(
        &self,
        op: &'static str,
        request: PageRequest,
        keep: impl Fn(&Product) -> bool,
    ) -> Result<Page<Product>, RepositoryError> {
        let rows = self.inner.read().map_err(|_| Self::poisoned(op))?;

        let matching: Vec<&Product> = match request.direction() {
            SortDirection::Asc => rows.products.values().filter(|p| keep(*p)).collect(),
            SortDirection::Desc => rows.products.values().rev().filter(|p| keep(*p)).collect(),
        };

        let total = matching.len() as u64;
        let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let content = matching
            .into_iter()
            .skip(offset)
            .take(request.size() as usize)
            .cloned()
            .collect();

        Ok(Page::new(content, total, request))
    }
}

#[async_trait::async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let rows = self.inner.read().map_err(|_| Self::poisoned("find_by_id"))?;
        Ok(rows.products.get(&id).cloned())
    }

    async fn find_all(&self, page: PageRequest) -> Result<Page<Product>, RepositoryError> {
        self.page_where("find_all", page, |_| true)
    }

    async fn find_all_by_category(
        &self,
        category: &str,
        page: PageRequest,
    ) -> Result<Page<Product>, RepositoryError> {
        self.page_where("find_all_by_category", page, |p| p.category() == category)
    }

    async fn save(&self, product: Product) -> Result<Product, RepositoryError> {
        let mut rows = self.inner.write().map_err(|_| Self::poisoned("save"))?;

        let (id, product) = match product.id() {
            Some(id) if rows.products.contains_key(&id) => (id, product),
            Some(id) => return Err(RepositoryError::Missing(id)),
            None => {
                let id = ProductId::new(rows.last_id + 1);
                let product = product
                    .identified(id)
                    .map_err(|e| RepositoryError::backend("save", e))?;
                rows.last_id = id.value();
                (id, product)
            }
        };

        rows.products.insert(id, product.clone());
        Ok(product)
    }

    async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let mut rows = self.inner.write().map_err(|_| Self::poisoned("delete"))?;
        rows.products
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::Missing(id))
    }

    async fn find_distinct_categories(&self) -> Result<Vec<String>, RepositoryError> {
        let rows = self
            .inner
            .read()
            .map_err(|_| Self::poisoned("find_distinct_categories"))?;

        let categories: BTreeSet<&str> = rows.products.values().map(Product::category).collect();
        Ok(categories.into_iter().map(str::to_owned).collect())
    }
}
