//! Errors surfaced by the product services.

use thiserror::Error;

use catalog_core::DomainError;

use crate::product::ProductId;
use crate::repository::RepositoryError;

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("product {0} not found")]
    NotFound(ProductId),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for ProductError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Missing(id) => ProductError::NotFound(id),
            other => ProductError::Repository(other),
        }
    }
}

impl ProductError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProductError::NotFound(_))
    }
}
