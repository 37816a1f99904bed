//! Products domain module.
//!
//! The `Product` entity guards its own fields; the services orchestrate reads and
//! writes against a [`ProductRepository`] without knowing which store backs it.

pub mod error;
pub mod product;
pub mod repository;
pub mod service;

pub use error::ProductError;
pub use product::{
    CATEGORY_MAX_LEN, CreateProduct, NAME_MAX_LEN, Product, ProductId, UpdateProduct,
    check_fields, validate_category, validate_name,
};
pub use repository::{ProductRepository, RepositoryError};
pub use service::{ProductQueryService, ProductService};
