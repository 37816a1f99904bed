//! Infrastructure layer: storage adapters behind the domain repository traits.

pub mod repository;

#[cfg(test)]
mod integration_tests;

pub use repository::{InMemoryProductRepository, PostgresProductRepository};
