//! Integration tests for the product services over the in-memory store.
//!
//! Tests: Command → ProductService → Repository → ProductQueryService
//!
//! Verifies:
//! - Created products get fresh ids and read back unchanged
//! - Missing ids fail with not-found on every path
//! - Listing order, filtering and totals

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use catalog_core::{DomainError, Entity};
    use catalog_products::{
        CreateProduct, ProductError, ProductId, ProductQueryService, ProductRepository,
        ProductService, UpdateProduct,
    };

    use crate::repository::InMemoryProductRepository;

    type Repo = Arc<dyn ProductRepository>;

    fn setup() -> (ProductService<Repo>, ProductQueryService<Repo>) {
        let repo: Repo = Arc::new(InMemoryProductRepository::new());
        let queries = ProductQueryService::new(repo.clone());
        let service = ProductService::new(queries.clone(), repo);
        (service, queries)
    }

    fn create(category: &str, name: &str) -> CreateProduct {
        CreateProduct {
            category: category.to_string(),
            name: name.to_string(),
        }
    }

    fn update(category: &str, name: &str) -> UpdateProduct {
        UpdateProduct {
            category: category.to_string(),
            name: name.to_string(),
        }
    }

    fn ids(page: &catalog_core::Page<catalog_products::Product>) -> Vec<i64> {
        page.content()
            .iter()
            .filter_map(|p| p.id())
            .map(ProductId::value)
            .collect()
    }

    #[tokio::test]
    async fn create_then_get_returns_same_values() {
        let (service, queries) = setup();

        let created = service.create(create("Book", "Atlas")).await.unwrap();
        let id = created.id().expect("saved product has an id");

        let fetched = queries.get_by_id(id).await.unwrap();
        assert_eq!(fetched.category(), "Book");
        assert_eq!(fetched.name(), "Atlas");
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn create_rejects_invalid_fields_without_storing() {
        let (service, queries) = setup();

        let err = service.create(create(" ", "Atlas")).await.unwrap_err();
        match err {
            ProductError::Domain(DomainError::InvalidField { field, .. }) => {
                assert_eq!(field, "category")
            }
            other => panic!("Expected InvalidField, got {other:?}"),
        }

        let page = queries.get_list_by_category(None, 0, 10).await.unwrap();
        assert_eq!(page.total_elements(), 0);
    }

    #[tokio::test]
    async fn missing_id_is_not_found_everywhere() {
        let (service, queries) = setup();
        let missing = ProductId::new(404);

        assert!(queries.get_by_id(missing).await.unwrap_err().is_not_found());
        assert!(
            service
                .update(missing, update("Book", "Atlas"))
                .await
                .unwrap_err()
                .is_not_found()
        );
        assert!(service.delete_by_id(missing).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn update_then_get_returns_new_values() {
        let (service, queries) = setup();
        let id = service.create(create("Book", "Atlas")).await.unwrap().id().unwrap();

        let updated = service.update(id, update("Map", "Globe")).await.unwrap();
        assert_eq!(updated.id(), Some(id));

        let fetched = queries.get_by_id(id).await.unwrap();
        assert_eq!((fetched.category(), fetched.name()), ("Map", "Globe"));
    }

    #[tokio::test]
    async fn rejected_update_keeps_stored_values() {
        let (service, queries) = setup();
        let id = service.create(create("Book", "Atlas")).await.unwrap().id().unwrap();

        assert!(service.update(id, update("Map", "")).await.is_err());

        let fetched = queries.get_by_id(id).await.unwrap();
        assert_eq!((fetched.category(), fetched.name()), ("Book", "Atlas"));
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let (service, queries) = setup();
        let id = service.create(create("Book", "Atlas")).await.unwrap().id().unwrap();

        service.delete_by_id(id).await.unwrap();
        assert!(queries.get_by_id(id).await.unwrap_err().is_not_found());

        // A repeated delete degenerates to not-found.
        assert!(service.delete_by_id(id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn listing_is_newest_first_and_filtered() {
        let (service, queries) = setup();
        for (category, name) in [("Book", "a"), ("Toy", "b"), ("Book", "c"), ("Book", "d")] {
            service.create(create(category, name)).await.unwrap();
        }

        let all = queries.get_list_by_category(None, 0, 10).await.unwrap();
        assert_eq!(ids(&all), vec![4, 3, 2, 1]);

        let books = queries.get_list_by_category(Some("Book"), 0, 2).await.unwrap();
        assert_eq!(ids(&books), vec![4, 3]);
        assert_eq!(books.total_elements(), 3);
        assert_eq!(books.total_pages(), 2);
        assert_eq!(books.number(), 0);

        let blank = queries.get_list_by_category(Some("   "), 0, 10).await.unwrap();
        assert_eq!(blank.total_elements(), 4);
    }

    #[tokio::test]
    async fn page_size_above_a_thousand_is_used_as_given() {
        let (service, queries) = setup();
        for i in 0..1500 {
            service.create(create("Book", &format!("item-{i}"))).await.unwrap();
        }

        let page = queries.get_list_by_category(None, 0, 2000).await.unwrap();
        assert_eq!(page.content().len(), 1500);
        assert_eq!(page.total_pages(), 1);
        assert_eq!(page.size(), 2000);
    }

    #[tokio::test]
    async fn zero_page_size_is_rejected() {
        let (_service, queries) = setup();
        match queries.get_list_by_category(None, 0, 0).await.unwrap_err() {
            ProductError::Domain(e) => assert_eq!(e.field(), Some("size")),
            other => panic!("Expected Domain error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unique_categories_reflect_current_rows() {
        let (service, _queries) = setup();
        let toy = service.create(create("Toy", "x")).await.unwrap().id().unwrap();
        service.create(create("Book", "y")).await.unwrap();
        service.create(create("Book", "z")).await.unwrap();

        assert_eq!(service.get_unique_categories().await.unwrap(), vec!["Book", "Toy"]);

        service.delete_by_id(toy).await.unwrap();
        assert_eq!(service.get_unique_categories().await.unwrap(), vec!["Book"]);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 64,
                ..ProptestConfig::default()
            })]

            /// Property: unfiltered total equals the sum of per-category totals,
            /// and every page is strictly id-descending.
            #[test]
            fn totals_add_up_and_order_is_descending(
                picks in proptest::collection::vec(0usize..4, 0..40),
                size in 1u32..8,
            ) {
                let rt = tokio::runtime::Runtime::new().unwrap();
                rt.block_on(async {
                    let (service, queries) = setup();
                    let categories = ["Book", "Toy", "Map", "Food"];
                    for (i, pick) in picks.iter().enumerate() {
                        service.create(create(categories[*pick], &format!("item-{i}"))).await.unwrap();
                    }

                    let all = queries.get_list_by_category(None, 0, size).await.unwrap();
                    let mut per_category = 0;
                    for category in service.get_unique_categories().await.unwrap() {
                        let page = queries.get_list_by_category(Some(&category), 0, size).await.unwrap();
                        per_category += page.total_elements();
                    }
                    assert_eq!(all.total_elements(), per_category);
                    assert_eq!(all.total_elements(), picks.len() as u64);

                    for page_no in 0..all.total_pages() {
                        let page = queries.get_list_by_category(None, page_no, size).await.unwrap();
                        let page_ids = ids(&page);
                        assert!(page_ids.windows(2).all(|w| w[0] > w[1]));
                    }
                });
            }
        }
    }
}
