use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Extension, Path, Query,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};

use catalog_products::ProductId;

use crate::app::dto::{
    ApiResponse, CreateProductRequest, GetProductListRequest, ProductListResponse,
    ProductResponse, UpdateProductRequest,
};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/categories", get(list_categories))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<ApiResponse<ProductResponse>, ApiError> {
    let Path(id) = id?;
    let product = services.queries().get_by_id(ProductId::new(id)).await?;
    Ok(ApiResponse::with_message(
        "Product retrieved.",
        ProductResponse::try_from(product)?,
    ))
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<CreateProductRequest>, JsonRejection>,
) -> Result<ApiResponse<ProductResponse>, ApiError> {
    let Json(body) = body?;
    let cmd = body.validate()?;

    let product = services.products().create(cmd).await?;
    Ok(ApiResponse::with_message(
        "Product created.",
        ProductResponse::try_from(product)?,
    ))
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateProductRequest>, JsonRejection>,
) -> Result<ApiResponse<ProductResponse>, ApiError> {
    let Path(id) = id?;
    let Json(body) = body?;
    let cmd = body.validate()?;

    let product = services.products().update(ProductId::new(id), cmd).await?;
    Ok(ApiResponse::with_message(
        "Product updated.",
        ProductResponse::try_from(product)?,
    ))
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    services.products().delete_by_id(ProductId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<GetProductListRequest>, QueryRejection>,
) -> Result<ApiResponse<ProductListResponse>, ApiError> {
    let Query(query) = query?;
    let query = query.validate()?;

    let page = services
        .queries()
        .get_list_by_category(query.category.as_deref(), query.page, query.size)
        .await?;
    Ok(ApiResponse::with_message(
        "Products listed.",
        ProductListResponse::try_from(page)?,
    ))
}

pub async fn list_categories(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<ApiResponse<Vec<String>>, ApiError> {
    let categories = services.products().get_unique_categories().await?;
    Ok(ApiResponse::with_message("Categories listed.", categories))
}
