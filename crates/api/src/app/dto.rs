use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use catalog_core::{DomainError, Entity, Page};
use catalog_products::{check_fields, CreateProduct, Product, UpdateProduct};

use crate::app::errors::ApiError;

/// Page size used when the caller does not pass one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

// -------------------------
// Request DTOs
// -------------------------

/// Missing, `null` and blank values are all reported as field errors, so both
/// fields stay optional at the deserialization step.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub category: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub category: Option<String>,
    pub name: Option<String>,
}

fn required_fields(
    category: Option<String>,
    name: Option<String>,
) -> Result<(String, String), ApiError> {
    let category = category.unwrap_or_default();
    let name = name.unwrap_or_default();

    let errors = check_fields(&category, &name);
    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }
    Ok((category, name))
}

impl CreateProductRequest {
    pub fn validate(self) -> Result<CreateProduct, ApiError> {
        let (category, name) = required_fields(self.category, self.name)?;
        Ok(CreateProduct { category, name })
    }
}

impl UpdateProductRequest {
    pub fn validate(self) -> Result<UpdateProduct, ApiError> {
        let (category, name) = required_fields(self.category, self.name)?;
        Ok(UpdateProduct { category, name })
    }
}

/// Query string of `GET /products`.
#[derive(Debug, Default, Deserialize)]
pub struct GetProductListRequest {
    pub category: Option<String>,
    pub page: Option<i64>,
    pub size: Option<i64>,
}

/// Listing parameters after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductListQuery {
    pub category: Option<String>,
    pub page: u32,
    pub size: u32,
}

impl GetProductListRequest {
    pub fn validate(self) -> Result<ProductListQuery, ApiError> {
        let mut errors = Vec::new();

        let page = match self.page.unwrap_or(0) {
            p if p < 0 => {
                errors.push(DomainError::invalid_field(
                    "page",
                    "must be greater than or equal to 0",
                ));
                0
            }
            p => u32::try_from(p).unwrap_or_else(|_| {
                errors.push(DomainError::invalid_field("page", "is too large"));
                0
            }),
        };

        let size = match self.size.unwrap_or(i64::from(DEFAULT_PAGE_SIZE)) {
            s if s <= 0 => {
                errors.push(DomainError::invalid_field("size", "must be greater than 0"));
                DEFAULT_PAGE_SIZE
            }
            s => u32::try_from(s).unwrap_or_else(|_| {
                errors.push(DomainError::invalid_field("size", "is too large"));
                DEFAULT_PAGE_SIZE
            }),
        };

        if !errors.is_empty() {
            return Err(ApiError::validation(errors));
        }

        Ok(ProductListQuery {
            category: self.category,
            page,
            size,
        })
    }
}

// -------------------------
// Response DTOs
// -------------------------

/// Success envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub code: &'static str,
    pub message: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            code: "SUCCESS",
            message: message.into(),
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductResponse {
    pub id: i64,
    pub category: String,
    pub name: String,
}

/// Only stored products can be rendered; an unsaved one is a server fault.
impl TryFrom<Product> for ProductResponse {
    type Error = ApiError;

    fn try_from(product: Product) -> Result<Self, Self::Error> {
        let id = product.id().ok_or_else(|| {
            ApiError::internal(anyhow::anyhow!(
                "product '{}' has no id and cannot be rendered",
                product.name()
            ))
        })?;
        Ok(Self {
            id: id.value(),
            category: product.category().to_string(),
            name: product.name().to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListResponse {
    pub products: Vec<ProductResponse>,
    pub total_pages: u32,
    pub total_elements: u64,
    pub page: u32,
}

impl TryFrom<Page<Product>> for ProductListResponse {
    type Error = ApiError;

    fn try_from(page: Page<Product>) -> Result<Self, Self::Error> {
        let total_pages = page.total_pages();
        let total_elements = page.total_elements();
        let number = page.number();
        let products = page
            .into_content()
            .into_iter()
            .map(ProductResponse::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            products,
            total_pages,
            total_elements,
            page: number,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::errors::ErrorCode;
    use catalog_core::PageRequest;
    use catalog_products::ProductId;

    fn field_errors(err: ApiError) -> Vec<String> {
        match err {
            ApiError::Validation(fields) => fields.into_keys().collect(),
            other => panic!("Expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn missing_and_blank_fields_are_each_reported() {
        let req: CreateProductRequest = serde_json::from_str(r#"{"name": "   "}"#).unwrap();
        assert_eq!(field_errors(req.validate().unwrap_err()), vec!["category", "name"]);

        let req: UpdateProductRequest =
            serde_json::from_str(r#"{"category": null, "name": "Atlas"}"#).unwrap();
        assert_eq!(field_errors(req.validate().unwrap_err()), vec!["category"]);
    }

    #[test]
    fn valid_request_becomes_command_unchanged() {
        let req: CreateProductRequest =
            serde_json::from_str(r#"{"category": "Book", "name": " Atlas "}"#).unwrap();
        let cmd = req.validate().unwrap();
        assert_eq!(cmd.category, "Book");
        assert_eq!(cmd.name, " Atlas ");
    }

    #[test]
    fn list_defaults_and_sizes_as_given() {
        let q = GetProductListRequest::default().validate().unwrap();
        assert_eq!((q.page, q.size, q.category), (0, DEFAULT_PAGE_SIZE, None));

        let q = GetProductListRequest {
            size: Some(2_000),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(q.size, 2_000);
    }

    #[test]
    fn list_rejects_unrepresentable_size() {
        let err = GetProductListRequest {
            size: Some(i64::MAX),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(field_errors(err), vec!["size"]);
    }

    #[test]
    fn list_rejects_negative_page_and_non_positive_size() {
        let err = GetProductListRequest {
            category: None,
            page: Some(-1),
            size: Some(0),
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::ValidationError);
        assert_eq!(field_errors(err), vec!["page", "size"]);
    }

    #[test]
    fn list_response_uses_camel_case_totals() {
        let products = vec![
            Product::restore(ProductId::new(2), "Book", "B").unwrap(),
            Product::restore(ProductId::new(1), "Book", "A").unwrap(),
        ];
        let page = Page::new(products, 3, PageRequest::newest_first(0, 2).unwrap());
        let json = serde_json::to_value(ProductListResponse::try_from(page).unwrap()).unwrap();

        assert_eq!(json["totalPages"], 2);
        assert_eq!(json["totalElements"], 3);
        assert_eq!(json["page"], 0);
        assert_eq!(json["products"][0]["id"], 2);
        assert_eq!(json["products"][1]["name"], "A");
    }

    #[test]
    fn success_envelope_shape() {
        let json =
            serde_json::to_value(ApiResponse::with_message("Categories listed.", vec!["Book"]))
                .unwrap();
        assert_eq!(json["code"], "SUCCESS");
        assert_eq!(json["data"][0], "Book");
        assert_eq!(json["message"], "Categories listed.");
    }

    #[test]
    fn unsaved_product_cannot_be_rendered() {
        let err = ProductResponse::try_from(Product::new("Book", "Atlas").unwrap()).unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::InternalServerError);

        let stored = Product::restore(ProductId::new(7), "Book", "Atlas").unwrap();
        let json = serde_json::to_value(ProductResponse::try_from(stored).unwrap()).unwrap();
        assert_eq!(json["id"], 7);
    }
}
