use serde::{Deserialize, Serialize};

use catalog_core::{DomainError, DomainResult, Entity};

/// Maximum length (in characters) of a product category.
pub const CATEGORY_MAX_LEN: usize = 50;

/// Maximum length (in characters) of a product name.
pub const NAME_MAX_LEN: usize = 100;

/// Product identifier, assigned by the store on first save.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(i64);

impl ProductId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(self) -> i64 {
        self.0
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<i64> for ProductId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

fn check_text(field: &'static str, value: &str, max_len: usize) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::invalid_field(field, "must not be blank"));
    }
    if value.chars().count() > max_len {
        return Err(DomainError::invalid_field(
            field,
            format!("must be at most {max_len} characters"),
        ));
    }
    Ok(())
}

pub fn validate_category(category: &str) -> DomainResult<()> {
    check_text("category", category, CATEGORY_MAX_LEN)
}

pub fn validate_name(name: &str) -> DomainResult<()> {
    check_text("name", name, NAME_MAX_LEN)
}

/// Run every field rule and return all failures (empty when valid).
pub fn check_fields(category: &str, name: &str) -> Vec<DomainError> {
    [validate_category(category), validate_name(name)]
        .into_iter()
        .filter_map(Result::err)
        .collect()
}

/// Entity: Product.
///
/// Fields are private. A product can only be built through [`Product::new`] /
/// [`Product::restore`] and only mutated through [`Product::change`], all of which
/// validate both fields before touching state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    id: Option<ProductId>,
    category: String,
    name: String,
}

impl Product {
    /// Create a new, not-yet-persisted product.
    pub fn new(category: impl Into<String>, name: impl Into<String>) -> DomainResult<Self> {
        let category = category.into();
        let name = name.into();
        validate_category(&category)?;
        validate_name(&name)?;

        Ok(Self {
            id: None,
            category,
            name,
        })
    }

    /// Rehydrate a stored product. Stored rows go through the same rules.
    pub fn restore(
        id: ProductId,
        category: impl Into<String>,
        name: impl Into<String>,
    ) -> DomainResult<Self> {
        let mut product = Self::new(category, name)?;
        product.id = Some(id);
        Ok(product)
    }

    /// Attach the identifier handed out by the store. Identity never changes once set.
    pub fn identified(mut self, id: ProductId) -> DomainResult<Self> {
        if let Some(existing) = self.id {
            return Err(DomainError::invariant(format!(
                "product already identified as {existing}, refusing {id}"
            )));
        }
        self.id = Some(id);
        Ok(self)
    }

    /// Replace category and name together. On error nothing changes.
    pub fn change(
        &mut self,
        category: impl Into<String>,
        name: impl Into<String>,
    ) -> DomainResult<()> {
        let category = category.into();
        let name = name.into();
        validate_category(&category)?;
        validate_name(&name)?;

        self.category = category;
        self.name = name;
        Ok(())
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> Option<ProductId> {
        self.id
    }
}

/// Command: CreateProduct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProduct {
    pub category: String,
    pub name: String,
}

/// Command: UpdateProduct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProduct {
    pub category: String,
    pub name: String,
}
