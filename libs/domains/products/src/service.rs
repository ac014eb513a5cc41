//! Product Service - Business logic layer

use mongodb::bson::oid::ObjectId;
use std::sync::Arc;
use tracing::instrument;
use validator::Validate;

use crate::error::{ProductError, ProductResult};
use crate::models::{CreateProduct, NewProduct, Product, UpdateProduct};
use crate::repository::ProductRepository;

/// Parse a 24-character hex product id.
pub fn parse_product_id(id: &str) -> ProductResult<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| ProductError::InvalidId(id.to_string()))
}

/// Product service providing business logic operations
///
/// Handles normalization, validation and the name uniqueness rule, and
/// orchestrates repository operations.
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
}

impl<R: ProductRepository> Clone for ProductService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    #[instrument(skip(self))]
    pub async fn list_products(&self) -> ProductResult<Vec<Product>> {
        self.repository.list().await
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: ObjectId) -> ProductResult<Product> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    /// Create a product. A name collision is reported before any field
    /// validation runs.
    #[instrument(skip(self, input), fields(product_name = ?input.name))]
    pub async fn create_product(&self, input: CreateProduct) -> ProductResult<Product> {
        let input = input.normalized();

        if let Some(name) = input.name.as_deref().filter(|name| !name.is_empty()) {
            if self.repository.find_by_name(name).await?.is_some() {
                return Err(ProductError::DuplicateName(name.to_string()));
            }
        }

        let new_product = NewProduct::try_from(input)?;
        self.repository.create(new_product).await
    }

    /// Update the fields present in `input`; absent fields are untouched.
    #[instrument(skip(self, input))]
    pub async fn update_product(
        &self,
        id: ObjectId,
        input: UpdateProduct,
    ) -> ProductResult<Product> {
        let input = input.normalized();
        input.validate()?;

        if let Some(ref name) = input.name {
            if let Some(existing) = self.repository.find_by_name(name).await? {
                if existing.id != id {
                    return Err(ProductError::DuplicateName(name.clone()));
                }
            }
        }

        self.repository
            .update(id, input)
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    /// Delete a product and return it as it was before removal.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: ObjectId) -> ProductResult<Product> {
        self.repository
            .delete(id)
            .await?
            .ok_or(ProductError::NotFound(id))
    }
}
