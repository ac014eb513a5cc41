use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use crate::error::ProductResult;
use crate::models::{NewProduct, Product, UpdateProduct};

/// Repository trait for Product persistence
///
/// Implementations must keep product names unique and report a collision
/// as [`ProductError::DuplicateName`](crate::ProductError::DuplicateName).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// All products in store order
    async fn list(&self) -> ProductResult<Vec<Product>>;

    async fn find_by_id(&self, id: ObjectId) -> ProductResult<Option<Product>>;

    /// Exact, case-sensitive name match
    async fn find_by_name(&self, name: &str) -> ProductResult<Option<Product>>;

    /// Insert a validated product and return it with id and timestamps
    async fn create(&self, input: NewProduct) -> ProductResult<Product>;

    /// Apply present fields and return the post-update product, `None` if
    /// no product has this id
    async fn update(&self, id: ObjectId, changes: UpdateProduct)
    -> ProductResult<Option<Product>>;

    /// Remove and return the product, `None` if no product has this id
    async fn delete(&self, id: ObjectId) -> ProductResult<Option<Product>>;
}
