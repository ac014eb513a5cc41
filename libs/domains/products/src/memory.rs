//! In-memory ProductRepository for tests and local development

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{ProductError, ProductResult};
use crate::models::{NewProduct, Product, UpdateProduct};
use crate::repository::ProductRepository;

/// Vec-backed store that keeps insertion order and enforces unique names
/// the same way the `idx_name_unique` index does. Clone-friendly via Arc.
#[derive(Clone, Default)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<Vec<Product>>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with existing documents, e.g. legacy data in tests.
    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            products: Arc::new(RwLock::new(products)),
        }
    }

    pub fn len(&self) -> usize {
        self.read().map(|products| products.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> ProductResult<RwLockReadGuard<'_, Vec<Product>>> {
        self.products
            .read()
            .map_err(|_| ProductError::Internal("lock poisoned".into()))
    }

    fn write(&self) -> ProductResult<RwLockWriteGuard<'_, Vec<Product>>> {
        self.products
            .write()
            .map_err(|_| ProductError::Internal("lock poisoned".into()))
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn list(&self) -> ProductResult<Vec<Product>> {
        Ok(self.read()?.clone())
    }

    async fn find_by_id(&self, id: ObjectId) -> ProductResult<Option<Product>> {
        Ok(self.read()?.iter().find(|p| p.id == id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> ProductResult<Option<Product>> {
        Ok(self.read()?.iter().find(|p| p.name == name).cloned())
    }

    async fn create(&self, input: NewProduct) -> ProductResult<Product> {
        let mut products = self.write()?;
        if products.iter().any(|p| p.name == input.name) {
            return Err(ProductError::DuplicateName(input.name));
        }

        let product = Product::new(input);
        products.push(product.clone());
        Ok(product)
    }

    async fn update(
        &self,
        id: ObjectId,
        changes: UpdateProduct,
    ) -> ProductResult<Option<Product>> {
        let mut products = self.write()?;

        if let Some(ref name) = changes.name {
            if products.iter().any(|p| p.id != id && &p.name == name) {
                return Err(ProductError::DuplicateName(name.clone()));
            }
        }

        let Some(product) = products.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        product.apply_update(changes);
        Ok(Some(product.clone()))
    }

    async fn delete(&self, id: ObjectId) -> ProductResult<Option<Product>> {
        let mut products = self.write()?;
        let position = products.iter().position(|p| p.id == id);
        Ok(position.map(|index| products.remove(index)))
    }
}
