//! MongoDB implementation of ProductRepository

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{self, Document, doc, oid::ObjectId, to_bson},
    options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument},
};
use tracing::instrument;

use crate::error::{ProductError, ProductResult, is_duplicate_key};
use crate::models::{self, NewProduct, Product, UpdateProduct};
use crate::repository::ProductRepository;

pub const COLLECTION_NAME: &str = "products";

/// MongoDB implementation of the ProductRepository
#[derive(Clone)]
pub struct MongoProductRepository {
    collection: Collection<Product>,
}

impl MongoProductRepository {
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, COLLECTION_NAME)
    }

    /// Use a custom collection name, e.g. an isolated one per test
    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        let collection = db.collection::<Product>(collection_name);
        Self { collection }
    }

    /// Create the unique name index plus a category index for listing.
    pub async fn init_indexes(&self) -> ProductResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "name": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name("idx_name_unique".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "category": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_category".to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await.map_err(|e| {
            if is_duplicate_key(&e) {
                tracing::error!(
                    collection = %self.collection.name(),
                    error = %e,
                    "Unique name index cannot be built because stored products share a name; \
                     rename or remove the duplicates, then restart"
                );
            }
            ProductError::from(e)
        })?;
        tracing::info!("Product indexes created successfully");
        Ok(())
    }

    /// Get the underlying collection for advanced operations
    pub fn collection(&self) -> &Collection<Product> {
        &self.collection
    }

    /// `$set` the present fields and `updatedAt`; `$unset` collections
    /// that were sent empty.
    fn build_update(changes: &UpdateProduct) -> ProductResult<Document> {
        let now = bson::DateTime::from_millis(models::now().timestamp_millis());
        let mut set = doc! { "updatedAt": now };
        let mut unset = Document::new();

        if let Some(name) = changes.name.as_deref() {
            set.insert("name", name);
        }
        if let Some(description) = changes.description.as_deref() {
            set.insert("description", description);
        }
        if let Some(price) = changes.price {
            set.insert("price", price);
        }
        if let Some(category) = changes.category.as_deref() {
            set.insert("category", category);
        }
        if let Some(brand) = changes.brand.as_deref() {
            set.insert("brand", brand);
        }
        if let Some(image_url) = changes.image_url.as_deref() {
            set.insert("image_url", image_url);
        }
        if let Some(stock) = changes.stock {
            set.insert("stock", stock);
        }
        if let Some(rating) = changes.rating {
            set.insert("rating", rating);
            // A document may still carry the legacy spelling.
            unset.insert("ratting", "");
        }
        if let Some(discount) = changes.discount {
            set.insert("discount", discount);
        }
        match changes.colors {
            Some(ref colors) if colors.is_empty() => {
                unset.insert("colors", "");
            }
            Some(ref colors) => {
                set.insert("colors", to_bson(colors)?);
            }
            None => {}
        }
        match changes.specifications {
            Some(ref specifications) if specifications.is_empty() => {
                unset.insert("specifications", "");
            }
            Some(ref specifications) => {
                set.insert("specifications", to_bson(specifications)?);
            }
            None => {}
        }

        let mut update = doc! { "$set": set };
        if !unset.is_empty() {
            update.insert("$unset", unset);
        }
        Ok(update)
    }
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    #[instrument(skip(self))]
    async fn list(&self) -> ProductResult<Vec<Product>> {
        let cursor = self.collection.find(doc! {}).await?;
        let products: Vec<Product> = cursor.try_collect().await?;
        Ok(products)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: ObjectId) -> ProductResult<Option<Product>> {
        let product = self.collection.find_one(doc! { "_id": id }).await?;
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn find_by_name(&self, name: &str) -> ProductResult<Option<Product>> {
        let product = self.collection.find_one(doc! { "name": name }).await?;
        Ok(product)
    }

    #[instrument(skip(self, input), fields(product_name = %input.name))]
    async fn create(&self, input: NewProduct) -> ProductResult<Product> {
        let product = Product::new(input);

        self.collection
            .insert_one(&product)
            .await
            .map_err(|e| {
                if is_duplicate_key(&e) {
                    ProductError::DuplicateName(product.name.clone())
                } else {
                    e.into()
                }
            })?;

        tracing::info!(product_id = %product.id, "Product created successfully");
        Ok(product)
    }

    #[instrument(skip(self, changes))]
    async fn update(
        &self,
        id: ObjectId,
        changes: UpdateProduct,
    ) -> ProductResult<Option<Product>> {
        let update = Self::build_update(&changes)?;
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let product = self
            .collection
            .find_one_and_update(doc! { "_id": id }, update)
            .with_options(options)
            .await
            .map_err(|e| match (is_duplicate_key(&e), changes.name) {
                (true, Some(name)) => ProductError::DuplicateName(name),
                _ => e.into(),
            })?;

        if product.is_some() {
            tracing::info!(product_id = %id, "Product updated successfully");
        }
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: ObjectId) -> ProductResult<Option<Product>> {
        let product = self
            .collection
            .find_one_and_delete(doc! { "_id": id })
            .await?;

        if product.is_some() {
            tracing::info!(product_id = %id, "Product deleted successfully");
        }
        Ok(product)
    }
}
