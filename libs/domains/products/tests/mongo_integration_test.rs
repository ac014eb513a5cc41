//! MongoDB repository tests against a real server
//!
//! Run with `cargo test -p domain_products -- --ignored` (requires Docker).

use domain_products::{
    CreateProduct, MongoProductRepository, NewProduct, ProductError, ProductRepository,
    UpdateProduct,
};
use mongodb::bson::{DateTime, Document, doc, oid::ObjectId};
use std::time::Duration;
use test_utils::{TestDataBuilder, TestMongo};

fn widget(name: &str) -> NewProduct {
    NewProduct::try_from(CreateProduct {
        name: Some(name.into()),
        price: Some(9.99),
        category: Some("Tools".into()),
        brand: Some("Acme".into()),
        image_url: Some("http://x/y.png".into()),
        stock: Some(5),
        ..Default::default()
    })
    .unwrap()
}

async fn repository(mongo: &TestMongo, test_name: &str) -> MongoProductRepository {
    let builder = TestDataBuilder::from_test_name(test_name);
    let repo = MongoProductRepository::new(&mongo.database(&builder.database_name()));
    repo.init_indexes().await.unwrap();
    repo
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_create_and_find() {
    let mongo = TestMongo::new().await;
    let repo = repository(&mongo, "mongo_create_and_find").await;

    let created = repo.create(widget("Widget")).await.unwrap();

    let by_id = repo.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(by_id.name, "Widget");
    assert_eq!(by_id.category, "tools");

    let by_name = repo.find_by_name("Widget").await.unwrap().unwrap();
    assert_eq!(by_name.id, created.id);

    assert!(repo.find_by_id(ObjectId::new()).await.unwrap().is_none());
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_unique_index_maps_to_duplicate_name() {
    let mongo = TestMongo::new().await;
    let repo = repository(&mongo, "mongo_unique_index").await;

    repo.create(widget("Widget")).await.unwrap();
    let err = repo.create(widget("Widget")).await.unwrap_err();

    assert!(matches!(err, ProductError::DuplicateName(name) if name == "Widget"));
    assert_eq!(repo.list().await.unwrap().len(), 1);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_update_returns_post_update_document() {
    let mongo = TestMongo::new().await;
    let repo = repository(&mongo, "mongo_update").await;

    let created = repo
        .create(NewProduct {
            colors: Some(vec!["red".into()]),
            ..widget("Widget")
        })
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;

    let updated = repo
        .update(
            created.id,
            UpdateProduct {
                stock: Some(42),
                colors: Some(vec![]),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.stock, 42);
    assert_eq!(updated.price, created.price);
    assert!(updated.colors.is_none());
    assert!(updated.updated_at > created.updated_at);

    let missing = repo
        .update(ObjectId::new(), UpdateProduct::default())
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_rename_onto_taken_name_hits_unique_index() {
    let mongo = TestMongo::new().await;
    let repo = repository(&mongo, "mongo_rename_conflict").await;

    repo.create(widget("Widget")).await.unwrap();
    let gadget = repo.create(widget("Gadget")).await.unwrap();

    let err = repo
        .update(
            gadget.id,
            UpdateProduct {
                name: Some("Widget".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ProductError::DuplicateName(_)));
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_delete_returns_removed_document() {
    let mongo = TestMongo::new().await;
    let repo = repository(&mongo, "mongo_delete").await;

    let created = repo.create(widget("Widget")).await.unwrap();

    let deleted = repo.delete(created.id).await.unwrap().unwrap();
    assert_eq!(deleted.id, created.id);
    assert!(repo.delete(created.id).await.unwrap().is_none());
    assert!(repo.list().await.unwrap().is_empty());
}

/// Insert a document the way the earlier Node service stored it.
async fn insert_legacy(db: &mongodb::Database, name: &str, ratting: i32) -> ObjectId {
    let id = ObjectId::new();
    let stamp = DateTime::from_millis(1_700_000_000_000);
    db.collection::<Document>("products")
        .insert_one(doc! {
            "_id": id,
            "name": name,
            "price": 1,
            "category": "misc",
            "brand": "Old",
            "image_url": "http://x/old.png",
            "stock": 1,
            "ratting": ratting,
            "createdAt": stamp,
            "updatedAt": stamp,
            "__v": 0,
        })
        .await
        .unwrap();
    id
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_reads_legacy_documents() {
    let mongo = TestMongo::new().await;
    let builder = TestDataBuilder::from_test_name("mongo_legacy_documents");
    let db = mongo.database(&builder.database_name());
    let repo = MongoProductRepository::new(&db);

    let id = insert_legacy(&db, "Legacy", 4).await;

    let product = repo.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(product.rating, 4.0);
    assert_eq!(product.price, 1.0);
    assert_eq!(product.created_at.timestamp_millis(), 1_700_000_000_000);
    assert_eq!(repo.list().await.unwrap().len(), 1);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_rating_update_on_legacy_document_keeps_collection_readable() {
    let mongo = TestMongo::new().await;
    let builder = TestDataBuilder::from_test_name("mongo_legacy_rating_update");
    let db = mongo.database(&builder.database_name());
    let repo = MongoProductRepository::new(&db);

    let id = insert_legacy(&db, "Legacy", 4).await;
    repo.create(widget("Widget")).await.unwrap();

    let updated = repo
        .update(
            id,
            UpdateProduct {
                rating: Some(2.5),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.rating, 2.5);
    assert!(updated.updated_at > updated.created_at);

    let raw = db
        .collection::<Document>("products")
        .find_one(doc! { "_id": id })
        .await
        .unwrap()
        .unwrap();
    assert!(!raw.contains_key("ratting"));

    let listed = repo.list().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(repo.find_by_id(id).await.unwrap().unwrap().rating, 2.5);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_index_build_fails_on_duplicate_stored_names() {
    let mongo = TestMongo::new().await;
    let builder = TestDataBuilder::from_test_name("mongo_index_duplicates");
    let db = mongo.database(&builder.database_name());

    insert_legacy(&db, "Twin", 1).await;
    insert_legacy(&db, "Twin", 2).await;

    let err = MongoProductRepository::new(&db)
        .init_indexes()
        .await
        .unwrap_err();
    assert!(matches!(err, ProductError::Database(_)));
}
