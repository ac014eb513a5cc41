//! Connection management for the catalog's backing stores.
//!
//! # Features
//!
//! - `mongodb` (default) - MongoDB document store
//! - `redis` - Redis cache client
//! - `config` - `core_config::FromEnv` impls for the config structs
//! - `all` - everything above
//!
//! # Examples
//!
//! ## MongoDB
//!
//! ```ignore
//! use database::mongodb::{self, MongoConfig};
//!
//! let config = MongoConfig::with_database("mongodb://localhost:27017", "catalog");
//! let client = mongodb::connect_from_config_with_retry(&config, None).await?;
//! let db = config.select_database(&client);
//! ```
//!
//! ## Redis
//!
//! ```ignore
//! use database::redis;
//!
//! let conn = redis::connect("redis://127.0.0.1:6379").await?;
//! ```

pub mod common;

#[cfg(feature = "redis")]
pub mod redis;

#[cfg(feature = "mongodb")]
pub mod mongodb;

pub use common::{DatabaseError, DatabaseResult};
