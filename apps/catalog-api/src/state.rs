//! Application state management

use database::redis::ConnectionManager;
use mongodb::{Client, Database};

/// Shared application state, built once in `main`
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub mongo_client: Client,
    pub db: Database,
    /// Connected at startup when Redis is reachable; no handler reads it yet
    pub cache: Option<ConnectionManager>,
}
