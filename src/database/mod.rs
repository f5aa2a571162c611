//! Persistence behind two narrow traits.
//!
//! Handlers see [`Collection`] and [`UserDirectory`] trait objects only. The
//! backing store is either [`MemoryStore`] or [`PgStore`], chosen at startup.

pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

pub use manager::{connect, DatabaseError};
pub use memory::MemoryStore;
pub use models::{InventoryItem, NewInventoryItem, NewUser, User, UserView};
pub use postgres::PgStore;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    #[error("duplicate value for {field}: {message}")]
    Conflict { field: String, message: String },

    #[error("backend failure: {0}")]
    Backend(String),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Parse a client-supplied identifier
pub fn parse_id(raw: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(raw.trim()).map_err(|_| StoreError::InvalidId(raw.to_string()))
}

/// A record type owned by a [`Collection`]
pub trait Entity: Clone + Send + Sync + 'static {
    /// Client-controlled column values
    type New: Clone + Send + Sync + 'static;

    const COLLECTION: &'static str;

    /// The single field that must be unique across the collection
    const UNIQUE_FIELD: &'static str;

    fn id(&self) -> Uuid;
    fn created_at(&self) -> DateTime<Utc>;
    fn unique_value(&self) -> &str;
    fn new_unique_value(new: &Self::New) -> &str;
    fn materialize(id: Uuid, new: Self::New, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self;
}

#[async_trait]
pub trait Collection<T: Entity>: Send + Sync {
    /// All records, newest first
    async fn list(&self) -> Result<Vec<T>, StoreError>;

    async fn find(&self, id: Uuid) -> Result<Option<T>, StoreError>;

    /// Insert with a store-assigned id and timestamps. Uniqueness is checked
    /// atomically with the write.
    async fn insert(&self, new: T::New) -> Result<T, StoreError>;

    /// Replace the client-controlled columns. `None` when no record has `id`.
    async fn update(&self, id: Uuid, changes: T::New) -> Result<Option<T>, StoreError>;

    /// `false` when no record has `id`
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Exact match on an already lower-cased email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
}

#[async_trait]
pub trait Backend: Send + Sync {
    fn name(&self) -> &'static str;
    async fn health_check(&self) -> Result<(), StoreError>;
}

/// Handles onto one backing store, one per concern
#[derive(Clone)]
pub struct Datastore {
    pub inventory: Arc<dyn Collection<InventoryItem>>,
    pub users: Arc<dyn Collection<User>>,
    pub directory: Arc<dyn UserDirectory>,
    pub backend: Arc<dyn Backend>,
}

impl Datastore {
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: Collection<InventoryItem> + Collection<User> + UserDirectory + Backend + 'static,
    {
        Self {
            inventory: store.clone(),
            users: store.clone(),
            directory: store.clone(),
            backend: store,
        }
    }

    pub fn memory() -> Self {
        Self::from_store(Arc::new(MemoryStore::new()))
    }
}

impl std::fmt::Debug for Datastore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Datastore")
            .field("backend", &self.backend.name())
            .finish()
    }
}
