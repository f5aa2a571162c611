use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Backend, Collection, Entity, InventoryItem, StoreError, User, UserDirectory};

/// One collection of records keyed by id
#[derive(Debug)]
pub struct Table<T> {
    rows: Arc<RwLock<HashMap<Uuid, T>>>,
}

impl<T> Clone for Table<T> {
    fn clone(&self) -> Self {
        Self {
            rows: Arc::clone(&self.rows),
        }
    }
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<T: Entity> Table<T> {
    fn conflict(new: &T::New) -> StoreError {
        StoreError::Conflict {
            field: T::UNIQUE_FIELD.to_string(),
            message: format!(
                "{} '{}' already exists in {}",
                T::UNIQUE_FIELD,
                T::new_unique_value(new),
                T::COLLECTION
            ),
        }
    }

    fn taken(rows: &HashMap<Uuid, T>, new: &T::New, except: Option<Uuid>) -> bool {
        let wanted = T::new_unique_value(new);
        rows.values()
            .any(|row| Some(row.id()) != except && row.unique_value() == wanted)
    }
}

#[async_trait]
impl<T: Entity> Collection<T> for Table<T> {
    async fn list(&self) -> Result<Vec<T>, StoreError> {
        let mut rows: Vec<T> = self.rows.read().await.values().cloned().collect();
        rows.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().cmp(&a.id()))
        });
        Ok(rows)
    }

    async fn find(&self, id: Uuid) -> Result<Option<T>, StoreError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn insert(&self, new: T::New) -> Result<T, StoreError> {
        let mut rows = self.rows.write().await;
        if Self::taken(&rows, &new, None) {
            return Err(Self::conflict(&new));
        }

        let now = Utc::now();
        let id = Uuid::new_v4();
        let record = T::materialize(id, new, now, now);
        rows.insert(id, record.clone());
        Ok(record)
    }

    async fn update(&self, id: Uuid, changes: T::New) -> Result<Option<T>, StoreError> {
        let mut rows = self.rows.write().await;
        let Some(created_at) = rows.get(&id).map(|row| row.created_at()) else {
            return Ok(None);
        };
        if Self::taken(&rows, &changes, Some(id)) {
            return Err(Self::conflict(&changes));
        }

        let record = T::materialize(id, changes, created_at, Utc::now());
        rows.insert(id, record.clone());
        Ok(Some(record))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.rows.write().await.remove(&id).is_some())
    }
}

/// Process-local store. Contents are lost on restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inventory: Table<InventoryItem>,
    users: Table<User>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Collection<InventoryItem> for MemoryStore {
    async fn list(&self) -> Result<Vec<InventoryItem>, StoreError> {
        self.inventory.list().await
    }

    async fn find(&self, id: Uuid) -> Result<Option<InventoryItem>, StoreError> {
        self.inventory.find(id).await
    }

    async fn insert(&self, new: <InventoryItem as Entity>::New) -> Result<InventoryItem, StoreError> {
        self.inventory.insert(new).await
    }

    async fn update(
        &self,
        id: Uuid,
        changes: <InventoryItem as Entity>::New,
    ) -> Result<Option<InventoryItem>, StoreError> {
        self.inventory.update(id, changes).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        self.inventory.delete(id).await
    }
}

#[async_trait]
impl Collection<User> for MemoryStore {
    async fn list(&self) -> Result<Vec<User>, StoreError> {
        self.users.list().await
    }

    async fn find(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        self.users.find(id).await
    }

    async fn insert(&self, new: <User as Entity>::New) -> Result<User, StoreError> {
        self.users.insert(new).await
    }

    async fn update(&self, id: Uuid, changes: <User as Entity>::New) -> Result<Option<User>, StoreError> {
        self.users.update(id, changes).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        self.users.delete(id).await
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .rows
            .read()
            .await
            .values()
            .find(|user| user.email == email)
            .cloned())
    }
}

#[async_trait]
impl Backend for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
