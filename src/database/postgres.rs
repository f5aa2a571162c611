use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::{Backend, Collection, InventoryItem, NewInventoryItem, NewUser, StoreError, User, UserDirectory};

const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS inventory (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        category TEXT NOT NULL,
        price NUMERIC NOT NULL CHECK (price >= 0),
        stock BIGINT NOT NULL CHECK (stock >= 0),
        description TEXT,
        supplier TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    "CREATE UNIQUE INDEX IF NOT EXISTS inventory_name_key ON inventory (name)",
    r#"CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        email TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        role TEXT NOT NULL DEFAULT 'user' CHECK (role IN ('user', 'admin')),
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    "CREATE UNIQUE INDEX IF NOT EXISTS users_email_key ON users (email)",
];

const INVENTORY_COLUMNS: &str =
    "id, name, category, price, stock, description, supplier, created_at, updated_at";
const USER_COLUMNS: &str =
    "id, first_name, last_name, email, password_hash, role, created_at, updated_at";

/// Map driver errors, turning unique index violations into conflicts
fn store_error(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.is_unique_violation() {
            let field = match db_err.constraint() {
                Some("users_email_key") => "email",
                Some("inventory_name_key") => "name",
                _ => "value",
            };
            return StoreError::Conflict {
                field: field.to_string(),
                message: db_err.message().to_string(),
            };
        }
    }
    if let sqlx::Error::ColumnDecode { .. } = e {
        return StoreError::Corrupt(e.to_string());
    }
    StoreError::Backend(e.to_string())
}

/// PostgreSQL-backed store
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create tables and unique indexes when missing
    pub async fn bootstrap(&self) -> Result<(), DatabaseError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| DatabaseError::Bootstrap(e.to_string()))?;
        }
        info!("Database schema ready");
        Ok(())
    }
}

#[async_trait]
impl Collection<InventoryItem> for PgStore {
    async fn list(&self) -> Result<Vec<InventoryItem>, StoreError> {
        let sql = format!("SELECT {} FROM inventory ORDER BY created_at DESC, id DESC", INVENTORY_COLUMNS);
        sqlx::query_as::<_, InventoryItem>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(store_error)
    }

    async fn find(&self, id: Uuid) -> Result<Option<InventoryItem>, StoreError> {
        let sql = format!("SELECT {} FROM inventory WHERE id = $1", INVENTORY_COLUMNS);
        sqlx::query_as::<_, InventoryItem>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)
    }

    async fn insert(&self, new: NewInventoryItem) -> Result<InventoryItem, StoreError> {
        let sql = format!(
            "INSERT INTO inventory (id, name, category, price, stock, description, supplier)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {}",
            INVENTORY_COLUMNS
        );
        sqlx::query_as::<_, InventoryItem>(&sql)
            .bind(Uuid::new_v4())
            .bind(new.name)
            .bind(new.category)
            .bind(new.price)
            .bind(new.stock)
            .bind(new.description)
            .bind(new.supplier)
            .fetch_one(&self.pool)
            .await
            .map_err(store_error)
    }

    async fn update(&self, id: Uuid, changes: NewInventoryItem) -> Result<Option<InventoryItem>, StoreError> {
        let sql = format!(
            "UPDATE inventory
             SET name = $2, category = $3, price = $4, stock = $5,
                 description = $6, supplier = $7, updated_at = now()
             WHERE id = $1
             RETURNING {}",
            INVENTORY_COLUMNS
        );
        sqlx::query_as::<_, InventoryItem>(&sql)
            .bind(id)
            .bind(changes.name)
            .bind(changes.category)
            .bind(changes.price)
            .bind(changes.stock)
            .bind(changes.description)
            .bind(changes.supplier)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM inventory WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Collection<User> for PgStore {
    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let sql = format!("SELECT {} FROM users ORDER BY created_at DESC, id DESC", USER_COLUMNS);
        sqlx::query_as::<_, User>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(store_error)
    }

    async fn find(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)
    }

    async fn insert(&self, new: NewUser) -> Result<User, StoreError> {
        let sql = format!(
            "INSERT INTO users (id, first_name, last_name, email, password_hash, role)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(new.first_name)
            .bind(new.last_name)
            .bind(new.email)
            .bind(new.password_hash)
            .bind(new.role.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(store_error)
    }

    async fn update(&self, id: Uuid, changes: NewUser) -> Result<Option<User>, StoreError> {
        let sql = format!(
            "UPDATE users
             SET first_name = $2, last_name = $3, email = $4, password_hash = $5,
                 role = $6, updated_at = now()
             WHERE id = $1
             RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(changes.first_name)
            .bind(changes.last_name)
            .bind(changes.email)
            .bind(changes.password_hash)
            .bind(changes.role.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl UserDirectory for PgStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)
    }
}

#[async_trait]
impl Backend for PgStore {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(())
    }
}
