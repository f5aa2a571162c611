use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::Entity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub stock: i64,
    pub description: Option<String>,
    pub supplier: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Column values for an insert or a full replacement
#[derive(Debug, Clone, PartialEq)]
pub struct NewInventoryItem {
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub stock: i64,
    pub description: Option<String>,
    pub supplier: Option<String>,
}

impl Entity for InventoryItem {
    type New = NewInventoryItem;

    const COLLECTION: &'static str = "inventory";
    const UNIQUE_FIELD: &'static str = "name";

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn unique_value(&self) -> &str {
        &self.name
    }

    fn new_unique_value(new: &NewInventoryItem) -> &str {
        &new.name
    }

    fn materialize(
        id: Uuid,
        new: NewInventoryItem,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: new.name,
            category: new.category,
            price: new.price,
            stock: new.stock,
            description: new.description,
            supplier: new.supplier,
            created_at,
            updated_at,
        }
    }
}
