use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use serde_json::{json, Map, Value};
use std::sync::Arc;

use super::Resource;
use crate::database::{Collection, Datastore, InventoryItem, NewInventoryItem};
use crate::error::ApiError;
use crate::policy::Access;
use crate::types::Operation;
use crate::validation::InventoryInput;

pub struct InventoryResource;

#[async_trait]
impl Resource for InventoryResource {
    type Record = InventoryItem;
    type Input = InventoryInput;
    type View = InventoryItem;

    const LABEL: &'static str = "Inventory item";

    fn access(operation: Operation) -> Access {
        match operation {
            Operation::List | Operation::Get => Access::Public,
            Operation::Create | Operation::Update | Operation::Delete => Access::Authenticated,
        }
    }

    fn collection(store: &Datastore) -> Arc<dyn Collection<InventoryItem>> {
        store.inventory.clone()
    }

    fn editable_fields(item: &InventoryItem) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("name".into(), json!(item.name));
        fields.insert("category".into(), json!(item.category));
        fields.insert("price".into(), json!(item.price.to_f64()));
        fields.insert("stock".into(), json!(item.stock));
        fields.insert("description".into(), json!(item.description));
        fields.insert("supplier".into(), json!(item.supplier));
        fields
    }

    fn merge(mut existing: Map<String, Value>, payload: Map<String, Value>) -> Map<String, Value> {
        // A `quantity` change replaces the stored stock unless `stock` is also sent
        if payload.contains_key("quantity") && !payload.contains_key("stock") {
            existing.remove("stock");
        }
        existing.extend(payload);
        existing
    }

    async fn prepare(input: InventoryInput, _existing: Option<&InventoryItem>) -> Result<NewInventoryItem, ApiError> {
        Ok(NewInventoryItem {
            name: input.name,
            category: input.category,
            price: input.price,
            stock: input.stock,
            description: input.description,
            supplier: input.supplier,
        })
    }

    fn view(item: InventoryItem) -> InventoryItem {
        item
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_replaces_stock_on_merge() {
        let mut existing = Map::new();
        existing.insert("stock".into(), json!(3));
        let payload = json!({ "quantity": 7 }).as_object().cloned().unwrap();

        let merged = InventoryResource::merge(existing, payload);
        assert!(!merged.contains_key("stock"));
        assert_eq!(merged["quantity"], 7);
    }

    #[test]
    fn reads_are_public_and_writes_are_not() {
        assert_eq!(InventoryResource::access(Operation::List), Access::Public);
        assert_eq!(InventoryResource::access(Operation::Delete), Access::Authenticated);
    }
}
