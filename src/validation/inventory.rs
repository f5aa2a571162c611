use rust_decimal::Decimal;
use serde_json::{Map, Value};

use super::{Checker, FieldError, Mode, Shape, Text};

/// Validated inventory payload
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryInput {
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub stock: i64,
    pub description: Option<String>,
    pub supplier: Option<String>,
}

impl Shape for InventoryInput {
    fn validate(payload: &Map<String, Value>, _mode: Mode) -> Result<Self, Vec<FieldError>> {
        let mut checker = Checker::new(payload);

        let name = checker.text(Text::required("name", "Name").min(3).max(50));
        let category = checker.text(Text::required("category", "Category"));
        let price = checker.decimal("price", "Price", Decimal::ZERO);

        // Older clients send `quantity`; errors name whichever key was used.
        let stock_field = if !checker.has("stock") && checker.has("quantity") {
            "quantity"
        } else {
            "stock"
        };
        let stock = checker.integer(stock_field, "Stock", 0);

        let description = checker.text(Text::optional("description", "Description").max(255));
        let supplier = checker.text(Text::optional("supplier", "Supplier"));

        checker.finish(|| {
            Some(InventoryInput {
                name: name?,
                category: category?,
                price: price?,
                stock: stock?,
                description,
                supplier,
            })
        })
    }
}
