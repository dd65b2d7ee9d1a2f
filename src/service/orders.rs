//! Order placement. Each line is a cart line; the store snapshots unit prices.

use super::cart::{check_cart_unit, CartUnitInput, NOT_ENOUGH_STOCK};
use super::validation::Validator;
use crate::error::{AppError, FieldErrors};
use crate::models::{NewOrder, NewOrderLine, OrderGraph};
use crate::store::ShopStore;
use serde::Deserialize;
use std::collections::HashMap;
use utoipa::ToSchema;

pub const EMPTY_ORDER: &str = "This list may not be empty.";

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct OrderInput {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub units: Option<Vec<CartUnitInput>>,
}

/// Validate and write an order, then load it back for representation.
pub async fn place_order(store: &dyn ShopStore, input: &OrderInput) -> Result<OrderGraph, AppError> {
    let mut v = Validator::new();
    let name = v.required("name", &input.name).map(String::from);
    let address = v.required("address", &input.address).map(String::from);
    let phone = v.required("phone", &input.phone).map(String::from);

    let mut lines = Vec::new();
    let mut stock: HashMap<i64, (i64, i32)> = HashMap::new();
    match input.units.as_deref() {
        None => v.add("units", super::validation::REQUIRED),
        Some([]) => v.add("units", EMPTY_ORDER),
        Some(units) => {
            let mut nested = FieldErrors::new();
            for (i, unit_input) in units.iter().enumerate() {
                match check_cart_unit(store, unit_input).await {
                    Ok(checked) => {
                        let unit = &checked.unit.unit.unit;
                        let entry = stock.entry(unit.id).or_insert((0, unit.num_in_stock));
                        entry.0 += i64::from(checked.quantity);
                        lines.push(NewOrderLine {
                            unit_id: unit.id,
                            quantity: checked.quantity,
                        });
                    }
                    Err(AppError::Validation(errors)) => {
                        nested.merge_prefixed(&format!("units[{}]", i), errors)
                    }
                    Err(e) => return Err(e),
                }
            }
            if !nested.is_empty() {
                return Err(AppError::Validation(merge(v, nested)));
            }
            // Lines for the same unit must fit in stock together.
            if stock.values().any(|(requested, in_stock)| *requested > i64::from(*in_stock)) {
                v.add("units", NOT_ENOUGH_STOCK);
            }
        }
    }

    let (Some(name), Some(address), Some(phone)) = (name, address, phone) else {
        return Err(AppError::Validation(v.into_errors()));
    };
    v.finish()?;

    let order_id = store
        .create_order(&NewOrder {
            name,
            address,
            phone,
            lines,
        })
        .await?;
    tracing::info!(order_id, "order placed");
    store
        .order(order_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {}", order_id)))
}

fn merge(v: Validator, nested: FieldErrors) -> FieldErrors {
    let mut errors = v.into_errors();
    errors.extend(nested);
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use rust_decimal::Decimal;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn line(sku: &str, quantity: i64) -> CartUnitInput {
        CartUnitInput {
            sku: Some(sku.into()),
            quantity: Some(quantity),
        }
    }

    fn order_input(units: Vec<CartUnitInput>) -> OrderInput {
        OrderInput {
            name: Some("Grace".into()),
            address: Some("2 Side St".into()),
            phone: Some("555-0101".into()),
            units: Some(units),
        }
    }

    fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        let product = store.add_product("Pen", "");
        store.add_unit(product, "PEN-B", dec("1.50"), 4);
        store
    }

    #[tokio::test]
    async fn price_is_snapshotted_at_creation() {
        let store = seeded();
        let graph = place_order(&store, &order_input(vec![line("PEN-B", 2)])).await.unwrap();
        assert_eq!(graph.lines[0].order_unit.unit_price, dec("1.50"));

        assert!(store.set_unit_price("PEN-B", dec("2.75")));
        let reloaded = store.order(graph.order.id).await.unwrap().unwrap();
        assert_eq!(reloaded.lines[0].order_unit.unit_price, dec("1.50"));
    }

    #[tokio::test]
    async fn line_errors_are_indexed() {
        let store = seeded();
        let err = place_order(&store, &order_input(vec![line("PEN-B", 1), line("GHOST", 1)]))
            .await
            .unwrap_err();
        match err {
            AppError::Validation(errors) => {
                assert_eq!(errors.get("units[1].sku").unwrap(), [super::super::cart::UNIT_DOES_NOT_EXIST]);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(store.list_orders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn repeated_sku_is_checked_against_combined_stock() {
        let store = seeded();
        let err = place_order(&store, &order_input(vec![line("PEN-B", 3), line("PEN-B", 2)]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref e) if e.get("units").is_some()));
    }

    #[tokio::test]
    async fn empty_order_and_missing_contact_fields_are_reported_together() {
        let store = seeded();
        let input = OrderInput {
            units: Some(vec![]),
            ..OrderInput::default()
        };
        match place_order(&store, &input).await.unwrap_err() {
            AppError::Validation(errors) => {
                assert_eq!(errors.get("units").unwrap(), [EMPTY_ORDER]);
                assert!(errors.get("name").is_some());
                assert!(errors.get("address").is_some());
                assert!(errors.get("phone").is_some());
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
