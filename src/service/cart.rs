//! Cart line validation: the sku must resolve to a unit with enough stock.
//! Stock is read at check time only; nothing is reserved.

use super::validation::Validator;
use crate::error::AppError;
use crate::models::UnitWithProduct;
use crate::store::ShopStore;
use serde::Deserialize;
use utoipa::ToSchema;

pub const UNIT_DOES_NOT_EXIST: &str = "Unit does not exist";
pub const NOT_ENOUGH_STOCK: &str = "There are not enough units in stock";
pub const DEFAULT_QUANTITY: i64 = 1;

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CartUnitInput {
    pub sku: Option<String>,
    /// Defaults to 1.
    pub quantity: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckedCartUnit {
    pub quantity: i32,
    pub unit: UnitWithProduct,
}

/// Validate one cart line. Failures are `AppError::Validation` attributed to
/// `sku` or `quantity`; storage failures pass through unchanged.
pub async fn check_cart_unit(
    store: &dyn ShopStore,
    input: &CartUnitInput,
) -> Result<CheckedCartUnit, AppError> {
    let mut v = Validator::new();
    let sku = v.required("sku", &input.sku);
    let quantity = input.quantity.unwrap_or(DEFAULT_QUANTITY);
    let quantity_ok =
        v.min_value("quantity", quantity, 1) && v.max_value("quantity", quantity, i64::from(i32::MAX));
    let Some(sku) = sku else {
        return Err(AppError::Validation(v.into_errors()));
    };

    let Some(unit) = store.unit_by_sku(sku).await? else {
        v.add("sku", UNIT_DOES_NOT_EXIST);
        return Err(AppError::Validation(v.into_errors()));
    };
    if !quantity_ok {
        return Err(AppError::Validation(v.into_errors()));
    }
    if i64::from(unit.unit.unit.num_in_stock) < quantity {
        tracing::debug!(sku, quantity, in_stock = unit.unit.unit.num_in_stock, "cart line exceeds stock");
        v.add("quantity", NOT_ENOUGH_STOCK);
        return Err(AppError::Validation(v.into_errors()));
    }
    Ok(CheckedCartUnit {
        quantity: quantity as i32,
        unit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn store() -> MemoryStore {
        let store = MemoryStore::new();
        let product = store.add_product("Hat", "");
        store.add_unit(product, "HAT-1", "12.00".parse().unwrap(), 3);
        store
    }

    fn input(sku: Option<&str>, quantity: Option<i64>) -> CartUnitInput {
        CartUnitInput {
            sku: sku.map(String::from),
            quantity,
        }
    }

    fn field_errors(err: AppError) -> crate::error::FieldErrors {
        match err {
            AppError::Validation(errors) => errors,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn quantity_defaults_to_one() {
        let checked = check_cart_unit(&store(), &input(Some("HAT-1"), None)).await.unwrap();
        assert_eq!(checked.quantity, 1);
        assert_eq!(checked.unit.product_title, "Hat");
    }

    #[tokio::test]
    async fn exact_stock_is_accepted() {
        assert!(check_cart_unit(&store(), &input(Some("HAT-1"), Some(3))).await.is_ok());
    }

    #[tokio::test]
    async fn more_than_stock_is_rejected_on_quantity() {
        let err = check_cart_unit(&store(), &input(Some("HAT-1"), Some(4))).await.unwrap_err();
        assert_eq!(field_errors(err).get("quantity").unwrap(), [NOT_ENOUGH_STOCK]);
    }

    #[tokio::test]
    async fn unknown_sku_is_rejected_on_sku() {
        let err = check_cart_unit(&store(), &input(Some("NOPE"), Some(1))).await.unwrap_err();
        assert_eq!(field_errors(err).get("sku").unwrap(), [UNIT_DOES_NOT_EXIST]);
    }

    #[tokio::test]
    async fn zero_quantity_is_below_minimum() {
        let err = check_cart_unit(&store(), &input(Some("HAT-1"), Some(0))).await.unwrap_err();
        let errors = field_errors(err);
        assert_eq!(errors.get("quantity").unwrap(), ["Ensure this value is greater than or equal to 1."]);
        assert!(errors.get("sku").is_none());
    }

    #[tokio::test]
    async fn missing_sku_is_required() {
        let err = check_cart_unit(&store(), &input(None, Some(1))).await.unwrap_err();
        assert_eq!(field_errors(err).get("sku").unwrap(), [super::super::validation::REQUIRED]);
    }
}
