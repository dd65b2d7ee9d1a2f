//! Order and cart handlers.

use super::parse_id;
use crate::error::AppError;
use crate::repr;
use crate::response::{success_many, success_one, success_one_ok};
use crate::service::{check_cart_unit, place_order, CartUnitInput, OrderInput};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

/// GET /orders
pub async fn list_orders(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let orders = state.store.list_orders().await?;
    Ok(success_many(orders.iter().map(repr::order_list).collect()))
}

/// GET /orders/:id
pub async fn read_order(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let order = state
        .store
        .order(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {}", id_str)))?;
    Ok(success_one_ok(repr::order_detail(&order, &state.media)))
}

/// POST /orders
///
/// Every line is validated like a cart entry before anything is written.
pub async fn create_order(
    State(state): State<AppState>,
    payload: Result<Json<OrderInput>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(input) = payload?;
    let order = place_order(state.store.as_ref(), &input).await?;
    Ok(success_one(repr::order_detail(&order, &state.media)))
}

/// POST /cart
///
/// Checks one line against current stock. Nothing is reserved.
pub async fn check_cart(
    State(state): State<AppState>,
    payload: Result<Json<CartUnitInput>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(input) = payload?;
    let checked = check_cart_unit(state.store.as_ref(), &input).await?;
    Ok(success_one_ok(repr::cart_unit(checked.quantity, &checked.unit, &state.media)))
}
