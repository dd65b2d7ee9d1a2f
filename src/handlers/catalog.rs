//! Catalog handlers: products, tags, properties. Read-only.

use super::parse_id;
use crate::error::AppError;
use crate::repr;
use crate::response::{success_many, success_one_ok};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::response::IntoResponse;

/// GET /products
pub async fn list_products(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let products = state.store.list_products().await?;
    let data: Vec<_> = products
        .iter()
        .map(|p| repr::product_list(p, &state.media))
        .collect();
    Ok(success_many(data))
}

/// GET /products/:id
pub async fn read_product(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let product = state
        .store
        .product(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {}", id_str)))?;
    Ok(success_one_ok(repr::product_detail(&product, &state.media)))
}

/// GET /tags
pub async fn list_tags(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let tags = state.store.list_tags().await?;
    Ok(success_many(tags.iter().map(repr::tag).collect()))
}

/// GET /properties
pub async fn list_properties(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let properties = state.store.list_properties().await?;
    Ok(success_many(properties.iter().map(repr::property).collect()))
}
