//! Sign-up handlers.

use crate::error::AppError;
use crate::repr::{SellerRepr, UserRepr};
use crate::response::success_one;
use crate::service::{create_seller, create_user, SellerInput, UserInput};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

/// POST /users
pub async fn sign_up_user(
    State(state): State<AppState>,
    payload: Result<Json<UserInput>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(input) = payload?;
    let user = create_user(state.store.as_ref(), &input).await?;
    Ok(success_one(UserRepr::from(&user)))
}

/// POST /sellers
pub async fn sign_up_seller(
    State(state): State<AppState>,
    payload: Result<Json<SellerInput>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(input) = payload?;
    let (user, seller) = create_seller(state.store.as_ref(), &input).await?;
    Ok(success_one(SellerRepr::new(&user, &seller)))
}
