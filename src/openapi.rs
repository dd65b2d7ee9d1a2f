//! OpenAPI document for the request and response shapes.

use crate::repr::{
    CartUnitRepr, OrderDetailRepr, OrderListRepr, OrderUnitRepr, PriceRange, ProductDetailRepr,
    ProductListRepr, PropertyRepr, PropertyValueRepr, SellerRepr, UnitForOrderRepr, UnitPropertyRepr,
    UnitRepr, UserRepr,
};
use crate::service::{CartUnitInput, OrderInput, SellerInput, UserInput};
use axum::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(title = "restshop", description = "Catalog, cart, order and sign-up API"),
    components(schemas(
        ProductListRepr,
        ProductDetailRepr,
        PriceRange,
        UnitRepr,
        UnitPropertyRepr,
        PropertyRepr,
        PropertyValueRepr,
        OrderListRepr,
        OrderDetailRepr,
        OrderUnitRepr,
        UnitForOrderRepr,
        CartUnitRepr,
        UserRepr,
        SellerRepr,
        CartUnitInput,
        OrderInput,
        UserInput,
        SellerInput,
    ))
)]
pub struct ApiDoc;

/// GET /schema
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
