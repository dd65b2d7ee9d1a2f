use super::RouteTable;
use crate::handlers::orders::{check_cart, create_order, list_orders, read_order};
use axum::routing::{get, post};

pub fn orders() -> RouteTable {
    RouteTable::new()
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/:id", get(read_order))
}

pub fn cart() -> RouteTable {
    RouteTable::new().route("/cart", post(check_cart))
}
