use super::RouteTable;
use crate::handlers::catalog::{list_products, list_properties, list_tags, read_product};
use axum::routing::get;

pub fn products() -> RouteTable {
    RouteTable::new()
        .route("/products", get(list_products))
        .route("/products/:id", get(read_product))
}

pub fn tags() -> RouteTable {
    RouteTable::new().route("/tags", get(list_tags))
}

pub fn properties() -> RouteTable {
    RouteTable::new().route("/properties", get(list_properties))
}
