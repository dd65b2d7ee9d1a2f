use super::RouteTable;
use crate::handlers::accounts::{sign_up_seller, sign_up_user};
use axum::routing::post;

pub fn users() -> RouteTable {
    RouteTable::new().route("/users", post(sign_up_user))
}

pub fn sellers() -> RouteTable {
    RouteTable::new().route("/sellers", post(sign_up_seller))
}
