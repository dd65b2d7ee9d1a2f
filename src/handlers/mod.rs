//! HTTP handlers. Each one loads through the store, then hands the graph to `repr`.

pub mod accounts;
pub mod catalog;
pub mod orders;

use crate::error::AppError;

fn parse_id(id_str: &str) -> Result<i64, AppError> {
    id_str
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid id '{}'", id_str)))
}
